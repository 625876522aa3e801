//! Tree-sitter parsing and node helpers for TypeScript sources.

use std::path::Path;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

/// Grammar used for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `.ts`, `.js`, and module variants.
    TypeScript,
    /// `.tsx` and `.jsx`.
    Tsx,
}

impl Dialect {
    /// Picks the grammar from the file extension. JSX-capable extensions
    /// use the TSX grammar; everything else parses as TypeScript.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx" | "jsx") => Self::Tsx,
            _ => Self::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// File extensions the analyzer understands.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

/// Errors from building a syntax tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {dialect:?} grammar: {message}")]
    Language {
        /// Grammar that failed.
        dialect: Dialect,
        /// Loader message.
        message: String,
    },

    /// The parser produced no tree.
    #[error("parser returned no syntax tree")]
    NoTree,
}

/// A parsed source file borrowing its text.
pub struct SourceTree<'src> {
    tree: Tree,
    source: &'src str,
    dialect: Dialect,
}

impl<'src> SourceTree<'src> {
    /// Parses `source` with the grammar selected by `path`'s extension.
    ///
    /// Syntax errors do not fail the parse; they surface as `ERROR` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the grammar cannot be loaded or no tree is
    /// produced.
    pub fn parse(path: &Path, source: &'src str) -> Result<Self, ParseError> {
        Self::parse_as(Dialect::for_path(path), source)
    }

    /// Parses `source` with an explicit grammar.
    ///
    /// # Errors
    ///
    /// See [`SourceTree::parse`].
    pub fn parse_as(dialect: Dialect, source: &'src str) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| ParseError::Language {
                dialect,
                message: e.to_string(),
            })?;
        let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
        Ok(Self {
            tree,
            source,
            dialect,
        })
    }

    /// Root `program` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text the tree was built from.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Grammar used for this tree.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &'src str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Pre-order iterator over every node of the tree.
    #[must_use]
    pub fn nodes(&self) -> Preorder<'_> {
        Preorder::new(self.root())
    }

    /// Contents of a string literal without quotes, or of a template string
    /// without substitutions.
    #[must_use]
    pub fn string_value(&self, node: Node<'_>) -> Option<&'src str> {
        match node.kind() {
            "string" => {
                let raw = self.text(node);
                raw.get(1..raw.len().saturating_sub(1))
            }
            "template_string" => {
                if has_child_kind(node, "template_substitution") {
                    return None;
                }
                let raw = self.text(node);
                raw.get(1..raw.len().saturating_sub(1))
            }
            _ => None,
        }
    }

    /// Dotted name of an identifier or non-computed member chain, e.g.
    /// `Object.assign` or `window.localStorage.setItem`.
    #[must_use]
    pub fn dotted_name(&self, node: Node<'_>) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = node;
        loop {
            match current.kind() {
                "identifier" | "this" | "property_identifier" => {
                    segments.push(self.text(current));
                    break;
                }
                "member_expression" => {
                    let property = current.child_by_field_name("property")?;
                    if property.kind() != "property_identifier" {
                        return None;
                    }
                    segments.push(self.text(property));
                    current = current.child_by_field_name("object")?;
                }
                "parenthesized_expression" => current = *named_children(current).first()?,
                _ => return None,
            }
        }
        segments.reverse();
        Some(segments.join("."))
    }

    /// Name of the property accessed by a non-computed member expression.
    #[must_use]
    pub fn member_property(&self, node: Node<'_>) -> Option<&'src str> {
        if node.kind() != "member_expression" {
            return None;
        }
        let property = node.child_by_field_name("property")?;
        matches!(
            property.kind(),
            "property_identifier" | "private_property_identifier"
        )
        .then(|| self.text(property))
    }

    /// For a call expression, the callee's object and method name when the
    /// callee is a member expression (`recv.method(...)`).
    #[must_use]
    pub fn method_call<'t>(&self, call: Node<'t>) -> Option<(Node<'t>, &'src str)> {
        let callee = call.child_by_field_name("function")?;
        let method = self.member_property(callee)?;
        Some((callee.child_by_field_name("object")?, method))
    }

    /// Argument nodes of a call or `new` expression, skipping punctuation
    /// and comments.
    #[must_use]
    pub fn arguments<'t>(&self, call: Node<'t>) -> Vec<Node<'t>> {
        call.child_by_field_name("arguments")
            .map(|args| named_children(args))
            .unwrap_or_default()
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect()
    }
}

/// Named children of `node`, in source order.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// All children of `node`, including anonymous tokens.
#[must_use]
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Whether `node` has a direct child of `kind`.
#[must_use]
pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// Whether `kind` introduces a new function scope.
#[must_use]
pub fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "function_expression"
            | "arrow_function"
            | "method_definition"
            | "generator_function_declaration"
            | "generator_function"
    )
}

/// Pre-order traversal of a subtree; a parent is yielded before its children.
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Preorder<'t> {
    /// Starts a traversal rooted at `node`.
    #[must_use]
    pub fn new(node: Node<'t>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.cursor.goto_first_child() || self.cursor.goto_next_sibling() {
            return Some(node);
        }
        loop {
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
        }
    }
}
