//! Import extraction from TypeScript syntax trees.
//!
//! Collects every module reference a file makes: static `import`
//! statements, re-exports, `import x = require(..)`, `require(..)` calls
//! and dynamic `import(..)` expressions.

use grain_lint_core::syntax::{children, has_child_kind, named_children};
use grain_lint_core::SourceTree;
use tree_sitter::Node;

/// Syntactic form of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSyntax {
    /// `import ... from 'x'` or `import 'x'`.
    Static,
    /// `export ... from 'x'`.
    ReExport,
    /// `require('x')` or `import x = require('x')`.
    Require,
    /// `import('x')`.
    Dynamic,
}

/// A binding introduced by an import clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName<'t> {
    /// The specifier node.
    pub node: Node<'t>,
    /// Imported (not local) name.
    pub name: String,
    /// Marked with an inline `type` modifier.
    pub type_only: bool,
}

/// One module reference in a file.
#[derive(Debug, Clone)]
pub struct ImportRef<'t> {
    /// The whole statement or call.
    pub node: Node<'t>,
    /// The string literal holding the specifier.
    pub source_node: Node<'t>,
    /// Specifier without quotes.
    pub specifier: String,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
    /// How the module is referenced.
    pub syntax: ImportSyntax,
    /// `import type ...` or `export type ... from`.
    pub type_only: bool,
    /// Named specifiers from `{ ... }`.
    pub named: Vec<ImportedName<'t>>,
    /// Default binding, if any.
    pub default: Option<String>,
    /// Whether a `* as ns` binding is present.
    pub namespace: bool,
}

impl ImportRef<'_> {
    /// True for `import type` or when every named specifier is type-only.
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        if self.type_only {
            return true;
        }
        self.default.is_none()
            && !self.namespace
            && !self.named.is_empty()
            && self.named.iter().all(|n| n.type_only)
    }
}

/// Extracts every import in document order.
#[must_use]
pub fn extract_imports<'t>(tree: &'t SourceTree<'_>) -> Vec<ImportRef<'t>> {
    let mut imports = Vec::new();
    for node in tree.nodes() {
        let found = match node.kind() {
            "import_statement" => static_import(tree, node),
            "export_statement" => re_export(tree, node),
            "call_expression" => call_import(tree, node),
            _ => None,
        };
        imports.extend(found);
    }
    imports
}

fn base<'t>(
    tree: &SourceTree<'_>,
    node: Node<'t>,
    source_node: Node<'t>,
    syntax: ImportSyntax,
) -> Option<ImportRef<'t>> {
    let specifier = tree.string_value(source_node)?.to_string();
    let position = node.start_position();
    Some(ImportRef {
        node,
        source_node,
        specifier,
        line: position.row + 1,
        column: position.column + 1,
        syntax,
        type_only: false,
        named: Vec::new(),
        default: None,
        namespace: false,
    })
}

fn static_import<'t>(tree: &SourceTree<'_>, node: Node<'t>) -> Option<ImportRef<'t>> {
    if let Some(source) = node.child_by_field_name("source") {
        let mut import = base(tree, node, source, ImportSyntax::Static)?;
        import.type_only = has_child_kind(node, "type");
        if let Some(clause) = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "import_clause")
        {
            read_clause(tree, clause, &mut import);
        }
        return Some(import);
    }

    // import x = require('y')
    let clause = named_children(node)
        .into_iter()
        .find(|c| c.kind() == "import_require_clause")?;
    let source = clause.child_by_field_name("source")?;
    let mut import = base(tree, node, source, ImportSyntax::Require)?;
    import.type_only = has_child_kind(node, "type");
    import.default = named_children(clause)
        .into_iter()
        .find(|c| c.kind() == "identifier")
        .map(|c| tree.text(c).to_string());
    Some(import)
}

fn read_clause<'t>(tree: &SourceTree<'_>, clause: Node<'t>, import: &mut ImportRef<'t>) {
    for child in named_children(clause) {
        match child.kind() {
            "identifier" => import.default = Some(tree.text(child).to_string()),
            "namespace_import" => import.namespace = true,
            "named_imports" => {
                import.named.extend(
                    named_children(child)
                        .into_iter()
                        .filter(|s| s.kind() == "import_specifier")
                        .filter_map(|s| imported_name(tree, s)),
                );
            }
            _ => {}
        }
    }
}

fn imported_name<'t>(tree: &SourceTree<'_>, specifier: Node<'t>) -> Option<ImportedName<'t>> {
    let name = specifier.child_by_field_name("name")?;
    Some(ImportedName {
        node: specifier,
        name: tree.string_value(name).unwrap_or_else(|| tree.text(name)).to_string(),
        type_only: children(specifier).iter().any(|c| c.kind() == "type"),
    })
}

fn re_export<'t>(tree: &SourceTree<'_>, node: Node<'t>) -> Option<ImportRef<'t>> {
    let source = node.child_by_field_name("source")?;
    let mut import = base(tree, node, source, ImportSyntax::ReExport)?;
    import.type_only = has_child_kind(node, "type");
    for clause in named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "export_clause")
    {
        for specifier in named_children(clause)
            .into_iter()
            .filter(|s| s.kind() == "export_specifier")
        {
            if let Some(name) = specifier.child_by_field_name("name") {
                import.named.push(ImportedName {
                    node: specifier,
                    name: tree.text(name).to_string(),
                    type_only: has_child_kind(specifier, "type"),
                });
            }
        }
    }
    import.namespace = has_child_kind(node, "*") || has_child_kind(node, "namespace_export");
    Some(import)
}

fn call_import<'t>(tree: &SourceTree<'_>, node: Node<'t>) -> Option<ImportRef<'t>> {
    let callee = node.child_by_field_name("function")?;
    let syntax = match callee.kind() {
        "import" => ImportSyntax::Dynamic,
        "identifier" if tree.text(callee) == "require" => ImportSyntax::Require,
        _ => return None,
    };
    let first = *tree.arguments(node).first()?;
    base(tree, node, first, syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_lint_core::Dialect;

    fn imports(src: &str) -> Vec<(String, ImportSyntax, bool)> {
        let tree = SourceTree::parse_as(Dialect::Tsx, src).unwrap();
        extract_imports(&tree)
            .into_iter()
            .map(|i| {
                let type_only = i.is_type_only();
                (i.specifier, i.syntax, type_only)
            })
            .collect()
    }

    #[test]
    fn static_import_forms() {
        let src = r"
import React from 'react';
import { useState, type FC } from 'react';
import * as io from '@/io/client.api';
import '@/styles/global.css';
";
        let found = imports(src);
        let specs: Vec<&str> = found.iter().map(|(s, _, _)| s.as_str()).collect();
        assert_eq!(
            specs,
            vec!["react", "react", "@/io/client.api", "@/styles/global.css"]
        );
        assert!(found.iter().all(|(_, s, _)| *s == ImportSyntax::Static));
        assert!(found.iter().all(|(_, _, t)| !t));
    }

    #[test]
    fn named_and_default_bindings() {
        let src = "import React, { useState as useS, type FC } from 'react';";
        let tree = SourceTree::parse_as(Dialect::Tsx, src).unwrap();
        let all = extract_imports(&tree);
        assert_eq!(all.len(), 1);
        let import = &all[0];
        assert_eq!(import.default.as_deref(), Some("React"));
        let names: Vec<(&str, bool)> = import
            .named
            .iter()
            .map(|n| (n.name.as_str(), n.type_only))
            .collect();
        assert_eq!(names, vec![("useState", false), ("FC", true)]);
        assert_eq!((import.line, import.column), (1, 1));
    }

    #[test]
    fn type_only_imports() {
        let found = imports(
            "import type { FC } from 'react';\nimport { type ReactNode } from 'react';",
        );
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(_, _, t)| *t));
    }

    #[test]
    fn require_and_dynamic_imports() {
        let src = r"
const fs = require('fs');
const lazy = import('@/views/heavy.view.fn');
import legacy = require('lodash');
const notRequire = load('x');
";
        let found = imports(src);
        assert_eq!(
            found,
            vec![
                ("fs".to_string(), ImportSyntax::Require, false),
                ("@/views/heavy.view.fn".to_string(), ImportSyntax::Dynamic, false),
                ("lodash".to_string(), ImportSyntax::Require, false),
            ]
        );
    }

    #[test]
    fn re_exports_are_collected() {
        let found = imports("export { toSlug } from './slug.pipe';\nexport * from './types';");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(_, s, _)| *s == ImportSyntax::ReExport));
    }

    #[test]
    fn computed_require_argument_is_ignored() {
        assert!(imports("const m = require(name);").is_empty());
    }
}
