//! Rule trait and the reporter rules use to emit violations.

use crate::context::FileContext;
use crate::message::{FormatError, Message, MessageCatalog, MessageTemplate};
use crate::syntax::SourceTree;
use crate::types::{Location, Severity, Suggestion, Violation, RULE_NAMESPACE};
use std::collections::HashSet;
use tree_sitter::Node;

/// A per-file lint rule over a tree-sitter syntax tree.
///
/// Rules are pure with respect to the tree: they read it and return
/// violations, holding no state between files.
///
/// # Example
///
/// ```ignore
/// use grain_lint_core::{FileContext, Rule, SourceTree, Violation};
/// use grain_lint_core::message::{FormatError, Message, MessageTemplate};
/// use grain_lint_core::rule::Reporter;
///
/// const NO_DEBUGGER: MessageTemplate = MessageTemplate::new("noDebugger", "Remove debugger");
///
/// pub struct NoDebugger;
///
/// impl Rule for NoDebugger {
///     fn name(&self) -> &'static str { "no-debugger" }
///     fn messages(&self) -> &'static [MessageTemplate] { &[NO_DEBUGGER] }
///
///     fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
///         let mut reporter = Reporter::new(self.name(), self.default_severity(), ctx);
///         for node in tree.nodes().filter(|n| n.kind() == "debugger_statement") {
///             reporter.report(node, Message::new(NO_DEBUGGER))?;
///         }
///         Ok(reporter.finish())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "no-mutation").
    fn name(&self) -> &'static str;

    /// Returns the namespaced identifier (e.g., `grain/no-mutation`).
    fn id(&self) -> String {
        format!("{RULE_NAMESPACE}/{}", self.name())
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Message templates this rule can emit.
    fn messages(&self) -> &'static [MessageTemplate];

    /// The rule's templates, addressable by message id.
    fn catalog(&self) -> MessageCatalog {
        MessageCatalog::new(self.messages())
    }

    /// Checks a single file and returns any violations found.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when a message could not be rendered, which
    /// indicates a defect in the rule itself.
    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Collects violations for one rule over one file.
pub struct Reporter<'a> {
    rule: &'static str,
    severity: Severity,
    ctx: &'a FileContext<'a>,
    doc_ref: Option<&'static str>,
    seen: HashSet<(usize, usize, &'static str)>,
    violations: Vec<Violation>,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for `rule` at `severity`.
    #[must_use]
    pub fn new(rule: &'static str, severity: Severity, ctx: &'a FileContext<'a>) -> Self {
        Self {
            rule,
            severity,
            ctx,
            doc_ref: None,
            seen: HashSet::new(),
            violations: Vec::new(),
        }
    }

    /// Attaches a documentation reference to every reported violation.
    #[must_use]
    pub fn doc_ref(mut self, doc_ref: &'static str) -> Self {
        self.doc_ref = Some(doc_ref);
        self
    }

    /// File context the reporter writes locations for.
    #[must_use]
    pub fn context(&self) -> &FileContext<'a> {
        self.ctx
    }

    /// Reports `message` at `node`.
    ///
    /// A second report of the same message on the same node is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the message cannot be rendered.
    pub fn report(&mut self, node: Node<'_>, message: Message) -> Result<(), FormatError> {
        self.report_with(node, message, None)
    }

    /// Reports `message` at `node` with a fix suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the message cannot be rendered.
    pub fn report_with(
        &mut self,
        node: Node<'_>,
        message: Message,
        suggestion: Option<Suggestion>,
    ) -> Result<(), FormatError> {
        let location = Location::from_node(self.ctx.relative_path.clone(), node);
        self.report_at(location, message, suggestion)
    }

    /// Reports `message` at an explicit location.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the message cannot be rendered.
    pub fn report_at(
        &mut self,
        location: Location,
        message: Message,
        suggestion: Option<Suggestion>,
    ) -> Result<(), FormatError> {
        let key = (location.offset, location.length, message.id());
        if !self.seen.insert(key) {
            return Ok(());
        }
        let text = message.render()?;
        let mut violation = Violation::new(self.rule, message.id(), self.severity, location, text)
            .with_data(message.into_data());
        if let Some(suggestion) = suggestion {
            violation = violation.with_suggestion(suggestion);
        }
        if let Some(doc_ref) = self.doc_ref {
            violation = violation.with_doc_ref(doc_ref);
        }
        self.violations.push(violation);
        Ok(())
    }

    /// Whether any message has already been reported on exactly this node.
    #[must_use]
    pub fn has_reported(&self, node: Node<'_>) -> bool {
        let span = (node.start_byte(), node.end_byte() - node.start_byte());
        self.seen.iter().any(|(o, l, _)| (*o, *l) == span)
    }

    /// Returns the collected violations.
    #[must_use]
    pub fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Dialect, SourceTree};
    use std::path::Path;

    const NO_DEBUGGER: MessageTemplate = MessageTemplate::new("noDebugger", "Remove `debugger`");
    const NEEDS_NAME: MessageTemplate = MessageTemplate::new("needsName", "Found {{name}}");

    struct NoDebugger;

    impl Rule for NoDebugger {
        fn name(&self) -> &'static str {
            "no-debugger"
        }

        fn messages(&self) -> &'static [MessageTemplate] {
            &[NO_DEBUGGER]
        }

        fn check(
            &self,
            ctx: &FileContext,
            tree: &SourceTree,
        ) -> Result<Vec<Violation>, FormatError> {
            let mut reporter = Reporter::new(self.name(), self.default_severity(), ctx);
            for node in tree.nodes().filter(|n| n.kind() == "debugger_statement") {
                reporter.report(node, Message::new(NO_DEBUGGER))?;
                reporter.report(node, Message::new(NO_DEBUGGER))?;
            }
            Ok(reporter.finish())
        }
    }

    #[test]
    fn rule_identity() {
        let rule = NoDebugger;
        assert_eq!(rule.id(), "grain/no-debugger");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert!(rule.requires_allow_reason());
    }

    #[test]
    fn reporter_deduplicates_per_node_and_message() {
        let src = "function f() {\n  debugger;\n}";
        let ctx = FileContext::standalone(Path::new("a.ts"), src);
        let tree = SourceTree::parse_as(Dialect::TypeScript, src).unwrap();
        let violations = NoDebugger.check(&ctx, &tree).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].location.column, 3);
        assert_eq!(violations[0].message_id, "noDebugger");
    }

    #[test]
    fn reporter_propagates_missing_fields() {
        let src = "x;";
        let ctx = FileContext::standalone(Path::new("a.ts"), src);
        let tree = SourceTree::parse_as(Dialect::TypeScript, src).unwrap();
        let mut reporter = Reporter::new("t", Severity::Warning, &ctx);
        let result = reporter.report(tree.root(), Message::new(NEEDS_NAME));
        assert!(matches!(result, Err(FormatError::MissingField { .. })));
        assert!(reporter.finish().is_empty());
    }
}
