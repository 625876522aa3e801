//! Rule requiring named exports.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::children;
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-default-export.
pub const NAME: &str = "no-default-export";

const DEFAULT_EXPORT: MessageTemplate = MessageTemplate::new(
    "noDefaultExport",
    "Default exports are not allowed.\n\
     Default imports can be renamed freely, so the same module ends up with many names.\n\
     Fix: export the value by name: export const name = ...",
);

static MESSAGES: [MessageTemplate; 1] = [DEFAULT_EXPORT];

/// Forbids `export default`.
#[derive(Debug, Clone)]
pub struct NoDefaultExport {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoDefaultExport {
    fn default() -> Self {
        Self::new()
    }
}

impl NoDefaultExport {
    /// Creates the rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoDefaultExport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires named exports instead of export default"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#exports");

        for node in tree.nodes().filter(|n| n.kind() == "export_statement") {
            let is_default = children(node).iter().any(|c| c.kind() == "default");
            if is_default {
                reporter.report(node, Message::new(DEFAULT_EXPORT))?;
            }
        }

        Ok(reporter.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, ids};

    fn run(src: &str) -> Vec<Violation> {
        check(&NoDefaultExport::new(), "src/pipes/a.pipe.ts", src)
    }

    #[test]
    fn default_exports_are_flagged() {
        assert_eq!(ids(&run("export default function f() {}")), vec!["noDefaultExport"]);
        assert_eq!(ids(&run("const x = 1;\nexport default x;")), vec!["noDefaultExport"]);
        assert_eq!(ids(&run("export default class A {}")), vec!["noDefaultExport"]);
    }

    #[test]
    fn named_exports_pass() {
        assert!(run("export const f = () => 1;\nexport function g() {}").is_empty());
        assert!(run("export { a, b as c } from './x';").is_empty());
        assert!(run("export type T = string;").is_empty());
    }
}
