//! Rule forbidding `throw`.
//!
//! # Configuration
//!
//! - `allow_in_tests`: skip test files (default: false)

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-throw.
pub const NAME: &str = "no-throw";

const THROW: MessageTemplate = MessageTemplate::new(
    "noThrow",
    "throw is not allowed.\n\
     A thrown error is an untyped exit that callers cannot see in the signature.\n\
     Fix: return err(error) and let the caller decide.",
);

static MESSAGES: [MessageTemplate; 1] = [THROW];

/// Forbids `throw` statements.
#[derive(Debug, Clone)]
pub struct NoThrow {
    /// Skip test files.
    pub allow_in_tests: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoThrow {
    fn default() -> Self {
        Self::new()
    }
}

impl NoThrow {
    /// Creates the rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_in_tests: false,
            severity: Severity::Error,
        }
    }

    /// Sets whether test files are skipped.
    #[must_use]
    pub fn allow_in_tests(mut self, allow: bool) -> Self {
        self.allow_in_tests = allow;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoThrow {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids throw; errors are returned as values"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        if self.allow_in_tests && ctx.is_test {
            return Ok(Vec::new());
        }

        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#error-handling");
        for node in tree.nodes().filter(|n| n.kind() == "throw_statement") {
            reporter.report(node, Message::new(THROW))?;
        }
        Ok(reporter.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, ids};

    #[test]
    fn throw_statements_are_reported() {
        let src = "function f(x: number) {\n  if (x < 0) throw new Error('neg');\n  return x;\n}\n";
        let v = check(&NoThrow::new(), "src/pipes/a.pipe.ts", src);
        assert_eq!(ids(&v), vec!["noThrow"]);
        assert_eq!(v[0].rule_id, "grain/no-throw");
        assert_eq!(v[0].location.line, 2);
    }

    #[test]
    fn test_files_can_be_exempted() {
        let src = "throw new Error('x');";
        assert_eq!(check(&NoThrow::new(), "src/a.test.ts", src).len(), 1);
        assert!(check(&NoThrow::new().allow_in_tests(true), "src/a.test.ts", src).is_empty());
    }

    #[test]
    fn creating_an_error_value_is_fine() {
        assert!(check(&NoThrow::new(), "a.ts", "const r = err(new Error('x'));").is_empty());
    }
}
