//! Rule forbidding `try`/`catch`.
//!
//! Errors are values: functions return a result type instead of throwing,
//! and callers branch on it instead of catching.
//!
//! # Configuration
//!
//! - `allow_in_tests`: skip test files (default: false)

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-try-catch.
pub const NAME: &str = "no-try-catch";

const TRY: MessageTemplate = MessageTemplate::new(
    "noTry",
    "try blocks are not allowed.\n\
     Exceptions skip the type system; failures must be visible in return types.\n\
     Fix: return a Result (ok/err) from the failing function and branch on it.",
);
const CATCH: MessageTemplate = MessageTemplate::new(
    "noCatch",
    "catch clauses are not allowed.\n\
     Catching hides which calls can fail and what they fail with.\n\
     Fix: wrap the throwing boundary once (e.g. tryCatch) and return a Result.",
);

static MESSAGES: [MessageTemplate; 2] = [TRY, CATCH];

/// Forbids `try` statements and `catch` clauses.
#[derive(Debug, Clone)]
pub struct NoTryCatch {
    /// Skip test files.
    pub allow_in_tests: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoTryCatch {
    fn default() -> Self {
        Self::new()
    }
}

impl NoTryCatch {
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

impl Rule for NoTryCatch {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids try/catch; errors are returned as values"
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
        for node in tree.nodes() {
            match node.kind() {
                "try_statement" => reporter.report(node, Message::new(TRY))?,
                "catch_clause" => reporter.report(node, Message::new(CATCH))?,
                _ => {}
            }
        }
        Ok(reporter.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, ids};

    const SRC: &str = "try {\n  run();\n} catch (e) {\n  throw new Error('x');\n} finally {\n  done();\n}\n";

    #[test]
    fn try_and_catch_are_separate_violations() {
        let v = check(&NoTryCatch::new(), "src/flows/a.flow.ts", SRC);
        assert_eq!(ids(&v), vec!["noTry", "noCatch"]);
        assert_eq!(v[1].location.line, 3);
    }

    #[test]
    fn tests_are_checked_unless_allowed() {
        assert_eq!(check(&NoTryCatch::new(), "src/a.test.ts", SRC).len(), 2);
        assert!(check(&NoTryCatch::new().allow_in_tests(true), "src/__tests__/a.ts", SRC).is_empty());
    }

    #[test]
    fn code_without_exceptions_is_clean() {
        let src = "const r = parse(x);\nif (r.ok) { use(r.value); }\n";
        assert!(check(&NoTryCatch::new(), "a.ts", src).is_empty());
    }
}
