//! Rule forbidding raw promise plumbing.
//!
//! Asynchronous work is composed with task helpers and `await` in flows,
//! not with `.then` chains or hand-built promises. `.then` and `.catch`
//! are matched on any receiver.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-promise-methods.
pub const NAME: &str = "no-promise-methods";

const THEN: MessageTemplate = MessageTemplate::new(
    "noPromiseThen",
    ".then() chains are not allowed.\n\
     Callback chains scatter control flow and lose typed errors.\n\
     Fix: const value = await task; inside a flow, or compose with a task helper.",
);
const CATCH: MessageTemplate = MessageTemplate::new(
    "noPromiseCatch",
    ".catch() is not allowed.\n\
     Catching a rejection hides the failure from the type system.\n\
     Fix: convert the promise once with a tryCatch helper and branch on the Result.",
);
const ALL: MessageTemplate = MessageTemplate::new(
    "noPromiseAll",
    "Promise.all() is not allowed.\n\
     One rejection discards every other result without a typed error.\n\
     Fix: use a sequence/traverse helper that collects Results.",
);
const RACE: MessageTemplate = MessageTemplate::new(
    "noPromiseRace",
    "Promise.race() is not allowed.\n\
     The outcome depends on timing, which makes behaviour nondeterministic.\n\
     Fix: model the timeout or cancellation explicitly in a flow.",
);
const NEW_PROMISE: MessageTemplate = MessageTemplate::new(
    "noNewPromise",
    "new Promise() is not allowed.\n\
     Hand-built promises mix resolve/reject callbacks with business logic.\n\
     Fix: wrap the callback API once in io and return a task.",
);

static MESSAGES: [MessageTemplate; 5] = [THEN, CATCH, ALL, RACE, NEW_PROMISE];

/// Forbids `.then`, `.catch`, `Promise.all`, `Promise.race`, and
/// `new Promise`.
#[derive(Debug, Clone)]
pub struct NoPromiseMethods {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoPromiseMethods {
    fn default() -> Self {
        Self::new()
    }
}

impl NoPromiseMethods {
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

impl Rule for NoPromiseMethods {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids promise chains, combinators, and constructors"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#async");

        for node in tree.nodes() {
            match node.kind() {
                "call_expression" => {
                    let Some((receiver, method)) = tree.method_call(node) else {
                        continue;
                    };
                    let on_promise = receiver.kind() == "identifier" && tree.text(receiver) == "Promise";
                    let template = match method {
                        "then" => Some(THEN),
                        "catch" => Some(CATCH),
                        "all" if on_promise => Some(ALL),
                        "race" if on_promise => Some(RACE),
                        _ => None,
                    };
                    if let Some(template) = template {
                        reporter.report(node, Message::new(template))?;
                    }
                }
                "new_expression" => {
                    let is_promise = node
                        .child_by_field_name("constructor")
                        .is_some_and(|c| c.kind() == "identifier" && tree.text(c) == "Promise");
                    if is_promise {
                        reporter.report(node, Message::new(NEW_PROMISE))?;
                    }
                }
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

    fn run(src: &str) -> Vec<Violation> {
        check(&NoPromiseMethods::new(), "src/flows/a.flow.ts", src)
    }

    #[test]
    fn chains_report_each_link() {
        let v = run("load().then(parse).catch(report);");
        assert_eq!(ids(&v), vec!["noPromiseCatch", "noPromiseThen"]);
    }

    #[test]
    fn combinators_only_on_promise() {
        assert_eq!(ids(&run("Promise.all(tasks);")), vec!["noPromiseAll"]);
        assert_eq!(ids(&run("Promise.race(tasks);")), vec!["noPromiseRace"]);
        assert!(run("results.all(tasks);").is_empty());
        assert!(run("Promise.resolve(1);").is_empty());
    }

    #[test]
    fn promise_constructor() {
        assert_eq!(
            ids(&run("const p = new Promise((resolve) => resolve(1));")),
            vec!["noNewPromise"]
        );
        assert!(run("const m = new Map();").is_empty());
    }

    #[test]
    fn await_is_fine() {
        assert!(run("async function f() { const x = await load(); return x; }").is_empty());
    }
}
