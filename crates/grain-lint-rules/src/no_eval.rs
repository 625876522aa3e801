//! Rule forbidding dynamic code evaluation.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};
use tree_sitter::Node;

/// Rule name for no-eval.
pub const NAME: &str = "no-eval";

const EVAL: MessageTemplate = MessageTemplate::new(
    "noEval",
    "eval() is not allowed.\n\
     Evaluating strings as code opens the door to injection and defeats analysis.\n\
     Fix: parse data with JSON.parse or dispatch through a lookup table.",
);
const FUNCTION_CONSTRUCTOR: MessageTemplate = MessageTemplate::new(
    "noFunctionConstructor",
    "The Function constructor is not allowed.\n\
     Function(...) compiles strings into code, exactly like eval.\n\
     Fix: write the function directly or select one from a map.",
);
const IMPLIED_EVAL: MessageTemplate = MessageTemplate::new(
    "noImpliedEval",
    "{{callee}}() with a string argument evaluates code.\n\
     A string callback is compiled at runtime like eval.\n\
     Fix: pass a function: {{callee}}(() => work(), delay)",
);

static MESSAGES: [MessageTemplate; 3] = [EVAL, FUNCTION_CONSTRUCTOR, IMPLIED_EVAL];

const TIMERS: &[&str] = &["setTimeout", "setInterval"];

fn is_string_like(node: Node<'_>) -> bool {
    matches!(node.kind(), "string" | "template_string")
}

/// Forbids `eval`, the `Function` constructor, and string timers.
#[derive(Debug, Clone)]
pub struct NoEval {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoEval {
    fn default() -> Self {
        Self::new()
    }
}

impl NoEval {
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

impl Rule for NoEval {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids eval, new Function, and string-based timers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#security");

        for node in tree.nodes() {
            match node.kind() {
                "call_expression" => {
                    let Some(callee) = node
                        .child_by_field_name("function")
                        .and_then(|f| tree.dotted_name(f))
                    else {
                        continue;
                    };
                    let bare = callee
                        .strip_prefix("window.")
                        .or_else(|| callee.strip_prefix("globalThis."))
                        .unwrap_or(&callee);
                    match bare {
                        "eval" => reporter.report(node, Message::new(EVAL))?,
                        "Function" => reporter.report(node, Message::new(FUNCTION_CONSTRUCTOR))?,
                        timer if TIMERS.contains(&timer) => {
                            let first_is_string =
                                tree.arguments(node).first().is_some_and(|a| is_string_like(*a));
                            if first_is_string {
                                reporter.report(
                                    node,
                                    Message::new(IMPLIED_EVAL).arg("callee", timer),
                                )?;
                            }
                        }
                        _ => {}
                    }
                }
                "new_expression" => {
                    let is_function = node
                        .child_by_field_name("constructor")
                        .is_some_and(|c| tree.text(c) == "Function");
                    if is_function {
                        reporter.report(node, Message::new(FUNCTION_CONSTRUCTOR))?;
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
        check(&NoEval::new(), "src/utils/a.util.ts", src)
    }

    #[test]
    fn eval_calls() {
        assert_eq!(ids(&run("eval(code);")), vec!["noEval"]);
        assert_eq!(ids(&run("window.eval(code);")), vec!["noEval"]);
    }

    #[test]
    fn function_constructor_with_and_without_new() {
        assert_eq!(ids(&run("const f = new Function('a', 'return a');")), vec!["noFunctionConstructor"]);
        assert_eq!(ids(&run("const f = Function('return 1');")), vec!["noFunctionConstructor"]);
    }

    #[test]
    fn string_timers_only() {
        let v = run("setTimeout('tick()', 100);");
        assert_eq!(ids(&v), vec!["noImpliedEval"]);
        assert!(v[0].message.starts_with("setTimeout()"));
        assert_eq!(ids(&run("setInterval(`poll()`, 5);")), vec!["noImpliedEval"]);
        assert!(run("setTimeout(() => tick(), 100);").is_empty());
    }

    #[test]
    fn methods_named_eval_on_other_objects_are_fine() {
        assert!(run("engine.eval(expr);").is_empty());
    }
}
