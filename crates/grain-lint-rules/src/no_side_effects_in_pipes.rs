//! Rule forbidding side effects in pipes and utils.
//!
//! Pipes and utils must be deterministic: no async work, no console or
//! DOM access, no timers or network, and no promise construction.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::{has_child_kind, is_function_like};
use grain_lint_core::{FileContext, Layer, Reporter, Rule, Severity, SourceTree, Violation};
use std::collections::HashSet;
use tree_sitter::Node;

/// Rule name for no-side-effects-in-pipes.
pub const NAME: &str = "no-side-effects-in-pipes";

/// Receivers whose method calls are side effects.
const SIDE_EFFECT_RECEIVERS: &[&str] = &[
    "console",
    "document",
    "window",
    "localStorage",
    "sessionStorage",
];

/// Globals that reach outside the process or the clock.
const SIDE_EFFECT_GLOBALS: &[&str] = &[
    "window",
    "document",
    "localStorage",
    "sessionStorage",
    "fetch",
    "XMLHttpRequest",
    "console",
    "alert",
    "confirm",
    "prompt",
    "setTimeout",
    "setInterval",
    "requestAnimationFrame",
    "cancelAnimationFrame",
    "clearTimeout",
    "clearInterval",
];

const ASYNC_FUNCTION: MessageTemplate = MessageTemplate::new(
    "noAsyncFunction",
    "Async function in {{layer}}.\n\
     {{layer}} must be synchronous and deterministic.\n\
     Fix: move async work into a flow and pass the awaited value in.",
);
const AWAIT: MessageTemplate = MessageTemplate::new(
    "noAwait",
    "await in {{layer}}.\n\
     Waiting on a promise means the result depends on the outside world.\n\
     Fix: await in a flow and pass the resolved value to this function.",
);
const SIDE_EFFECT_CALL: MessageTemplate = MessageTemplate::new(
    "noSideEffectCall",
    "Side-effect call {{callee}}() in {{layer}}.\n\
     Logging and DOM or storage access are effects, not transformations.\n\
     Fix: perform the effect in a flow or io module and return data from here.",
);
const SIDE_EFFECT_GLOBAL: MessageTemplate = MessageTemplate::new(
    "noSideEffectGlobal",
    "Reference to global {{name}} in {{layer}}.\n\
     {{name}} reaches outside the function and breaks referential transparency.\n\
     Fix: use it from a flow or io module, or inject it as a parameter.",
);
const NEW_PROMISE: MessageTemplate = MessageTemplate::new(
    "noNewPromise",
    "new Promise() in {{layer}}.\n\
     Constructing a promise schedules asynchronous work.\n\
     Fix: keep {{layer}} synchronous and build promises in flows.",
);

static MESSAGES: [MessageTemplate; 5] = [
    ASYNC_FUNCTION,
    AWAIT,
    SIDE_EFFECT_CALL,
    SIDE_EFFECT_GLOBAL,
    NEW_PROMISE,
];

/// Forbids side effects in pipes and utils.
#[derive(Debug, Clone)]
pub struct NoSideEffectsInPipes {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoSideEffectsInPipes {
    fn default() -> Self {
        Self::new()
    }
}

impl NoSideEffectsInPipes {
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

fn is_declaration_name(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "variable_declarator" | "function_declaration" => {
            parent.child_by_field_name("name") == Some(node)
        }
        "required_parameter" | "optional_parameter" => {
            parent.child_by_field_name("pattern") == Some(node)
        }
        "formal_parameters" => true,
        "arrow_function" => parent.child_by_field_name("parameter") == Some(node),
        _ => false,
    }
}

impl Rule for NoSideEffectsInPipes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids async code, effectful calls, and effectful globals in pipes and utils"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let layer = match ctx.layer() {
            Some(layer @ (Layer::Pipes | Layer::Utils)) if !ctx.is_test => layer,
            _ => return Ok(Vec::new()),
        };

        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#pure-layers");
        let mut reported_receivers = HashSet::new();

        for node in tree.nodes() {
            match node.kind() {
                kind if is_function_like(kind) && has_child_kind(node, "async") => {
                    reporter.report(node, Message::new(ASYNC_FUNCTION).arg("layer", layer))?;
                }
                "await_expression" => {
                    reporter.report(node, Message::new(AWAIT).arg("layer", layer))?;
                }
                "call_expression" => {
                    let Some((receiver, _)) = tree.method_call(node) else {
                        continue;
                    };
                    if receiver.kind() == "identifier"
                        && SIDE_EFFECT_RECEIVERS.contains(&tree.text(receiver))
                    {
                        let callee = node
                            .child_by_field_name("function")
                            .and_then(|f| tree.dotted_name(f))
                            .unwrap_or_else(|| tree.text(receiver).to_string());
                        reported_receivers.insert(receiver.id());
                        reporter.report(
                            node,
                            Message::new(SIDE_EFFECT_CALL)
                                .arg("callee", callee)
                                .arg("layer", layer),
                        )?;
                    }
                }
                "new_expression" => {
                    let is_promise = node
                        .child_by_field_name("constructor")
                        .is_some_and(|c| tree.text(c) == "Promise");
                    if is_promise {
                        reporter.report(node, Message::new(NEW_PROMISE).arg("layer", layer))?;
                    }
                }
                "identifier" => {
                    let name = tree.text(node);
                    if SIDE_EFFECT_GLOBALS.contains(&name)
                        && !reported_receivers.contains(&node.id())
                        && !is_declaration_name(node)
                    {
                        reporter.report(
                            node,
                            Message::new(SIDE_EFFECT_GLOBAL)
                                .arg("name", name)
                                .arg("layer", layer),
                        )?;
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

    fn run(path: &str, src: &str) -> Vec<Violation> {
        check(&NoSideEffectsInPipes::new(), path, src)
    }

    #[test]
    fn async_and_await_are_flagged() {
        let src = "export const load = async (id: string) => {\n  const r = await get(id);\n  return r;\n};\n";
        assert_eq!(
            ids(&run("src/pipes/load.pipe.ts", src)),
            vec!["noAsyncFunction", "noAwait"]
        );
    }

    #[test]
    fn console_call_is_reported_once() {
        let v = run("src/pipes/a.pipe.ts", "export const f = (x: number) => { console.log(x); return x; };");
        assert_eq!(ids(&v), vec!["noSideEffectCall"]);
        assert_eq!(v[0].data.get("callee").map(String::as_str), Some("console.log"));
    }

    #[test]
    fn globals_are_flagged_as_values_only() {
        let src = r"
export const f = () => fetch('/api');
export const g = (o: { window: number }) => o.window;
export const h = { document: 1 };
";
        let v = run("src/utils/a.util.ts", src);
        assert_eq!(ids(&v), vec!["noSideEffectGlobal"]);
        assert_eq!(v[0].data.get("name").map(String::as_str), Some("fetch"));
    }

    #[test]
    fn timers_and_promises() {
        let src = "export const f = () => new Promise((r) => setTimeout(r, 10));";
        assert_eq!(
            ids(&run("src/pipes/a.pipe.ts", src)),
            vec!["noNewPromise", "noSideEffectGlobal"]
        );
    }

    #[test]
    fn other_layers_and_tests_are_skipped() {
        let src = "export const f = async () => { console.log(await x); };";
        assert!(run("src/flows/a.flow.ts", src).is_empty());
        assert!(run("src/pipes/a.pipe.test.ts", src).is_empty());
        assert!(run("src/main.ts", src).is_empty());
    }

    #[test]
    fn pure_pipe_is_clean() {
        let src = "export const double = (xs: readonly number[]) => xs.map((x) => x * 2);";
        assert!(run("src/pipes/double.pipe.ts", src).is_empty());
    }
}
