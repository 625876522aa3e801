//! Rule forbidding raw HTML injection.
//!
//! Direct writes to `innerHTML`/`outerHTML` are always reported. The JSX
//! `dangerouslySetInnerHTML` prop is allowed only when its `__html` value
//! comes straight from a sanitizer call.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::named_children;
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};
use tree_sitter::Node;

/// Rule name for no-innerhtml.
pub const NAME: &str = "no-innerhtml";

const DANGEROUS_PROP: &str = "dangerouslySetInnerHTML";

const INNER_HTML: MessageTemplate = MessageTemplate::new(
    "noInnerHtml",
    "Assignment to innerHTML is not allowed.\n\
     Injecting markup from strings is the most common XSS vector.\n\
     Fix: set textContent, or render the content through JSX.",
);
const OUTER_HTML: MessageTemplate = MessageTemplate::new(
    "noOuterHtml",
    "Assignment to outerHTML is not allowed.\n\
     Replacing elements from strings injects unescaped markup.\n\
     Fix: build the element with DOM APIs or render it through JSX.",
);
const DANGEROUS_HTML: MessageTemplate = MessageTemplate::new(
    "noDangerouslySetInnerHtml",
    "dangerouslySetInnerHTML without sanitization.\n\
     Unsanitized HTML lets user content run scripts in the app.\n\
     Fix: pass { __html: DOMPurify.sanitize(html) } as the prop value.",
);

static MESSAGES: [MessageTemplate; 3] = [INNER_HTML, OUTER_HTML, DANGEROUS_HTML];

const SANITIZERS: &[&str] = &["sanitizeHtml", "DOMPurify.sanitize", "xss"];

/// Whether a dotted callee name is a recognized sanitizer.
#[must_use]
pub fn is_sanitizer(callee: &str) -> bool {
    SANITIZERS.contains(&callee)
}

/// Forbids `innerHTML`/`outerHTML` writes and unsanitized
/// `dangerouslySetInnerHTML`.
#[derive(Debug, Clone)]
pub struct NoInnerHtml {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoInnerHtml {
    fn default() -> Self {
        Self::new()
    }
}

impl NoInnerHtml {
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

fn is_sanitizer_call(tree: &SourceTree<'_>, node: Node<'_>) -> bool {
    node.kind() == "call_expression"
        && node
            .child_by_field_name("function")
            .and_then(|f| tree.dotted_name(f))
            .is_some_and(|name| is_sanitizer(&name))
}

/// Whether the value of a `dangerouslySetInnerHTML` attribute is sanitized:
/// either the whole expression is a sanitizer call, or it is an object
/// whose `__html` property is one.
fn is_sanitized(tree: &SourceTree<'_>, value: Node<'_>) -> bool {
    let Some(expression) = named_children(value)
        .into_iter()
        .find(|c| c.kind() != "comment")
    else {
        return false;
    };
    if is_sanitizer_call(tree, expression) {
        return true;
    }
    if expression.kind() != "object" {
        return false;
    }
    named_children(expression)
        .into_iter()
        .filter(|p| p.kind() == "pair")
        .find(|p| {
            p.child_by_field_name("key").is_some_and(|k| {
                tree.string_value(k).unwrap_or_else(|| tree.text(k)) == "__html"
            })
        })
        .and_then(|p| p.child_by_field_name("value"))
        .is_some_and(|v| is_sanitizer_call(tree, v))
}

impl Rule for NoInnerHtml {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids innerHTML/outerHTML writes and unsanitized dangerouslySetInnerHTML"
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
                "assignment_expression" | "augmented_assignment_expression" => {
                    let property = node
                        .child_by_field_name("left")
                        .and_then(|left| tree.member_property(left));
                    match property {
                        Some("innerHTML") => reporter.report(node, Message::new(INNER_HTML))?,
                        Some("outerHTML") => reporter.report(node, Message::new(OUTER_HTML))?,
                        _ => {}
                    }
                }
                "jsx_attribute" => {
                    let children = named_children(node);
                    let is_dangerous = children
                        .first()
                        .is_some_and(|name| tree.text(*name) == DANGEROUS_PROP);
                    if !is_dangerous {
                        continue;
                    }
                    let sanitized = children
                        .iter()
                        .find(|c| c.kind() == "jsx_expression")
                        .is_some_and(|value| is_sanitized(tree, *value));
                    if !sanitized {
                        reporter.report(node, Message::new(DANGEROUS_HTML))?;
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
        check(&NoInnerHtml::new(), path, src)
    }

    #[test]
    fn dom_writes() {
        assert_eq!(ids(&run("a.ts", "el.innerHTML = html;")), vec!["noInnerHtml"]);
        assert_eq!(ids(&run("a.ts", "el.innerHTML += more;")), vec!["noInnerHtml"]);
        assert_eq!(ids(&run("a.ts", "node.outerHTML = html;")), vec!["noOuterHtml"]);
        assert!(run("a.ts", "el.textContent = text;").is_empty());
        assert!(run("a.ts", "const h = el.innerHTML;").is_empty());
    }

    #[test]
    fn unsanitized_jsx_prop() {
        let src = "export const V = () => <div dangerouslySetInnerHTML={{ __html: html }} />;";
        assert_eq!(
            ids(&run("src/views/a.view.fn.tsx", src)),
            vec!["noDangerouslySetInnerHtml"]
        );
    }

    #[test]
    fn sanitized_jsx_prop() {
        for call in ["DOMPurify.sanitize(html)", "sanitizeHtml(html)", "xss(html)"] {
            let src = format!(
                "export const V = () => <div dangerouslySetInnerHTML={{{{ __html: {call} }}}} />;"
            );
            assert!(run("src/views/a.view.fn.tsx", &src).is_empty(), "{call}");
        }
        let whole =
            "export const V = () => <div dangerouslySetInnerHTML={DOMPurify.sanitize(html)} />;";
        assert!(run("src/views/a.view.fn.tsx", whole).is_empty());
    }

    #[test]
    fn quoted_html_key_is_recognized() {
        for key in ["'__html'", "\"__html\""] {
            let src = format!(
                "export const V = () => <div dangerouslySetInnerHTML={{{{ {key}: xss(html) }}}} />;"
            );
            assert!(run("src/views/a.view.fn.tsx", &src).is_empty(), "{key}");
        }
        let raw = "export const V = () => <div dangerouslySetInnerHTML={{ '__html': html }} />;";
        assert_eq!(
            ids(&run("src/views/a.view.fn.tsx", raw)),
            vec!["noDangerouslySetInnerHtml"]
        );
    }

    #[test]
    fn lookalike_sanitizers_do_not_count() {
        for call in ["unsafeSanitize(html)", "sanitize(html)", "markdown.sanitize(html)"] {
            let src = format!(
                "export const V = () => <div dangerouslySetInnerHTML={{{{ __html: {call} }}}} />;"
            );
            assert_eq!(
                ids(&run("src/views/a.view.fn.tsx", &src)),
                vec!["noDangerouslySetInnerHtml"],
                "{call}"
            );
        }
    }

    #[test]
    fn sanitizer_names() {
        assert!(is_sanitizer("DOMPurify.sanitize"));
        assert!(is_sanitizer("sanitizeHtml"));
        assert!(is_sanitizer("xss"));
        assert!(!is_sanitizer("markdown.sanitize"));
        assert!(!is_sanitizer("unsafeSanitize"));
        assert!(!is_sanitizer("render"));
    }
}
