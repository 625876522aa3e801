//! Rule forbidding in-place array mutation.
//!
//! The receiver type is not known, so any call to a mutating array method
//! name is reported, whatever the receiver.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-mutation.
pub const NAME: &str = "no-mutation";

macro_rules! array_method {
    ($id:literal, $method:literal, $fix:literal) => {
        MessageTemplate::new(
            $id,
            concat!(
                "array.",
                $method,
                "() mutates the array in place.\n",
                "Shared arrays changed in place make data flow impossible to follow.\n",
                "Fix: ",
                $fix
            ),
        )
    };
}

const PUSH: MessageTemplate = array_method!("noArrayPush", "push", "const next = [...items, item];");
const POP: MessageTemplate = array_method!("noArrayPop", "pop", "const rest = items.slice(0, -1); const last = items.at(-1);");
const SHIFT: MessageTemplate = array_method!("noArrayShift", "shift", "const [first, ...rest] = items;");
const UNSHIFT: MessageTemplate = array_method!("noArrayUnshift", "unshift", "const next = [item, ...items];");
const SPLICE: MessageTemplate = array_method!(
    "noArraySplice",
    "splice",
    "const next = [...items.slice(0, i), ...items.slice(i + 1)];"
);
const SORT: MessageTemplate = array_method!("noArraySort", "sort", "const sorted = items.toSorted(compare);");
const REVERSE: MessageTemplate = array_method!("noArrayReverse", "reverse", "const reversed = items.toReversed();");
const FILL: MessageTemplate = array_method!("noArrayFill", "fill", "const filled = Array.from({ length: n }, () => value);");
const COPY_WITHIN: MessageTemplate = array_method!(
    "noArrayCopyWithin",
    "copyWithin",
    "build a new array with slice() and spread."
);
const INDEX_ASSIGNMENT: MessageTemplate = MessageTemplate::new(
    "noArrayIndexAssignment",
    "Assignment through an index mutates the collection in place.\n\
     Shared collections changed in place make data flow impossible to follow.\n\
     Fix: const next = items.with(i, value); or { ...record, [key]: value }",
);
const FOR_EACH: MessageTemplate = MessageTemplate::new(
    "noForEach",
    "array.forEach() only exists for its side effects.\n\
     A callback that returns nothing has to mutate something to be useful.\n\
     Fix: use map, filter or reduce and keep the result.",
);

static MESSAGES: [MessageTemplate; 11] = [
    PUSH,
    POP,
    SHIFT,
    UNSHIFT,
    SPLICE,
    SORT,
    REVERSE,
    FILL,
    COPY_WITHIN,
    INDEX_ASSIGNMENT,
    FOR_EACH,
];

fn method_template(method: &str) -> Option<MessageTemplate> {
    Some(match method {
        "push" => PUSH,
        "pop" => POP,
        "shift" => SHIFT,
        "unshift" => UNSHIFT,
        "splice" => SPLICE,
        "sort" => SORT,
        "reverse" => REVERSE,
        "fill" => FILL,
        "copyWithin" => COPY_WITHIN,
        "forEach" => FOR_EACH,
        _ => return None,
    })
}

/// Forbids mutating array methods, `forEach`, and index assignment.
#[derive(Debug, Clone)]
pub struct NoMutation {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoMutation {
    fn default() -> Self {
        Self::new()
    }
}

impl NoMutation {
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

impl Rule for NoMutation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids in-place array mutation and forEach"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#immutability");

        for node in tree.nodes() {
            match node.kind() {
                "call_expression" => {
                    if let Some(template) = tree
                        .method_call(node)
                        .and_then(|(_, method)| method_template(method))
                    {
                        reporter.report(node, Message::new(template))?;
                    }
                }
                "assignment_expression" => {
                    let computed = node
                        .child_by_field_name("left")
                        .is_some_and(|left| left.kind() == "subscript_expression");
                    if computed {
                        reporter.report(node, Message::new(INDEX_ASSIGNMENT))?;
                    }
                }
                _ => {}
            }
        }

        Ok(reporter.finish())
    }
}
