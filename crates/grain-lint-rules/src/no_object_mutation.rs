//! Rule forbidding in-place object mutation.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::named_children;
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};
use tree_sitter::Node;

/// Rule name for no-object-mutation.
pub const NAME: &str = "no-object-mutation";

const PROPERTY_ASSIGNMENT: MessageTemplate = MessageTemplate::new(
    "noObjectPropertyAssignment",
    "Assignment to {{target}} mutates the object in place.\n\
     Every holder of the reference sees the change without being told.\n\
     Fix: const next = { ...obj, prop: value };",
);
const DELETE: MessageTemplate = MessageTemplate::new(
    "noDelete",
    "delete {{target}} removes a property in place.\n\
     Deleting fields mutates shared objects and changes their shape.\n\
     Fix: const { prop, ...rest } = obj; and use rest.",
);
const MEMBER_UPDATE: MessageTemplate = MessageTemplate::new(
    "noMemberUpdate",
    "{{operator}} on {{target}} mutates the object in place.\n\
     Counters stored on shared objects change under every reader.\n\
     Fix: const next = { ...obj, count: obj.count + 1 };",
);
const ASSIGN_MUTATION: MessageTemplate = MessageTemplate::new(
    "noObjectAssignMutation",
    "Object.assign() writes into its first argument.\n\
     Passing an existing object as the target mutates it.\n\
     Fix: const merged = { ...a, ...b }; or Object.assign({}, a, b)",
);
const DEFINE_PROPERTY: MessageTemplate = MessageTemplate::new(
    "noDefineProperty",
    "{{callee}}() mutates the object in place.\n\
     Defining properties after construction hides the object's real shape.\n\
     Fix: declare every property in the object literal.",
);
const SET_PROTOTYPE: MessageTemplate = MessageTemplate::new(
    "noSetPrototype",
    "Object.setPrototypeOf() changes an object's prototype in place.\n\
     Swapping prototypes mutates behaviour for every holder of the reference.\n\
     Fix: const obj = Object.create(proto, descriptors); or compose plain objects.",
);

static MESSAGES: [MessageTemplate; 6] = [
    PROPERTY_ASSIGNMENT,
    DELETE,
    MEMBER_UPDATE,
    ASSIGN_MUTATION,
    DEFINE_PROPERTY,
    SET_PROTOTYPE,
];

fn is_member(node: Node<'_>) -> bool {
    matches!(node.kind(), "member_expression" | "subscript_expression")
}

fn is_empty_object(node: Node<'_>) -> bool {
    node.kind() == "object" && named_children(node).iter().all(|c| c.kind() == "comment")
}

/// Forbids property assignment, `delete`, member updates, and mutating
/// `Object` helpers.
#[derive(Debug, Clone)]
pub struct NoObjectMutation {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoObjectMutation {
    fn default() -> Self {
        Self::new()
    }
}

impl NoObjectMutation {
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

    fn check_call(
        reporter: &mut Reporter<'_>,
        tree: &SourceTree<'_>,
        node: Node<'_>,
    ) -> Result<(), FormatError> {
        let Some(callee) = node
            .child_by_field_name("function")
            .and_then(|f| tree.dotted_name(f))
        else {
            return Ok(());
        };
        match callee.as_str() {
            "Object.assign" => {
                let mutates = tree
                    .arguments(node)
                    .first()
                    .is_some_and(|first| !is_empty_object(*first));
                if mutates {
                    reporter.report(node, Message::new(ASSIGN_MUTATION))?;
                }
            }
            "Object.defineProperty" | "Object.defineProperties" => {
                reporter.report(node, Message::new(DEFINE_PROPERTY).arg("callee", &callee))?;
            }
            "Object.setPrototypeOf" => reporter.report(node, Message::new(SET_PROTOTYPE))?,
            _ => {}
        }
        Ok(())
    }
}

impl Rule for NoObjectMutation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids in-place object mutation"
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
                "assignment_expression" => {
                    if let Some(left) = node
                        .child_by_field_name("left")
                        .filter(|l| l.kind() == "member_expression")
                    {
                        reporter.report(
                            node,
                            Message::new(PROPERTY_ASSIGNMENT).arg("target", tree.text(left)),
                        )?;
                    }
                }
                "unary_expression" => {
                    let is_delete = node
                        .child_by_field_name("operator")
                        .is_some_and(|op| tree.text(op) == "delete");
                    if let Some(argument) = node
                        .child_by_field_name("argument")
                        .filter(|a| is_delete && is_member(*a))
                    {
                        reporter.report(
                            node,
                            Message::new(DELETE).arg("target", tree.text(argument)),
                        )?;
                    }
                }
                "update_expression" => {
                    if let Some(argument) = node
                        .child_by_field_name("argument")
                        .filter(|a| is_member(*a))
                    {
                        let operator = node
                            .child_by_field_name("operator")
                            .map_or("++", |op| tree.text(op));
                        reporter.report(
                            node,
                            Message::new(MEMBER_UPDATE)
                                .arg("operator", operator)
                                .arg("target", tree.text(argument)),
                        )?;
                    }
                }
                "call_expression" => Self::check_call(&mut reporter, tree, node)?,
                _ => {}
            }
        }

        Ok(reporter.finish())
    }
}
