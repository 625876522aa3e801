//! Rule enforcing the layer dependency table.
//!
//! # Rationale
//!
//! Every source file under `src/<layer>/` may only import from the layers
//! its row of the dependency table allows. Purity carve-outs for pipes,
//! utils, hooks and views are checked before the table, and imports of
//! legacy directories are always reported with a migration hint.
//!
//! # Configuration
//!
//! - `strict`: use the strict table (default: `[architecture] strict`,
//!   which itself defaults to true)

use grain_lint_arch::policy::{join_layers, violation_suggestion};
use grain_lint_arch::{classify_import, extract_imports, DependencyPolicy, ImportSyntax, LayerVerdict};
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Suggestion, Violation};

/// Rule name for layer-dependencies.
pub const NAME: &str = "layer-dependencies";

const LAYER_VIOLATION: MessageTemplate = MessageTemplate::new(
    "layerViolation",
    "Layer violation: {{current}} must not import from {{import}}.\n\
     Allowed dependencies for {{current}}: {{allowed}}.\n\
     Fix: {{suggestion}}",
);
const CONTAINER_EXCEPTION: MessageTemplate = MessageTemplate::new(
    "containerException",
    "views must not import from {{import}} unless the file is a container.\n\
     Only *.container.fn.tsx components may reach flows and state.\n\
     Fix: call it from a hook, or rename this file to *.container.fn.tsx.",
);
const VIEW_STATE: MessageTemplate = MessageTemplate::new(
    "viewStateViolation",
    "Pure views must not read state directly.\n\
     A *.view.fn.tsx component receives everything it renders through props.\n\
     Fix: read state in a hook or container and pass it down via props.",
);
const DEPRECATED: MessageTemplate = MessageTemplate::new(
    "deprecatedImport",
    "Import from deprecated directory {{directory}}/.\n\
     The directory is kept only while its contents migrate.\n\
     Fix: import from {{migration}} instead.",
);
const PIPES_PURITY: MessageTemplate = MessageTemplate::new(
    "pipesPurityViolation",
    "pipes must stay pure and cannot import from {{import}}.\n\
     Pipes are deterministic data transformations with no side effects.\n\
     Fix: {{suggestion}}",
);
const UTILS_PURITY: MessageTemplate = MessageTemplate::new(
    "utilsPurityViolation",
    "utils may only import from types, not from {{import}}.\n\
     Utils are leaf helpers that every layer can depend on.\n\
     Fix: move the code that needs {{import}} into the caller.",
);
const HOOKS_IO: MessageTemplate = MessageTemplate::new(
    "hooksIoViolation",
    "hooks must not import io directly.\n\
     Hooks coordinate UI state; io belongs behind a flow or a query.\n\
     Fix: call io through a flow in src/flows/ or a query in src/queries/.",
);

static MESSAGES: [MessageTemplate; 7] = [
    LAYER_VIOLATION,
    CONTAINER_EXCEPTION,
    VIEW_STATE,
    DEPRECATED,
    PIPES_PURITY,
    UTILS_PURITY,
    HOOKS_IO,
];

/// Enforces the layer dependency table on static imports.
#[derive(Debug, Clone)]
pub struct LayerDependencies {
    /// Use the strict table instead of the legacy one.
    pub strict: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for LayerDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerDependencies {
    /// Creates the rule with the strict table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strict: true,
            severity: Severity::Error,
        }
    }

    /// Selects the strict or legacy table.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn message(verdict: LayerVerdict) -> (Message, Option<Suggestion>) {
        match verdict {
            LayerVerdict::Deprecated(dir) => (
                Message::new(DEPRECATED)
                    .arg("directory", dir.directory)
                    .arg("migration", dir.migration),
                Some(Suggestion::new(format!("Import from {} instead", dir.migration))),
            ),
            LayerVerdict::ViewState => (Message::new(VIEW_STATE), None),
            LayerVerdict::ContainerException { import } => {
                (Message::new(CONTAINER_EXCEPTION).arg("import", import), None)
            }
            LayerVerdict::PipesPurity { import } => {
                let hint = violation_suggestion(grain_lint_core::Layer::Pipes, import);
                (
                    Message::new(PIPES_PURITY)
                        .arg("import", import)
                        .arg("suggestion", &hint),
                    Some(Suggestion::new(hint)),
                )
            }
            LayerVerdict::UtilsPurity { import } => {
                (Message::new(UTILS_PURITY).arg("import", import), None)
            }
            LayerVerdict::HooksIo => (Message::new(HOOKS_IO), None),
            LayerVerdict::NotAllowed {
                current,
                import,
                allowed,
            } => {
                let hint = violation_suggestion(current, import);
                (
                    Message::new(LAYER_VIOLATION)
                        .arg("current", current)
                        .arg("import", import)
                        .arg("allowed", join_layers(&allowed))
                        .arg("suggestion", &hint),
                    Some(Suggestion::new(hint)),
                )
            }
        }
    }
}

impl Rule for LayerDependencies {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Enforces the layer dependency table and flags imports of deprecated directories"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        if ctx.is_test {
            return Ok(Vec::new());
        }

        let policy = DependencyPolicy::new(self.strict);
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#layer-dependencies");

        for import in extract_imports(tree) {
            if import.syntax != ImportSyntax::Static {
                continue;
            }
            let classification = classify_import(&import.specifier);
            if let Some(verdict) = policy.check_import(&ctx.role, &classification) {
                let (message, suggestion) = Self::message(verdict);
                reporter.report_with(import.node, message, suggestion)?;
            }
        }

        Ok(reporter.finish())
    }
}
