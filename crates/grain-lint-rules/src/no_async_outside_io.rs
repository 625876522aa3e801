//! Rule confining `async` functions to the io layer.
//!
//! Async code is where side effects enter; everywhere else the project
//! composes effects as values. Pipes and utils are covered by the stricter
//! `no-side-effects-in-pipes` and are skipped here, as are test files and
//! files outside the layered tree.
//!
//! # Configuration
//!
//! - `allow_layers`: layers in which async functions are allowed
//!   (default: `["io"]`); unknown names are ignored with a warning

use grain_lint_arch::policy::join_layers;
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::{has_child_kind, is_function_like};
use grain_lint_core::{FileContext, Layer, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-async-outside-io.
pub const NAME: &str = "no-async-outside-io";

const ASYNC_OUTSIDE_IO: MessageTemplate = MessageTemplate::new(
    "asyncOutsideIo",
    "async function in the {{layer}} layer.\n\
     Async code is only allowed in: {{allowed}}.\n\
     Fix: move the awaited call into src/io/ and compose its result as a TaskEither.",
);

static MESSAGES: [MessageTemplate; 1] = [ASYNC_OUTSIDE_IO];

/// Forbids async functions outside the allowed layers.
#[derive(Debug, Clone)]
pub struct NoAsyncOutsideIo {
    /// Custom severity.
    pub severity: Severity,
    allowed: Vec<Layer>,
}

impl Default for NoAsyncOutsideIo {
    fn default() -> Self {
        Self::new()
    }
}

impl NoAsyncOutsideIo {
    /// Creates the rule allowing async code in io only.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            allowed: vec![Layer::Io],
        }
    }

    /// Replaces the allowed layers.
    #[must_use]
    pub fn allow_layers(mut self, layers: impl IntoIterator<Item = Layer>) -> Self {
        self.allowed = layers.into_iter().collect();
        self
    }

    /// Replaces the allowed layers from their directory names.
    #[must_use]
    pub fn allow_layer_names<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Self {
        let layers = names.into_iter().filter_map(|name| {
            let layer = Layer::from_segment(name.as_ref());
            if layer.is_none() {
                tracing::warn!(rule = NAME, layer = name.as_ref(), "ignoring unknown layer");
            }
            layer
        });
        self.allow_layers(layers)
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoAsyncOutsideIo {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Confines async functions to the io layer"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let layer = match ctx.layer() {
            Some(Layer::Pipes | Layer::Utils) | None => return Ok(Vec::new()),
            Some(layer) => layer,
        };
        if ctx.is_test || self.allowed.contains(&layer) {
            return Ok(Vec::new());
        }

        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#async");
        let allowed = join_layers(&self.allowed);
        for node in tree.nodes() {
            if node.is_named() && is_function_like(node.kind()) && has_child_kind(node, "async") {
                reporter.report(
                    node,
                    Message::new(ASYNC_OUTSIDE_IO)
                        .arg("layer", layer)
                        .arg("allowed", &allowed),
                )?;
            }
        }
        Ok(reporter.finish())
    }
}
