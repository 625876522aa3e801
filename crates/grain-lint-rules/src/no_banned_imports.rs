//! Rule forbidding libraries the codebase has replaced.
//!
//! # Detected Patterns
//!
//! - ESM imports, re-exports and `require("...")` of a banned package or
//!   any of its submodule paths (`lodash/fp`, `moment/locale/de`)
//! - `new Date()` without arguments and `Date.now()`, which read the wall
//!   clock directly
//!
//! Test files are skipped.

use grain_lint_arch::{extract_imports, ImportSyntax};
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-banned-imports.
pub const NAME: &str = "no-banned-imports";

/// Banned packages and what to use instead.
pub const BANNED_PACKAGES: &[(&str, &str)] = &[
    ("lodash", "es-toolkit"),
    ("lodash-es", "es-toolkit"),
    ("underscore", "es-toolkit"),
    ("moment", "dayjs"),
    ("moment-timezone", "dayjs with the timezone plugin"),
    ("request", "the fetch API"),
    ("axios", "the fetch API"),
    ("jquery", "native DOM APIs"),
    ("mkdirp", "fs.mkdir with { recursive: true }"),
    ("rimraf", "fs.rm with { recursive: true }"),
];

const BANNED_LIBRARY: MessageTemplate = MessageTemplate::new(
    "bannedLibrary",
    "Import of banned library {{package}}.\n\
     The project has standardized on a lighter or native replacement.\n\
     Fix: use {{replacement}} instead.",
);
const DATE_CONSTRUCTOR: MessageTemplate = MessageTemplate::new(
    "bannedDateConstructor",
    "new Date() without arguments reads the system clock.\n\
     Hidden clock access makes results depend on when the code runs.\n\
     Fix: accept the current time as a parameter or from an injected clock.",
);
const DATE_NOW: MessageTemplate = MessageTemplate::new(
    "bannedDateNow",
    "Date.now() reads the system clock.\n\
     Hidden clock access makes results depend on when the code runs.\n\
     Fix: accept the current time as a parameter or from an injected clock.",
);

static MESSAGES: [MessageTemplate; 3] = [BANNED_LIBRARY, DATE_CONSTRUCTOR, DATE_NOW];

/// Returns the banned package and its replacement if `specifier` names one.
#[must_use]
pub fn banned_package(specifier: &str) -> Option<(&'static str, &'static str)> {
    BANNED_PACKAGES.iter().copied().find(|(name, _)| {
        specifier == *name
            || specifier
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Forbids banned libraries and direct clock reads.
#[derive(Debug, Clone)]
pub struct NoBannedImports {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoBannedImports {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBannedImports {
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

impl Rule for NoBannedImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids replaced libraries and direct system clock reads"
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
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#banned-imports");

        for import in extract_imports(tree) {
            if import.syntax == ImportSyntax::Dynamic {
                continue;
            }
            if let Some((package, replacement)) = banned_package(&import.specifier) {
                reporter.report(
                    import.source_node,
                    Message::new(BANNED_LIBRARY)
                        .arg("package", package)
                        .arg("replacement", replacement),
                )?;
            }
        }

        for node in tree.nodes() {
            match node.kind() {
                "new_expression" => {
                    let is_date = node
                        .child_by_field_name("constructor")
                        .is_some_and(|c| c.kind() == "identifier" && tree.text(c) == "Date");
                    let no_args = node
                        .child_by_field_name("arguments")
                        .map_or(true, |args| args.named_child_count() == 0);
                    if is_date && no_args {
                        reporter.report(node, Message::new(DATE_CONSTRUCTOR))?;
                    }
                }
                "call_expression" => {
                    let is_now = tree.method_call(node).is_some_and(|(recv, method)| {
                        method == "now" && recv.kind() == "identifier" && tree.text(recv) == "Date"
                    });
                    if is_now {
                        reporter.report(node, Message::new(DATE_NOW))?;
                    }
                }
                _ => {}
            }
        }

        Ok(reporter.finish())
    }
}
