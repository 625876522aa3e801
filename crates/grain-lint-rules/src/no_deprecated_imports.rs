//! Rule reporting imports of legacy directories on their own.
//!
//! `layer-dependencies` already reports these imports as part of the
//! dependency table, so no preset enables this rule. It is meant for
//! setups that turn the table off while a codebase migrates and still want
//! to track what is left in `fn/`, `components/`, `actions/`, `stores/` and
//! `lib/`. Enable it with `[rules.no-deprecated-imports] enabled = true`.
//!
//! Static imports, re-exports, `require` calls and dynamic imports are all
//! checked. Test files are skipped.

use grain_lint_arch::{classify_import, extract_imports};
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Suggestion, Violation};

/// Rule name for no-deprecated-imports.
pub const NAME: &str = "no-deprecated-imports";

const DEPRECATED_DIRECTORY: MessageTemplate = MessageTemplate::new(
    "deprecatedDirectoryImport",
    "{{specifier}} imports from the deprecated directory {{directory}}/.\n\
     Code there is being migrated and will be removed.\n\
     Fix: import from {{migration}} instead.",
);

static MESSAGES: [MessageTemplate; 1] = [DEPRECATED_DIRECTORY];

/// Reports every import of a legacy directory.
#[derive(Debug, Clone)]
pub struct NoDeprecatedImports {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoDeprecatedImports {
    fn default() -> Self {
        Self::new()
    }
}

impl NoDeprecatedImports {
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

impl Rule for NoDeprecatedImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports imports of legacy directories with their migration target"
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
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#deprecated-directories");

        for import in extract_imports(tree) {
            let Some(directory) = classify_import(&import.specifier).deprecated else {
                continue;
            };
            reporter.report_with(
                import.source_node,
                Message::new(DEPRECATED_DIRECTORY)
                    .arg("specifier", &import.specifier)
                    .arg("directory", directory.directory)
                    .arg("migration", directory.migration),
                Some(Suggestion::new(format!("Import from {} instead", directory.migration))),
            )?;
        }

        Ok(reporter.finish())
    }
}
