//! Rule requiring kebab-case file and directory names.
//!
//! The stem of a file is checked after its extension and its role suffix
//! (`.pipe`, `.view.fn`, `.types`, ...) are removed, so
//! `create-node.flow.ts` is checked as `create-node`. Directories between
//! the layer directory and the file must be kebab-case too; the outermost
//! offending directory is reported.
//!
//! Only layered, non-test files are checked. `routes/` is skipped because
//! router file conventions (`__root.tsx`, `$id.tsx`) are not kebab-case.

use grain_lint_core::layer::normalize_path;
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{
    FileContext, Layer, Location, Reporter, Rule, Severity, SourceTree, Suggestion, Violation,
};

/// Rule name for file-naming.
pub const NAME: &str = "file-naming";

const ROLE_SUFFIXES: [&str; 17] = [
    ".view.fn",
    ".container.fn",
    ".view",
    ".container",
    ".pipe",
    ".fn",
    ".flow",
    ".action",
    ".api",
    ".storage",
    ".file",
    ".state",
    ".util",
    ".queries",
    ".types",
    ".schema",
    ".interface",
];

const FILE_NAME: MessageTemplate = MessageTemplate::new(
    "fileNameNotKebabCase",
    "File name {{file}} is not kebab-case.\n\
     Mixed naming styles make files hard to find and break on case-insensitive file systems.\n\
     Fix: rename the file to {{suggested}}.",
);
const DIRECTORY_NAME: MessageTemplate = MessageTemplate::new(
    "directoryNameNotKebabCase",
    "Directory {{directory}} is not kebab-case.\n\
     Directory names become import paths and should follow the file convention.\n\
     Fix: rename the directory to {{suggested}}.",
);

static MESSAGES: [MessageTemplate; 2] = [FILE_NAME, DIRECTORY_NAME];

/// Whether `name` is kebab-case: lowercase words of letters and digits
/// joined by single hyphens, starting with a letter.
#[must_use]
pub fn is_kebab_case(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.split('-').all(|word| {
            !word.is_empty()
                && word
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Converts camelCase, PascalCase and snake_case to kebab-case.
#[must_use]
pub fn to_kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Splits a basename into its checked stem and the untouched remainder,
/// e.g. `NodeCard.view.fn.tsx` into `NodeCard` and `.view.fn.tsx`.
#[must_use]
pub fn split_stem(basename: &str) -> (&str, &str) {
    let without_ext = basename
        .rfind('.')
        .filter(|&i| i > 0)
        .map_or(basename, |i| &basename[..i]);
    let stem = ROLE_SUFFIXES
        .iter()
        .find_map(|suffix| without_ext.strip_suffix(suffix).filter(|s| !s.is_empty()))
        .unwrap_or(without_ext);
    (stem, &basename[stem.len()..])
}

/// Requires kebab-case file stems and directory names.
#[derive(Debug, Clone)]
pub struct FileNaming {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl FileNaming {
    /// Creates the rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for FileNaming {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires kebab-case file and directory names inside layers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, _tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let Some(layer) = ctx.layer() else {
            return Ok(Vec::new());
        };
        if ctx.is_test || ctx.role.is_index || layer == Layer::Routes {
            return Ok(Vec::new());
        }

        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#naming");
        let at_top = || Location::new(ctx.relative_path.clone(), 1, 1);

        let normalized = normalize_path(&ctx.path.to_string_lossy());
        let marker = format!("/src/{}/", layer.as_str());
        let Some(inside) = normalized
            .find(&marker)
            .map(|i| &normalized[i + marker.len()..])
        else {
            return Ok(Vec::new());
        };
        let mut segments: Vec<&str> = inside.split('/').collect();
        let Some(basename) = segments.pop() else {
            return Ok(Vec::new());
        };

        if let Some(directory) = segments.into_iter().find(|d| !is_kebab_case(d)) {
            reporter.report_at(
                at_top(),
                Message::new(DIRECTORY_NAME)
                    .arg("directory", directory)
                    .arg("suggested", to_kebab_case(directory)),
                None,
            )?;
        }

        let (stem, rest) = split_stem(basename);
        if !is_kebab_case(stem) {
            let suggested = format!("{}{rest}", to_kebab_case(stem));
            reporter.report_at(
                at_top(),
                Message::new(FILE_NAME)
                    .arg("file", basename)
                    .arg("suggested", &suggested),
                Some(Suggestion::new(format!("Rename to {suggested}"))),
            )?;
        }

        Ok(reporter.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, ids};

    fn run(path: &str) -> Vec<Violation> {
        check(&FileNaming::new(), path, "export const value = 1;\n")
    }

    #[test]
    fn kebab_case_names_pass() {
        for path in [
            "src/pipes/transform.pipe.ts",
            "src/pipes/validate.fn.ts",
            "src/flows/node/create-node.flow.ts",
            "src/views/node-card/node-card.view.fn.tsx",
            "src/hooks/use-workspace.ts",
            "src/types/node.interface.ts",
            "src/io/v2-client.api.ts",
        ] {
            assert!(run(path).is_empty(), "{path}");
        }
    }

    #[test]
    fn camel_and_pascal_stems_are_flagged() {
        let v = run("src/views/NodeCard.view.fn.tsx");
        assert_eq!(ids(&v), vec!["fileNameNotKebabCase"]);
        assert_eq!(
            v[0].data.get("suggested").map(String::as_str),
            Some("node-card.view.fn.tsx")
        );
        let v = run("src/pipes/sortNodes.pipe.ts");
        assert_eq!(
            v[0].data.get("suggested").map(String::as_str),
            Some("sort-nodes.pipe.ts")
        );
        assert_eq!(ids(&run("src/utils/date_format.util.ts")), vec!["fileNameNotKebabCase"]);
    }

    #[test]
    fn directories_below_the_layer_are_checked() {
        let v = run("src/flows/NodeOps/create-node.flow.ts");
        assert_eq!(ids(&v), vec!["directoryNameNotKebabCase"]);
        assert_eq!(v[0].data.get("suggested").map(String::as_str), Some("node-ops"));
    }

    #[test]
    fn routes_tests_indexes_and_unlayered_files_are_skipped() {
        for path in [
            "src/routes/__root.tsx",
            "src/pipes/sortNodes.pipe.test.ts",
            "src/views/index.ts",
            "scripts/BuildAll.ts",
        ] {
            assert!(run(path).is_empty(), "{path}");
        }
    }

    #[test]
    fn kebab_conversion() {
        assert_eq!(to_kebab_case("nodeCard"), "node-card");
        assert_eq!(to_kebab_case("HTMLParser"), "html-parser");
        assert_eq!(to_kebab_case("snake_case_name"), "snake-case-name");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
        assert!(is_kebab_case("a1-b2"));
        assert!(!is_kebab_case("a--b"));
        assert!(!is_kebab_case("1a"));
        assert!(!is_kebab_case("trailing-"));
    }

    #[test]
    fn stems_drop_role_suffixes() {
        assert_eq!(split_stem("node-card.view.fn.tsx"), ("node-card", ".view.fn.tsx"));
        assert_eq!(split_stem("use-a.ts"), ("use-a", ".ts"));
        assert_eq!(split_stem("node.types.ts"), ("node", ".types.ts"));
    }
}
