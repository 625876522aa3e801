//! Rule checking that files are shaped and named for their layer.
//!
//! # Detected Patterns
//!
//! - `index.ts`/`index.tsx` containing anything besides imports,
//!   re-exports, local `export { .. }` lists and type declarations
//! - exported type aliases, interfaces and enums outside `src/types/`
//! - basenames not matching the layer's naming convention
//! - relative imports climbing more than two directories
//!
//! Only layered, non-test files are checked. Index files are exempt from
//! the naming and type placement checks.

use grain_lint_arch::{extract_imports, ImportSyntax};
use grain_lint_core::layer::relative_import_depth;
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::named_children;
use grain_lint_core::{
    FileContext, Layer, Location, Reporter, Rule, Severity, SourceTree, Violation,
};
use tree_sitter::Node;

/// Rule name for file-location.
pub const NAME: &str = "file-location";

/// Deepest allowed relative import.
pub const MAX_RELATIVE_DEPTH: usize = 2;

const INDEX_LOGIC: MessageTemplate = MessageTemplate::new(
    "indexFileLogic",
    "index files may only re-export.\n\
     Logic in a barrel file invites import cycles and hides where code lives.\n\
     Fix: move the code into its own file and re-export it: export { x } from './x.flow';",
);
const TYPES_IN_WRONG_FILE: MessageTemplate = MessageTemplate::new(
    "typesInWrongFile",
    "Exported type {{name}} belongs in src/types/.\n\
     Shared types spread across layers create hidden dependencies between them.\n\
     Fix: move {{name}} to a *.types.ts file under src/types/ and import it.",
);
const DEEP_RELATIVE: MessageTemplate = MessageTemplate::new(
    "deepRelativeImport",
    "Relative import climbs {{depth}} directories: {{specifier}}.\n\
     Deep relative paths are hard to read and break when files move.\n\
     Fix: use the @/ alias, e.g. import {} from '@/utils/helper.util';",
);
const WRONG_LOCATION: MessageTemplate = MessageTemplate::new(
    "wrongFileLocation",
    "File name {{file}} does not follow the {{layer}} naming convention.\n\
     {{layer}} files must be named {{expected}}.\n\
     Fix: rename the file, e.g. {{example}}.",
);

static MESSAGES: [MessageTemplate; 4] =
    [INDEX_LOGIC, TYPES_IN_WRONG_FILE, DEEP_RELATIVE, WRONG_LOCATION];

/// Naming convention for files in one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    /// Human readable form, e.g. `*.pipe.ts or *.fn.ts`.
    pub expected: &'static str,
    /// Example basename.
    pub example: &'static str,
    suffixes: &'static [&'static str],
    prefix: Option<&'static str>,
}

impl NamingConvention {
    const fn suffixes(
        suffixes: &'static [&'static str],
        expected: &'static str,
        example: &'static str,
    ) -> Self {
        Self {
            expected,
            example,
            suffixes,
            prefix: None,
        }
    }

    /// Whether `basename` follows the convention.
    #[must_use]
    pub fn matches(&self, basename: &str) -> bool {
        let prefixed = self.prefix.map_or(true, |p| {
            basename
                .strip_prefix(p)
                .is_some_and(|rest| !rest.starts_with('.'))
        });
        prefixed
            && self.suffixes.iter().any(|s| {
                basename
                    .strip_suffix(s)
                    .is_some_and(|stem| !stem.is_empty())
            })
    }
}

/// Naming convention of `layer`; `None` for layers without one.
#[must_use]
pub fn naming_convention(layer: Layer) -> Option<NamingConvention> {
    let convention = match layer {
        Layer::Pipes => NamingConvention::suffixes(
            &[".pipe.ts", ".fn.ts"],
            "*.pipe.ts or *.fn.ts",
            "transform.pipe.ts",
        ),
        Layer::Flows => NamingConvention::suffixes(
            &[".flow.ts", ".action.ts"],
            "*.flow.ts or *.action.ts",
            "create-node.flow.ts",
        ),
        Layer::Io => NamingConvention::suffixes(
            &[".api.ts", ".storage.ts", ".file.ts"],
            "*.api.ts, *.storage.ts or *.file.ts",
            "node.api.ts",
        ),
        Layer::State => {
            NamingConvention::suffixes(&[".state.ts"], "*.state.ts", "selection.state.ts")
        }
        Layer::Hooks => NamingConvention {
            expected: "use-*.ts or use-*.tsx",
            example: "use-workspace.ts",
            suffixes: &[".ts", ".tsx"],
            prefix: Some("use-"),
        },
        Layer::Utils => NamingConvention::suffixes(&[".util.ts"], "*.util.ts", "date.util.ts"),
        Layer::Views => NamingConvention::suffixes(
            &[".view.fn.tsx", ".container.fn.tsx"],
            "*.view.fn.tsx or *.container.fn.tsx",
            "node-card.view.fn.tsx",
        ),
        Layer::Types => NamingConvention::suffixes(
            &[".interface.ts", ".schema.ts", ".types.ts"],
            "*.interface.ts, *.schema.ts or *.types.ts",
            "node.types.ts",
        ),
        Layer::Queries => {
            NamingConvention::suffixes(&[".queries.ts"], "*.queries.ts", "node.queries.ts")
        }
        Layer::Routes => return None,
    };
    Some(convention)
}

const TYPE_DECLARATIONS: [&str; 3] = [
    "type_alias_declaration",
    "interface_declaration",
    "enum_declaration",
];

/// Whether a top-level statement may appear in an index file.
fn is_reexport_statement(node: Node<'_>) -> bool {
    match node.kind() {
        "import_statement" | "comment" | "empty_statement" => true,
        "export_statement" => match node.child_by_field_name("declaration") {
            Some(declaration) => TYPE_DECLARATIONS.contains(&declaration.kind()),
            None => node.child_by_field_name("value").is_none(),
        },
        kind => TYPE_DECLARATIONS.contains(&kind),
    }
}

/// Checks file placement, naming and barrel hygiene.
#[derive(Debug, Clone)]
pub struct FileLocation {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for FileLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLocation {
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

impl Rule for FileLocation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks file naming, type placement, index files, and relative import depth"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let Some(layer) = ctx.layer() else {
            return Ok(Vec::new());
        };
        if ctx.is_test {
            return Ok(Vec::new());
        }
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#structure");
        let top_level = named_children(tree.root());

        if ctx.role.is_index {
            if let Some(statement) = top_level.iter().find(|s| !is_reexport_statement(**s)) {
                reporter.report(*statement, Message::new(INDEX_LOGIC))?;
            }
        } else {
            if layer != Layer::Types {
                for statement in top_level.iter().filter(|s| s.kind() == "export_statement") {
                    let Some(declaration) = statement
                        .child_by_field_name("declaration")
                        .filter(|d| TYPE_DECLARATIONS.contains(&d.kind()))
                    else {
                        continue;
                    };
                    let name = declaration
                        .child_by_field_name("name")
                        .map_or("", |n| tree.text(n));
                    reporter.report(*statement, Message::new(TYPES_IN_WRONG_FILE).arg("name", name))?;
                }
            }

            let basename = ctx
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(convention) = naming_convention(layer) {
                if !convention.matches(&basename) {
                    reporter.report_at(
                        Location::new(ctx.relative_path.clone(), 1, 1),
                        Message::new(WRONG_LOCATION)
                            .arg("file", &basename)
                            .arg("layer", layer)
                            .arg("expected", convention.expected)
                            .arg("example", convention.example),
                        None,
                    )?;
                }
            }
        }

        for import in extract_imports(tree) {
            if !matches!(import.syntax, ImportSyntax::Static | ImportSyntax::ReExport)
                || !import.specifier.starts_with('.')
            {
                continue;
            }
            let depth = relative_import_depth(&import.specifier);
            if depth > MAX_RELATIVE_DEPTH {
                reporter.report(
                    import.node,
                    Message::new(DEEP_RELATIVE)
                        .arg("depth", depth)
                        .arg("specifier", &import.specifier),
                )?;
            }
        }

        Ok(reporter.finish())
    }
}
