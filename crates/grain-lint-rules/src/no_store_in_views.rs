//! Rule keeping state stores out of pure view components.
//!
//! # Detected Patterns
//!
//! - state-management libraries (`zustand`, `jotai`, ...) imported into a
//!   non-container view
//! - store hooks (`useXStore`) imported into a non-container view from any
//!   module outside `src/state/`
//!
//! Imports straight from `src/state/` are left to `layer-dependencies`,
//! which already reports them. Containers and test files are skipped.

use crate::no_react_in_pure_layers::is_state_package;
use grain_lint_arch::{classify_import, extract_imports, ImportSyntax};
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Layer, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-store-in-views.
pub const NAME: &str = "no-store-in-views";

const STORE_LIBRARY: MessageTemplate = MessageTemplate::new(
    "noStoreLibraryInView",
    "View imports the state library {{package}}.\n\
     Pure views render props and never own or subscribe to a store.\n\
     Fix: define the store under src/state/ and read it from a container or hook.",
);
const STORE_HOOK: MessageTemplate = MessageTemplate::new(
    "noStoreHookInView",
    "View imports the store hook {{name}} from {{specifier}}.\n\
     Subscribing inside a pure view couples rendering to global state.\n\
     Fix: call {{name}} in a *.container.fn.tsx and pass the values down as props.",
);

static MESSAGES: [MessageTemplate; 2] = [STORE_LIBRARY, STORE_HOOK];

/// Whether `name` looks like a store hook such as `useSelectionStore`.
#[must_use]
pub fn is_store_hook(name: &str) -> bool {
    name.starts_with("use") && name.ends_with("Store")
}

/// Forbids store libraries and store hooks in non-container views.
#[derive(Debug, Clone)]
pub struct NoStoreInViews {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoStoreInViews {
    fn default() -> Self {
        Self::new()
    }
}

impl NoStoreInViews {
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

impl Rule for NoStoreInViews {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids state libraries and store hooks in non-container views"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        if ctx.is_test || ctx.role.is_container || ctx.layer() != Some(Layer::Views) {
            return Ok(Vec::new());
        }
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#views");

        for import in extract_imports(tree) {
            if !matches!(import.syntax, ImportSyntax::Static | ImportSyntax::Require)
                || import.is_type_only()
            {
                continue;
            }
            let specifier = import.specifier.as_str();
            if is_state_package(specifier) {
                reporter.report(
                    import.source_node,
                    Message::new(STORE_LIBRARY).arg("package", specifier),
                )?;
                continue;
            }
            if classify_import(specifier).target_layer == Some(Layer::State) {
                continue;
            }

            if let Some(default) = import.default.as_deref().filter(|n| is_store_hook(n)) {
                reporter.report(
                    import.node,
                    Message::new(STORE_HOOK)
                        .arg("name", default)
                        .arg("specifier", specifier),
                )?;
            }
            for name in import
                .named
                .iter()
                .filter(|n| !n.type_only && is_store_hook(&n.name))
            {
                reporter.report(
                    name.node,
                    Message::new(STORE_HOOK)
                        .arg("name", &name.name)
                        .arg("specifier", specifier),
                )?;
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
        check(&NoStoreInViews::new(), path, src)
    }

    #[test]
    fn store_library_in_view() {
        let v = run(
            "src/views/card.view.fn.tsx",
            "import { create } from 'zustand';\n",
        );
        assert_eq!(ids(&v), vec!["noStoreLibraryInView"]);
        assert_eq!(v[0].data.get("package").map(String::as_str), Some("zustand"));
    }

    #[test]
    fn store_hook_through_another_module() {
        let src = "import { useSelectionStore, useTheme } from '@/hooks/use-selection';\n";
        let v = run("src/views/card.view.fn.tsx", src);
        assert_eq!(ids(&v), vec!["noStoreHookInView"]);
        assert_eq!(
            v[0].data.get("name").map(String::as_str),
            Some("useSelectionStore")
        );
        let v = run(
            "src/views/card.view.fn.tsx",
            "import useEditorStore from '../editor';\n",
        );
        assert_eq!(ids(&v), vec!["noStoreHookInView"]);
    }

    #[test]
    fn state_layer_imports_are_left_to_the_dependency_table() {
        let src = "import { useSelectionStore } from '@/state/selection.state';\n";
        assert!(run("src/views/card.view.fn.tsx", src).is_empty());
    }

    #[test]
    fn containers_tests_and_other_layers_are_skipped() {
        let src = "import { create } from 'zustand';\nimport { useAStore } from '@/hooks/use-a';\n";
        assert!(run("src/views/card.container.fn.tsx", src).is_empty());
        assert!(run("src/views/card.view.fn.test.tsx", src).is_empty());
        assert!(run("src/hooks/use-card.ts", src).is_empty());
    }

    #[test]
    fn type_only_imports_pass() {
        let src = "import type { StoreApi } from 'zustand';\nimport { type useAStore } from '@/hooks/use-a';\n";
        assert!(run("src/views/card.view.fn.tsx", src).is_empty());
    }

    #[test]
    fn store_hook_names() {
        assert!(is_store_hook("useSelectionStore"));
        assert!(is_store_hook("useStore"));
        assert!(!is_store_hook("useStorage"));
        assert!(!is_store_hook("selectionStore"));
    }
}
