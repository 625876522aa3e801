//! Rule keeping UI frameworks out of the pure layers.
//!
//! Pipes, utils, io and state must not couple to React or its ecosystem.
//! State-management libraries are flagged too, except inside `state`
//! itself. Any named import that looks like a hook (`useX`) is flagged
//! regardless of its package.

use grain_lint_arch::{extract_imports, ImportRef, ImportSyntax};
use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::{FileContext, Layer, Reporter, Rule, Severity, SourceTree, Violation};

/// Rule name for no-react-in-pure-layers.
pub const NAME: &str = "no-react-in-pure-layers";

/// UI packages matched by exact name or as a subpath parent.
const UI_PACKAGES: &[&str] = &[
    "react",
    "react-dom",
    "react/jsx-runtime",
    "@types/react",
    "@types/react-dom",
    "react-router",
    "react-router-dom",
    "@tanstack/react-query",
    "@tanstack/react-router",
    "@tanstack/react-table",
    "@tanstack/react-form",
    "@headlessui/react",
    "framer-motion",
    "react-spring",
    "react-hook-form",
    "formik",
    "swr",
];

/// UI packages matched by prefix.
const UI_PACKAGE_PREFIXES: &[&str] = &["@radix-ui/react-"];

const STATE_PACKAGES: &[&str] = &["zustand", "jotai", "recoil", "@reduxjs/toolkit", "redux"];

const HOOK_PREFIX: &str = "use";

const IN_PIPES: MessageTemplate = MessageTemplate::new(
    "noReactInPipes",
    "pipes must not import {{package}}.\n\
     Pipes are pure data transformations and know nothing about rendering.\n\
     Fix: keep the transformation framework-free and call it from a hook.",
);
const IN_UTILS: MessageTemplate = MessageTemplate::new(
    "noReactInUtils",
    "utils must not import {{package}}.\n\
     Utils are framework-agnostic helpers shared by every layer.\n\
     Fix: move UI-specific helpers into src/hooks/ or src/views/.",
);
const IN_IO: MessageTemplate = MessageTemplate::new(
    "noReactInIo",
    "io must not import {{package}}.\n\
     io wraps external systems and must be callable outside a component tree.\n\
     Fix: return plain data and wrap the call in a query or hook.",
);
const IN_STATE: MessageTemplate = MessageTemplate::new(
    "noReactInState",
    "state must not import {{package}}.\n\
     State stores are plain modules; components subscribe through hooks.\n\
     Fix: expose the store and subscribe to it from src/hooks/.",
);
const HOOKS_IN_PURE: MessageTemplate = MessageTemplate::new(
    "noReactHooksInPure",
    "Hook {{name}} imported into the pure layer {{layer}}.\n\
     Hooks only run inside components and make the module impure.\n\
     Fix: call {{name}} from src/hooks/ and pass its result in as an argument.",
);
const TYPES_IN_PURE: MessageTemplate = MessageTemplate::new(
    "noReactTypesInPure",
    "Type import from {{package}} in the pure layer {{layer}}.\n\
     Even type-level coupling ties {{layer}} to the UI framework.\n\
     Fix: declare a framework-free type in src/types/.",
);

static MESSAGES: [MessageTemplate; 6] =
    [IN_PIPES, IN_UTILS, IN_IO, IN_STATE, HOOKS_IN_PURE, TYPES_IN_PURE];

fn matches_package(specifier: &str, package: &str) -> bool {
    specifier == package
        || specifier
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `specifier` names a UI-framework package.
#[must_use]
pub fn is_ui_package(specifier: &str) -> bool {
    UI_PACKAGES.iter().any(|p| matches_package(specifier, p))
        || UI_PACKAGE_PREFIXES.iter().any(|p| specifier.starts_with(p))
}

/// Whether `specifier` names a state-management library.
#[must_use]
pub fn is_state_package(specifier: &str) -> bool {
    STATE_PACKAGES.iter().any(|p| matches_package(specifier, p))
}

/// Whether `name` follows the hook naming convention.
#[must_use]
pub fn is_hook_name(name: &str) -> bool {
    name.len() > HOOK_PREFIX.len() && name.starts_with(HOOK_PREFIX)
}

/// Forbids UI-framework imports in pipes, utils, io and state.
#[derive(Debug, Clone)]
pub struct NoReactInPureLayers {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoReactInPureLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl NoReactInPureLayers {
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

    fn layer_template(layer: Layer) -> Option<MessageTemplate> {
        match layer {
            Layer::Pipes => Some(IN_PIPES),
            Layer::Utils => Some(IN_UTILS),
            Layer::Io => Some(IN_IO),
            Layer::State => Some(IN_STATE),
            _ => None,
        }
    }

    fn check_import(
        reporter: &mut Reporter<'_>,
        layer: Layer,
        template: MessageTemplate,
        import: &ImportRef<'_>,
    ) -> Result<(), FormatError> {
        let specifier = import.specifier.as_str();
        let banned =
            is_ui_package(specifier) || (layer != Layer::State && is_state_package(specifier));

        if banned {
            let message = if import.is_type_only() {
                Message::new(TYPES_IN_PURE)
                    .arg("package", specifier)
                    .arg("layer", layer)
            } else {
                Message::new(template).arg("package", specifier)
            };
            reporter.report(import.node, message)?;
            if import.is_type_only() {
                return Ok(());
            }
        }

        for name in import.named.iter().filter(|n| !n.type_only) {
            if is_hook_name(&name.name) {
                reporter.report(
                    name.node,
                    Message::new(HOOKS_IN_PURE)
                        .arg("name", &name.name)
                        .arg("layer", layer),
                )?;
            }
        }
        Ok(())
    }
}

impl Rule for NoReactInPureLayers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids UI-framework, hook, and state-library imports in pure layers"
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
        let Some(layer) = ctx.layer() else {
            return Ok(Vec::new());
        };
        let Some(template) = Self::layer_template(layer) else {
            return Ok(Vec::new());
        };

        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#pure-layers");
        for import in extract_imports(tree) {
            if matches!(import.syntax, ImportSyntax::Static | ImportSyntax::Require) {
                Self::check_import(&mut reporter, layer, template, &import)?;
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
        check(&NoReactInPureLayers::new(), path, src)
    }

    #[test]
    fn message_follows_layer() {
        let src = "import React from 'react';\n";
        assert_eq!(ids(&run("src/pipes/a.pipe.ts", src)), vec!["noReactInPipes"]);
        assert_eq!(ids(&run("src/utils/a.util.ts", src)), vec!["noReactInUtils"]);
        assert_eq!(ids(&run("src/io/a.api.ts", src)), vec!["noReactInIo"]);
        assert_eq!(ids(&run("src/state/a.state.ts", src)), vec!["noReactInState"]);
        assert!(run("src/views/a.view.fn.tsx", src).is_empty());
        assert!(run("src/hooks/use-a.ts", src).is_empty());
    }

    #[test]
    fn subpaths_and_scoped_prefixes_match() {
        for spec in [
            "react-dom/client",
            "@tanstack/react-query",
            "@radix-ui/react-dialog",
            "react/jsx-runtime",
            "swr/infinite",
        ] {
            let src = format!("import x from '{spec}';");
            assert_eq!(run("src/io/a.api.ts", &src).len(), 1, "{spec}");
        }
        for spec in ["reactive-streams", "preact", "@radix-ui/colors", "swrv"] {
            let src = format!("import x from '{spec}';");
            assert!(run("src/io/a.api.ts", &src).is_empty(), "{spec}");
        }
    }

    #[test]
    fn type_only_imports_use_the_types_message() {
        let v = run("src/utils/a.util.ts", "import type { FC } from 'react';");
        assert_eq!(ids(&v), vec!["noReactTypesInPure"]);
        let v = run("src/utils/a.util.ts", "import { type FC, type ReactNode } from 'react';");
        assert_eq!(ids(&v), vec!["noReactTypesInPure"]);
    }

    #[test]
    fn hook_names_are_flagged_from_any_package() {
        let v = run("src/pipes/a.pipe.ts", "import { useThing, parse } from '@/hooks/use-thing';");
        assert_eq!(ids(&v), vec!["noReactHooksInPure"]);
        assert_eq!(v[0].data.get("name").map(String::as_str), Some("useThing"));
        assert!(run("src/pipes/a.pipe.ts", "import { use } from 'x';").is_empty());
    }

    #[test]
    fn react_value_import_with_hook_reports_both() {
        let v = run("src/pipes/a.pipe.ts", "import { useState } from 'react';");
        assert_eq!(ids(&v), vec!["noReactInPipes", "noReactHooksInPure"]);
    }

    #[test]
    fn every_hook_in_one_statement_is_reported() {
        let v = run("src/io/a.api.ts", "import { useA, useB } from '@/hooks/use-ab';");
        assert_eq!(ids(&v), vec!["noReactHooksInPure", "noReactHooksInPure"]);
    }

    #[test]
    fn state_libraries_are_allowed_only_in_state() {
        let src = "import { create } from 'zustand';";
        assert!(run("src/state/notes.state.ts", src).is_empty());
        assert_eq!(ids(&run("src/pipes/a.pipe.ts", src)), vec!["noReactInPipes"]);
        assert_eq!(
            ids(&run("src/io/a.api.ts", "import { configureStore } from '@reduxjs/toolkit';")),
            vec!["noReactInIo"]
        );
    }

    #[test]
    fn require_calls_are_checked() {
        let v = run("src/utils/a.util.ts", "const React = require('react');");
        assert_eq!(ids(&v), vec!["noReactInUtils"]);
    }

    #[test]
    fn test_files_are_skipped() {
        assert!(run("src/pipes/a.pipe.test.ts", "import React from 'react';").is_empty());
    }
}
