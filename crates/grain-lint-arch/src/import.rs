//! Import classification: what a module specifier points at.

use grain_lint_core::Layer;

/// Prefix of project-internal aliased imports (`@/io/client.api`).
pub const ALIAS_PREFIX: &str = "@/";

/// How a specifier resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Third-party package.
    External,
    /// `./` or `../` path.
    Relative,
    /// Rooted at [`ALIAS_PREFIX`].
    Aliased,
}

/// A legacy directory and where its contents moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedDirectory {
    /// Legacy directory name (e.g. `stores`).
    pub directory: &'static str,
    /// Human-readable migration hint naming the new location.
    pub migration: &'static str,
}

const DEPRECATED_DIRECTORIES: [DeprecatedDirectory; 5] = [
    DeprecatedDirectory {
        directory: "fn",
        migration: "pipes/, utils/, flows/, or views/",
    },
    DeprecatedDirectory {
        directory: "components",
        migration: "views/",
    },
    DeprecatedDirectory {
        directory: "actions",
        migration: "flows/",
    },
    DeprecatedDirectory {
        directory: "stores",
        migration: "state/",
    },
    DeprecatedDirectory {
        directory: "lib",
        migration: "utils/",
    },
];

/// Looks up a legacy directory by name.
#[must_use]
pub fn deprecated_directory(name: &str) -> Option<DeprecatedDirectory> {
    DEPRECATED_DIRECTORIES
        .iter()
        .find(|d| d.directory == name)
        .copied()
}

/// Classification of a single module specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportClassification {
    /// How the specifier resolves.
    pub kind: ImportKind,
    /// Layer targeted by an aliased import, if its first segment is a layer.
    pub target_layer: Option<Layer>,
    /// Set when the first aliased segment is a legacy directory.
    pub deprecated: Option<DeprecatedDirectory>,
}

impl ImportClassification {
    /// Whether the specifier names a third-party package.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.kind == ImportKind::External
    }

    /// Whether the import targets a legacy directory.
    #[must_use]
    pub fn is_deprecated_directory(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Migration hint for a legacy-directory import.
    #[must_use]
    pub fn deprecated_migration_hint(&self) -> Option<&'static str> {
        self.deprecated.map(|d| d.migration)
    }
}

/// Classifies a module specifier. Never fails: an empty or malformed
/// specifier is external with no layer.
#[must_use]
pub fn classify_import(specifier: &str) -> ImportClassification {
    if specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
    {
        return ImportClassification {
            kind: ImportKind::Relative,
            target_layer: None,
            deprecated: None,
        };
    }

    let Some(rest) = specifier.strip_prefix(ALIAS_PREFIX) else {
        return ImportClassification {
            kind: ImportKind::External,
            target_layer: None,
            deprecated: None,
        };
    };

    let first_segment = rest.split('/').next().unwrap_or_default();
    ImportClassification {
        kind: ImportKind::Aliased,
        target_layer: Layer::from_segment(first_segment),
        deprecated: deprecated_directory(first_segment),
    }
}
