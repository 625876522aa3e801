//! Path classification: maps file paths to architecture layers and roles.
//!
//! Classification is a pure function of the path string. Separators are
//! normalized to `/` first, then the path is tested against an ordered
//! table of `/src/<dir>/` segments where the first match wins.

use serde::{Deserialize, Serialize};

/// An architectural role assigned to a source file by its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// UI components (`src/views/`).
    Views,
    /// React hooks bridging views and business logic (`src/hooks/`).
    Hooks,
    /// Business workflows composing pipes and io (`src/flows/`).
    Flows,
    /// Pure data transformations (`src/pipes/`).
    Pipes,
    /// Side-effecting adapters: network, storage, files (`src/io/`).
    Io,
    /// Application state stores (`src/state/`).
    State,
    /// Generic pure helpers (`src/utils/`).
    Utils,
    /// Shared type definitions (`src/types/`).
    Types,
    /// Query definitions over io (`src/queries/`).
    Queries,
    /// Route modules (`src/routes/`).
    Routes,
}

/// Every layer, in classification order.
pub const ALL_LAYERS: [Layer; 10] = [
    Layer::Views,
    Layer::Hooks,
    Layer::Flows,
    Layer::Pipes,
    Layer::Io,
    Layer::State,
    Layer::Utils,
    Layer::Types,
    Layer::Queries,
    Layer::Routes,
];

/// Layers that must stay free of UI-framework coupling.
pub const PURE_LAYERS: [Layer; 4] = [Layer::Pipes, Layer::Utils, Layer::Io, Layer::State];

impl Layer {
    /// Directory name of the layer (also its config and message spelling).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Hooks => "hooks",
            Self::Flows => "flows",
            Self::Pipes => "pipes",
            Self::Io => "io",
            Self::State => "state",
            Self::Utils => "utils",
            Self::Types => "types",
            Self::Queries => "queries",
            Self::Routes => "routes",
        }
    }

    /// Resolves a directory segment (e.g. the `io` in `@/io/client`).
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        ALL_LAYERS.into_iter().find(|l| l.as_str() == segment)
    }

    /// One-line description of what belongs in the layer.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Views => "UI components",
            Self::Hooks => "React hooks connecting views to flows and state",
            Self::Flows => "business workflows composing pipes and io",
            Self::Pipes => "pure data transformations",
            Self::Io => "side-effecting adapters for network, storage, and files",
            Self::State => "application state stores",
            Self::Utils => "generic pure helpers",
            Self::Types => "shared type definitions",
            Self::Queries => "query definitions over io",
            Self::Routes => "route modules",
        }
    }

    /// Whether the layer must stay free of UI-framework coupling.
    #[must_use]
    pub fn is_pure(self) -> bool {
        PURE_LAYERS.contains(&self)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(segment, layer)` table; first match wins.
const LAYER_SEGMENTS: [(&str, Layer); 10] = [
    ("/src/views/", Layer::Views),
    ("/src/hooks/", Layer::Hooks),
    ("/src/flows/", Layer::Flows),
    ("/src/pipes/", Layer::Pipes),
    ("/src/io/", Layer::Io),
    ("/src/state/", Layer::State),
    ("/src/utils/", Layer::Utils),
    ("/src/types/", Layer::Types),
    ("/src/queries/", Layer::Queries),
    ("/src/routes/", Layer::Routes),
];

const SOURCE_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Normalizes separators and anchors the path with a leading `/` so that
/// relative and absolute paths match the same segment table.
#[must_use]
pub fn normalize_path(file_path: &str) -> String {
    let unified = file_path.replace('\\', "/");
    if unified.starts_with('/') {
        unified
    } else {
        format!("/{unified}")
    }
}

fn basename(file_path: &str) -> &str {
    file_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_path)
}

/// Maps a file path to its layer, or `None` outside the layered tree.
#[must_use]
pub fn classify_layer(file_path: &str) -> Option<Layer> {
    let normalized = normalize_path(file_path);
    LAYER_SEGMENTS
        .iter()
        .find(|(segment, _)| normalized.contains(segment))
        .map(|(_, layer)| *layer)
}

/// Whether the path is a test file (`*.test.*`, `*.spec.*`, or under `__tests__`).
#[must_use]
pub fn is_test_file(file_path: &str) -> bool {
    let name = basename(file_path);
    if name.contains(".test.") || name.contains(".spec.") {
        return true;
    }
    normalize_path(file_path)
        .split('/')
        .any(|segment| segment == "__tests__")
}

/// Whether the basename is `index` with a recognized source extension.
#[must_use]
pub fn is_index_file(file_path: &str) -> bool {
    basename(file_path)
        .split_once('.')
        .is_some_and(|(stem, ext)| stem == "index" && SOURCE_EXTENSIONS.contains(&ext))
}

/// Whether the file follows the container naming convention (`*.container.fn.tsx`).
#[must_use]
pub fn is_container_component(file_path: &str) -> bool {
    basename(file_path).contains(".container.")
}

/// Whether the file follows the pure view naming convention (`*.view.fn.tsx`).
#[must_use]
pub fn is_view_component(file_path: &str) -> bool {
    basename(file_path).contains(".view.")
}

/// Counts the leading `../` segments of a relative import path.
#[must_use]
pub fn relative_import_depth(import_path: &str) -> usize {
    let mut rest = import_path.strip_prefix("./").unwrap_or(import_path);
    let mut depth = 0;
    while let Some(next) = rest.strip_prefix("../") {
        depth += 1;
        rest = next;
    }
    if rest == ".." {
        depth += 1;
    }
    depth
}

/// Structural roles of a file, computed once per analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileRole {
    /// Architectural layer, if any.
    pub layer: Option<Layer>,
    /// Test file.
    pub is_test: bool,
    /// `index.*` barrel file.
    pub is_index: bool,
    /// Container component (may reach flows and state).
    pub is_container: bool,
    /// Pure view component.
    pub is_view: bool,
}

impl FileRole {
    /// Classifies `file_path`.
    #[must_use]
    pub fn classify(file_path: &str) -> Self {
        Self {
            layer: classify_layer(file_path),
            is_test: is_test_file(file_path),
            is_index: is_index_file(file_path),
            is_container: is_container_component(file_path),
            is_view: is_view_component(file_path),
        }
    }
}
