//! Layer dependency policy.
//!
//! The policy is static data: for each layer the set of layers it may
//! import from, in a strict and a legacy variant. A handful of purity
//! carve-outs are evaluated before the table and can only add violations,
//! never remove them.

use crate::import::{DeprecatedDirectory, ImportClassification};
use grain_lint_core::{FileRole, Layer};

use Layer::{Flows, Hooks, Io, Pipes, Queries, Routes, State, Types, Utils, Views};

/// Extra layers a container component may import from.
pub const CONTAINER_EXTRA: [Layer; 2] = [Flows, State];

const fn strict_allowed(layer: Layer) -> &'static [Layer] {
    match layer {
        Views => &[Hooks, Types],
        Hooks => &[Flows, State, Queries, Types],
        Flows => &[Pipes, Io, State, Types],
        Pipes => &[Utils, Types],
        Io | State | Utils => &[Types],
        Types => &[],
        Queries => &[Io, Types],
        Routes => &[Views, Hooks, Types],
    }
}

const fn legacy_allowed(layer: Layer) -> &'static [Layer] {
    match layer {
        Views => &[Hooks, Flows, State, Types],
        Hooks => &[Flows, State, Queries, Types, Io],
        Flows => &[Pipes, Io, State, Types],
        Pipes => &[Utils, Types],
        Io | Utils => &[Types],
        State => &[Types, Pipes],
        Types => &[],
        Queries => &[Io, Types],
        Routes => &[Views, Hooks, Flows, State, Types],
    }
}

/// Outcome of checking one import against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerVerdict {
    /// Import of a legacy directory.
    Deprecated(DeprecatedDirectory),
    /// A pure view reaching into state.
    ViewState,
    /// A non-container view reaching into flows or state.
    ContainerException {
        /// Imported layer.
        import: Layer,
    },
    /// A pipe importing io, state, or flows.
    PipesPurity {
        /// Imported layer.
        import: Layer,
    },
    /// A util importing anything other than types.
    UtilsPurity {
        /// Imported layer.
        import: Layer,
    },
    /// A hook importing io directly.
    HooksIo,
    /// Not in the allowed set for the current layer.
    NotAllowed {
        /// Importing layer.
        current: Layer,
        /// Imported layer.
        import: Layer,
        /// What the current layer may import.
        allowed: Vec<Layer>,
    },
}

/// Strict or legacy dependency table plus carve-outs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyPolicy {
    strict: bool,
}

impl Default for DependencyPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl DependencyPolicy {
    /// Policy with the given mode.
    #[must_use]
    pub const fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// The strict table.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(true)
    }

    /// The legacy (relaxed) table.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::new(false)
    }

    /// Whether this is the strict table.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        self.strict
    }

    /// Layers `current` may import from, before carve-outs.
    #[must_use]
    pub const fn allowed_layers(self, current: Layer) -> &'static [Layer] {
        if self.strict {
            strict_allowed(current)
        } else {
            legacy_allowed(current)
        }
    }

    /// Whether `current` importing `import` is a violation.
    #[must_use]
    pub fn is_violation(self, current: Layer, import: Layer, is_container: bool) -> bool {
        let role = FileRole {
            layer: Some(current),
            is_container,
            ..FileRole::default()
        };
        self.evaluate(current, import, &role).is_some()
    }

    /// Checks one layer-to-layer dependency, returning the first matching
    /// carve-out or the table verdict.
    #[must_use]
    pub fn evaluate(self, current: Layer, import: Layer, role: &FileRole) -> Option<LayerVerdict> {
        match (current, import) {
            (Views, State) if role.is_view && !role.is_container => Some(LayerVerdict::ViewState),
            (Views, Flows | State) if !role.is_container => {
                Some(LayerVerdict::ContainerException { import })
            }
            (Pipes, Io | State | Flows) => Some(LayerVerdict::PipesPurity { import }),
            (Utils, _) if import != Types => Some(LayerVerdict::UtilsPurity { import }),
            (Hooks, Io) => Some(LayerVerdict::HooksIo),
            _ => self.table_verdict(current, import, role.is_container),
        }
    }

    fn table_verdict(self, current: Layer, import: Layer, is_container: bool) -> Option<LayerVerdict> {
        let base = self.allowed_layers(current);
        let container_ok = current == Views && is_container && CONTAINER_EXTRA.contains(&import);
        if base.contains(&import) || container_ok {
            return None;
        }
        let mut allowed = base.to_vec();
        if current == Views && is_container {
            for extra in CONTAINER_EXTRA {
                if !allowed.contains(&extra) {
                    allowed.push(extra);
                }
            }
        }
        Some(LayerVerdict::NotAllowed {
            current,
            import,
            allowed,
        })
    }

    /// Checks one classified import made from a file with `role`.
    ///
    /// Deprecated directories are reported regardless of the importing
    /// file's layer; every other check needs both ends to have a layer.
    #[must_use]
    pub fn check_import(
        self,
        role: &FileRole,
        import: &ImportClassification,
    ) -> Option<LayerVerdict> {
        if let Some(deprecated) = import.deprecated {
            return Some(LayerVerdict::Deprecated(deprecated));
        }
        let current = role.layer?;
        let target = import.target_layer?;
        self.evaluate(current, target, role)
    }
}

/// Concrete advice for moving a forbidden dependency.
#[must_use]
pub fn violation_suggestion(current: Layer, import: Layer) -> String {
    let specific = match (current, import) {
        (Hooks, Io) => Some("Call io through a flow in src/flows/ or a query in src/queries/."),
        (Pipes, Flows) => Some("Invert the dependency: let the flow call the pipe."),
        (Pipes, Io) => {
            Some("Perform the io call in a flow and pass its result to the pipe as an argument.")
        }
        (Pipes, State) => Some("Pass the state value into the pipe as a parameter."),
        (Views, Flows) => {
            Some("Call the flow from a hook, or rename the file to *.container.fn.tsx.")
        }
        (Views, Io) => Some("Load data in a hook or flow and pass it to the view via props."),
        (Views, Pipes) => Some("Transform data in a hook and pass the result via props."),
        (Views, State) => Some("Read state through a hook and pass it to the view via props."),
        _ => None,
    };
    specific.map_or_else(
        || format!("Move the code that needs {import} out of {current}, or depend on a layer {current} may import."),
        str::to_string,
    )
}

/// Joins layers as `a, b, c`, or `(none)` when empty.
#[must_use]
pub fn join_layers(layers: &[Layer]) -> String {
    if layers.is_empty() {
        return "(none)".to_string();
    }
    layers
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::classify_import;
    use grain_lint_core::layer::ALL_LAYERS;

    fn role(path: &str) -> FileRole {
        FileRole::classify(path)
    }

    #[test]
    fn flows_may_depend_on_io() {
        let policy = DependencyPolicy::strict();
        let verdict = policy.check_import(
            &role("src/flows/create-node.flow.ts"),
            &classify_import("@/io/node.api"),
        );
        assert_eq!(verdict, None);
    }

    #[test]
    fn pipes_importing_io_is_a_purity_violation() {
        let verdict = DependencyPolicy::strict().check_import(
            &role("src/pipes/transform.pipe.ts"),
            &classify_import("@/io/api/client.api"),
        );
        assert_eq!(verdict, Some(LayerVerdict::PipesPurity { import: Io }));
    }

    #[test]
    fn container_may_reach_state_but_view_may_not() {
        let policy = DependencyPolicy::strict();
        let state = classify_import("@/state/selection.state");
        assert_eq!(
            policy.check_import(&role("src/views/sidebar.container.fn.tsx"), &state),
            None
        );
        assert_eq!(
            policy.check_import(&role("src/views/sidebar.view.fn.tsx"), &state),
            Some(LayerVerdict::ViewState)
        );
        assert_eq!(
            policy.check_import(&role("src/views/sidebar.tsx"), &state),
            Some(LayerVerdict::ContainerException { import: State })
        );
    }

    #[test]
    fn deprecated_import_is_reported_from_any_file() {
        let policy = DependencyPolicy::strict();
        let stores = classify_import("@/stores/anything");
        for path in ["src/pipes/a.pipe.ts", "src/main.tsx", "src/views/a.view.fn.tsx"] {
            match policy.check_import(&role(path), &stores) {
                Some(LayerVerdict::Deprecated(d)) => assert_eq!(d.migration, "state/"),
                other => panic!("{path}: {other:?}"),
            }
        }
    }

    #[test]
    fn carve_outs_apply_in_legacy_mode() {
        let legacy = DependencyPolicy::legacy();
        assert!(legacy.allowed_layers(Hooks).contains(&Io));
        assert_eq!(
            legacy.evaluate(Hooks, Io, &role("src/hooks/use-x.ts")),
            Some(LayerVerdict::HooksIo)
        );
        assert!(legacy.is_violation(Views, State, false));
        assert!(!legacy.is_violation(State, Pipes, false));
        assert!(DependencyPolicy::strict().is_violation(State, Pipes, false));
    }

    #[test]
    fn utils_may_only_import_types() {
        let policy = DependencyPolicy::strict();
        for layer in ALL_LAYERS {
            assert_eq!(policy.is_violation(Utils, layer, false), layer != Types, "{layer}");
        }
    }

    #[test]
    fn not_allowed_carries_allowed_set() {
        let verdict = DependencyPolicy::strict().evaluate(Io, Flows, &role("src/io/a.api.ts"));
        assert_eq!(
            verdict,
            Some(LayerVerdict::NotAllowed {
                current: Io,
                import: Flows,
                allowed: vec![Types],
            })
        );
    }

    #[test]
    fn allowed_pairs_without_carve_outs_never_violate() {
        for policy in [DependencyPolicy::strict(), DependencyPolicy::legacy()] {
            for current in ALL_LAYERS {
                for &import in policy.allowed_layers(current) {
                    let carved = matches!(
                        (current, import),
                        (Views, Flows | State) | (Pipes, Io | State | Flows) | (Hooks, Io)
                    ) || (current == Utils && import != Types);
                    if !carved {
                        assert!(
                            !policy.is_violation(current, import, false),
                            "{current} -> {import}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn utils_row_is_types_in_both_tables() {
        assert_eq!(DependencyPolicy::strict().allowed_layers(Utils), &[Types]);
        assert_eq!(DependencyPolicy::legacy().allowed_layers(Utils), &[Types]);
        assert!(DependencyPolicy::strict().is_violation(Utils, Utils, false));
    }

    #[test]
    fn strict_table_never_exceeds_legacy() {
        for layer in ALL_LAYERS {
            for &allowed in DependencyPolicy::strict().allowed_layers(layer) {
                assert!(
                    DependencyPolicy::legacy().allowed_layers(layer).contains(&allowed),
                    "strict {layer} -> {allowed} is missing from legacy"
                );
            }
        }
    }

    #[test]
    fn tables_are_acyclic() {
        fn visit(policy: DependencyPolicy, layer: Layer, stack: &mut Vec<Layer>) {
            assert!(!stack.contains(&layer), "cycle through {stack:?} -> {layer}");
            stack.push(layer);
            for &next in policy.allowed_layers(layer) {
                visit(policy, next, stack);
            }
            stack.pop();
        }

        for policy in [DependencyPolicy::strict(), DependencyPolicy::legacy()] {
            for layer in ALL_LAYERS {
                visit(policy, layer, &mut Vec::new());
            }
        }
    }

    #[test]
    fn suggestions_fall_back_to_generic_text() {
        assert!(violation_suggestion(Pipes, Io).contains("flow"));
        let generic = violation_suggestion(Types, Views);
        assert!(generic.contains("views") && generic.contains("types"));
    }

    #[test]
    fn join_layers_formats_lists() {
        assert_eq!(join_layers(&[Utils, Types]), "utils, types");
        assert_eq!(join_layers(&[]), "(none)");
    }
}
