//! # grain-lint-rules
//!
//! Built-in lint rules for grain-lint.
//!
//! Rules fall into four groups: architecture (layer boundaries and file
//! placement), purity (side effects and mutation), security (code and
//! markup injection, secrets) and complexity.
//!
//! ## Available Rules
//!
//! | Name | Severity | Description |
//! |------|----------|-------------|
//! | `layer-dependencies` | error | Enforces the layer dependency table |
//! | `no-react-in-pure-layers` | error | Keeps UI frameworks out of pipes, utils, io and state |
//! | `no-side-effects-in-pipes` | error | Forbids async code and side-effect globals in pipes and utils |
//! | `no-mutation` | error | Forbids mutating array methods and index assignment |
//! | `no-object-mutation` | error | Forbids property writes, `delete` and mutating `Object.*` calls |
//! | `no-try-catch` | error | Forbids `try`/`catch` |
//! | `no-throw` | error | Forbids `throw` |
//! | `no-promise-methods` | error | Forbids promise chains, combinators and constructors |
//! | `no-eval` | error | Forbids `eval`, `Function` and string timers |
//! | `no-innerhtml` | error | Forbids raw HTML injection |
//! | `no-sensitive-logging` | error | Catches secrets in logs and source |
//! | `max-function-lines` | warning | Function body length |
//! | `max-params` | warning | Declared parameter count |
//! | `max-nesting` | warning | Block nesting depth |
//! | `cyclomatic-complexity` | warning | Branch count |
//! | `max-file-lines` | warning | Code lines per file |
//! | `no-banned-imports` | error | Forbids replaced libraries and clock reads |
//! | `no-default-export` | error | Requires named exports |
//! | `file-location` | warning | File naming, type placement, index files, import depth |
//! | `no-store-in-views` | error | Keeps state libraries and store hooks out of pure views |
//! | `no-async-outside-io` | error | Confines `async` functions to io |
//! | `no-deprecated-imports` | error | Legacy-directory imports on their own (opt-in) |
//! | `file-naming` | warning | Kebab-case file and directory names |
//!
//! ## Usage
//!
//! ```ignore
//! use grain_lint_core::Analyzer;
//! use grain_lint_rules::Preset;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./apps/desktop")
//!     .rules(Preset::Strict.rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod complexity;
mod file_location;
mod file_naming;
mod layer_dependencies;
mod no_async_outside_io;
mod no_banned_imports;
mod no_default_export;
mod no_deprecated_imports;
mod no_eval;
mod no_innerhtml;
mod no_mutation;
mod no_object_mutation;
mod no_promise_methods;
mod no_react_in_pure_layers;
mod no_sensitive_logging;
mod no_side_effects_in_pipes;
mod no_store_in_views;
mod no_throw;
mod no_try_catch;
mod presets;

#[cfg(test)]
mod test_support;

pub use complexity::{ComplexityLimits, ComplexityRule, FunctionMetrics, Metric};
pub use file_location::{naming_convention, FileLocation, NamingConvention};
pub use file_naming::{is_kebab_case, split_stem, to_kebab_case, FileNaming};
pub use layer_dependencies::LayerDependencies;
pub use no_async_outside_io::NoAsyncOutsideIo;
pub use no_banned_imports::{banned_package, NoBannedImports, BANNED_PACKAGES};
pub use no_default_export::NoDefaultExport;
pub use no_deprecated_imports::NoDeprecatedImports;
pub use no_eval::NoEval;
pub use no_innerhtml::{is_sanitizer, NoInnerHtml};
pub use no_mutation::NoMutation;
pub use no_object_mutation::NoObjectMutation;
pub use no_promise_methods::NoPromiseMethods;
pub use no_react_in_pure_layers::{is_hook_name, is_state_package, is_ui_package, NoReactInPureLayers};
pub use no_sensitive_logging::{is_sensitive_name, looks_like_credential, NoSensitiveLogging};
pub use no_side_effects_in_pipes::NoSideEffectsInPipes;
pub use no_store_in_views::{is_store_hook, NoStoreInViews};
pub use no_throw::NoThrow;
pub use no_try_catch::NoTryCatch;
pub use presets::{
    all_rules, configured_rules, Preset, UnknownPreset, ALL_PRESETS, ALL_RULE_NAMES, OPT_IN,
};

/// Re-export core types for convenience.
pub use grain_lint_core::{Rule, Severity, Violation};
