//! # grain-lint
//!
//! Static analyzer for the grain layered TypeScript architecture.
//!
//! This is the facade crate that re-exports the core framework, the
//! architecture model and the built-in rules, plus a small runner that
//! resolves configuration into a ready-to-use [`Analyzer`].
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use grain_lint::{build_analyzer, load_config, resolve_fail_on, resolve_preset};
//!
//! let config = load_config(Some(Path::new("grain-lint.toml")))?;
//! let preset = resolve_preset(None, &config)?;
//! let fail_on = resolve_fail_on(None, &config)?;
//! let analyzer = build_analyzer("./apps/desktop", preset, config)?;
//!
//! let result = analyzer.analyze()?;
//! if result.has_violations_at(fail_on) {
//!     eprintln!("{}", result.format_test_report(fail_on));
//! }
//! ```
//!
//! ## Suppression Comments
//!
//! ```typescript
//! // grain-lint: allow(no-try-catch) reason="SDK throws on cancel"
//! try { await sdk.pick(); } catch { return none; }
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use grain_lint_core::*;

/// Import extraction, classification and the dependency policy.
pub mod arch {
    pub use grain_lint_arch::*;
}

/// Built-in rules and presets.
pub mod rules {
    pub use grain_lint_rules::*;
}

mod runner;

pub use runner::{
    analyze_batch, build_analyzer, check_project, load_config, resolve_fail_on, resolve_preset,
    CheckReport, RunnerError, CONFIG_FILE_NAME,
};
