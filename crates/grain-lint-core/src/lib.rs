//! # grain-lint-core
//!
//! Core framework for grain-lint, a layered-architecture and functional
//! style linter for TypeScript projects built on tree-sitter.
//!
//! This crate provides:
//!
//! - [`layer`]: the path classifier mapping files to architecture layers
//! - [`SourceTree`]: tree-sitter parsing and node helpers
//! - [`Rule`] trait and [`rule::Reporter`] for per-file detectors
//! - [`message`]: templates whose placeholders must all be filled
//! - [`Analyzer`] for orchestrating lint execution across files
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use grain_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./apps/desktop")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let violations = analyzer.analyze_file(path, &source)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
pub mod layer;
pub mod message;
pub mod rule;
pub mod syntax;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, ALLOW_MISSING_REASON};
pub use config::{AnalyzerConfig, ArchitectureConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use layer::{FileRole, Layer};
pub use message::{FormatError, Message, MessageTemplate};
pub use rule::{Reporter, Rule, RuleBox};
pub use syntax::{Dialect, ParseError, SourceTree};
pub use types::{
    FileFailure, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
    RULE_NAMESPACE,
};
pub use utils::allowance::AllowCheck;
