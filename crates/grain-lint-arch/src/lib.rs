//! # grain-lint-arch
//!
//! Architecture knowledge shared by the grain-lint rules:
//!
//! - [`classify_import`] for telling external, relative, aliased, and
//!   deprecated-directory imports apart
//! - [`DependencyPolicy`] with the strict and legacy layer dependency
//!   tables and the purity carve-outs
//! - [`extract_imports`] for pulling ESM imports, `require` calls, and
//!   dynamic imports out of a syntax tree

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod extractor;
pub mod import;
pub mod policy;

pub use extractor::{extract_imports, ImportRef, ImportSyntax, ImportedName};
pub use import::{classify_import, DeprecatedDirectory, ImportClassification, ImportKind};
pub use policy::{DependencyPolicy, LayerVerdict};
