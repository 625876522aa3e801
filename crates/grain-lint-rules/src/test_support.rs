//! Helpers shared by the rule unit tests.

use grain_lint_core::{FileContext, Rule, SourceTree, Violation};
use std::path::Path;

/// Runs `rule` over `src` as if it lived at `path`.
pub fn check(rule: &dyn Rule, path: &str, src: &str) -> Vec<Violation> {
    let path = Path::new(path);
    let ctx = FileContext::standalone(path, src);
    let tree = SourceTree::parse(path, src).unwrap();
    rule.check(&ctx, &tree).unwrap()
}

/// Message IDs of `violations`, in report order.
pub fn ids(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.message_id.as_str()).collect()
}
