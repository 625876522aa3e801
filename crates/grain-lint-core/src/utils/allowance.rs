//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // grain-lint: allow(no-mutation) reason="builder owns this array"
//! // eslint-disable-next-line grain/no-try-catch -- third-party API throws
//! const value = compute(); // eslint-disable-line grain/no-mutation
//! ```
//!
//! A directive applies to the line it sits on and the line directly below.

use crate::types::RULE_NAMESPACE;
use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Which lines a directive covers relative to its own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Its own line and the next one (`grain-lint: allow`).
    SameAndNext,
    /// Only the next line (`eslint-disable-next-line`).
    Next,
    /// Only its own line (`eslint-disable-line`).
    Same,
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    /// Rule names that are allowed; empty means every rule.
    rules: HashSet<String>,
    reason: Option<String>,
    scope: Scope,
}

impl AllowDirective {
    fn covers(&self, rule_name: &str) -> bool {
        self.rules.is_empty() || self.rules.contains("all") || self.rules.contains(rule_name)
    }
}

/// Checks source code for allowance comments with reason.
///
/// # Arguments
///
/// * `content` - Source code content
/// * `line` - Line number of the violation (1-indexed)
/// * `rule_name` - Bare rule name (e.g., `no-mutation`)
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, rule_name: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for (check_line, on_same_line) in [(line, true), (line.saturating_sub(1), false)] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }

        let Some(directive) = parse_allow_directive(lines[check_line - 1]) else {
            continue;
        };
        let in_scope = match directive.scope {
            Scope::SameAndNext => true,
            Scope::Next => !on_same_line,
            Scope::Same => on_same_line,
        };
        if in_scope && directive.covers(rule_name) {
            return AllowCheck::Allowed {
                reason: directive.reason,
            };
        }
    }

    AllowCheck::Denied
}

/// Extracts the comment body from a line: a whole-line `//` comment, a
/// trailing `//` comment, or a single-line `/* ... */` block.
fn comment_body(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("/*") {
        return Some(rest.strip_suffix("*/").unwrap_or(rest).trim());
    }
    let start = line.find("//")?;
    Some(line[start + 2..].trim())
}

/// Parses an allowance directive from a source line.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let body = comment_body(line)?;

    if let Some(rest) = body.strip_prefix("grain-lint:") {
        return parse_grain_directive(rest.trim());
    }
    if let Some(rest) = body.strip_prefix("eslint-disable-next-line") {
        return Some(parse_eslint_directive(rest, Scope::Next));
    }
    if let Some(rest) = body.strip_prefix("eslint-disable-line") {
        return Some(parse_eslint_directive(rest, Scope::Same));
    }
    None
}

fn parse_grain_directive(directive: &str) -> Option<AllowDirective> {
    let allow_content = directive.strip_prefix("allow(")?.trim();
    let paren_end = allow_content.find(')')?;

    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(normalize_rule)
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some(AllowDirective {
        rules,
        reason,
        scope: Scope::SameAndNext,
    })
}

fn parse_eslint_directive(rest: &str, scope: Scope) -> AllowDirective {
    let (list, reason) = match rest.split_once("--") {
        Some((list, reason)) => (list, Some(reason.trim().to_string())),
        None => (rest, None),
    };

    let rules = list
        .split(',')
        .map(normalize_rule)
        .filter(|s| !s.is_empty())
        .collect();

    AllowDirective {
        rules,
        reason: reason.filter(|r| !r.is_empty()),
        scope,
    }
}

/// Strips the `grain/` namespace so directives may use either spelling.
fn normalize_rule(raw: &str) -> String {
    let name = raw.trim().trim_end_matches("*/").trim();
    name.strip_prefix(RULE_NAMESPACE)
        .and_then(|n| n.strip_prefix('/'))
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grain_directive() {
        let directive = parse_allow_directive("// grain-lint: allow(no-mutation)").unwrap();
        assert!(directive.rules.contains("no-mutation"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_grain_directive_with_reason() {
        let directive =
            parse_allow_directive("// grain-lint: allow(grain/no-throw) reason=\"adapter edge\"")
                .unwrap();
        assert!(directive.rules.contains("no-throw"));
        assert_eq!(directive.reason.as_deref(), Some("adapter edge"));
    }

    #[test]
    fn test_parse_multiple_rules() {
        let directive =
            parse_allow_directive("  // grain-lint: allow(rule1, grain/rule2, rule3)").unwrap();
        assert!(directive.rules.contains("rule1"));
        assert!(directive.rules.contains("rule2"));
        assert!(directive.rules.contains("rule3"));
    }

    #[test]
    fn eslint_next_line_applies_only_below() {
        let content = "// eslint-disable-next-line grain/no-try-catch -- sdk throws\ntry {} catch {}";
        let below = check_allow_with_reason(content, 2, "no-try-catch");
        assert!(below.is_allowed());
        assert_eq!(below.reason(), Some("sdk throws"));
        assert!(!check_allow_with_reason(content, 1, "no-try-catch").is_allowed());
    }

    #[test]
    fn eslint_same_line_applies_to_trailing_comment() {
        let content = "items.push(x); // eslint-disable-line grain/no-mutation\nitems.push(y);";
        assert!(check_allow_with_reason(content, 1, "no-mutation").is_allowed());
        assert!(!check_allow_with_reason(content, 2, "no-mutation").is_allowed());
    }

    #[test]
    fn bare_eslint_directive_covers_every_rule() {
        let content = "/* eslint-disable-next-line */\neval(code);";
        assert!(check_allow_with_reason(content, 2, "no-eval").is_allowed());
    }

    #[test]
    fn grain_directive_covers_next_line() {
        let content = r#"function f() {
  // grain-lint: allow(no-mutation) reason="local buffer"
  buf.push(x);
}"#;
        let result = check_allow_with_reason(content, 3, "no-mutation");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("local buffer"));
        assert!(!check_allow_with_reason(content, 3, "no-eval").is_allowed());
    }

    #[test]
    fn test_check_allow_denied() {
        let content = "function f() {\n  buf.push(x);\n}";
        let result = check_allow_with_reason(content, 2, "no-mutation");
        assert!(!result.is_allowed());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn urls_in_code_are_not_directives() {
        assert!(parse_allow_directive("const u = 'https://example.com';").is_none());
    }
}
