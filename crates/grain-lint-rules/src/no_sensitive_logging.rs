//! Rule catching secrets in logs and source.
//!
//! Three heuristics:
//!
//! - a `console.*`/`logger.*` argument whose identifier, shorthand property
//!   or template substitution name contains a sensitive term
//! - a variable or property with a sensitive name initialized from a
//!   string literal (environment and config accessors are not literals, so
//!   `process.env.API_KEY` passes)
//! - a string literal that looks like a credential (bearer tokens, API key
//!   formats)
//!
//! The term list is matched as lowercase substrings and omits
//! very short terms (`pin`, `ssn`, `key`) that match ordinary identifiers
//! such as `spinner` or `keyboard`.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::named_children;
use grain_lint_core::{FileContext, Reporter, Rule, Severity, SourceTree, Violation};
use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

/// Rule name for no-sensitive-logging.
pub const NAME: &str = "no-sensitive-logging";

/// Lowercase substrings that mark a name as sensitive.
pub const SENSITIVE_TERMS: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "secret",
    "token",
    "apikey",
    "api_key",
    "accesskey",
    "access_key",
    "privatekey",
    "private_key",
    "credential",
    "auth",
    "authorization",
    "session",
    "cookie",
    "jwt",
    "bearer",
    "oauth",
    "social_security",
    "credit_card",
    "creditcard",
    "cvv",
    "bank_account",
    "account_number",
];

const CREDENTIAL_PATTERNS: &[&str] = &[
    r#"(?i)['"](?:password|passwd|pwd)['"]:\s*['"][^'"]+['"]"#,
    r#"(?i)['"](?:token|apikey|api_key)['"]:\s*['"][^'"]+['"]"#,
    r#"(?i)['"](?:secret|privatekey|private_key)['"]:\s*['"][^'"]+['"]"#,
    r"Bearer\s+[A-Za-z0-9\-._~+/]+=*",
    r"Basic\s+[A-Za-z0-9+/]{8,}=*",
    r"sk-[A-Za-z0-9]{32,}",
    r"gh[po]_[A-Za-z0-9]{36}",
];

static CREDENTIAL_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CREDENTIAL_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

const PLACEHOLDER_MARKERS: &[&str] = &["YOUR_", "REPLACE_", "TODO"];

const LOGGERS: &[&str] = &["console", "logger"];

const SENSITIVE_LOGGING: MessageTemplate = MessageTemplate::new(
    "sensitiveLogging",
    "Possible sensitive value {{name}} passed to a logger.\n\
     Logs are copied, shipped and retained far beyond the running process.\n\
     Fix: log a redacted marker instead, e.g. {{name}}Present: Boolean({{name}}).",
);
const HARDCODED: MessageTemplate = MessageTemplate::new(
    "hardcodedCredentials",
    "Hardcoded value for sensitive name {{name}}.\n\
     Secrets in source end up in version control and client bundles.\n\
     Fix: read it from configuration, e.g. const {{name}} = process.env.NAME;",
);
const CREDENTIAL_PATTERN: MessageTemplate = MessageTemplate::new(
    "credentialPattern",
    "String literal looks like a credential.\n\
     Tokens and keys in source are leaked to anyone who can read the code.\n\
     Fix: load the credential from a secret store or environment variable.",
);

static MESSAGES: [MessageTemplate; 3] = [SENSITIVE_LOGGING, HARDCODED, CREDENTIAL_PATTERN];

/// Whether `name` contains a sensitive term.
#[must_use]
pub fn is_sensitive_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    SENSITIVE_TERMS.iter().any(|term| lower.contains(term))
}

/// Whether `text` matches a known credential format.
#[must_use]
pub fn looks_like_credential(text: &str) -> bool {
    CREDENTIAL_REGEXES.iter().any(|re| re.is_match(text))
}

fn is_real_value(value: &str) -> bool {
    !value.is_empty() && !PLACEHOLDER_MARKERS.iter().any(|m| value.contains(m))
}

/// Forbids logging sensitive values and hardcoding credentials.
#[derive(Debug, Clone)]
pub struct NoSensitiveLogging {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoSensitiveLogging {
    fn default() -> Self {
        Self::new()
    }
}

impl NoSensitiveLogging {
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

    fn check_log_call(
        reporter: &mut Reporter<'_>,
        tree: &SourceTree<'_>,
        call: Node<'_>,
    ) -> Result<(), FormatError> {
        let is_logger = tree
            .method_call(call)
            .is_some_and(|(recv, _)| recv.kind() == "identifier" && LOGGERS.contains(&tree.text(recv)));
        if !is_logger {
            return Ok(());
        }

        for arg in tree.arguments(call) {
            let candidates: Vec<Node<'_>> = match arg.kind() {
                "identifier" => vec![arg],
                "object" => named_children(arg)
                    .into_iter()
                    .filter(|p| p.kind() == "shorthand_property_identifier")
                    .collect(),
                "template_string" => named_children(arg)
                    .into_iter()
                    .filter(|s| s.kind() == "template_substitution")
                    .flat_map(named_children)
                    .filter(|e| e.kind() == "identifier")
                    .collect(),
                _ => Vec::new(),
            };
            for node in candidates {
                let name = tree.text(node);
                if is_sensitive_name(name) {
                    reporter.report(node, Message::new(SENSITIVE_LOGGING).arg("name", name))?;
                }
            }
        }
        Ok(())
    }

    fn check_binding(
        reporter: &mut Reporter<'_>,
        tree: &SourceTree<'_>,
        name: Option<Node<'_>>,
        value: Option<Node<'_>>,
    ) -> Result<(), FormatError> {
        let (Some(name), Some(value)) = (name, value) else {
            return Ok(());
        };
        if !matches!(
            name.kind(),
            "identifier" | "property_identifier" | "shorthand_property_identifier"
        ) {
            return Ok(());
        }
        let name = tree.text(name);
        let hardcoded = tree.string_value(value).is_some_and(is_real_value);
        if hardcoded && is_sensitive_name(name) {
            reporter.report(value, Message::new(HARDCODED).arg("name", name))?;
        }
        Ok(())
    }
}

impl Rule for NoSensitiveLogging {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids logging sensitive values and hardcoding credentials"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        &MESSAGES
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter = Reporter::new(NAME, self.severity, ctx).doc_ref("#security");

        for node in tree.nodes() {
            match node.kind() {
                "call_expression" => Self::check_log_call(&mut reporter, tree, node)?,
                "variable_declarator" => Self::check_binding(
                    &mut reporter,
                    tree,
                    node.child_by_field_name("name"),
                    node.child_by_field_name("value"),
                )?,
                "pair" => Self::check_binding(
                    &mut reporter,
                    tree,
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                )?,
                "string" | "template_string" => {
                    let matches = tree.string_value(node).is_some()
                        && looks_like_credential(tree.text(node));
                    if matches && !reporter.has_reported(node) {
                        reporter.report(node, Message::new(CREDENTIAL_PATTERN))?;
                    }
                }
                _ => {}
            }
        }

        Ok(reporter.finish())
    }
}
