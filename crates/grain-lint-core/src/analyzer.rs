//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, RuleConfig};
use crate::context::FileContext;
use crate::message::{FormatError, Message, MessageTemplate};
use crate::rule::{Rule, RuleBox};
use crate::syntax::{ParseError, SourceTree, SOURCE_EXTENSIONS};
use crate::types::{FileFailure, LintResult, Severity, Suggestion, Violation};
use crate::utils::allowance::check_allow_with_reason;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Emitted when an allow directive silences a rule that requires a reason.
pub const ALLOW_MISSING_REASON: MessageTemplate = MessageTemplate::new(
    "allowMissingReason",
    "Allow directive for `{{rule}}` is missing a reason",
);

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be turned into a syntax tree.
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        source: ParseError,
    },

    /// A rule produced a message it could not render.
    #[error("Rule `{rule}` failed on {path}: {source}")]
    Message {
        /// Path being analyzed.
        path: PathBuf,
        /// Rule that failed.
        rule: String,
        /// Rendering error.
        source: FormatError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be resolved or a
    /// glob pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let exclude = compile_patterns(
            self.exclude_patterns
                .iter()
                .chain(config.analyzer.exclude.iter()),
        )?;
        let include = compile_patterns(
            self.include_patterns
                .iter()
                .chain(config.analyzer.include.iter()),
        )?;

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            include,
            config,
        })
    }
}

fn compile_patterns<'a>(
    patterns: impl Iterator<Item = &'a String>,
) -> Result<Vec<glob::Pattern>, AnalyzerError> {
    patterns
        .map(|p| glob::Pattern::new(p).map_err(AnalyzerError::from))
        .collect()
}

type Outcome<'a> = (&'a Path, Result<Vec<Violation>, AnalyzerError>);

fn collect_outcomes(outcomes: Vec<Outcome<'_>>) -> LintResult {
    let mut result = LintResult::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(violations) => {
                result.violations.extend(violations);
                result.files_checked += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                result.failures.push(FileFailure {
                    file: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    result.sort();

    info!(
        "Analysis complete: {} violations in {} files ({} failed)",
        result.violations.len(),
        result.files_checked,
        result.failures.len()
    );

    result
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance. Analysis of one
/// file never depends on another, so [`Analyzer::analyze`] fans out over
/// files in parallel.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discovers and analyzes every source file under the root.
    ///
    /// A file that fails to read, parse, or render a message is recorded in
    /// [`LintResult::failures`] and does not stop the other files.
    ///
    /// # Errors
    ///
    /// Returns an error only if file discovery itself fails.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());
        Ok(self.analyze_paths(&files))
    }

    /// Analyzes an explicit list of files.
    #[must_use]
    pub fn analyze_paths(&self, files: &[PathBuf]) -> LintResult {
        let outcomes = files
            .par_iter()
            .map(|path| (path.as_path(), self.analyze_path(path)))
            .collect();
        collect_outcomes(outcomes)
    }

    /// Analyzes in-memory sources, keyed by the path each one would have on
    /// disk. Failures are isolated the same way as in [`Self::analyze_paths`].
    #[must_use]
    pub fn analyze_sources(&self, sources: &[(PathBuf, String)]) -> LintResult {
        let outcomes = sources
            .par_iter()
            .map(|(path, source)| (path.as_path(), self.analyze_file(path, source)))
            .collect();
        collect_outcomes(outcomes)
    }

    fn analyze_path(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        let content = std::fs::read_to_string(path)?;
        self.analyze_file(path, &content)
    }

    /// Analyzes one file's text. Pure: performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if no syntax tree could be built and
    /// [`AnalyzerError::Message`] if a rule failed to render a message.
    pub fn analyze_file(&self, path: &Path, source: &str) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let tree = SourceTree::parse(path, source).map_err(|e| AnalyzerError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let ctx = FileContext::new(path, source, &self.root);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let found = rule
                .check(&ctx, &tree)
                .map_err(|e| AnalyzerError::Message {
                    path: path.to_path_buf(),
                    rule: rule.id(),
                    source: e,
                })?;
            let found = self.apply_allowances(rule.as_ref(), &ctx, found)?;
            violations.extend(self.apply_severity_override(rule.name(), found));
        }

        Ok(violations)
    }

    /// Drops violations silenced by inline directives.
    fn apply_allowances(
        &self,
        rule: &dyn Rule,
        ctx: &FileContext,
        violations: Vec<Violation>,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let mut kept = Vec::with_capacity(violations.len());
        for violation in violations {
            let allow = check_allow_with_reason(ctx.content, violation.location.line, rule.name());
            if !allow.is_allowed() {
                kept.push(violation);
                continue;
            }
            debug!(
                "{} allowed at {}:{}",
                rule.name(),
                violation.location.file.display(),
                violation.location.line
            );
            if rule.requires_allow_reason() && allow.reason().is_none() {
                kept.push(missing_reason(rule, violation).map_err(|e| {
                    AnalyzerError::Message {
                        path: ctx.path.to_path_buf(),
                        rule: rule.id(),
                        source: e,
                    }
                })?);
            }
        }
        Ok(kept)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                if v.message_id != ALLOW_MISSING_REASON.id {
                    v.severity = severity;
                }
            }
        }
        violations
    }

    /// Discovers all source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files = Vec::new();

        for entry in walkdir::WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
            if !is_source {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Checks if a path should be excluded, either by an exclude pattern or
    /// by not matching any include pattern.
    #[must_use]
    pub fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let matches = |p: &glob::Pattern| p.matches_path(path) || p.matches_path(relative);

        if self.exclude.iter().any(matches) {
            return true;
        }
        !self.include.is_empty() && !self.include.iter().any(matches)
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rule(rule_name)
    }
}

fn missing_reason(rule: &dyn Rule, violation: Violation) -> Result<Violation, FormatError> {
    let message = Message::new(ALLOW_MISSING_REASON).arg("rule", rule.name());
    let text = message.render()?;
    Ok(Violation::new(
        rule.name(),
        message.id(),
        Severity::Warning,
        violation.location,
        text,
    )
    .with_data(message.into_data())
    .with_suggestion(Suggestion::new(
        "Add reason=\"...\" to explain why this exception is necessary",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageTemplate;
    use crate::rule::Reporter;
    use std::fs;

    const FOUND: MessageTemplate = MessageTemplate::new("found", "found {{what}}");
    const BROKEN: MessageTemplate = MessageTemplate::new("broken", "needs {{missing}}");

    struct FlagDebugger;

    impl Rule for FlagDebugger {
        fn name(&self) -> &'static str {
            "flag-debugger"
        }

        fn messages(&self) -> &'static [MessageTemplate] {
            &[FOUND]
        }

        fn check(
            &self,
            ctx: &FileContext,
            tree: &SourceTree,
        ) -> Result<Vec<Violation>, FormatError> {
            let mut reporter = Reporter::new(self.name(), self.default_severity(), ctx);
            for node in tree.nodes().filter(|n| n.kind() == "debugger_statement") {
                reporter.report(node, Message::new(FOUND).arg("what", "debugger"))?;
            }
            Ok(reporter.finish())
        }
    }

    struct AlwaysBroken;

    impl Rule for AlwaysBroken {
        fn name(&self) -> &'static str {
            "always-broken"
        }

        fn messages(&self) -> &'static [MessageTemplate] {
            &[BROKEN]
        }

        fn check(
            &self,
            ctx: &FileContext,
            tree: &SourceTree,
        ) -> Result<Vec<Violation>, FormatError> {
            let mut reporter = Reporter::new(self.name(), self.default_severity(), ctx);
            if ctx.content.contains("boom") {
                reporter.report(tree.root(), Message::new(BROKEN))?;
            }
            Ok(reporter.finish())
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::builder()
            .root(".")
            .rule(FlagDebugger)
            .build()
            .unwrap()
    }

    #[test]
    fn analyze_file_is_pure() {
        let a = analyzer();
        let v = a
            .analyze_file(Path::new("src/a.ts"), "debugger;\nconst x = 1;\n")
            .unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule_id, "grain/flag-debugger");
        assert_eq!(v[0].message, "found debugger");
        assert_eq!(v[0].location.line, 1);
    }

    #[test]
    fn disabled_rules_do_not_run() {
        let config = Config::parse("[rules.flag-debugger]\nenabled = false\n").unwrap();
        let a = Analyzer::builder()
            .root(".")
            .config(config)
            .rule(FlagDebugger)
            .build()
            .unwrap();
        assert!(a.analyze_file(Path::new("a.ts"), "debugger;").unwrap().is_empty());
    }

    #[test]
    fn severity_override_applies() {
        let config = Config::parse("[rules.flag-debugger]\nseverity = \"warning\"\n").unwrap();
        let a = Analyzer::builder()
            .root(".")
            .config(config)
            .rule(FlagDebugger)
            .build()
            .unwrap();
        let v = a.analyze_file(Path::new("a.ts"), "debugger;").unwrap();
        assert_eq!(v[0].severity, Severity::Warning);
    }

    #[test]
    fn allow_directive_with_reason_silences() {
        let src = "// grain-lint: allow(flag-debugger) reason=\"local repro\"\ndebugger;";
        let v = analyzer().analyze_file(Path::new("a.ts"), src).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn allow_directive_without_reason_warns() {
        let src = "// eslint-disable-next-line grain/flag-debugger\ndebugger;";
        let v = analyzer().analyze_file(Path::new("a.ts"), src).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message_id, "allowMissingReason");
        assert_eq!(v[0].severity, Severity::Warning);
    }

    #[test]
    fn broken_template_fails_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = dir.path().join("src");
        fs::create_dir_all(&src_dir).unwrap();
        fs::write(src_dir.join("good.ts"), "debugger;\n").unwrap();
        fs::write(src_dir.join("bad.ts"), "const boom = 1;\n").unwrap();

        let a = Analyzer::builder()
            .root(dir.path())
            .rule(FlagDebugger)
            .rule(AlwaysBroken)
            .build()
            .unwrap();
        let result = a.analyze().unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].file.ends_with("bad.ts"));
        assert!(result.failures[0].reason.contains("{{missing}}"));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("src/good.ts"));
    }

    #[test]
    fn in_memory_sources_isolate_failures() {
        let a = Analyzer::builder()
            .root("/proj")
            .rule(FlagDebugger)
            .rule(AlwaysBroken)
            .build()
            .unwrap();
        let sources = vec![
            (PathBuf::from("/proj/src/z.ts"), "debugger;\n".to_string()),
            (PathBuf::from("/proj/src/bad.ts"), "const boom = 1;\n".to_string()),
            (PathBuf::from("/proj/src/a.ts"), "debugger;\n".to_string()),
        ];
        let result = a.analyze_sources(&sources);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].file, PathBuf::from("/proj/src/bad.ts"));
        let files: Vec<&Path> = result
            .violations
            .iter()
            .map(|v| v.location.file.as_path())
            .collect();
        assert_eq!(files, vec![Path::new("src/a.ts"), Path::new("src/z.ts")]);
    }

    #[test]
    fn discovery_honours_extensions_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "").unwrap();
        fs::write(dir.path().join("src/b.tsx"), "").unwrap();
        fs::write(dir.path().join("src/c.css"), "").unwrap();
        fs::write(dir.path().join("src/d.d.ts"), "").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "").unwrap();

        let a = Analyzer::builder().root(dir.path()).build().unwrap();
        let files = a.discover_files().unwrap();
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["a.ts", "b.tsx"]);
    }

    #[test]
    fn include_patterns_narrow_discovery() {
        let a = Analyzer::builder()
            .root("/proj")
            .include("src/**")
            .build()
            .unwrap();
        assert!(!a.should_exclude(Path::new("/proj/src/pipes/a.ts")));
        assert!(a.should_exclude(Path::new("/proj/scripts/build.ts")));
    }
}
