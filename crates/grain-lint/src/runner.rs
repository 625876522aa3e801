//! Configuration-to-analyzer plumbing shared by the CLI and library users.

use grain_lint_core::{Analyzer, AnalyzerError, Config, ConfigError, LintResult, Severity};
use grain_lint_rules::{Preset, UnknownPreset};
use std::path::{Path, PathBuf};
use tracing::info;

/// Project-level configuration file name.
pub const CONFIG_FILE_NAME: &str = "grain-lint.toml";

/// Errors raised while turning configuration into an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The preset name is not recognized.
    #[error(transparent)]
    Preset(#[from] UnknownPreset),

    /// The `fail_on` threshold is not a severity.
    #[error("unknown severity `{0}`; expected `error` or `warning`")]
    FailOn(String),

    /// The analyzer could not be built or run.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

/// Loads `path`, or the default configuration when no path is given.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<Config, RunnerError> {
    match path {
        Some(path) => {
            info!("Using config: {}", path.display());
            Ok(Config::from_file(path)?)
        }
        None => Ok(Config::default()),
    }
}

/// Resolves the effective preset: explicit argument, then config, then
/// [`Preset::Strict`].
///
/// # Errors
///
/// Returns [`UnknownPreset`] for an unrecognized name.
pub fn resolve_preset(arg: Option<&str>, config: &Config) -> Result<Preset, UnknownPreset> {
    arg.or(config.preset.as_deref())
        .map_or(Ok(Preset::default()), str::parse)
}

/// Resolves the effective `fail_on` threshold: explicit argument, then
/// config, then `error`.
///
/// # Errors
///
/// Returns [`RunnerError::FailOn`] for anything but `error` or `warning`.
pub fn resolve_fail_on(arg: Option<&str>, config: &Config) -> Result<Severity, RunnerError> {
    let name = arg.or(config.fail_on.as_deref()).unwrap_or("error");
    Severity::from_name(name).ok_or_else(|| RunnerError::FailOn(name.to_string()))
}

/// Builds an analyzer rooted at `root` running `preset` with the rule
/// options, enablement and severity overrides from `config`.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or a glob is invalid.
pub fn build_analyzer(
    root: impl Into<PathBuf>,
    preset: Preset,
    config: Config,
) -> Result<Analyzer, AnalyzerError> {
    let rules = preset.rules_with_config(&config);
    let analyzer = Analyzer::builder()
        .root(root)
        .rules(rules)
        .config(config)
        .build()?;
    info!(
        "Preset {} with {} rules at {}",
        preset,
        analyzer.rule_count(),
        analyzer.root().display()
    );
    Ok(analyzer)
}

/// Analyzes in-memory sources in parallel.
///
/// A source that fails to parse or render is recorded in
/// [`LintResult::failures`]; the others are unaffected.
#[must_use]
pub fn analyze_batch(analyzer: &Analyzer, sources: &[(PathBuf, String)]) -> LintResult {
    analyzer.analyze_sources(sources)
}

/// Outcome of [`check_project`].
#[derive(Debug)]
pub struct CheckReport {
    /// Everything the analyzer found.
    pub result: LintResult,
    /// Threshold the run is judged against.
    pub fail_on: Severity,
}

impl CheckReport {
    /// True when no violation reaches the `fail_on` threshold.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.result.has_violations_at(self.fail_on)
    }

    /// Human-readable report of the failing violations.
    #[must_use]
    pub fn report(&self) -> String {
        self.result.format_test_report(self.fail_on)
    }
}

/// Analyzes the project at `root` using `root/grain-lint.toml` if present.
///
/// `preset` and `fail_on` override the configuration file.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or file discovery
/// fails. Individual file failures are reported in the result instead.
pub fn check_project(
    root: &Path,
    preset: Option<&str>,
    fail_on: Option<&str>,
) -> Result<CheckReport, RunnerError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    let config = load_config(config_path.exists().then_some(config_path.as_path()))?;
    let preset = resolve_preset(preset, &config)?;
    let fail_on = resolve_fail_on(fail_on, &config)?;
    let analyzer = build_analyzer(root, preset, config)?;
    let result = analyzer.analyze()?;
    Ok(CheckReport { result, fail_on })
}
