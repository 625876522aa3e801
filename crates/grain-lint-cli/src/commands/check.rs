//! Check command implementation.

use anyhow::{Context, Result};
use grain_lint::syntax::SOURCE_EXTENSIONS;
use grain_lint::{build_analyzer, load_config, resolve_fail_on, resolve_preset, Analyzer};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config_resolver::{self, ConfigLocation, Origin};
use crate::OutputFormat;

/// Command-line options of `grain-lint check`.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Files or directories to analyze.
    pub paths: Vec<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Preset override.
    pub preset: Option<String>,
    /// `fail_on` override.
    pub fail_on: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the check command.
pub fn run(options: &CheckOptions, explicit_config: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let location = config_resolver::resolve(&cwd, explicit_config);
    if let (Origin::User, Some(p)) = (location.origin, location.file()) {
        tracing::info!("Using user config: {}", p.display());
    }

    let mut config = load_config(location.file()).with_context(|| match location.file() {
        Some(p) => format!("Failed to load config: {}", p.display()),
        None => "Failed to load default config".to_string(),
    })?;
    config.analyzer.exclude.extend(options.exclude.iter().cloned());

    let preset = resolve_preset(options.preset.as_deref(), &config)?;
    let fail_on = resolve_fail_on(options.fail_on.as_deref(), &config)?;
    let root = analysis_root(&location, &cwd, &config.analyzer.root);
    let respect_gitignore = config.analyzer.respect_gitignore;

    let analyzer = build_analyzer(root, preset, config).context("Failed to build analyzer")?;

    let targets: Vec<PathBuf> = options.paths.iter().map(|p| cwd.join(p)).collect();
    let files = discover_files(&analyzer, &targets, respect_gitignore)?;
    tracing::info!("Analyzing {} files", files.len());

    let result = analyzer.analyze_paths(&files);

    super::output::print(&result, options.format, analyzer.root())?;

    if result.has_violations_at(fail_on) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn analysis_root(location: &ConfigLocation, cwd: &Path, configured: &Path) -> PathBuf {
    location.root_base(cwd).join(configured)
}

/// Collects source files under `targets`, honoring `.gitignore` when asked
/// and the analyzer's include and exclude patterns.
///
/// A target that is a file is taken as-is if it has a source extension.
pub fn discover_files(
    analyzer: &Analyzer,
    targets: &[PathBuf],
    respect_gitignore: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for target in targets {
        if target.is_file() {
            if is_source_file(target) && !analyzer.should_exclude(target) {
                files.push(target.clone());
            }
            continue;
        }

        let mut builder = ignore::WalkBuilder::new(target);
        builder
            .hidden(false)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .ignore(respect_gitignore);

        for entry in builder.build() {
            let entry = entry.with_context(|| format!("Failed to walk {}", target.display()))?;
            let path = entry.path();

            if !path.is_file() || !is_source_file(path) {
                continue;
            }
            if analyzer.should_exclude(path) {
                tracing::debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_lint::rules::Preset;
    use grain_lint::Config;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn discovers_sources_and_skips_excluded_paths() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/pipes/sort.pipe.ts", "export const a = 1;\n");
        write(root, "src/views/node-card.view.tsx", "export const b = 1;\n");
        write(root, "src/types/node.types.d.ts", "export type T = string;\n");
        write(root, "node_modules/pkg/index.js", "module.exports = 1;\n");
        write(root, "README.md", "# readme\n");

        let analyzer = build_analyzer(root, Preset::Minimal, Config::default()).unwrap();
        let files = discover_files(&analyzer, &[root.to_path_buf()], true).unwrap();

        assert_eq!(
            relative(root, &files),
            vec!["src/pipes/sort.pipe.ts", "src/views/node-card.view.tsx"]
        );
    }

    #[test]
    fn explicit_files_and_overlapping_targets_are_deduplicated() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/pipes/sort.pipe.ts", "export const a = 1;\n");
        write(root, "notes.txt", "not source\n");

        let analyzer = build_analyzer(root, Preset::Minimal, Config::default()).unwrap();
        let targets = vec![
            root.join("src"),
            root.join("src/pipes/sort.pipe.ts"),
            root.join("notes.txt"),
        ];
        let files = discover_files(&analyzer, &targets, true).unwrap();

        assert_eq!(relative(root, &files), vec!["src/pipes/sort.pipe.ts"]);
    }

    #[test]
    fn extra_exclude_patterns_apply() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/pipes/sort.pipe.ts", "export const a = 1;\n");
        write(root, "src/generated/api.ts", "export const b = 1;\n");

        let mut config = Config::default();
        config.analyzer.exclude.push("**/generated/**".to_string());
        let analyzer = build_analyzer(root, Preset::Minimal, config).unwrap();
        let files = discover_files(&analyzer, &[root.to_path_buf()], false).unwrap();

        assert_eq!(relative(root, &files), vec!["src/pipes/sort.pipe.ts"]);
    }

    #[test]
    fn relative_root_resolves_against_the_config_directory() {
        let location = ConfigLocation {
            origin: Origin::Project,
            file: Some(PathBuf::from("/repo/apps/desktop/grain-lint.toml")),
        };
        assert_eq!(
            analysis_root(&location, Path::new("/elsewhere"), Path::new("src")),
            PathBuf::from("/repo/apps/desktop/src")
        );
        assert_eq!(
            analysis_root(&ConfigLocation::built_in(), Path::new("/work"), Path::new(".")),
            PathBuf::from("/work/.")
        );
    }
}
