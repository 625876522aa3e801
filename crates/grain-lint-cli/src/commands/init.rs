//! Init command implementation.

use anyhow::{bail, Result};
use grain_lint::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# grain-lint configuration

# Rule preset: strict (default), legacy, recommended or minimal
preset = "strict"

# Lowest severity that fails `grain-lint check`: "error" or "warning"
fail_on = "error"

[analyzer]
# Root directory to analyze, relative to this file
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/*.d.ts",
]

# Respect .gitignore files
respect_gitignore = true

[architecture]
# false selects the legacy dependency table while a codebase migrates
strict = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.no-try-catch]
enabled = true
allow_in_tests = false

[rules.no-throw]
allow_in_tests = false

[rules.max-params]
max = 3

[rules.max-function-lines]
max = 20
# severity = "error"

[rules.no-async-outside-io]
allow_layers = ["io"]

# [rules.no-default-export]
# enabled = false

# Opt-in rules join any preset with enabled = true
# [rules.no-deprecated-imports]
# enabled = true
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: grain-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_lint::rules::{Preset, ALL_RULE_NAMES};
    use grain_lint::{resolve_fail_on, resolve_preset, Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(resolve_preset(None, &config), Ok(Preset::Strict));
        assert_eq!(resolve_fail_on(None, &config).unwrap(), Severity::Error);
        assert!(config.architecture.strict);
        assert_eq!(config.rule("max-params").unwrap().get_usize("max", 0), 3);
        assert_eq!(
            config.rule("no-async-outside-io").unwrap().get_str_array("allow_layers"),
            vec!["io".to_string()]
        );
    }

    #[test]
    fn default_config_only_names_known_rules() {
        let value: toml::Value = toml::from_str(DEFAULT_CONFIG).unwrap();
        let rules = value.get("rules").and_then(toml::Value::as_table).unwrap();
        for name in rules.keys() {
            assert!(ALL_RULE_NAMES.contains(&name.as_str()), "unknown rule {name}");
        }
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "preset = \"minimal\"\n").unwrap();

        assert!(write_config(tmp.path(), false).is_err());
        let kept = std::fs::read_to_string(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(kept.contains("minimal"));

        let path = write_config(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), DEFAULT_CONFIG);
    }
}
