//! Locating `grain-lint.toml`.
//!
//! A config passed with `--config` wins. Otherwise the working directory and
//! its ancestors are searched for `grain-lint.toml` or `.grain-lint.toml`,
//! so running from `src/pipes/` still picks up the project file. The user
//! config under `$GRAIN_LINT_CONFIG_DIR` or `~/.config/grain-lint/` comes
//! last, and without any file the built-in defaults apply.

use grain_lint::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

const PROJECT_FILE_NAMES: [&str; 2] = [CONFIG_FILE_NAME, ".grain-lint.toml"];

/// How a config file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Named by `--config`.
    Flag,
    /// Found next to the project sources.
    Project,
    /// The per-user config.
    User,
    /// No file; built-in defaults.
    BuiltIn,
}

/// The config file to load, if any, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Origin of the file.
    pub origin: Origin,
    /// Path of the file; `None` for built-in defaults.
    pub file: Option<PathBuf>,
}

impl ConfigLocation {
    fn found(origin: Origin, file: PathBuf) -> Self {
        Self {
            origin,
            file: Some(file),
        }
    }

    /// Built-in defaults with no file.
    #[must_use]
    pub fn built_in() -> Self {
        Self {
            origin: Origin::BuiltIn,
            file: None,
        }
    }

    /// Config file path, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Directory a relative `analyzer.root` is joined to.
    ///
    /// A user config does not belong to any project, so the working
    /// directory is used for it and for built-in defaults.
    #[must_use]
    pub fn root_base<'a>(&'a self, cwd: &'a Path) -> &'a Path {
        match (self.origin, self.file.as_deref().and_then(Path::parent)) {
            (Origin::Flag | Origin::Project, Some(dir)) => dir,
            _ => cwd,
        }
    }
}

/// Finds the config for a run started in `cwd`.
#[must_use]
pub fn resolve(cwd: &Path, flag: Option<&Path>) -> ConfigLocation {
    locate(cwd, flag, user_config_dir().as_deref())
}

fn locate(cwd: &Path, flag: Option<&Path>, user_dir: Option<&Path>) -> ConfigLocation {
    if let Some(file) = flag {
        return ConfigLocation::found(Origin::Flag, file.to_path_buf());
    }

    let project_file = cwd.ancestors().find_map(|dir| {
        PROJECT_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    });
    if let Some(file) = project_file {
        tracing::debug!(config = %file.display(), "found project config");
        return ConfigLocation::found(Origin::Project, file);
    }

    match user_dir.map(|dir| dir.join(CONFIG_FILE_NAME)) {
        Some(file) if file.is_file() => {
            tracing::debug!(config = %file.display(), "found user config");
            ConfigLocation::found(Origin::User, file)
        }
        _ => ConfigLocation::built_in(),
    }
}

/// Per-user config directory: `$GRAIN_LINT_CONFIG_DIR`, else
/// `~/.config/grain-lint/`.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("GRAIN_LINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".config").join("grain-lint")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) -> PathBuf {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(path, "preset = \"recommended\"\n").unwrap();
        path.to_path_buf()
    }

    #[test]
    fn flag_wins_even_when_the_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join(CONFIG_FILE_NAME));
        let flagged = tmp.path().join("ci/strict.toml");

        let found = locate(tmp.path(), Some(&flagged), None);
        assert_eq!(found.origin, Origin::Flag);
        assert_eq!(found.file(), Some(flagged.as_path()));
        assert_eq!(found.root_base(Path::new("/cwd")), tmp.path().join("ci"));
    }

    #[test]
    fn nearest_project_file_is_used_from_a_layer_directory() {
        let tmp = TempDir::new().unwrap();
        let outer = touch(&tmp.path().join(CONFIG_FILE_NAME));
        let app = tmp.path().join("apps/desktop");
        let inner = touch(&app.join(".grain-lint.toml"));
        let pipes = app.join("src/pipes");
        fs::create_dir_all(&pipes).unwrap();

        let found = locate(&pipes, None, None);
        assert_eq!(found, ConfigLocation::found(Origin::Project, inner));
        assert_eq!(found.root_base(&pipes), app.as_path());

        let found = locate(tmp.path(), None, None);
        assert_eq!(found.file(), Some(outer.as_path()));
    }

    #[test]
    fn plain_file_name_beats_the_dotted_one() {
        let tmp = TempDir::new().unwrap();
        let plain = touch(&tmp.path().join(CONFIG_FILE_NAME));
        touch(&tmp.path().join(".grain-lint.toml"));

        assert_eq!(locate(tmp.path(), None, None).file(), Some(plain.as_path()));
    }

    #[test]
    fn user_config_is_the_last_resort() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let user_file = touch(&user.path().join(CONFIG_FILE_NAME));

        let found = locate(project.path(), None, Some(user.path()));
        assert_eq!(found, ConfigLocation::found(Origin::User, user_file));
        assert_eq!(found.root_base(project.path()), project.path());

        let project_file = touch(&project.path().join(CONFIG_FILE_NAME));
        let found = locate(project.path(), None, Some(user.path()));
        assert_eq!(found.file(), Some(project_file.as_path()));
    }

    #[test]
    fn nothing_found_means_built_in_defaults() {
        let project = TempDir::new().unwrap();
        let empty_user_dir = TempDir::new().unwrap();

        let found = locate(project.path(), None, Some(empty_user_dir.path()));
        assert_eq!(found, ConfigLocation::built_in());
        assert!(found.file().is_none());
        assert_eq!(found.root_base(Path::new("/work")), Path::new("/work"));
    }
}
