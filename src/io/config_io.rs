use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::EditorConfig;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG: &str = "trackline.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// `$XDG_CONFIG_HOME/trackline/config.toml`, falling back to
/// `~/.config/trackline/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
    };
    Some(base.join("trackline").join("config.toml"))
}

/// Candidate config files in priority order (excluding an explicit path)
pub fn search_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(LOCAL_CONFIG)];
    paths.extend(user_config_path());
    paths
}

/// Parse one config file
pub fn read_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolve the effective config: an explicit path must exist; otherwise the
/// first existing file from [`search_paths`] wins, else defaults. Returns the
/// file that was used, if any.
pub fn load_config(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(EditorConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((read_config(path)?, Some(path.to_path_buf())));
    }
    for path in search_paths(cwd) {
        if path.is_file() {
            let config = read_config(&path)?;
            tracing::debug!(path = %path.display(), "using config file");
            return Ok((config, Some(path)));
        }
    }
    Ok((EditorConfig::default(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_file_beats_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(LOCAL_CONFIG),
            "[timeline]\nfps = 24.0\n[layout]\nindent = 16.0\n",
        )
        .unwrap();

        let (config, used) = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.timeline.fps, 24.0);
        assert_eq!(config.layout.indent, 16.0);
        assert_eq!(used, Some(tmp.path().join(LOCAL_CONFIG)));
    }

    #[test]
    fn explicit_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        let err = load_config(Some(&missing), tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[layout]\nindent = \"wide\"\n").unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn search_starts_in_working_directory() {
        let tmp = TempDir::new().unwrap();
        let paths = search_paths(tmp.path());
        assert_eq!(paths[0], tmp.path().join(LOCAL_CONFIG));
    }
}
