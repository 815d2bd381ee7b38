//! gutscore configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level gutscore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GutscoreConfig {
    /// Assessment TOML to use instead of the built-in one.
    #[serde(default)]
    pub assessment: Option<PathBuf>,
    /// Output directory for saved results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Saved result format: json, html, or all.
    #[serde(default = "default_format")]
    pub format: String,
    /// Save results after every completed session even without `--output`.
    #[serde(default)]
    pub save_results: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./gutscore-results")
}
fn default_format() -> String {
    "json".to_string()
}

impl Default for GutscoreConfig {
    fn default() -> Self {
        Self {
            assessment: None,
            output_dir: default_output_dir(),
            format: default_format(),
            save_results: false,
        }
    }
}

/// Expand `${VAR}` references; unset variables expand to nothing.
///
/// Substituted values are not expanded again. An unterminated `${` is kept
/// as written.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&std::env::var(&rest[start + 2..start + 2 + len]).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order after an explicit path:
/// 1. `gutscore.toml` in the current directory
/// 2. `~/.config/gutscore/config.toml`
///
/// Environment variable override: `GUTSCORE_ASSESSMENT`.
pub fn load_config_from(path: Option<&Path>) -> Result<GutscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gutscore.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<GutscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => GutscoreConfig::default(),
    };

    if let Ok(assessment) = std::env::var("GUTSCORE_ASSESSMENT") {
        if !assessment.is_empty() {
            config.assessment = Some(PathBuf::from(assessment));
        }
    }

    config.assessment = config.assessment.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gutscore"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GUTSCORE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GUTSCORE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GUTSCORE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${oops"), "unterminated ${oops");
        assert_eq!(resolve_env_vars("${_GUTSCORE_TEST_UNSET}/x"), "/x");
        std::env::remove_var("_GUTSCORE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_GUTSCORE_TEST_SELF", "${_GUTSCORE_TEST_SELF}");
        assert_eq!(
            resolve_env_vars("out/${_GUTSCORE_TEST_SELF}/${_GUTSCORE_TEST_SELF}"),
            "out/${_GUTSCORE_TEST_SELF}/${_GUTSCORE_TEST_SELF}"
        );
        std::env::remove_var("_GUTSCORE_TEST_SELF");
    }

    #[test]
    fn default_config() {
        let config = GutscoreConfig::default();
        assert!(config.assessment.is_none());
        assert_eq!(config.output_dir, PathBuf::from("./gutscore-results"));
        assert_eq!(config.format, "json");
        assert!(!config.save_results);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
assessment = "assessments/sleep.toml"
save_results = true
"#;
        let config: GutscoreConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.assessment,
            Some(PathBuf::from("assessments/sleep.toml"))
        );
        assert!(config.save_results);
        assert_eq!(config.format, "json");
    }

    #[test]
    fn load_explicit_path() {
        std::env::set_var("_GUTSCORE_TEST_OUT", "/tmp/gutscore-out");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gutscore.toml");
        std::fs::write(
            &path,
            "output_dir = \"${_GUTSCORE_TEST_OUT}/results\"\nformat = \"html\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/gutscore-out/results"));
        assert_eq!(config.format, "html");
        std::env::remove_var("_GUTSCORE_TEST_OUT");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/no/such/gutscore.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
