//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level knowcheck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowcheckConfig {
    /// Default question bank for `knowcheck take`.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Percentage needed to pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u32,
    /// Per-character delay for feedback text, in milliseconds (0 disables).
    #[serde(default = "default_typewriter_ms")]
    pub typewriter_ms: u64,
    /// Show the theory label next to feedback.
    #[serde(default = "default_true")]
    pub show_theory: bool,
    /// Report formats written on completion.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./knowcheck-results")
}
fn default_pass_threshold() -> u32 {
    70
}
fn default_typewriter_ms() -> u64 {
    15
}
fn default_true() -> bool {
    true
}
fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for KnowcheckConfig {
    fn default() -> Self {
        Self {
            bank: None,
            output_dir: default_output_dir(),
            pass_threshold: default_pass_threshold(),
            typewriter_ms: default_typewriter_ms(),
            show_theory: true,
            formats: default_formats(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        // Substituted values are not rescanned.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. the explicit path, which must exist
/// 2. `knowcheck.toml` in the current directory
/// 3. `~/.config/knowcheck/config.toml`
///
/// Environment variable overrides: `KNOWCHECK_BANK`, `KNOWCHECK_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<KnowcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("knowcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<KnowcheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => KnowcheckConfig::default(),
    };

    // Apply env var overrides
    if let Ok(bank) = std::env::var("KNOWCHECK_BANK") {
        config.bank = Some(PathBuf::from(bank));
    }
    if let Ok(dir) = std::env::var("KNOWCHECK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.bank = config.bank.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    anyhow::ensure!(
        config.pass_threshold <= 100,
        "pass_threshold must be between 0 and 100"
    );

    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("knowcheck"))
}
