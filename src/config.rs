//! Application configuration.
//!
//! Layered, lowest precedence first:
//! 1. built-in defaults
//! 2. `issueboard.toml` in the working directory (optional)
//! 3. environment (`ISSUEBOARD_REPO`, `ISSUEBOARD_JSONP`; `.env` is loaded)
//! 4. CLI flags
//!
//! ```toml
//! repo = "rails/rails"
//! jsonp = false
//! user_agent = "issueboard"
//! ```
//!
//! The static server reads only `PORT`; see [`crate::server::ServerConfig`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::github::api_base_for;
use crate::service::ServiceConfig;

pub const CONFIG_FILE: &str = "issueboard.toml";
pub const DEFAULT_REPO: &str = "rails/rails";
pub const DEFAULT_SERVER: &str = "https://api.github.com/repos/rails/rails";

/// Contents of `issueboard.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub jsonp: Option<bool>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let parsed = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(parsed))
    }
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repo: Option<String>,
    pub jsonp: bool,
}

/// Resolved configuration handed to the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `owner/repo` or a GitHub URL.
    pub repo: String,
    /// API base derived from `repo`.
    pub server: String,
    pub jsonp: bool,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            server: DEFAULT_SERVER.to_string(),
            jsonp: false,
            user_agent: format!("issueboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AppConfig {
    /// Resolve all layers from `dir`, the process environment and `cli`.
    pub fn load(dir: &Path, cli: &CliOverrides) -> Result<Self> {
        let file = FileConfig::load(&dir.join(CONFIG_FILE))?;
        let env_repo = std::env::var("ISSUEBOARD_REPO").ok();
        let env_jsonp = std::env::var("ISSUEBOARD_JSONP").ok();
        Self::resolve(file, env_repo.as_deref(), env_jsonp.as_deref(), cli)
    }

    /// Merge the layers. Kept free of I/O for testing.
    pub fn resolve(
        file: Option<FileConfig>,
        env_repo: Option<&str>,
        env_jsonp: Option<&str>,
        cli: &CliOverrides,
    ) -> Result<Self> {
        let mut config = Self::default();
        let file = file.unwrap_or_default();

        if let Some(repo) = file.repo {
            config.repo = repo;
        }
        if let Some(jsonp) = file.jsonp {
            config.jsonp = jsonp;
        }
        if let Some(user_agent) = file.user_agent {
            config.user_agent = user_agent;
        }

        if let Some(repo) = env_repo {
            config.repo = repo.to_string();
        }
        if let Some(value) = env_jsonp {
            config.jsonp = parse_flag(value)
                .with_context(|| format!("Invalid ISSUEBOARD_JSONP value '{}'", value))?;
        }

        if let Some(repo) = &cli.repo {
            config.repo = repo.clone();
        }
        if cli.jsonp {
            config.jsonp = true;
        }

        config.server = api_base_for(&config.repo).with_context(|| {
            format!(
                "Invalid repository '{}'. Expected owner/name or a GitHub URL",
                config.repo
            )
        })?;
        Ok(config)
    }

    pub fn service(&self) -> ServiceConfig {
        ServiceConfig {
            server: self.server.clone(),
            jsonp: self.jsonp,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected true or false"),
    }
}
