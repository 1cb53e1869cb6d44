use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

pub const DEFAULT_TOKEN_ENV: &str = "GH_TOKEN";
pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("BRANCH_SWEEP_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SweepError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("branch-sweep/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SweepError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SweepError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.github {
            self.github.merge(patch);
        }
        if let Some(patch) = patch.sweep {
            self.sweep.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `BRANCH_SWEEP_*` overrides read through `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BRANCH_SWEEP_API_URL") {
            self.github.api_url = Some(value);
        }
        if let Some(value) = lookup("BRANCH_SWEEP_TOKEN_ENV") {
            self.github.token_env = value;
        }
        if let Some(value) = parse_u64(&lookup, "BRANCH_SWEEP_TIMEOUT_SECS")? {
            self.github.timeout_secs = value;
        }
        if let Some(value) = parse_u64(&lookup, "BRANCH_SWEEP_PER_PAGE")? {
            self.github.per_page = u32::try_from(value).unwrap_or(MAX_PER_PAGE);
        }
        if let Some(values) = lookup("BRANCH_SWEEP_HOSTS").map(|raw| split_list(&raw)) {
            self.github.hosts = merge_unique(values, &[]);
        }
        if let Some(values) = lookup("BRANCH_SWEEP_EXCLUDE").map(|raw| split_list(&raw)) {
            self.sweep.exclude = merge_unique(values, &self.sweep.exclude);
        }

        self.github.per_page = self.github.per_page.clamp(1, MAX_PER_PAGE);
        if self.github.hosts.is_empty() {
            return Err(SweepError::Config("github.hosts is empty".to_string()));
        }
        if self.github.token_env.trim().is_empty() {
            return Err(SweepError::Config("github.token_env is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Explicit REST base URL; derived from the repository host when unset.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            per_page: default_per_page(),
            hosts: default_hosts(),
        }
    }
}

impl GitHubConfig {
    fn merge(&mut self, patch: GitHubPatch) {
        if let Some(value) = patch.api_url {
            self.api_url = Some(value);
        }
        if let Some(value) = patch.token_env {
            self.token_env = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.per_page {
            self.per_page = value.clamp(1, MAX_PER_PAGE);
        }
        // A configured host list replaces the default rather than extending it.
        if let Some(values) = patch.hosts {
            self.hosts = merge_unique(values, &[]);
        }
    }

    /// REST base URL for a repository hosted on `host`.
    #[must_use]
    pub fn api_base_for(&self, host: &str) -> String {
        if let Some(url) = &self.api_url {
            return url.trim_end_matches('/').to_string();
        }
        if host.eq_ignore_ascii_case(DEFAULT_HOST) {
            DEFAULT_API_URL.to_string()
        } else {
            format!("https://{host}/api/v3")
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Branches never deleted, in addition to `--exclude-branch`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl SweepConfig {
    fn merge(&mut self, patch: SweepPatch) {
        if let Some(values) = patch.exclude {
            self.exclude = merge_unique(values, &self.exclude);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub github: Option<GitHubPatch>,
    pub sweep: Option<SweepPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GitHubPatch {
    pub api_url: Option<String>,
    pub token_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub per_page: Option<u32>,
    pub hosts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SweepPatch {
    pub exclude: Option<Vec<String>>,
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

fn default_hosts() -> Vec<String> {
    vec![DEFAULT_HOST.to_string()]
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| SweepError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}
