//! Configuration loading for Argus.
//! Reads argus.toml from the current directory or path in ARGUS_CONFIG env var.
//! `ARGUS_BACKEND_URL` overrides `backend.url`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use argus_dashboard::Variant;

pub const CONFIG_ENV: &str = "ARGUS_CONFIG";
pub const BACKEND_URL_ENV: &str = "ARGUS_BACKEND_URL";
const DEFAULT_CONFIG_PATH: &str = "argus.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            event_buffer: default_event_buffer(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind()         -> String { "127.0.0.1:3001".to_string() }
fn default_event_buffer() -> usize { 256 }
fn default_static_dir()   -> String { concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Overrides the variant's start-search endpoint.
    pub start_search_path: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            start_search_path: None,
        }
    }
}

fn default_backend_url()  -> String { "http://127.0.0.1:5000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// "basic" or "enhanced".
    #[serde(default = "default_variant")]
    pub variant: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { variant: default_variant() }
    }
}

fn default_variant() -> String { "enhanced".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Milliseconds between layout frames pushed to clients.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "default_ticks_per_frame")]
    pub ticks_per_frame: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_ms: default_frame_ms(),
            ticks_per_frame: default_ticks_per_frame(),
        }
    }
}

fn default_width()           -> f64 { 960.0 }
fn default_height()          -> f64 { 600.0 }
fn default_frame_ms()        -> u64 { 50 }
fn default_ticks_per_frame() -> usize { 3 }

impl Config {
    /// Load configuration from argus.toml.
    /// Checks ARGUS_CONFIG env var first, then current directory. A missing
    /// default file yields the built-in defaults; a missing explicit path is an error.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var(CONFIG_ENV).ok();
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else if explicit.is_some() {
            anyhow::bail!("Config file not found: {}", path);
        } else {
            Self::default()
        };

        config.apply_env_overrides(std::env::var(BACKEND_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self, backend_url: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend.url = url;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.variant()?;
        if self.graph.width <= 0.0 || self.graph.height <= 0.0 {
            anyhow::bail!("graph canvas must have a positive size");
        }
        if self.graph.frame_ms == 0 {
            anyhow::bail!("graph.frame_ms must be at least 1");
        }
        Ok(())
    }

    pub fn variant(&self) -> anyhow::Result<Variant> {
        Variant::parse(&self.dashboard.variant)
            .ok_or_else(|| anyhow::anyhow!("unknown dashboard variant: {}", self.dashboard.variant))
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.graph.frame_ms)
    }

    /// Explicit override, else the variant's endpoint.
    pub fn start_search_path(&self) -> anyhow::Result<String> {
        Ok(match &self.backend.start_search_path {
            Some(p) => p.clone(),
            None => self.variant()?.start_search_path().to_string(),
        })
    }
}
