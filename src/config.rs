use anyhow::{Context, ensure};
use serde::Deserialize;

use crate::http::parser::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEAD_BYTES};

pub const DEFAULT_CONFIG_PATH: &str = "courier.yaml";

/// Top-level configuration, read from YAML. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Size of the connection worker pool.
    pub workers: usize,
    pub read_timeout_ms: u64,
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9999".to_string(),
            workers: 64,
            read_timeout_ms: 10_000,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Files served with `GET`, each under its own request path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory the request paths are resolved against.
    pub root: String,
    pub paths: Vec<String>,
    /// Paths rendered as templates (`{time}` is substituted) instead of
    /// copied verbatim.
    pub templates: Vec<String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        let paths = [
            "/index.html",
            "/spring.svg",
            "/spring.png",
            "/resources.html",
            "/styles.css",
            "/app.js",
            "/links.html",
            "/forms.html",
            "/classic.html",
            "/events.html",
            "/events.js",
        ];

        Self {
            root: "./public".to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            templates: vec!["/classic.html".to_string()],
        }
    }
}

impl Config {
    /// Loads the file named by `COURIER_CONFIG` (default `courier.yaml`).
    ///
    /// A missing file yields the defaults. `LISTEN` overrides the listen
    /// address either way.
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("COURIER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut cfg = match std::fs::read_to_string(&path) {
            Ok(text) => {
                Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config file {}", path));
            }
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.server.workers > 0, "server.workers must be at least 1");
        ensure!(
            self.server.read_timeout_ms > 0,
            "server.read_timeout_ms must be positive"
        );

        for path in self.static_files.paths.iter().chain(&self.static_files.templates) {
            ensure!(
                path.starts_with('/'),
                "static file path {:?} must start with '/'",
                path
            );
        }

        Ok(())
    }
}
