use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::availability::{BackendMode, RemoteSettings};

/// Which local durable store backs guest data and remote fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalBackend {
    /// One JSON file per key under a data directory.
    File(PathBuf),
    Redis(String),
    /// Process memory only. Nothing survives a restart.
    Memory,
}

/// Application configuration loaded from environment variables.
/// The remote availability check runs here, once, and is never repeated.
#[derive(Debug, Clone)]
pub struct Config {
    pub remote: Option<RemoteSettings>,
    pub local: LocalBackend,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let remote = RemoteSettings::resolve(
            optional_env("SUPABASE_URL").as_deref(),
            optional_env("SUPABASE_ANON_KEY").as_deref(),
        );

        let local = match optional_env("LOCAL_STORE").as_deref().unwrap_or("file") {
            "file" => LocalBackend::File(PathBuf::from(
                optional_env("LOCAL_DATA_DIR").unwrap_or_else(|| ".resume-analyzer".to_string()),
            )),
            "redis" => LocalBackend::Redis(require_env("REDIS_URL")?),
            "memory" => LocalBackend::Memory,
            other => bail!("LOCAL_STORE must be one of file, redis, memory (got '{other}')"),
        };

        Ok(Config {
            remote,
            local,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn backend_mode(&self) -> BackendMode {
        if self.remote.is_some() {
            BackendMode::Remote
        } else {
            BackendMode::Local
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
