//! Configuration resolution for tracknest
//!
//! Each setting resolves environment variable → `tracknest.toml` in the
//! working directory → hardcoded default, in that priority order. The chosen
//! source is logged at startup so a misconfigured deployment is visible in
//! the first few log lines.

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://tracknest.db?mode=rwc";
/// Known weak placeholder. Fine for local development, never for a real
/// deployment; startup warns whenever it is in use.
pub const DEFAULT_SESSION_SECRET: &str = "dev-session-secret";

const CONFIG_FILE: &str = "tracknest.toml";

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (loopback bind)
    pub port: u16,
    /// Persistent-store connection string
    pub database_url: String,
    /// Session-signing secret
    pub session_secret: String,
}

/// Optional `tracknest.toml` contents
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    database_url: Option<String>,
    session_secret: Option<String>,
}

/// Environment variable overrides
#[derive(Debug, Default)]
struct EnvConfig {
    port: Option<u16>,
    database_url: Option<String>,
    session_secret: Option<String>,
}

impl Config {
    /// Load configuration from the process environment and the optional
    /// config file.
    pub fn load() -> Self {
        let env = EnvConfig {
            port: read_port_env(),
            database_url: std::env::var("DATABASE_URL").ok(),
            session_secret: std::env::var("SESSION_SECRET").ok(),
        };

        let file = read_config_file();

        resolve(env, file)
    }
}

fn read_port_env() -> Option<u16> {
    let raw = std::env::var("TRACKNEST_PORT").ok()?;
    match raw.parse::<u16>() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!("Ignoring TRACKNEST_PORT={:?} (not a valid port)", raw);
            None
        }
    }
}

fn read_config_file() -> FileConfig {
    let content = match std::fs::read_to_string(CONFIG_FILE) {
        Ok(content) => content,
        Err(_) => return FileConfig::default(),
    };

    match toml::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
            FileConfig::default()
        }
    }
}

/// Merge the tiers. Environment wins over file, file wins over default.
fn resolve(env: EnvConfig, file: FileConfig) -> Config {
    let (port, source) = pick(env.port, file.port, DEFAULT_PORT);
    info!("Port {} ({})", port, source);

    let (database_url, source) =
        pick(env.database_url, file.database_url, DEFAULT_DATABASE_URL.to_string());
    info!("Database URL {:?} ({})", database_url, source);

    let (session_secret, source) = pick(
        env.session_secret,
        file.session_secret,
        DEFAULT_SESSION_SECRET.to_string(),
    );
    info!("Session secret ({})", source);

    if session_secret == DEFAULT_SESSION_SECRET {
        warn!("Using the built-in session secret; set SESSION_SECRET before deploying");
    }

    Config {
        port,
        database_url,
        session_secret,
    }
}

fn pick<T>(env: Option<T>, file: Option<T>, default: T) -> (T, &'static str) {
    if let Some(value) = env {
        (value, "environment")
    } else if let Some(value) = file {
        (value, CONFIG_FILE)
    } else {
        (default, "default")
    }
}
