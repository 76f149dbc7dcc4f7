//! Configuration management for crease.
//!
//! Settings are resolved in layers: built-in defaults, then an optional TOML
//! file, then environment variables (after `.env` has been loaded), and
//! finally any CLI overrides applied by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::util::redact_url_password;
use crate::repository::DbContext;

/// Default upstream origin.
pub const DEFAULT_BASE_URL: &str = "https://www.cricbuzz.com";

/// Default database filename inside the data directory.
const DEFAULT_DATABASE_FILENAME: &str = "crease.db";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "crease.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Application settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database URL; defaults to a SQLite file in `data_dir`.
    pub database_url: Option<String>,
    /// Secret for the web collaborator's sessions. Never logged.
    pub session_secret: Option<String>,
    /// Enables info-level logging.
    pub debug: bool,
    /// Upstream origin.
    pub base_url: String,
    /// Per-attempt HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Attempts per fetch.
    pub fetch_retries: u32,
    /// Delay between fetch attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// Lower bound of the pause between dependent fetches.
    pub pause_min_ms: u64,
    /// Upper bound of the pause between dependent fetches.
    pub pause_max_ms: u64,
    /// Profile scrapes commit after this many players.
    pub profile_commit_every: usize,
    /// How often the daemon re-reads schedule settings.
    pub settings_poll_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            database_url: None,
            session_secret: None,
            debug: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            fetch_retries: 3,
            retry_delay_ms: 1000,
            pause_min_ms: 300,
            pause_max_ms: 500,
            profile_commit_every: 10,
            settings_poll_secs: 60,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("data_dir", &self.data_dir)
            .field("database_url", &redact_url_password(&self.database_url()))
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "***"),
            )
            .field("debug", &self.debug)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("fetch_retries", &self.fetch_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("pause_min_ms", &self.pause_min_ms)
            .field("pause_max_ms", &self.pause_max_ms)
            .field("profile_commit_every", &self.profile_commit_every)
            .field("settings_poll_secs", &self.settings_poll_secs)
            .finish()
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from the data directory if not set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            let path = self.data_dir.join(DEFAULT_DATABASE_FILENAME);
            format!("sqlite:{}", path.display())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settings_poll_interval(&self) -> Duration {
        Duration::from_secs(self.settings_poll_secs.max(1))
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    /// Open a database context for the configured database.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }

    /// Apply values from a parsed config file.
    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.data_dir {
            self.data_dir = v;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if file.session_secret.is_some() {
            self.session_secret = file.session_secret;
        }
        if let Some(v) = file.debug {
            self.debug = v;
        }
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.fetch_retries {
            self.fetch_retries = v.max(1);
        }
        if let Some(v) = file.retry_delay_ms {
            self.retry_delay_ms = v;
        }
        if let Some(v) = file.pause_min_ms {
            self.pause_min_ms = v;
        }
        if let Some(v) = file.pause_max_ms {
            self.pause_max_ms = v;
        }
        if let Some(v) = file.profile_commit_every {
            self.profile_commit_every = v.max(1);
        }
        if let Some(v) = file.settings_poll_secs {
            self.settings_poll_secs = v;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = env_nonempty("CREASE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = env_nonempty("DATABASE_URL") {
            tracing::debug!(
                "Using DATABASE_URL from environment: {}",
                redact_url_password(&url)
            );
            self.database_url = Some(url);
        }
        if let Some(secret) = env_nonempty("SESSION_SECRET") {
            self.session_secret = Some(secret);
        }
        if debug_from_env() {
            self.debug = true;
        }
        if let Some(url) = env_nonempty("CREASE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = env_nonempty("CREASE_FETCH_RETRIES") {
            let retries: u32 = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "CREASE_FETCH_RETRIES",
                value: raw.clone(),
            })?;
            self.fetch_retries = retries.max(1);
        }
        Ok(())
    }
}

/// Optional settings read from a TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    database_url: Option<String>,
    session_secret: Option<String>,
    debug: Option<bool>,
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    fetch_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    pause_min_ms: Option<u64>,
    pause_max_ms: Option<u64>,
    profile_commit_every: Option<usize>,
    settings_poll_secs: Option<u64>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Whether `FLASK_DEBUG` or `CREASE_DEBUG` is set to a truthy value.
pub fn debug_from_env() -> bool {
    ["FLASK_DEBUG", "CREASE_DEBUG"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .any(|v| is_truthy(&v))
}

/// Read a TOML config file.
fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve settings from defaults, config file and environment.
///
/// An explicit `config_path` must exist; otherwise `crease.toml` in the
/// working directory is used when present.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let file = match config_path {
        Some(path) => Some(read_file_config(path)?),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Some(read_file_config(default_path)?)
            } else {
                None
            }
        }
    };
    if let Some(file) = file {
        settings.apply_file(file);
    }

    settings.apply_env()?;

    if settings.pause_max_ms < settings.pause_min_ms {
        settings.pause_max_ms = settings.pause_min_ms;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_url() {
        let settings = Settings::with_data_dir(PathBuf::from("/tmp/crease"));
        assert_eq!(settings.database_url(), "sqlite:/tmp/crease/crease.db");
    }

    #[test]
    fn test_file_config_applies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crease.toml");
        fs::write(
            &path,
            r#"
base_url = "http://localhost:8080"
fetch_retries = 0
pause_min_ms = 10
pause_max_ms = 20
"#,
        )
        .unwrap();

        let file = read_file_config(&path).unwrap();
        let mut settings = Settings::default();
        settings.apply_file(file);
        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.fetch_retries, 1);
        assert_eq!(settings.pause_min_ms, 10);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "no_such_key = 1\n").unwrap();
        assert!(matches!(
            read_file_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("True"));
        assert!(is_truthy(" yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let settings = Settings {
            session_secret: Some("hunter2".into()),
            ..Default::default()
        };
        let out = format!("{:?}", settings);
        assert!(!out.contains("hunter2"));
    }
}
