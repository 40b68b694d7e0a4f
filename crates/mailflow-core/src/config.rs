use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18950;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Cadence of the background due-dispatch scan. Bounds how late a dispatch
/// may fire: with the default a daily dispatch can run up to 5 minutes late.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Top-level config (mailflow.toml + MAILFLOW_* env overrides).
///
/// All schedule arithmetic runs in one fixed zone: UTC. `time_of_day` values
/// are wall-clock UTC times; persisted timestamps are RFC 3339 UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailflowConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

impl Default for MailflowConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            scheduler: SchedulerConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-dispatch scans.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// When set, a dispatch more than this many seconds past its due instant
    /// is no longer selected by the runner. Absent means the due check is an
    /// open-ended `now >= next_due_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_tolerance_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            due_tolerance_secs: None,
        }
    }
}

/// Mail transport selection and SMTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// `"smtp"` for real delivery, `"file"` to write messages to a directory
    /// (development / integration testing).
    #[serde(default = "default_backend")]
    pub backend: MailBackend,
    /// Sender address placed in the From header.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    pub smtp: Option<SmtpConfig>,
    /// Output directory for the file backend.
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::File,
            from_address: default_from_address(),
            smtp: None,
            outbox_dir: default_outbox_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MailBackend {
    Smtp,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_backend() -> MailBackend {
    MailBackend::File
}
fn default_from_address() -> String {
    "mailing.dev@example.com".to_string()
}
fn default_outbox_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mailflow/outbox", home)
}
fn default_smtp_port() -> u16 {
    587
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mailflow/mailflow.db", home)
}

impl MailflowConfig {
    /// Load config from a TOML file with MAILFLOW_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.mailflow/mailflow.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MailflowConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MAILFLOW_").split("_"))
            .extract()
            .map_err(|e| crate::error::MailflowError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mailflow/mailflow.toml", home)
}
