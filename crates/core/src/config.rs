//! TOML-based configuration system for the AI news agent.
//!
//! Sensitive values (the SMTP password) are stored as `_env` fields that
//! reference environment variable names. The actual secrets are resolved at
//! runtime via [`AppConfig::resolve_env_vars`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::models::Recipient;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent-wide settings (logging).
    #[serde(default)]
    pub agent: AgentConfig,

    /// Email delivery settings.
    pub email: EmailConfig,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Agent-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for the daily-rolling log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// Email delivery configuration: SMTP endpoint, sender credentials, and the
/// ordered recipient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP endpoint settings.
    #[serde(default)]
    pub smtp: SmtpSettings,

    /// Sender credentials.
    pub credentials: CredentialsConfig,

    /// Digest recipients, in delivery order.
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

/// SMTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// SMTP server hostname.
    #[serde(default = "default_smtp_server")]
    pub server: String,

    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Upgrade the session with STARTTLS before authenticating.
    #[serde(default = "default_true")]
    pub use_tls: bool,
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_true() -> bool {
    true
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            server: default_smtp_server(),
            port: default_smtp_port(),
            use_tls: true,
        }
    }
}

/// Sender account credentials. The password is referenced by environment
/// variable name and resolved at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// SMTP username, also used as the `From` address.
    pub username: String,

    /// Environment variable holding the SMTP password.
    pub password_env: String,

    /// Resolved password (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve all `*_env` fields from environment variables and populate the
    /// corresponding resolved fields.
    ///
    /// A missing variable logs a warning but does **not** fail -- the
    /// dispatcher constructor decides what is required and fails fast there.
    pub fn resolve_env_vars(&mut self) {
        info!("resolving environment variable references in config");

        self.email.credentials.password = resolve_optional_env(
            &self.email.credentials.password_env,
            "email.credentials.password_env",
        );

        debug!("environment variable resolution complete");
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.email.smtp.server.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "email.smtp.server".into(),
                detail: "SMTP server must not be empty".into(),
            });
        }
        if self.email.smtp.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "email.smtp.port".into(),
                detail: "SMTP port must be > 0".into(),
            });
        }
        if self.email.credentials.username.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "email.credentials.username".into(),
                detail: "SMTP username must not be empty".into(),
            });
        }
        if self.email.recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }
        for (i, recipient) in self.email.recipients.iter().enumerate() {
            if recipient.email.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("email.recipients[{}].email", i),
                    detail: "recipient address must not be empty".into(),
                });
            }
        }

        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars();
        config.validate()?;
        Ok(config)
    }
}

/// Try to read an environment variable by name. Returns `Some(value)` on
/// success; logs a warning and returns `None` if the variable is unset.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}
