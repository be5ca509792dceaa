//! Error types for the AI news agent core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type. Delivery errors are deliberately separate from session errors:
//! a failed delivery to one recipient is recoverable, a failed session is not.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation, and from constructing
/// a dispatcher out of an incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing {
        var: String,
        field: String,
    },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// SMTP username or password is missing or empty.
    #[error("email credentials not found in configuration: {0}")]
    MissingCredentials(String),

    /// The recipient list is empty.
    #[error("no email recipients configured")]
    NoRecipients,

    /// An address in the configuration does not parse as an email address.
    #[error("invalid email address '{address}' for '{field}': {detail}")]
    InvalidAddress {
        field: String,
        address: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors establishing or securing an SMTP session.
///
/// Any of these aborts the whole dispatch call before a single message is
/// submitted.
#[derive(Debug, Error)]
pub enum SessionError {
    /// TCP connect or SMTP greeting failed.
    #[error("smtp connect to {server}:{port} failed: {detail}")]
    Connect {
        server: String,
        port: u16,
        detail: String,
    },

    /// STARTTLS negotiation failed.
    #[error("starttls upgrade with {server} failed: {detail}")]
    TlsUpgrade {
        server: String,
        detail: String,
    },

    /// The server rejected the sender credentials.
    #[error("smtp authentication failed for '{username}': {detail}")]
    AuthenticationFailed {
        username: String,
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// Errors delivering to a single recipient within an open session.
///
/// These never abort the batch; the dispatcher records them in the
/// [`DispatchReport`](crate::models::DispatchReport) and continues.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The server rejected the message for this recipient.
    #[error("send to '{recipient}' failed: {detail}")]
    Rejected {
        recipient: String,
        detail: String,
    },

    /// The per-recipient message could not be constructed.
    #[error("failed to build message for '{recipient}': {detail}")]
    MessageBuild {
        recipient: String,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConfigError::NoRecipients;
        assert_eq!(err.to_string(), "no email recipients configured");

        let err = SessionError::Connect {
            server: "smtp.example.com".into(),
            port: 587,
            detail: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "smtp connect to smtp.example.com:587 failed: connection refused"
        );

        let err = SessionError::AuthenticationFailed {
            username: "bot@example.com".into(),
            detail: "535 bad credentials".into(),
        };
        assert!(err.to_string().contains("bot@example.com"));

        let err = DeliveryError::Rejected {
            recipient: "a@x.com".into(),
            detail: "mailbox full".into(),
        };
        assert!(err.to_string().contains("a@x.com"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let cfg_err = ConfigError::NoRecipients;
        let core_err: CoreError = cfg_err.into();
        assert!(matches!(core_err, CoreError::Config(_)));

        let sess_err = SessionError::TlsUpgrade {
            server: "smtp.example.com".into(),
            detail: "handshake failed".into(),
        };
        let core_err: CoreError = sess_err.into();
        assert!(matches!(core_err, CoreError::Session(_)));
    }
}
