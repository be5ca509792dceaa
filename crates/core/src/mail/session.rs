//! SMTP session establishment and the transport seam.
//!
//! The dispatcher talks to the mail server through the [`SessionFactory`] /
//! [`MailSession`] traits so that tests can substitute a fake transport. The
//! production implementation drives `lettre`'s blocking SMTP client through
//! the full session lifecycle: connect, optional STARTTLS upgrade,
//! authenticate, send, quit.

use std::time::Duration;

use lettre::message::Message;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use tracing::debug;

use crate::config::SmtpSettings;
use crate::errors::{DeliveryError, SessionError};

/// Connect timeout matching lettre's transport default.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// An open, authenticated mail session.
///
/// Scoped to one dispatch call; the dispatcher guarantees `close` is called
/// exactly once on every exit path and never reuses a session.
pub trait MailSession {
    /// Submit one fully built, individually addressed message.
    fn submit(&mut self, message: &Message) -> Result<(), DeliveryError>;

    /// Terminate the session. Errors during termination are logged, not
    /// surfaced.
    fn close(&mut self);
}

/// Opens authenticated mail sessions.
///
/// `open` performs the whole establishment sequence; any failure within it
/// leaves no session behind.
pub trait SessionFactory {
    fn open(&self) -> Result<Box<dyn MailSession>, SessionError>;
}

// ---------------------------------------------------------------------------
// SMTP implementation
// ---------------------------------------------------------------------------

/// Production [`SessionFactory`] backed by `lettre`'s blocking SMTP client.
///
/// Constructing the factory performs no network I/O; the connection is made
/// per [`open`](SessionFactory::open) call.
pub struct SmtpSessionFactory {
    smtp: SmtpSettings,
    username: String,
    credentials: Credentials,
}

impl SmtpSessionFactory {
    pub fn new(smtp: SmtpSettings, username: &str, password: &str) -> Self {
        Self {
            smtp,
            username: username.to_string(),
            credentials: Credentials::new(username.to_string(), password.to_string()),
        }
    }
}

impl SessionFactory for SmtpSessionFactory {
    fn open(&self) -> Result<Box<dyn MailSession>, SessionError> {
        debug!(server = %self.smtp.server, port = self.smtp.port, "connecting to smtp server");

        let hello = ClientId::default();
        let mut conn = SmtpConnection::connect(
            (self.smtp.server.as_str(), self.smtp.port),
            Some(CONNECT_TIMEOUT),
            &hello,
            None,
            None,
        )
        .map_err(|e| SessionError::Connect {
            server: self.smtp.server.clone(),
            port: self.smtp.port,
            detail: e.to_string(),
        })?;

        if self.smtp.use_tls {
            let tls = match TlsParameters::new(self.smtp.server.clone()) {
                Ok(tls) => tls,
                Err(e) => {
                    let _ = conn.quit();
                    return Err(SessionError::TlsUpgrade {
                        server: self.smtp.server.clone(),
                        detail: e.to_string(),
                    });
                }
            };
            if let Err(e) = conn.starttls(&tls, &hello) {
                let _ = conn.quit();
                return Err(SessionError::TlsUpgrade {
                    server: self.smtp.server.clone(),
                    detail: e.to_string(),
                });
            }
            debug!("tls upgrade complete");
        }

        if let Err(e) = conn.auth(&[Mechanism::Plain, Mechanism::Login], &self.credentials) {
            let _ = conn.quit();
            return Err(SessionError::AuthenticationFailed {
                username: self.username.clone(),
                detail: e.to_string(),
            });
        }
        debug!("smtp login successful");

        Ok(Box::new(SmtpSession { conn }))
    }
}

/// One live SMTP session.
struct SmtpSession {
    conn: SmtpConnection,
}

impl MailSession for SmtpSession {
    fn submit(&mut self, message: &Message) -> Result<(), DeliveryError> {
        let recipient = message
            .envelope()
            .to()
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();

        self.conn
            .send(message.envelope(), &message.formatted())
            .map(|_| ())
            .map_err(|e| DeliveryError::Rejected {
                recipient,
                detail: e.to_string(),
            })
    }

    fn close(&mut self) {
        if let Err(e) = self.conn.quit() {
            debug!(error = %e, "smtp quit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_construction_does_no_io() {
        // Constructing the factory for an unroutable server must succeed;
        // only `open` touches the network.
        let smtp = SmtpSettings {
            server: "smtp.invalid".into(),
            port: 587,
            use_tls: true,
        };
        let factory = SmtpSessionFactory::new(smtp, "bot@example.com", "secret");
        assert_eq!(factory.username, "bot@example.com");
        assert_eq!(factory.smtp.port, 587);
    }
}
