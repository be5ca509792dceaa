//! Mail delivery subsystem.
//!
//! [`MailDispatcher`] owns message construction, per-recipient fan-out, and
//! the SMTP session lifecycle for one dispatch call. Each recipient receives
//! an individually addressed copy of the digest through a single
//! authenticated session; a failed delivery to one recipient never aborts
//! the remaining deliveries.

mod session;

pub use session::{MailSession, SessionFactory, SmtpSessionFactory};

use chrono::Utc;
use lettre::message::{Mailbox, Message, MultiPart};
use tracing::{error, info, warn};

use crate::config::EmailConfig;
use crate::errors::{ConfigError, DeliveryError, SessionError};
use crate::models::{DispatchReport, EmailPayload, Recipient};

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Sends the rendered digest to all configured recipients over SMTP.
///
/// Construction validates the configuration and performs no network I/O.
/// Delivery is synchronous and single-threaded: one session per
/// [`dispatch`](Self::dispatch) call, never shared or reused.
pub struct MailDispatcher {
    from: Mailbox,
    recipients: Vec<Mailbox>,
    factory: Box<dyn SessionFactory>,
}

impl MailDispatcher {
    /// Build a dispatcher from the email configuration, using the real SMTP
    /// transport.
    ///
    /// Fails fast with a [`ConfigError`] if credentials are missing or the
    /// recipient list is empty.
    pub fn from_config(config: &EmailConfig) -> Result<Self, ConfigError> {
        let password = config.credentials.password.as_deref().ok_or_else(|| {
            ConfigError::MissingCredentials(format!(
                "password env var '{}' is not set",
                config.credentials.password_env
            ))
        })?;

        let factory = SmtpSessionFactory::new(
            config.smtp.clone(),
            &config.credentials.username,
            password,
        );
        Self::with_factory(config, Box::new(factory))
    }

    /// Build a dispatcher with an explicit session factory.
    ///
    /// Used by tests and by callers supplying a non-SMTP transport. Applies
    /// the same fail-fast validation as [`from_config`](Self::from_config),
    /// except for the password, which only the SMTP factory needs.
    pub fn with_factory(
        config: &EmailConfig,
        factory: Box<dyn SessionFactory>,
    ) -> Result<Self, ConfigError> {
        if config.credentials.username.is_empty() {
            return Err(ConfigError::MissingCredentials("username is empty".into()));
        }
        if config.recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        let from: Mailbox = config.credentials.username.parse().map_err(
            |e: lettre::address::AddressError| ConfigError::InvalidAddress {
                field: "email.credentials.username".into(),
                address: config.credentials.username.clone(),
                detail: e.to_string(),
            },
        )?;

        let recipients = config
            .recipients
            .iter()
            .map(parse_recipient)
            .collect::<Result<Vec<_>, _>>()?;

        info!(from = %from.email, recipients = recipients.len(), "mail dispatcher initialized");

        Ok(Self {
            from,
            recipients,
            factory,
        })
    }

    /// Deliver `payload` to every configured recipient over one SMTP session.
    ///
    /// Session establishment failures (connect, TLS upgrade, login) abort the
    /// call before any send and are returned as `Err`; in that case no
    /// recipient receives the message. Per-recipient failures are logged,
    /// recorded in the report, and do not stop the remaining deliveries. The
    /// session is closed on every exit path.
    pub fn dispatch(&self, payload: &EmailPayload) -> Result<DispatchReport, SessionError> {
        info!(
            subject = %payload.subject,
            recipients = self.recipients.len(),
            "starting digest dispatch"
        );

        let mut session = match self.factory.open() {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "smtp session establishment failed, no recipients contacted");
                return Err(e);
            }
        };

        let mut report = DispatchReport::default();
        for recipient in &self.recipients {
            let outcome = self
                .build_message(payload, recipient)
                .and_then(|message| session.submit(&message));

            match outcome {
                Ok(()) => {
                    info!(to = %recipient.email, "digest delivered");
                    report.delivered.push(recipient.email.to_string());
                }
                Err(e) => {
                    warn!(to = %recipient.email, error = %e, "delivery failed, continuing");
                    report.failed.push((recipient.email.to_string(), e));
                }
            }
        }
        session.close();

        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "dispatch complete"
        );
        Ok(report)
    }

    /// Exercise the session establishment path (connect, optional TLS
    /// upgrade, login) without sending any message.
    pub fn probe_connection(&self) -> Result<(), SessionError> {
        info!("testing smtp connection");
        let mut session = self.factory.open().map_err(|e| {
            error!(error = %e, "smtp connection test failed");
            e
        })?;
        session.close();
        info!("smtp connection test successful");
        Ok(())
    }

    /// Send a fixed self-test digest through the regular dispatch path,
    /// validating the end-to-end email configuration without the content
    /// pipeline.
    pub fn send_diagnostic(&self) -> Result<DispatchReport, SessionError> {
        self.dispatch(&diagnostic_payload())
    }

    /// Build the individually addressed multipart/alternative message for
    /// one recipient. Both the plain-text and HTML parts are always copied.
    fn build_message(&self, payload: &EmailPayload, to: &Mailbox) -> Result<Message, DeliveryError> {
        Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(payload.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                payload.text_body.clone(),
                payload.html_body.clone(),
            ))
            .map_err(|e| DeliveryError::MessageBuild {
                recipient: to.email.to_string(),
                detail: e.to_string(),
            })
    }
}

fn parse_recipient(recipient: &Recipient) -> Result<Mailbox, ConfigError> {
    let address = recipient.email.parse::<lettre::Address>().map_err(|e| {
        ConfigError::InvalidAddress {
            field: "email.recipients".into(),
            address: recipient.email.clone(),
            detail: e.to_string(),
        }
    })?;
    Ok(Mailbox::new(recipient.name.clone(), address))
}

/// The fixed payload used by [`MailDispatcher::send_diagnostic`].
pub fn diagnostic_payload() -> EmailPayload {
    let generated_at = Utc::now().to_rfc2822();
    EmailPayload {
        subject: "AI News Agent - Test Email".into(),
        html_body: format!(
            "<html><body>\
            <h2>AI News Agent Test</h2>\
            <p>This is a test email to verify that your AI News Agent is configured correctly.</p>\
            <p>If you're receiving this, everything is working properly!</p>\
            <p>Generated at {}</p>\
            </body></html>",
            generated_at
        ),
        text_body: format!(
            "AI News Agent Test\n\n\
             This is a test email to verify that your AI News Agent is configured correctly.\n\n\
             If you're receiving this, everything is working properly!\n\n\
             Generated at {}\n",
            generated_at
        ),
    }
}
