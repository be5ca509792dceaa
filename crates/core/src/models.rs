//! Domain model types used throughout the agent.
//!
//! These types bridge the configuration layer, the content pipeline, and the
//! mail dispatcher.

use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

// ---------------------------------------------------------------------------
// Email payload
// ---------------------------------------------------------------------------

/// A fully rendered digest email, produced once per run by the content
/// pipeline. All three fields are required and treated as final content; no
/// templating happens downstream of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPayload {
    /// Subject line.
    pub subject: String,
    /// HTML alternative body.
    pub html_body: String,
    /// Plain-text alternative body.
    pub text_body: String,
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// A configured digest recipient.
///
/// Address syntax is validated when the dispatcher is constructed, not at
/// deserialization time. Duplicate addresses are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address.
    pub email: String,
    /// Display name used in the `To` header.
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Dispatch outcome
// ---------------------------------------------------------------------------

/// Per-recipient outcome of one dispatch call.
///
/// A recipient appears in exactly one of the two lists. Session-level
/// failures never produce a report; they surface as
/// [`SessionError`](crate::errors::SessionError) instead.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Addresses the session accepted the message for.
    pub delivered: Vec<String>,
    /// Recipients the session rejected, with the individual error.
    pub failed: Vec<(String, DeliveryError)>,
}

impl DispatchReport {
    /// Number of recipients attempted.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// Whether every attempted recipient was delivered to.
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}
