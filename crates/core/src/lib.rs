//! AI news agent core library.
//!
//! This crate provides the foundational components for the daily digest
//! agent: configuration loading, the data model for rendered digests, and
//! the SMTP mail dispatcher that delivers them. Content production (scraping
//! and summarization) lives outside this crate; callers hand the dispatcher
//! a finished [`models::EmailPayload`].

pub mod config;
pub mod errors;
pub mod mail;
pub mod models;

// Re-exports for convenience.
pub use config::AppConfig;
pub use mail::MailDispatcher;
pub use models::{DispatchReport, EmailPayload, Recipient};
