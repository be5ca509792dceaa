//! Interactive setup wizard.
//!
//! Walks the user through the SMTP endpoint, sender credentials, and the
//! first recipient, then writes the resulting TOML configuration file.
//! Secrets stay in the environment; only the variable name is written to the
//! config.

use std::path::Path;

use anyhow::{Context, Result};
use console::Style;
use dialoguer::{Confirm, Input};

use ainews_core::config::{AgentConfig, AppConfig, CredentialsConfig, EmailConfig, SmtpSettings};
use ainews_core::models::Recipient;

/// Run the interactive setup wizard and write the config to `output_path`.
pub fn run_init(output_path: &Path) -> Result<()> {
    // Guard against overwriting an existing file.
    if output_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!(
                "{} already exists. Overwrite?",
                output_path.display()
            ))
            .default(false)
            .interact()
            .context("failed to read confirmation")?;

        if !overwrite {
            println!("Init cancelled. Existing file was not modified.");
            return Ok(());
        }
    }

    let accent = Style::new().cyan().bold();
    println!();
    println!("{}", accent.apply_to("=== AI News Agent Setup Wizard ==="));
    println!();
    println!("This wizard creates the agent configuration file.");
    println!("For Gmail you need an App Password, not your regular password.");
    println!();

    // -----------------------------------------------------------------
    // 1. SMTP endpoint
    // -----------------------------------------------------------------
    println!("{}", accent.apply_to("1/3  SMTP Server"));
    println!();

    let server: String = Input::new()
        .with_prompt("SMTP server")
        .default("smtp.gmail.com".into())
        .interact_text()
        .context("failed to read SMTP server")?;

    let port: u16 = Input::new()
        .with_prompt("SMTP port")
        .default(587)
        .interact_text()
        .context("failed to read SMTP port")?;

    let use_tls = Confirm::new()
        .with_prompt("Upgrade the connection with STARTTLS?")
        .default(true)
        .interact()
        .context("failed to read STARTTLS preference")?;

    println!();

    // -----------------------------------------------------------------
    // 2. Sender account
    // -----------------------------------------------------------------
    println!("{}", accent.apply_to("2/3  Sender Account"));
    println!();

    let username: String = Input::new()
        .with_prompt("SMTP username (also the From address)")
        .interact_text()
        .context("failed to read SMTP username")?;

    let password_env: String = Input::new()
        .with_prompt("Environment variable that holds the SMTP password")
        .default("AINEWS_SMTP_PASSWORD".into())
        .interact_text()
        .context("failed to read password env var name")?;

    println!();

    // -----------------------------------------------------------------
    // 3. First recipient
    // -----------------------------------------------------------------
    println!("{}", accent.apply_to("3/3  First Recipient"));
    println!();

    let email: String = Input::new()
        .with_prompt("Recipient email address")
        .interact_text()
        .context("failed to read recipient address")?;

    let name: String = Input::new()
        .with_prompt("Recipient name (optional)")
        .allow_empty(true)
        .interact_text()
        .context("failed to read recipient name")?;
    let name = if name.trim().is_empty() {
        None
    } else {
        Some(name.trim().to_string())
    };

    let config = AppConfig {
        agent: AgentConfig::default(),
        email: EmailConfig {
            smtp: SmtpSettings {
                server,
                port,
                use_tls,
            },
            credentials: CredentialsConfig {
                username,
                password_env: password_env.clone(),
                password: None,
            },
            recipients: vec![Recipient { email, name }],
        },
    };

    let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    std::fs::write(output_path, rendered).context("failed to write config file")?;

    println!();
    println!("Configuration written to {}", output_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Export the SMTP password: export {}=...", password_env);
    println!(
        "  2. Validate with: ainews validate --config {}",
        output_path.display()
    );
    println!(
        "  3. Send a test digest: ainews send-test --config {}",
        output_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_config_round_trips_through_toml() {
        let config = AppConfig {
            agent: AgentConfig::default(),
            email: EmailConfig {
                smtp: SmtpSettings {
                    server: "smtp.example.com".into(),
                    port: 587,
                    use_tls: true,
                },
                credentials: CredentialsConfig {
                    username: "bot@example.com".into(),
                    password_env: "AINEWS_SMTP_PASSWORD".into(),
                    password: Some("never-written".into()),
                },
                recipients: vec![Recipient {
                    email: "a@x.com".into(),
                    name: None,
                }],
            },
        };

        let rendered = toml::to_string_pretty(&config).expect("failed to render");
        let parsed: AppConfig = toml::from_str(&rendered).expect("failed to parse back");

        assert_eq!(parsed.email.smtp.server, "smtp.example.com");
        assert_eq!(parsed.email.credentials.password_env, "AINEWS_SMTP_PASSWORD");
        // The resolved secret is never serialized.
        assert!(parsed.email.credentials.password.is_none());
        assert!(!rendered.contains("never-written"));
        assert!(parsed.email.recipients[0].name.is_none());
    }
}
