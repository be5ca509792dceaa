//! End-to-end test: load a TOML configuration from disk, resolve secrets from
//! the environment, and construct a mail dispatcher from it. No network I/O
//! happens anywhere on this path.

use std::io::Write;
use std::path::PathBuf;

use ainews_core::config::AppConfig;
use ainews_core::errors::ConfigError;
use ainews_core::MailDispatcher;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn loads_config_and_builds_dispatcher() {
    std::env::set_var("E2E_AINEWS_SMTP_PW", "secret");

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[email.smtp]
server = "smtp.example.com"
port = 587
use_tls = true

[email.credentials]
username = "bot@example.com"
password_env = "E2E_AINEWS_SMTP_PW"

[[email.recipients]]
email = "a@x.com"

[[email.recipients]]
email = "b@x.com"
name = "Bob"
"#,
    );

    let config = AppConfig::load_and_resolve(&path).expect("load_and_resolve failed");
    assert_eq!(config.email.credentials.password.as_deref(), Some("secret"));

    MailDispatcher::from_config(&config.email).expect("dispatcher construction failed");

    std::env::remove_var("E2E_AINEWS_SMTP_PW");
}

#[test]
fn rejects_config_without_recipients() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[email.credentials]
username = "bot@example.com"
password_env = "E2E_AINEWS_UNUSED_PW"
"#,
    );

    let result = AppConfig::load_and_resolve(&path);
    assert!(matches!(result, Err(ConfigError::NoRecipients)));
}

#[test]
fn dispatcher_construction_fails_without_password_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[email.credentials]
username = "bot@example.com"
password_env = "E2E_AINEWS_MISSING_PW"

[[email.recipients]]
email = "a@x.com"
"#,
    );

    // The config layer tolerates the unset variable; the dispatcher does not.
    let config = AppConfig::load_and_resolve(&path).expect("load_and_resolve failed");
    let result = MailDispatcher::from_config(&config.email);
    assert!(matches!(result, Err(ConfigError::MissingCredentials(_))));
}
