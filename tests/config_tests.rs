// Integration tests for configuration loading

use anyhow::Result;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use voicemail_ivr::dialogue::PromptMode;
use voicemail_ivr::Config;

#[test]
fn test_missing_file_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("absent");

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.service.name, "voicemail-ivr");
    assert_eq!(cfg.nats.turn_subject_prefix, "ivr.turn");
    assert_eq!(cfg.nats.result_subject_prefix, "ivr.result");
    assert_eq!(cfg.dialogue.max_login_attempts, 3);
    assert_eq!(cfg.dialogue.turn_grace_ms, 5_000);
    assert_eq!(cfg.dialogue.valid_username, "4069");
    assert_eq!(cfg.dialogue.valid_password, "6522");
    assert_eq!(cfg.prompts.mode, PromptMode::Synthesis);
    assert_eq!(cfg.prompts.caller_attribute, "callerId");
    assert!(cfg.prompts.instrumented_callers.is_empty());

    let retention = cfg.service.http.retention();
    assert_eq!(retention.ttl, Duration::from_secs(600));
    assert_eq!(retention.max_finished, 1000);

    Ok(())
}

#[test]
fn test_load_toml_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("voicemail-ivr.toml");
    fs::write(
        &path,
        r#"
[service]
name = "voicemail-test"

[service.http]
port = 9090

[nats]
url = "nats://nats.internal:4222"

[dialogue]
login_timeout_ms = 8000
max_login_attempts = 5
recording_max_duration_ms = 30000
valid_username = "1000"
valid_password = "2000"

[prompts]
mode = "audio"
base_path = "/srv/prompts"
instrumented_callers = ["sip:nubot"]
"#,
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.service.name, "voicemail-test");
    assert_eq!(cfg.service.http.port, 9090);
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.nats.url, "nats://nats.internal:4222");
    assert_eq!(cfg.nats.turn_subject_prefix, "ivr.turn");
    assert_eq!(cfg.prompts.mode, PromptMode::Audio);
    assert_eq!(cfg.prompts.base_path, "/srv/prompts");
    assert_eq!(cfg.prompts.instrumented_callers, vec!["sip:nubot".to_string()]);

    let settings = cfg.dialogue.settings();
    assert_eq!(settings.login_timeout, Duration::from_secs(8));
    assert_eq!(settings.default_timeout, Duration::from_secs(5));
    assert_eq!(settings.max_login_attempts, 5);
    assert_eq!(settings.recording.max_duration, Duration::from_secs(30));

    let services = cfg.dialogue.services();
    assert!(services.credentials.validate("1000", "2000"));
    assert!(!services.credentials.validate("4069", "6522"));
    assert_eq!(services.dial_out.resolve("1234").as_deref(), Some("tel:1234"));

    Ok(())
}

#[test]
fn test_invalid_value_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[prompts]\nmode = \"video\"\n")?;

    assert!(Config::load(path.to_str().unwrap()).is_err());

    Ok(())
}
