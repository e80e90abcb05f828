use captions_notes::Config;
use std::io::Write;
use tempfile::Builder;

#[test]
fn test_defaults_without_file() {
    let cfg = Config::load("/nonexistent/captions-notes").unwrap();

    assert_eq!(cfg.service.http.port, 8000);
    assert_eq!(cfg.sessions.max_concurrent, 1);
    assert_eq!(cfg.sessions.session_minutes, 40);
    assert_eq!(cfg.sessions.transcript_capacity, 20);
    assert_eq!(cfg.rate_limit.capacity, 10.0);
    assert_eq!(cfg.rate_limit.refill_per_sec, 2.0);
    assert_eq!(cfg.streams.caption_poll_ms, 400);
    assert!(cfg.audio.allow_raw_ingest);
}

#[test]
fn test_file_overrides_only_given_keys() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[sessions]
max_concurrent = 4
inactive_secs = 30

[notes]
model = "llama3"
"#
    )
    .unwrap();

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.sessions.max_concurrent, 4);
    assert_eq!(cfg.sessions.inactive_secs, 30);
    assert_eq!(cfg.sessions.queue_timeout_secs, 600);
    assert_eq!(cfg.notes.model, "llama3");
    assert_eq!(cfg.transcriber.model, "large-v3");
}

#[test]
fn test_invalid_value_is_an_error() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[sessions]\nmax_concurrent = \"many\"").unwrap();

    assert!(Config::load(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_sample_config_loads() {
    let cfg = Config::load("config/captions-notes").unwrap();

    assert_eq!(cfg.service.name, "CaptionsNotes");
    assert_eq!(cfg.service.cors_origins, vec!["http://localhost:5173"]);
    assert_eq!(cfg.notes.max_tokens, 200);
}
