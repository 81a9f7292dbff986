use serde_json::json;
use serial_test::serial;
use splunk_log_stream::app::{Cli, ForwardSummary, forward_lines};
use splunk_log_stream::{ConfigError, Level, Protocol, SplunkStream, StreamConfig};
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method},
};

const ENV_VARS: &[&str] = &[
    "SPLUNK_TOKEN",
    "SPLUNK_HOST",
    "SPLUNK_PORT",
    "SPLUNK_PROTOCOL",
    "SPLUNK_LEVEL",
    "SPLUNK_NAME",
    "SPLUNK_PATH",
    "SPLUNK_TIMEOUT_MS",
    "SPLUNK_SOURCE",
    "SPLUNK_SOURCETYPE",
    "SPLUNK_INDEX",
    "SPLUNK_EVENT_HOST",
    "SPLUNK_ACCEPT_INVALID_CERTS",
    "SPLUNK_CONFIG",
    "LOG_LEVEL",
    "LOG_FORMAT",
];

fn clean_env() {
    unsafe {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_token_flag_gives_default_config() {
    clean_env();
    let cli = Cli::from_args(["splunk-log-stream", "--token", "abc"]).unwrap();

    let config = cli.stream_config().unwrap();
    assert_eq!(config, StreamConfig::new("abc"));
    assert_eq!(cli.log_level, Level::Warn);
}

#[test]
#[serial]
fn test_missing_token_is_rejected() {
    clean_env();
    let cli = Cli::from_args(["splunk-log-stream"]).unwrap();

    assert!(matches!(cli.stream_config(), Err(ConfigError::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_env_vars_fill_config() {
    clean_env();
    unsafe {
        env::set_var("SPLUNK_TOKEN", "from-env");
        env::set_var("SPLUNK_HOST", "splunk.internal");
        env::set_var("SPLUNK_PORT", "9088");
        env::set_var("SPLUNK_PROTOCOL", "http");
        env::set_var("SPLUNK_SOURCETYPE", "_json");
    }

    let config = Cli::from_args(["splunk-log-stream"])
        .unwrap()
        .stream_config()
        .unwrap();
    clean_env();

    assert_eq!(config.token, "from-env");
    assert_eq!(config.host, "splunk.internal");
    assert_eq!(config.port, 9088);
    assert_eq!(config.protocol, Protocol::Http);
    assert_eq!(config.sourcetype.as_deref(), Some("_json"));
}

#[test]
#[serial]
fn test_flags_override_config_file() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
token = "file-token"
host = "file-host"
port = 1234
level = "error"
index = "main"
"#
    )
    .unwrap();

    let cli = Cli::from_args([
        "splunk-log-stream",
        "--config",
        file.path().to_str().unwrap(),
        "--port",
        "4321",
        "--level",
        "debug",
    ])
    .unwrap();
    let config = cli.stream_config().unwrap();

    assert_eq!(config.token, "file-token");
    assert_eq!(config.host, "file-host");
    assert_eq!(config.port, 4321);
    assert_eq!(config.level, Level::Debug);
    assert_eq!(config.index.as_deref(), Some("main"));
}

#[test]
#[serial]
fn test_token_flag_completes_config_file_without_token() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host = "file-host"
index = "main"
"#
    )
    .unwrap();

    let cli = Cli::from_args([
        "splunk-log-stream",
        "--config",
        file.path().to_str().unwrap(),
        "--token",
        "abc",
    ])
    .unwrap();
    let config = cli.stream_config().unwrap();

    assert_eq!(config.token, "abc");
    assert_eq!(config.host, "file-host");
    assert_eq!(config.index.as_deref(), Some("main"));
}

#[test]
#[serial]
fn test_env_token_completes_config_file_without_token() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"host = "file-host""#).unwrap();
    unsafe {
        env::set_var("SPLUNK_TOKEN", "from-env");
    }

    let result = Cli::from_args(["splunk-log-stream", "--config", file.path().to_str().unwrap()])
        .unwrap()
        .stream_config();
    clean_env();

    let config = result.unwrap();
    assert_eq!(config.token, "from-env");
    assert_eq!(config.host, "file-host");
}

#[test]
#[serial]
fn test_flag_corrects_invalid_file_value() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
token = "t"
port = 0
"#
    )
    .unwrap();

    let cli = Cli::from_args([
        "splunk-log-stream",
        "--config",
        file.path().to_str().unwrap(),
        "--port",
        "9000",
    ])
    .unwrap();
    let config = cli.stream_config().unwrap();

    assert_eq!(config.token, "t");
    assert_eq!(config.port, 9000);
}

#[test]
#[serial]
fn test_invalid_file_value_without_override_is_rejected() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
token = "t"
port = 0
"#
    )
    .unwrap();

    let cli = Cli::from_args(["splunk-log-stream", "--config", file.path().to_str().unwrap()])
        .unwrap();

    assert!(matches!(cli.stream_config(), Err(ConfigError::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_config_file_without_any_token_is_rejected() {
    clean_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"host = "file-host""#).unwrap();

    let cli = Cli::from_args(["splunk-log-stream", "--config", file.path().to_str().unwrap()])
        .unwrap();

    assert!(matches!(cli.stream_config(), Err(ConfigError::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_unreadable_config_file() {
    clean_env();
    let cli = Cli::from_args([
        "splunk-log-stream",
        "--config",
        "/definitely/not/here.toml",
    ])
    .unwrap();

    assert!(matches!(cli.stream_config(), Err(ConfigError::FileError(_))));
}

#[tokio::test]
async fn test_forward_lines_sends_one_event_per_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Splunk good"))
        .and(body_partial_json(json!({"event": {"message": {"msg": "plain text line"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Success", "code": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("authorization", "Splunk good"))
        .and(body_partial_json(json!({
            "event": {"message": {"msg": "structured", "user": "ada"}, "severity": "warn"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Success", "code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let stream = SplunkStream::new(StreamConfig {
        protocol: Protocol::Http,
        host: server.address().ip().to_string(),
        port: server.address().port(),
        ..StreamConfig::new("good")
    })
    .unwrap();

    let input = "plain text line\n\n{\"msg\":\"structured\",\"user\":\"ada\",\"level\":40}\n";
    let summary = forward_lines(&stream, input.as_bytes()).await.unwrap();

    assert_eq!(
        summary,
        ForwardSummary {
            lines: 3,
            skipped: 1,
            accepted: 2,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn test_forward_lines_counts_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"text": "Invalid token", "code": 4})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let stream = SplunkStream::new(StreamConfig {
        protocol: Protocol::Http,
        host: server.address().ip().to_string(),
        port: server.address().port(),
        ..StreamConfig::new("bad-token")
    })
    .unwrap();
    let errors = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    {
        let errors = std::sync::Arc::clone(&errors);
        stream.on_error(move |err, _| {
            assert_eq!(err.code(), Some(4));
            errors.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
    }

    let summary = forward_lines(&stream, "one\ntwo\n".as_bytes()).await.unwrap();

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.accepted, 0);
    assert_eq!(errors.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_forward_lines_skips_records_below_level() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"event": {"message": {"msg": "debug detail"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Success", "code": 0})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Success", "code": 0})))
        .expect(2)
        .mount(&server)
        .await;

    let stream = SplunkStream::new(StreamConfig {
        protocol: Protocol::Http,
        host: server.address().ip().to_string(),
        port: server.address().port(),
        level: Level::Info,
        ..StreamConfig::new("good")
    })
    .unwrap();

    let input = concat!(
        "{\"msg\":\"debug detail\",\"level\":20}\n",
        "{\"msg\":\"worth keeping\",\"level\":30}\n",
        "no level at all\n",
    );
    let summary = forward_lines(&stream, input.as_bytes()).await.unwrap();

    assert_eq!(
        summary,
        ForwardSummary {
            lines: 3,
            skipped: 1,
            accepted: 2,
            failed: 0,
        }
    );
}
