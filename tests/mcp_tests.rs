// tests/mcp_tests.rs - tool-server client against scripted fake servers

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::json;

use logbench::mcp::{call_tool, McpError, Phase};

fn fake_server(dir: &tempfile::TempDir, script: &str) -> PathBuf {
    let path = dir.path().join("server.sh");
    fs::write(&path, format!("#!/bin/sh\n{}", script)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn test_happy_path_exchange() {
    let dir = tempfile::tempdir().unwrap();
    // Checks each incoming message before answering; any unexpected
    // message makes the script exit, which fails the test.
    let server = fake_server(
        &dir,
        r#"read -r line
case "$line" in
  *'"method":"initialize"'*) printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05"}}' ;;
  *) exit 1 ;;
esac
read -r line
case "$line" in
  *'"method":"notifications/initialized"'*) ;;
  *) exit 1 ;;
esac
read -r line
case "$line" in
  *'"method":"tools/call"'*'"name":"analyze"'*) printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"status":"ok"}}' ;;
  *) exit 1 ;;
esac
"#,
    );

    let outcome = call_tool(
        &server,
        "analyze",
        &json!({"file": "access.log"}),
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(outcome.response["id"], 2);
    assert_eq!(outcome.response["result"]["status"], "ok");
    assert!(outcome.elapsed > Duration::ZERO);
}

#[test]
fn test_server_that_exits_without_replying() {
    let dir = tempfile::tempdir().unwrap();
    let server = fake_server(&dir, "read -r line\nexit 0\n");

    let err = call_tool(&server, "analyze", &json!({}), Duration::from_secs(5)).unwrap_err();
    assert!(matches!(
        err,
        McpError::ServerClosed {
            phase: Phase::Initialize
        }
    ));
}

#[test]
fn test_server_that_dies_before_the_tool_response() {
    let dir = tempfile::tempdir().unwrap();
    let server = fake_server(
        &dir,
        r#"read -r line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{}}'
read -r line
read -r line
exit 0
"#,
    );

    let err = call_tool(&server, "analyze", &json!({}), Duration::from_secs(5)).unwrap_err();
    assert!(matches!(
        err,
        McpError::ServerClosed {
            phase: Phase::ToolCall
        }
    ));
}

#[test]
fn test_silent_server_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let server = fake_server(&dir, "read -r line\nexec sleep 30\n");

    let start = Instant::now();
    let err = call_tool(&server, "analyze", &json!({}), Duration::from_millis(300)).unwrap_err();

    assert!(matches!(
        err,
        McpError::Timeout {
            phase: Phase::Initialize,
            ..
        }
    ));
    // The bounded wait must not stretch anywhere near the server's sleep.
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_non_json_reply_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = fake_server(&dir, "read -r line\necho this is not json\n");

    let err = call_tool(&server, "analyze", &json!({}), Duration::from_secs(5)).unwrap_err();
    assert!(matches!(
        err,
        McpError::BadResponse {
            phase: Phase::Initialize,
            ..
        }
    ));
}

#[test]
fn test_unlaunchable_server_reports_spawn_failure() {
    let err = call_tool(
        Path::new("/no/such/tool-server"),
        "analyze",
        &json!({}),
        Duration::from_secs(5),
    )
    .unwrap_err();
    assert!(matches!(err, McpError::Spawn { .. }));
    assert!(err.to_string().contains("/no/such/tool-server"));
}
