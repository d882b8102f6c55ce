//! Integration tests for the bracket-fetch binary
//!
//! These tests run the compiled binary against a wiremock server and check
//! its exit status and both output streams.

use std::path::Path;
use std::process::{Output, Stdio};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a command for the binary, run from `workdir` so no stray `.env` is picked up
fn bracket_fetch(workdir: &Path, secret: Option<&str>) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bracket-fetch"));
    cmd.current_dir(workdir)
        .arg("--rate-limit-ms")
        .arg("10")
        .env_remove("SECRET")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(secret) = secret {
        cmd.env("SECRET", secret);
    }
    cmd
}

async fn mount_page(mock_server: &MockServer) -> String {
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Hello</title></head><body></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(mock_server)
        .await;

    format!("{}/hello", mock_server.uri())
}

fn stdout_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

fn assert_single_record(output: &Output, url: &str) {
    assert!(
        output.status.success(),
        "exit status {:?}, stderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        output.stderr.is_empty(),
        "unexpected stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let records = stdout_lines(output);
    assert_eq!(records, vec![serde_json::json!({ "url": url, "title": "Hello" })]);
}

#[tokio::test]
async fn test_missing_secret_exits_with_failure() {
    let workdir = TempDir::new().unwrap();

    let output = bracket_fetch(workdir.path(), None)
        .arg("input.txt")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SECRET is not set"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_blank_secret_exits_with_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let workdir = TempDir::new().unwrap();
    let input = workdir.path().join("input.txt");
    std::fs::write(&input, format!("[ {}/hello ]", mock_server.uri())).unwrap();

    let output = bracket_fetch(workdir.path(), Some("   "))
        .arg(&input)
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SECRET is not set"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_file_argument() {
    let mock_server = MockServer::start().await;
    let url = mount_page(&mock_server).await;

    let workdir = TempDir::new().unwrap();
    let input = workdir.path().join("input.txt");
    std::fs::write(&input, format!("read this [ page at {} ] please\n", url)).unwrap();

    let output = bracket_fetch(workdir.path(), Some("secret"))
        .arg(&input)
        .output()
        .await
        .unwrap();

    assert_single_record(&output, &url);
}

#[tokio::test]
async fn test_piped_stdin() {
    let mock_server = MockServer::start().await;
    let url = mount_page(&mock_server).await;

    let workdir = TempDir::new().unwrap();
    let mut child = bracket_fetch(workdir.path(), Some("secret"))
        .stdin(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    stdin
        .write_all(format!("read this [ page at {} ] please\n", url).as_bytes())
        .await
        .unwrap();
    drop(stdin);

    let output = child.wait_with_output().await.unwrap();
    assert_single_record(&output, &url);
}

#[tokio::test]
async fn test_missing_input_file() {
    let workdir = TempDir::new().unwrap();

    let output = bracket_fetch(workdir.path(), Some("secret"))
        .arg("does-not-exist.txt")
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.txt"));
    assert!(output.stdout.is_empty());
}
