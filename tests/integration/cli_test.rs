//! Integration tests for the dsx binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::fixtures_dir;

/// Run dsx with an isolated config file and capture output.
fn run_dsx(args: &[&str], cwd: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_dsx"))
        .args(args)
        .current_dir(cwd)
        .env("DSX_CONFIG", cwd.join("dsx-config.toml"))
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute dsx");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) = run_dsx(&["--help"], dir.path());

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("export"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("completions"));
}

#[test]
fn export_requires_file() {
    let dir = TempDir::new().unwrap();
    let (_stdout, stderr, exit_code) = run_dsx(&["export"], dir.path());

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("<FILE>"));
}

// ============================================================================
// Export Tests
// ============================================================================

#[test]
fn export_writes_templated_json_file() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) = run_dsx(&["export", &fixture("deepseek_chat.html")], dir.path());

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Exported 4 messages (2 user, 2 assistant)"));

    let written: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".json"))
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("deepseek-chat-9c1e7a52-04bd-4f7e-b0a1-3d2c-"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(&written[0])).unwrap()).unwrap();
    assert_eq!(json["messages"].as_array().unwrap().len(), 4);
    assert_eq!(json["messages"][1]["type"], "assistant");
    assert_eq!(json["messages"][1]["hasThinking"], true);
    assert_eq!(json["metadata"]["chatId"], "9c1e7a52-04bd-4f7e-b0a1-3d2c");
}

#[test]
fn export_to_stdout_with_filters() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) = run_dsx(
        &[
            "export",
            &fixture("deepseek_chat.html"),
            "--messages",
            "ai",
            "--no-thinking",
            "--stdout",
        ],
        dir.path(),
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m["type"] == "assistant"));
    assert!(messages.iter().all(|m| m["hasThinking"] == false));
}

#[test]
fn export_markdown_to_explicit_path() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("chat.md");
    let (_stdout, stderr, exit_code) = run_dsx(
        &[
            "export",
            &fixture("deepseek_chat.html"),
            "--format",
            "markdown",
            "--title",
            "Sorting",
            "-o",
            out.to_str().unwrap(),
        ],
        dir.path(),
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("# DeepSeek Chat Export\n\n- **Title:** Sorting\n"));
    assert!(text.contains("### User ("));
    assert!(text.contains("### DeepSeek AI ("));
    assert!(text.contains("> **Thinking Process:**"));
}

#[test]
fn url_flag_sets_chat_id() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) = run_dsx(
        &[
            "export",
            &fixture("content_shape.html"),
            "--url",
            "https://chat.deepseek.com/a/chat/s/beef-01",
            "--stdout",
        ],
        dir.path(),
    );

    assert_eq!(exit_code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["metadata"]["chatId"], "beef-01");
    assert_eq!(json["metadata"]["title"], "Unstyled export");
}

#[test]
fn empty_page_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let (_stdout, stderr, exit_code) = run_dsx(&["export", &fixture("empty.html")], dir.path());

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("No messages found"));
}

#[test]
fn missing_input_names_the_path() {
    let dir = TempDir::new().unwrap();
    AssertCommand::cargo_bin("dsx")
        .unwrap()
        .current_dir(dir.path())
        .env("DSX_CONFIG", dir.path().join("dsx-config.toml"))
        .args(["export", "does-not-exist.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.html"));
}

#[test]
fn configured_defaults_apply() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("dsx-config.toml"),
        "[export]\nformat = \"markdown\"\nfilename_template = \"chat-{chat_id}\"\n",
    )
    .unwrap();

    let (_stdout, stderr, exit_code) = run_dsx(&["export", &fixture("generic_chat.html")], dir.path());

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(dir.path().join("chat-abc123.md").exists());
}

// ============================================================================
// Config and Completions
// ============================================================================

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();

    let (stdout, _stderr, exit_code) = run_dsx(&["config", "init"], dir.path());
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Wrote default config"));
    assert!(dir.path().join("dsx-config.toml").exists());

    let (stdout, _stderr, exit_code) = run_dsx(&["config", "init"], dir.path());
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("already exists"));

    let (stdout, _stderr, exit_code) = run_dsx(&["config", "show"], dir.path());
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("[export]"));
    assert!(stdout.contains("min_content_chars = 10"));
}

#[test]
fn config_path_honors_environment() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) = run_dsx(&["config", "path"], dir.path());

    assert_eq!(exit_code, 0);
    assert!(stdout.trim().ends_with("dsx-config.toml"));
}

#[test]
fn completions_for_bash() {
    AssertCommand::cargo_bin("dsx")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_dsx"));
}
