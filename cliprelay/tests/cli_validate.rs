//! CLI tests for `cliprelay init` and `cliprelay validate`.
//!
//! Spawns the binary and checks exit codes and output. Neither command
//! touches git, the clipboard or the display.

use std::fs;
use std::process::Command;

use cliprelay::io::init::STARTER_CONFIG;

fn cliprelay() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cliprelay"))
}

#[test]
fn init_then_validate_starter_config() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = cliprelay()
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("cliprelay init");
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("config.yaml")).expect("config"),
        STARTER_CONFIG
    );

    let output = cliprelay()
        .current_dir(temp.path())
        .arg("validate")
        .output()
        .expect("cliprelay validate");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("repo: chat-bridge"));
    assert!(stdout.contains("constant_loop (9 actions):"));
    assert!(stdout.contains("until clipboard contains '<<END>>'"));
}

#[test]
fn init_refuses_to_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("relay.yaml");
    fs::write(&path, "mine").expect("write");

    let output = cliprelay()
        .arg("--config")
        .arg(&path)
        .arg("init")
        .output()
        .expect("cliprelay init");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(fs::read_to_string(&path).expect("read"), "mine");
}

#[test]
fn validate_rejects_unknown_action_tag() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.yaml");
    fs::write(
        &path,
        "repo:\n  name: r\n  url: u\n  local_path: l\n  request: a.md\n  response: b.md\n\
         constant_loop:\n  - git_pull: true\n  - double_click: [1, 2]\n",
    )
    .expect("write");

    let output = cliprelay()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .output()
        .expect("cliprelay validate");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("schema validation failed"));
}

#[test]
fn missing_config_exits_with_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let status = cliprelay()
        .current_dir(temp.path())
        .arg("validate")
        .status()
        .expect("cliprelay validate");
    assert_eq!(status.code(), Some(1));
}
