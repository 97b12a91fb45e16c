//! CLI surface tests for the toolagent binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with logs and config lookups redirected into `home`
fn toolagent(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toolagent"));
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("VECTORIZE_ORGANIZATION_ID");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("repl"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("mcp-server").not());
}

#[test]
fn test_tools_with_remote_off() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .args(["--remote", "off", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search_web"))
        .stdout(predicate::str::contains("search_documents").not())
        .stdout(predicate::str::contains("mcp_read_file").not());
}

#[test]
fn test_tools_in_process() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .args(["--remote", "in-process", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcp_read_file"))
        .stdout(predicate::str::contains("[MCP] "));
}

#[test]
fn test_tools_through_server_process() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .args(["--remote", "process", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcp_search_files"))
        .stdout(predicate::str::contains("mcp_file_info"));
}

#[test]
fn test_config_file_selects_mode() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".toolagent.yml"), "remote:\n  mode: in-process\n").unwrap();

    toolagent(&home)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcp_list_directory"));
}

#[test]
fn test_ask_requires_api_key() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .env_remove("OPENAI_API_KEY")
        .args(["--remote", "off", "ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_mcp_server_answers_initialize() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .args(["mcp-server", "--base-dir"])
        .arg(home.path())
        .write_stdin("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"protocolVersion\""))
        .stdout(predicate::str::contains("\"filesystem\""));
}

#[test]
fn test_mcp_server_rejects_missing_base_dir() {
    let home = TempDir::new().unwrap();
    toolagent(&home)
        .args(["mcp-server", "--base-dir"])
        .arg(home.path().join("missing"))
        .write_stdin("")
        .assert()
        .failure();
}
