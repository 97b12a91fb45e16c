//! Integration tests for toolagent
//!
//! These tests verify end-to-end behavior across the tool registry, the
//! remote transports and the invocation loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use toolagent::agent::{FALLBACK_ANSWER, LoopOptions, ToolInvocationLoop};
use toolagent::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Role, ToolCall};
use toolagent::remote::{BASE_DIR_ENV, InProcessTransport, RemoteToolTransport, StdioTransport};
use toolagent::tools::{ToolRegistry, ToolResult, ToolSource};

// =============================================================================
// Helpers
// =============================================================================

/// Completion client that replays a script and records what it was sent
struct ScriptedClient {
    script: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<CompletionResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".to_string())))
    }
}

async fn in_process_source(dir: &TempDir) -> ToolSource {
    let transport = Arc::new(InProcessTransport::new());
    assert!(transport.connect(dir.path()).await);
    ToolSource::LocalPlusRemote(transport)
}

fn text(result: &ToolResult) -> String {
    result.content()
}

// =============================================================================
// Sandbox scenario through the registry
// =============================================================================

#[tokio::test]
async fn test_notes_scenario_through_registry() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let outside = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(outside.path().join("outside.txt"), "secret").unwrap();

    let registry = ToolRegistry::new().with_source(in_process_source(&sandbox).await);

    let written = registry
        .dispatch("mcp_write_file", json!({"file_path": "notes.txt", "content": "hello"}))
        .await;
    assert!(written.success);
    assert!(text(&written).contains("Successfully wrote 5 bytes"));

    let read = registry.dispatch("mcp_read_file", json!({"file_path": "notes.txt"})).await;
    assert_eq!(text(&read), "File: notes.txt\n---\nhello");

    let listed = registry.dispatch("mcp_list_directory", json!({})).await;
    let listing = text(&listed);
    assert!(listing.contains("[FILE] notes.txt (5 bytes)"));
    assert_eq!(listing.matches("[FILE]").count(), 1);

    let searched = registry.dispatch("mcp_search_files", json!({"search_term": "hell"})).await;
    let report = text(&searched);
    assert!(report.contains("notes.txt:"));
    assert!(report.contains("  Line 1: hello"));

    let escaped = format!("../{}/outside.txt", outside.path().file_name().unwrap().to_string_lossy());
    for path in ["../outside.txt", escaped.as_str()] {
        let denied = registry.dispatch("mcp_read_file", json!({"file_path": path})).await;
        assert!(!denied.success);
        assert!(denied.error.unwrap().starts_with("Permission denied"));
    }

    let clobber = registry
        .dispatch("mcp_write_file", json!({"file_path": escaped, "content": "pwned"}))
        .await;
    assert!(!clobber.success);
    assert_eq!(std::fs::read_to_string(outside.path().join("outside.txt")).unwrap(), "secret");
}

#[tokio::test]
async fn test_dispatch_is_total() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let registry = ToolRegistry::new().with_source(in_process_source(&sandbox).await);

    for (name, args) in [
        ("nope", json!({})),
        ("mcp_nope", json!({})),
        ("mcp_read_file", json!({})),
        ("mcp_read_file", json!({"file_path": "missing.txt"})),
        ("mcp_list_directory", json!({"directory_path": "missing"})),
        ("mcp_file_info", json!({"path": 42})),
    ] {
        let result = registry.dispatch(name, args).await;
        assert!(!result.success, "{name} should fail");
        assert!(result.error.is_some());
    }
}

// =============================================================================
// Invocation loop
// =============================================================================

#[tokio::test]
async fn test_loop_runs_file_tools_in_order() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let llm = ScriptedClient::new(vec![
        Ok(CompletionResponse::with_tool_calls(vec![
            ToolCall::new("w", "mcp_write_file", r#"{"file_path":"notes.txt","content":"hello"}"#),
            ToolCall::new("r", "mcp_read_file", r#"{"file_path":"notes.txt"}"#),
        ])),
        Ok(CompletionResponse::text("The file says hello.")),
    ]);

    let agent = ToolInvocationLoop::new(
        llm.clone(),
        ToolRegistry::new(),
        in_process_source(&sandbox).await,
        LoopOptions::default(),
    );

    let transcript = agent.run("Write hello to notes.txt and read it back").await.unwrap();

    assert_eq!(transcript.answer, "The file says hello.");
    assert_eq!(transcript.completions, 2);

    // The read ran after the write, so it saw the content
    let read_result = &transcript.tool_runs[1].result;
    assert!(read_result.success);
    assert!(read_result.content().ends_with("hello"));

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    let offered: Vec<&str> = requests[0].tools.iter().map(|t| t.name()).collect();
    assert_eq!(
        offered,
        vec![
            "mcp_read_file",
            "mcp_write_file",
            "mcp_list_directory",
            "mcp_search_files",
            "mcp_file_info"
        ]
    );
    assert!(requests[0].tools[0].description().starts_with("[MCP] "));
    assert!(requests[1].tools.is_empty());

    let tool_messages: Vec<_> = requests[1].messages.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("w"));
    assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("r"));

    let payload: Value = serde_json::from_str(tool_messages[0].content.as_deref().unwrap()).unwrap();
    assert_eq!(payload["success"], true);
}

#[tokio::test]
async fn test_loop_without_tool_calls_makes_one_completion() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let llm = ScriptedClient::new(vec![Ok(CompletionResponse::text("Hi!"))]);

    let agent = ToolInvocationLoop::new(
        llm.clone(),
        ToolRegistry::new(),
        in_process_source(&sandbox).await,
        LoopOptions::default(),
    );

    let answer = agent.answer("hello").await;
    assert_eq!(answer.text, "Hi!");
    assert!(answer.tool_runs.is_empty());
    assert_eq!(llm.requests().len(), 1);

    // Nothing was written by a tool
    assert_eq!(std::fs::read_dir(sandbox.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_loop_upstream_error_is_apology() {
    let llm = ScriptedClient::new(vec![Err(LlmError::ApiError {
        status: 500,
        message: "boom".to_string(),
    })]);

    let agent = ToolInvocationLoop::new(llm, ToolRegistry::new(), ToolSource::LocalOnly, LoopOptions::default());

    let answer = agent.answer("anything").await;
    assert_eq!(answer.text, FALLBACK_ANSWER);
    assert!(answer.error.unwrap().contains("boom"));
}

#[tokio::test]
async fn test_system_prompt_tracks_source() {
    let llm = ScriptedClient::new(vec![Ok(CompletionResponse::text("ok"))]);
    let agent = ToolInvocationLoop::new(llm.clone(), ToolRegistry::new(), ToolSource::LocalOnly, LoopOptions::default());

    agent.run("hi").await.unwrap();

    let system = llm.requests()[0].messages[0].content.clone().unwrap();
    assert!(!system.contains("mcp_"));
}

// =============================================================================
// Out-of-process transport against the real server
// =============================================================================

fn server_transport() -> StdioTransport {
    StdioTransport::new(
        env!("CARGO_BIN_EXE_toolagent"),
        vec!["mcp-server".to_string()],
        Duration::from_secs(10),
    )
}

#[tokio::test]
async fn test_stdio_transport_round_trip() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(server_transport());

    assert!(transport.connect(sandbox.path()).await, "server should start");
    let names: Vec<String> = transport.tools().iter().map(|d| d.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["read_file", "write_file", "list_directory", "search_files", "file_info"]
    );

    let written = transport
        .invoke("write_file", json!({"file_path": "notes.txt", "content": "hello"}))
        .await;
    assert!(written.success, "{:?}", written.error);
    assert_eq!(std::fs::read_to_string(sandbox.path().join("notes.txt")).unwrap(), "hello");

    let read = transport.invoke("read_file", json!({"file_path": "notes.txt"})).await;
    assert_eq!(read.content(), "File: notes.txt\n---\nhello");

    let denied = transport.invoke("read_file", json!({"file_path": "../outside.txt"})).await;
    assert!(!denied.success);
    assert!(denied.error.unwrap().starts_with("Permission denied"));

    let unknown = transport.invoke("delete_everything", json!({})).await;
    assert!(!unknown.success);

    transport.disconnect().await;
    assert!(!transport.is_connected());
    transport.disconnect().await;
}

#[tokio::test]
async fn test_in_process_and_stdio_agree() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(sandbox.path().join("a.txt"), "alpha\nbeta").unwrap();
    std::fs::write(sandbox.path().join("b.txt"), "  gamma\n\n").unwrap();

    let stdio = server_transport();
    let in_process = InProcessTransport::new();
    assert!(stdio.connect(sandbox.path()).await);
    assert!(in_process.connect(sandbox.path()).await);

    assert_eq!(stdio.tools(), in_process.tools());

    for (name, args) in [
        ("read_file", json!({"file_path": "a.txt"})),
        ("read_file", json!({"file_path": "b.txt"})),
        ("list_directory", json!({"directory_path": "."})),
        ("search_files", json!({"search_term": "BETA"})),
        ("read_file", json!({"file_path": "missing.txt"})),
    ] {
        let remote = stdio.invoke(name, args.clone()).await;
        let local = in_process.invoke(name, args).await;
        assert_eq!(remote.success, local.success, "{name}");
        assert_eq!(remote.content(), local.content(), "{name}");
    }

    stdio.disconnect().await;
    in_process.disconnect().await;
}

#[tokio::test]
async fn test_stdio_round_trip_keeps_trailing_newlines() {
    let sandbox = TempDir::new().expect("Failed to create temp dir");
    let transport = server_transport();
    assert!(transport.connect(sandbox.path()).await);

    let written = transport
        .invoke("write_file", json!({"file_path": "n.txt", "content": "hello\n\n"}))
        .await;
    assert!(written.success);
    assert_eq!(std::fs::read_to_string(sandbox.path().join("n.txt")).unwrap(), "hello\n\n");

    let read = transport.invoke("read_file", json!({"file_path": "n.txt"})).await;
    assert!(read.success);
    assert_eq!(read.content(), "File: n.txt\n---\nhello\n\n");

    transport.disconnect().await;
}

#[test]
fn test_base_dir_env_name() {
    assert_eq!(BASE_DIR_ENV, "FS_MCP_BASE_DIR");
}
