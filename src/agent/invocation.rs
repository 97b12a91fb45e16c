//! ToolInvocationLoop - one user message to one answer, with at most one tool round

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::conversation::ConversationState;
use super::error::AgentError;
use super::prompt::system_prompt;
use crate::config::Config;
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message};
use crate::tools::{ToolDescriptor, ToolError, ToolRegistry, ToolResult, ToolSource};

/// Answer returned when an invocation is abandoned
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error.";

/// Knobs for the completion calls
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Bound on each completion call
    pub completion_timeout: Duration,
}

impl LoopOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            completion_timeout: config.agent.completion_timeout(),
        }
    }
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One dispatched tool call and its outcome
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub call_id: String,
    pub name: String,
    pub result: ToolResult,
}

/// Everything a completed invocation produced
#[derive(Debug, Clone)]
pub struct Transcript {
    pub answer: String,
    pub tool_runs: Vec<ToolRun>,
    pub conversation: ConversationState,
    /// Number of completion calls made (1 or 2)
    pub completions: usize,
}

/// Final user-facing answer
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub tool_runs: Vec<ToolRun>,
    /// Set when the invocation was abandoned and `text` is the fallback
    pub error: Option<String>,
}

impl Answer {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Drives the completion service and the tool registry for one message at a time
///
/// Stateless between invocations: each call to [`run`](Self::run) builds a
/// fresh conversation and a fresh catalog.
pub struct ToolInvocationLoop {
    llm: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    options: LoopOptions,
}

impl ToolInvocationLoop {
    pub fn new(llm: Arc<dyn LlmClient>, registry: ToolRegistry, source: ToolSource, options: LoopOptions) -> Self {
        debug!(?source, "ToolInvocationLoop::new: called");
        Self {
            llm,
            registry: registry.with_source(source),
            options,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Disconnect the remote transport, if any
    pub async fn shutdown(&self) {
        if let Some(transport) = self.registry.source().remote() {
            info!(kind = %transport.kind(), "Disconnecting remote tools");
            transport.disconnect().await;
        }
    }

    /// Answer a message, degrading to the fallback answer on any failure
    pub async fn answer(&self, user_message: &str) -> Answer {
        match self.run(user_message).await {
            Ok(transcript) => Answer {
                text: transcript.answer,
                tool_runs: transcript.tool_runs,
                error: None,
            },
            Err(e) => {
                error!(%e, "Invocation failed");
                Answer {
                    text: FALLBACK_ANSWER.to_string(),
                    tool_runs: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Run one invocation
    pub async fn run(&self, user_message: &str) -> Result<Transcript, AgentError> {
        debug!(message_len = %user_message.len(), "ToolInvocationLoop::run: called");

        let catalog = self.registry.list();
        let mut conversation = ConversationState::new(system_prompt(&catalog), user_message);

        let first = self.complete("first", &conversation, catalog).await?;

        if first.tool_calls.is_empty() {
            debug!("ToolInvocationLoop::run: no tool calls, answering directly");
            return Ok(Transcript {
                answer: first.content.unwrap_or_default(),
                tool_runs: Vec::new(),
                conversation,
                completions: 1,
            });
        }

        info!(call_count = %first.tool_calls.len(), "Dispatching tool calls");
        conversation.push(Message::assistant_tool_calls(first.content.clone(), first.tool_calls.clone()));

        let mut tool_runs = Vec::with_capacity(first.tool_calls.len());
        for call in &first.tool_calls {
            let result = match call.parse_arguments() {
                Ok(arguments) => self.registry.dispatch(&call.name, arguments).await,
                Err(reason) => {
                    warn!(name = %call.name, %reason, "Malformed tool arguments");
                    ToolError::InvalidArguments(reason).into()
                }
            };
            debug!(name = %call.name, success = %result.success, "ToolInvocationLoop::run: tool finished");

            conversation.push(Message::tool(&call.id, &call.name, result.to_message_content()));
            tool_runs.push(ToolRun {
                call_id: call.id.clone(),
                name: call.name.clone(),
                result,
            });
        }

        let second = self.complete("second", &conversation, Vec::new()).await?;

        Ok(Transcript {
            answer: second.content.unwrap_or_default(),
            tool_runs,
            conversation,
            completions: 2,
        })
    }

    async fn complete(
        &self,
        stage: &'static str,
        conversation: &ConversationState,
        tools: Vec<ToolDescriptor>,
    ) -> Result<CompletionResponse, AgentError> {
        debug!(%stage, tool_count = %tools.len(), "ToolInvocationLoop::complete: called");
        let request = CompletionRequest {
            messages: conversation.messages().to_vec(),
            tools,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        bounded(stage, self.options.completion_timeout, self.llm.complete(request)).await
    }
}

async fn bounded<F>(stage: &'static str, timeout: Duration, call: F) -> Result<CompletionResponse, AgentError>
where
    F: Future<Output = Result<CompletionResponse, LlmError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AgentError::Timeout {
            stage,
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
