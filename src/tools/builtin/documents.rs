//! search_documents tool - retrieval over an external knowledge base

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::DocumentsConfig;
use crate::tools::{Tool, ToolError, ToolResult};

/// A retrieved document chunk
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    pub content: String,
    pub score: Option<f64>,
}

/// Knowledge-base retrieval backend
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, num_results: usize) -> Result<Vec<RetrievedDocument>, ToolError>;
}

/// Search through uploaded documents
pub struct DocumentSearchTool {
    retriever: Arc<dyn DocumentRetriever>,
    default_num_results: usize,
}

impl DocumentSearchTool {
    pub fn new(retriever: Arc<dyn DocumentRetriever>, default_num_results: usize) -> Self {
        Self {
            retriever,
            default_num_results,
        }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn name(&self) -> &'static str {
        "search_documents"
    }

    fn description(&self) -> &'static str {
        "Search through uploaded documents to find relevant information."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant documents"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of documents to retrieve",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let query = match input["query"].as_str() {
            Some(q) => q,
            None => return ToolError::InvalidArguments("query is required".to_string()).into(),
        };
        let num_results = input["num_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.default_num_results);
        debug!(%query, %num_results, "DocumentSearchTool::execute: called");

        match self.retriever.retrieve(query, num_results).await {
            Ok(documents) => {
                let results: Vec<Value> = documents
                    .iter()
                    .map(|doc| {
                        json!({
                            "content": doc.content,
                            "score": doc.score.map(Value::from).unwrap_or_else(|| Value::from("N/A")),
                            "source": "knowledge_base",
                        })
                    })
                    .collect();

                ToolResult::success(json!({
                    "query": query,
                    "total_found": results.len(),
                    "results": results,
                }))
            }
            Err(e) => e.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalRequest<'a> {
    question: &'a str,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    documents: Vec<RetrievalDocument>,
}

#[derive(Debug, Deserialize)]
struct RetrievalDocument {
    #[serde(default)]
    text: String,
    relevancy: Option<f64>,
    similarity: Option<f64>,
}

/// Vectorize.io pipeline retrieval over HTTP
pub struct VectorizeRetriever {
    http: reqwest::Client,
    base_url: String,
    organization_id: String,
    pipeline_id: String,
    access_token: String,
}

impl VectorizeRetriever {
    /// Build from the credential variables named in `config`
    ///
    /// Returns `None` when any of the three credentials is missing or empty.
    pub fn from_env(config: &DocumentsConfig) -> Option<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let organization_id = read(&config.organization_id_env)?;
        let access_token = read(&config.access_token_env)?;
        let pipeline_id = read(&config.pipeline_id_env)?;

        Self::new(&config.base_url, organization_id, pipeline_id, access_token)
    }

    pub fn new(
        base_url: &str,
        organization_id: impl Into<String>,
        pipeline_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Option<Self> {
        let http = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
            Ok(c) => c,
            Err(e) => {
                warn!(%e, "VectorizeRetriever::new: failed to build HTTP client");
                return None;
            }
        };

        Some(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            organization_id: organization_id.into(),
            pipeline_id: pipeline_id.into(),
            access_token: access_token.into(),
        })
    }

    fn retrieval_url(&self) -> String {
        format!(
            "{}/org/{}/pipelines/{}/retrieval",
            self.base_url, self.organization_id, self.pipeline_id
        )
    }
}

#[async_trait]
impl DocumentRetriever for VectorizeRetriever {
    async fn retrieve(&self, query: &str, num_results: usize) -> Result<Vec<RetrievedDocument>, ToolError> {
        debug!(%query, %num_results, "VectorizeRetriever::retrieve: called");

        let response = self
            .http
            .post(self.retrieval_url())
            .header("Authorization", &self.access_token)
            .json(&RetrievalRequest {
                question: query,
                num_results,
            })
            .send()
            .await
            .map_err(|e| ToolError::Retrieval(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "VectorizeRetriever::retrieve: error response");
            return Err(ToolError::Retrieval(format!("HTTP {}: {}", status, body)));
        }

        let parsed: RetrievalResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Retrieval(format!("invalid response: {}", e)))?;

        debug!(count = %parsed.documents.len(), "VectorizeRetriever::retrieve: documents received");
        Ok(parsed
            .documents
            .into_iter()
            .map(|doc| RetrievedDocument {
                content: doc.text,
                score: doc.relevancy.or(doc.similarity),
            })
            .collect())
    }
}
