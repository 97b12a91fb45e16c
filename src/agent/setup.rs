//! Assemble the tool registry and tool source from configuration

use std::path::Path;
use std::sync::Arc;

use eyre::Result;
use tracing::{debug, info, warn};

use crate::config::{Config, RemoteMode};
use crate::remote::{InProcessTransport, RemoteToolTransport, StdioTransport};
use crate::tools::ToolRegistry;
use crate::tools::ToolSource;
use crate::tools::builtin::{DocumentSearchTool, SimulatedWebSearch, VectorizeRetriever, WebSearchTool};

/// Registry of local tools plus the resolved tool source
pub struct ToolSetup {
    pub registry: ToolRegistry,
    pub source: ToolSource,
}

impl ToolSetup {
    /// Build local tools and connect the configured remote transport
    ///
    /// A transport that fails to connect is dropped with a warning and the
    /// setup continues with local tools only.
    pub async fn from_config(config: &Config) -> Result<Self> {
        debug!(mode = ?config.remote.mode, "ToolSetup::from_config: called");
        let registry = local_registry(config);

        let source = match build_transport(config)? {
            Some(transport) => {
                let base_dir = config.agent.resolved_base_dir()?;
                connect_source(transport, &base_dir).await
            }
            None => ToolSource::LocalOnly,
        };

        Ok(Self { registry, source })
    }
}

/// Registry holding the local tools enabled by `config`
pub fn local_registry(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new().with_timeout(config.agent.tool_timeout());

    if let Some(retriever) = VectorizeRetriever::from_env(&config.documents) {
        registry.register(Arc::new(DocumentSearchTool::new(
            Arc::new(retriever),
            config.documents.num_results,
        )));
    } else {
        debug!("local_registry: document search credentials missing, search_documents disabled");
    }

    registry.register(Arc::new(WebSearchTool::new(
        Arc::new(SimulatedWebSearch::new()),
        config.web.max_results,
    )));

    registry
}

/// Transport for the configured remote mode; `None` when remote tools are off
pub fn build_transport(config: &Config) -> Result<Option<Arc<dyn RemoteToolTransport>>> {
    let transport: Arc<dyn RemoteToolTransport> = match config.remote.mode {
        RemoteMode::Off => return Ok(None),
        RemoteMode::Process => Arc::new(StdioTransport::new(
            config.remote.resolved_command()?,
            config.remote.args.clone(),
            config.remote.request_timeout(),
        )),
        RemoteMode::InProcess => Arc::new(InProcessTransport::new()),
    };
    Ok(Some(transport))
}

/// Connect `transport`, degrading to local-only tools on failure
pub async fn connect_source(transport: Arc<dyn RemoteToolTransport>, base_dir: &Path) -> ToolSource {
    if transport.connect(base_dir).await {
        info!(kind = %transport.kind(), tool_count = %transport.tools().len(), "Remote tools connected");
        ToolSource::LocalPlusRemote(transport)
    } else {
        warn!(kind = %transport.kind(), "Failed to connect remote tools, continuing with local tools only");
        ToolSource::LocalOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config(mode: RemoteMode, base_dir: PathBuf) -> Config {
        let mut config = Config::default();
        config.remote = RemoteConfig {
            mode,
            ..RemoteConfig::default()
        };
        config.agent.base_dir = Some(base_dir);
        config.documents.organization_id_env = "TOOLAGENT_TEST_UNSET_ORG".to_string();
        config
    }

    #[test]
    fn test_local_registry_without_document_credentials() {
        let temp = tempdir().unwrap();
        let registry = local_registry(&config(RemoteMode::Off, temp.path().to_path_buf()));
        assert_eq!(registry.names(), vec!["search_web"]);
    }

    #[tokio::test]
    async fn test_off_mode_is_local_only() {
        let temp = tempdir().unwrap();
        let setup = ToolSetup::from_config(&config(RemoteMode::Off, temp.path().to_path_buf()))
            .await
            .unwrap();
        assert!(setup.source.remote().is_none());
    }

    #[tokio::test]
    async fn test_in_process_mode_exposes_namespaced_file_tools() {
        let temp = tempdir().unwrap();
        let setup = ToolSetup::from_config(&config(RemoteMode::InProcess, temp.path().to_path_buf()))
            .await
            .unwrap();

        let registry = setup.registry.with_source(setup.source);
        let names = registry.names();
        assert_eq!(names[0], "search_web");
        assert!(names.contains(&"mcp_read_file".to_string()));
        assert!(names.contains(&"mcp_file_info".to_string()));
        assert_eq!(names.len(), 6);
    }

    #[tokio::test]
    async fn test_failed_connect_degrades_to_local_only() {
        let temp = tempdir().unwrap();
        let transport = Arc::new(StdioTransport::new(
            "/nonexistent/toolagent-server-binary",
            Vec::new(),
            Duration::from_secs(1),
        ));

        let source = connect_source(transport, temp.path()).await;
        assert!(source.remote().is_none());
    }

    #[tokio::test]
    async fn test_in_process_bad_base_dir_degrades() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing");
        let setup = ToolSetup::from_config(&config(RemoteMode::InProcess, missing)).await.unwrap();
        assert!(setup.source.remote().is_none());
    }
}
