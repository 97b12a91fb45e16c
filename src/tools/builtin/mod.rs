//! Built-in tools
//!
//! The five file tools wrap a shared [`FileOperations`]; `search_web` and
//! `search_documents` sit behind pluggable backends.

mod documents;
mod file_info;
mod list_directory;
mod read_file;
mod search_files;
mod web_search;
mod write_file;

use std::sync::Arc;

pub use documents::{DocumentRetriever, DocumentSearchTool, RetrievedDocument, VectorizeRetriever};
pub use file_info::FileInfoTool;
pub use list_directory::ListDirectoryTool;
pub use read_file::ReadFileTool;
pub use search_files::SearchFilesTool;
pub use web_search::{QueryKind, SimulatedWebSearch, WebResult, WebSearchBackend, WebSearchTool, classify};
pub use write_file::WriteFileTool;

use crate::fs::FileOperations;
use crate::tools::Tool;

/// The five file tools over one set of operations, in catalog order
pub fn file_tools(ops: Arc<FileOperations>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ReadFileTool::new(ops.clone())),
        Arc::new(WriteFileTool::new(ops.clone())),
        Arc::new(ListDirectoryTool::new(ops.clone())),
        Arc::new(SearchFilesTool::new(ops.clone())),
        Arc::new(FileInfoTool::new(ops)),
    ]
}
