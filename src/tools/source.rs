//! ToolSource - which tool backends an invocation may use

use std::fmt;
use std::sync::Arc;

use crate::remote::RemoteToolTransport;

/// Tool backends available to the invocation loop
#[derive(Clone, Default)]
pub enum ToolSource {
    /// Only tools registered in-process
    #[default]
    LocalOnly,
    /// Local tools plus the namespaced tools of a remote transport
    LocalPlusRemote(Arc<dyn RemoteToolTransport>),
}

impl ToolSource {
    /// The remote transport, if one is attached
    pub fn remote(&self) -> Option<&Arc<dyn RemoteToolTransport>> {
        match self {
            ToolSource::LocalOnly => None,
            ToolSource::LocalPlusRemote(transport) => Some(transport),
        }
    }
}

impl fmt::Debug for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolSource::LocalOnly => write!(f, "LocalOnly"),
            ToolSource::LocalPlusRemote(t) => write!(f, "LocalPlusRemote({})", t.kind()),
        }
    }
}
