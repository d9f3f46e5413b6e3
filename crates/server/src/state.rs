use crate::config::ServerConfig;
use crate::error::ServerResult;
use filedock::Filedock;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Upload store and previewer over the content directory
    pub dock: Arc<Filedock>,
}

impl ServerState {
    /// Create new server state, creating the content directory if needed
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let dock = Arc::new(Filedock::init(&config.dock)?);

        Ok(Self {
            config: Arc::new(config),
            dock,
        })
    }
}
