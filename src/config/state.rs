// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::routing::{default_routes, RouteTable};
use crate::storage::FileStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub store: FileStore,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = FileStore::new(config.storage.base_dir.clone());
        Self {
            config,
            routes: default_routes(),
            store,
            active_connections: AtomicUsize::new(0),
        }
    }
}
