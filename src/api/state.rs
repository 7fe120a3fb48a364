//! Application state for the Finance Suite API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::store::Database;
use crate::tasks::TaskQueue;

/// Shared application state.
///
/// Holds the immutable domain tables, the database handle and the queue of
/// background work. Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    database: Database,
    tasks: TaskQueue,
}

impl AppState {
    /// Creates the application state.
    pub fn new(config: ConfigLoader, database: Database, tasks: TaskQueue) -> Self {
        Self {
            config: Arc::new(config),
            database,
            tasks,
        }
    }

    /// Returns the loaded domain tables.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the database handle.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Returns the background task queue.
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone_and_send() {
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }
}
