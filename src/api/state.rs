//! API server state

use std::sync::Arc;

use crate::config::AppConfig;
use crate::table::{load_table, LoadedTable};
use crate::Result;

/// What the server has to offer, fixed at startup
#[derive(Debug)]
pub enum DataState {
    /// Table loaded and cleaned; it may still have zero rows
    Ready(LoadedTable),
    /// Loading failed at startup
    Unavailable { reason: String },
}

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Data loaded once at startup, read-only afterwards
    pub data: Arc<DataState>,
}

impl AppState {
    /// Create state around a loaded table
    pub fn ready(loaded: LoadedTable) -> Self {
        Self {
            data: Arc::new(DataState::Ready(loaded)),
        }
    }

    /// Create state for a failed load
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            data: Arc::new(DataState::Unavailable {
                reason: reason.into(),
            }),
        }
    }

    /// Turn a load outcome into state, logging the failure
    pub fn from_load(result: Result<LoadedTable>) -> Self {
        match result {
            Ok(loaded) => Self::ready(loaded),
            Err(err) => {
                tracing::error!(error = %err, "Data file could not be loaded; serving errors");
                Self::unavailable(err.to_string())
            }
        }
    }

    /// Resolve the data path from configuration and load it
    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_load(config.data_path().and_then(load_table))
    }
}
