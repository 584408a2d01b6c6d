use std::sync::Arc;

use tracing::warn;

use adlens_core::{config::Config, AggregationOptions, Dataset};

use crate::{error::AppError, source::DatasetSource};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Holds no data of its own: each request loads its own dataset snapshot
/// through `source` and aggregates it on the request task.
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    pub source: Arc<dyn DatasetSource>,
}

impl AppState {
    pub fn new(source: impl DatasetSource, config: Config) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        self.config.aggregation_options()
    }

    /// Load a fresh dataset. A failure is reported once, as the message the
    /// dashboard shows in place of the view.
    pub async fn load_dataset(&self) -> Result<Dataset, AppError> {
        self.source.load().await.map_err(|e| {
            warn!(source = %self.source.describe(), error = %format!("{e:#}"), "dataset load failed");
            AppError::DatasetUnavailable(format!("Error loading data: {e}"))
        })
    }
}
