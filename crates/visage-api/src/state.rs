//! Application state.

use std::sync::Arc;

use visage_engine::{EngineConfig, EngineError, FaceEngine};

use crate::config::ServiceConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub engine: Arc<FaceEngine>,
}

impl AppState {
    /// Create application state, loading all models up front.
    pub fn new(config: ServiceConfig) -> Result<Self, EngineError> {
        let engine = FaceEngine::new(&EngineConfig {
            detector: config.detector,
            max_image_size: config.max_image_size,
            model_dir: config.model_dir.clone(),
        })?;

        Ok(Self {
            config,
            engine: Arc::new(engine),
        })
    }

    /// Wrap an already-built engine, bypassing model loading.
    pub fn with_engine(config: ServiceConfig, engine: FaceEngine) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
        }
    }
}
