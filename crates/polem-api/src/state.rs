//! Application state management

use polem_core::config::AppConfig;
use polem_core::{MorphologicalEngine, PolemError, Result};
use polem_pipeline::{BatchReport, DictionaryEngine, LemmatizationPipeline};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Engine type held by the server
pub type SharedEngine = Box<dyn MorphologicalEngine>;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Engine name, readable without taking the pipeline lock
    engine_name: String,
    /// Single pipeline; requests are serialized on this lock
    pipeline: Arc<Mutex<LemmatizationPipeline<SharedEngine>>>,
}

impl AppState {
    /// Create new application state around an engine
    pub fn new(config: AppConfig, engine: SharedEngine) -> Self {
        let engine_name = engine.name().to_string();
        let pipeline = LemmatizationPipeline::with_config(engine, config.pipeline.clone());

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            engine_name,
            pipeline: Arc::new(Mutex::new(pipeline)),
        }
    }

    /// Build the configured dictionary engine and wrap it in state
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let engine = match &config.engine.dictionary_path {
            Some(path) => {
                let engine = DictionaryEngine::from_file(path)?;
                tracing::info!(entries = engine.len(), path = %path.display(), "dictionary loaded");
                engine
            }
            None => DictionaryEngine::new(),
        };
        Ok(Self::new(config, Box::new(engine)))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// Run the pipeline over a batch on the blocking pool
    ///
    /// Returns the enriched batch together with its report.
    pub async fn process_batch(&self, mut batch: Value) -> Result<(Value, BatchReport)> {
        let pipeline = Arc::clone(&self.pipeline);

        tokio::task::spawn_blocking(move || -> Result<(Value, BatchReport)> {
            let mut pipeline = pipeline
                .lock()
                .map_err(|_| PolemError::Other(anyhow::anyhow!("pipeline lock poisoned")))?;
            let report = pipeline.process_document_batch(&mut batch)?;
            Ok((batch, report))
        })
        .await
        .map_err(|e| PolemError::Other(e.into()))?
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), Box::new(DictionaryEngine::new()))
    }
}
