use std::sync::Arc;

use image::RgbImage;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::form::store::FormStore;
use crate::generation::generator::GeneratedScript;
use crate::generation::guard::GenerationGuard;
use crate::llm_client::TextGenerator;
use crate::raster::Rasterizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persisted form draft. Redis when `REDIS_URL` is set, process memory otherwise.
    pub store: Arc<dyn FormStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    /// One generation or document render at a time.
    pub guard: GenerationGuard,
    /// Most recent script, served by the `latest` endpoints.
    pub latest: Arc<RwLock<Option<GeneratedScript>>>,
    /// `None` draws the "AA+" disc instead.
    pub logo: Option<Arc<RgbImage>>,
    pub rasterizer: Arc<dyn Rasterizer>,
}
