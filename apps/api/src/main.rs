mod config;
mod content;
mod document;
mod errors;
mod form;
mod generation;
mod layout;
mod llm_client;
mod raster;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::header::load_logo;
use crate::form::store::{FormStore, MemoryFormStore, RedisFormStore};
use crate::generation::guard::GenerationGuard;
use crate::llm_client::GeminiClient;
use crate::raster::MonoRasterizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interview script service v{}", env!("CARGO_PKG_VERSION"));

    // Form draft store
    let store: Arc<dyn FormStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisFormStore::open(url)?;
            info!("Form drafts stored in Redis");
            Arc::new(store)
        }
        None => {
            info!("REDIS_URL not set, form drafts kept in memory");
            Arc::new(MemoryFormStore::new())
        }
    };

    // Gemini client
    let llm = GeminiClient::new(
        config.gemini_api_url.clone(),
        config.gemini_api_key.clone(),
        Duration::from_secs(config.gemini_timeout_secs),
    )?;
    if !llm.has_api_key() {
        warn!("GEMINI_API_KEY not set, every script will use the sample fallback");
    }

    // Logo: a broken path falls back to the drawn "AA+" disc
    let logo = match &config.logo_path {
        Some(path) => match load_logo(path) {
            Ok(image) => {
                info!("Logo loaded from {}", path.display());
                Some(Arc::new(image))
            }
            Err(e) => {
                warn!("Using fallback logo: {e:#}");
                None
            }
        },
        None => None,
    };

    info!("Body mode: {:?}", config.body_mode);

    let state = AppState {
        store,
        llm: Arc::new(llm),
        config: config.clone(),
        guard: GenerationGuard::new(),
        latest: Arc::new(RwLock::new(None)),
        logo,
        rasterizer: Arc::new(MonoRasterizer::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
