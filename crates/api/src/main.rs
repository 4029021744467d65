use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomstage_api::config::{BackendKind, ServerConfig};
use roomstage_api::engine::PlacementEngine;
use roomstage_api::recommend::Recommender;
use roomstage_api::router::build_app_router;
use roomstage_api::state::AppState;
use roomstage_compose::{
    ComposeBackend, GenerativeBackend, ImageHost, KieGenerationApi, PixelCompositeBackend,
};
use roomstage_vision::{OpenAiVisionClient, PlacementAnalyzer, VisionClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomstage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Data directories ---
    for dir in [
        config.uploads_dir(),
        config.results_dir(),
        config.catalog_dir(),
    ] {
        std::fs::create_dir_all(&dir)
            .unwrap_or_else(|e| panic!("Failed to create {}: {e}", dir.display()));
    }

    // --- Database ---
    let pool = roomstage_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    roomstage_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    roomstage_db::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");
    tracing::info!(database_url = %config.database_url, "Database ready");

    // --- Providers and engine ---
    let vision_client: Arc<dyn VisionClient> = Arc::new(OpenAiVisionClient::new(
        config.providers.vision_api_url.clone(),
        config.providers.vision_api_key.clone(),
        config.providers.vision_model.clone(),
    ));
    let analyzer = PlacementAnalyzer::new(Arc::clone(&vision_client));

    let generative: Option<Arc<dyn ComposeBackend>> =
        if config.providers.generation_api_key.is_empty() {
            tracing::warn!(
                "GENERATION_API_KEY is not set; multi-item and replace requests will fail"
            );
            None
        } else {
            let api = Arc::new(KieGenerationApi::new(
                config.providers.generation_create_url.clone(),
                config.providers.generation_query_url.clone(),
                config.providers.generation_api_key.clone(),
            ));
            let host = ImageHost::new(
                config.providers.hosting_api_url.clone(),
                config.providers.hosting_api_key.clone(),
            );
            Some(Arc::new(GenerativeBackend::new(
                api,
                host,
                config.providers.generation_model.clone(),
            )))
        };

    let single_backend: Arc<dyn ComposeBackend> = match config.backend {
        BackendKind::Pixel => Arc::new(PixelCompositeBackend),
        BackendKind::Generative => Arc::clone(
            generative
                .as_ref()
                .expect("COMPOSE_BACKEND=generative requires GENERATION_API_KEY"),
        ),
    };

    let engine = Arc::new(PlacementEngine::new(
        analyzer,
        single_backend,
        generative,
        config.results_dir(),
        config.trial_limit,
    ));

    let recommender = Arc::new(Recommender::new(
        (!config.providers.vision_api_key.is_empty()).then(|| Arc::clone(&vision_client)),
    ));

    // --- App state and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
        recommender,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
