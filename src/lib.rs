//! picdrop - a tiny local web server that publishes images.
//!
//! Serves a single upload form, streams the submitted image into per-request scratch
//! storage, publishes it to a configured image host (Cloudinary by default), and
//! best-effort opens the resulting public URL in the local default browser. The URL is
//! always returned in the HTTP response; the browser launch is only a convenience.

pub mod api;
pub mod browser;
pub mod config;
pub mod errors;
pub mod hosting;
pub mod scratch;
pub mod static_assets;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};

pub use config::Config;
use hosting::ImageHost;

/// Application state shared across all request handlers.
///
/// Holds the loaded configuration, the configured image host, and the compiled page
/// templates. Cheap to clone; the host and templates are shared via `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub host: Arc<dyn ImageHost>,
    pub templates: Arc<minijinja::Environment<'static>>,
}

/// Compile the embedded page templates.
fn build_templates() -> Result<minijinja::Environment<'static>, minijinja::Error> {
    let mut env = minijinja::Environment::new();
    env.add_template("index.html", include_str!("../templates/index.html"))?;
    Ok(env)
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(api::handlers::pages::index))
        .route("/upload", post(api::handlers::uploads::upload_image))
        .route("/favicon.ico", get(api::handlers::static_assets::favicon))
        .route("/public/{*path}", get(api::handlers::static_assets::serve_public_asset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The assembled application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance from configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting picdrop with configuration: {:#?}", config);

        let templates = build_templates().map_err(|e| anyhow::anyhow!("Failed to compile page templates: {e}"))?;
        let host: Arc<dyn ImageHost> = Arc::from(hosting::create_host(&config.hosting));

        let state = AppState {
            config: config.clone(),
            host,
            templates: Arc::new(templates),
        };
        let router = build_router(state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "picdrop listening on http://{}, upload form at http://localhost:{}/",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
