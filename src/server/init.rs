//! Server initialization
//!
//! Builds the router and runs the HTTP server until Ctrl+C or SIGTERM.

use super::config::AppConfig;
use super::providers::build_from_config;
use crate::api::{health_routes, runs_routes, AppState, RunStore};
use crate::web::web_routes;
use anyhow::{Context, Result};
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(web_routes())
        .merge(health_routes())
        .merge(runs_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the web server
pub async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Research Crew v{}", env!("CARGO_PKG_VERSION"));

    let builder = build_from_config(&config)?;
    let state = Arc::new(AppState {
        builder,
        runs: RunStore::new(config.crew.max_stored_runs),
        download_filename: config.output.filename.clone(),
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Research Crew shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crew_core::ResearchCrewBuilder;
    use crew_llm::MockProvider;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            builder: ResearchCrewBuilder::new(Arc::new(MockProvider::new())),
            runs: RunStore::new(4),
            download_filename: "research_crew_output.txt".to_string(),
        })
    }

    #[tokio::test]
    async fn test_router_serves_all_surfaces() {
        let app = build_router(state());

        for path in ["/", "/health"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        }

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
