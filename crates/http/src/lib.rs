//! HTTP server facade for bookshelf with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

pub use error::AppError;
use router::RouterBuilder;

/// Start the HTTP server and serve until ctrl-c.
///
/// `extra` is merged at the root next to the module routers; the app uses it
/// for operational endpoints that need application state.
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &Settings,
    extra: Router,
) -> anyhow::Result<()> {
    let app = build_router(registry, settings, extra);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes and pages mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings, extra: Router) -> Router {
    let mut router_builder = RouterBuilder::new()
        .route("/healthz", get(health_check))
        .merge(extra);

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder
            .mount_module(module_name, module.routes())
            .merge(module.pages());
    }

    router_builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Liveness check
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, extract::Request, http::StatusCode};
    use bookshelf_kernel::Module;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct ShelfModule;

    #[async_trait]
    impl Module for ShelfModule {
        fn name(&self) -> &'static str {
            "shelf"
        }

        fn routes(&self) -> Router {
            Router::new().route("/count", get(|| async { "3" }))
        }

        fn pages(&self) -> Router {
            Router::new().route("/shelf", get(|| async { "<h1>shelf</h1>" }))
        }

        fn openapi(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({
                "paths": { "/count": { "get": { "summary": "count" } } }
            }))
        }
    }

    fn app() -> Router {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(ShelfModule)).unwrap();
        build_router(
            &registry,
            &Settings::default(),
            Router::new().route("/readyz", get(|| async { "ready" })),
        )
    }

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn serves_health_modules_pages_and_extra_routes() {
        assert_eq!(status_of(app(), "/healthz").await, StatusCode::OK);
        assert_eq!(status_of(app(), "/readyz").await, StatusCode::OK);
        assert_eq!(status_of(app(), "/api/shelf/count").await, StatusCode::OK);
        assert_eq!(status_of(app(), "/shelf").await, StatusCode::OK);
        assert_eq!(status_of(app(), "/nope").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_includes_module_paths() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/shelf/count"]["get"].is_object());
    }
}
