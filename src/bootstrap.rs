//! Process wiring: state, module registry, HTTP router and lifecycle.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookshelf_http::{build_router, start_server};
use bookshelf_kernel::{InitCtx, ModuleRegistry, Settings};
use serde_json::json;

use crate::modules;
use crate::state::AppState;

/// Registry with every application module registered against `state`.
pub fn registry(state: &AppState) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, state)?;
    Ok(registry)
}

/// The full HTTP surface, without starting module lifecycles.
pub fn router(settings: &Settings, state: AppState) -> anyhow::Result<Router> {
    let registry = registry(&state)?;
    Ok(build_router(&registry, settings, ops_routes(state)))
}

/// Operational endpoints that need application state.
pub fn ops_routes(state: AppState) -> Router {
    Router::new()
        .route("/readyz", get(readiness))
        .with_state(state)
}

async fn readiness(State(state): State<AppState>) -> Response {
    let store = state.book_list.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "cache": store.mode() })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, cache = store.mode(), "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "cache": store.mode(),
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

/// Build state from `settings`, run module lifecycles around the server.
///
/// Modules are stopped even when the server exits with an error; the server
/// error wins over a stop error.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings)?;
    let registry = registry(&state)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = start_server(&registry, &settings, ops_routes(state)).await;
    let stopped = registry.stop_all().await;

    served?;
    stopped
}
