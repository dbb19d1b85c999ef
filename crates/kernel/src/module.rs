use async_trait::async_trait;
use axum::Router;

/// What a module sees while it is brought up.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A feature area of the application: its routes, its OpenAPI fragment and
/// its lifecycle hooks.
///
/// Every hook has a no-op default, so a module overrides only what it uses.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the `/api/{name}` mount point.
    fn name(&self) -> &'static str;

    /// Runs once, in registration order, before the server accepts requests.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// JSON endpoints, nested under `/api/{name}`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Server-rendered pages. Merged at the root, so paths are absolute.
    fn pages(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components.schemas` to merge into the served document.
    /// Paths are relative to the module's mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs on shutdown, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
