pub mod auth;
pub mod books;

use bookshelf_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register every application module. Order matters: modules start in this
/// order and stop in reverse.
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) -> anyhow::Result<()> {
    registry.register(auth::create_module(state.clone()))?;
    registry.register(books::create_module(state.clone()))?;
    Ok(())
}
