use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookshelf_authz::{GuardState, TokenService};
use bookshelf_cache::{BookListCache, CacheStore};
use bookshelf_db::{BookStore, MemoryBookStore, MemoryUserStore, UserStore};
use bookshelf_kernel::Settings;

use crate::views::{HtmlRenderer, PageRenderer};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
    pub book_list: BookListCache,
    pub tokens: Arc<TokenService>,
    pub guard: GuardState,
    pub pages: Arc<dyn PageRenderer>,
    /// Deadline for dropping the cached list after a write.
    pub invalidate_timeout: Duration,
}

impl AppState {
    /// In-memory stores and the cache backend chosen by `settings.cache`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let cache = CacheStore::from_settings(&settings.cache)
            .context("failed to configure book list cache")?;

        Self::new(
            settings,
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryUserStore::new()),
            cache,
        )
    }

    pub fn new(
        settings: &Settings,
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserStore>,
        cache: CacheStore,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenService::new(&settings.auth.jwt_secret).context("invalid auth.jwt_secret")?,
        );

        Ok(Self {
            books,
            users,
            book_list: BookListCache::new(cache)
                .with_ttl(settings.cache.ttl())
                .with_op_timeout(settings.cache.op_timeout()),
            guard: GuardState::new(tokens.clone(), settings.auth.login_path.clone()),
            tokens,
            pages: Arc::new(HtmlRenderer),
            invalidate_timeout: settings.cache.invalidate_timeout(),
        })
    }
}
