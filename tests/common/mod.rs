#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use bookshelf_app::{bootstrap, AppState};
use bookshelf_cache::{CacheStore, RedisCache};
use bookshelf_db::{
    Book, BookDraft, BookFilter, BookStore, MemoryBookStore, MemoryUserStore, StorageError,
};
use bookshelf_kernel::Settings;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// [`BookStore`] that counts how often the full list is loaded.
#[derive(Default)]
pub struct CountingBookStore {
    inner: MemoryBookStore,
    find_all_calls: AtomicUsize,
}

impl CountingBookStore {
    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookStore for CountingBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StorageError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: u64) -> Result<Book, StorageError> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, draft: BookDraft) -> Result<Book, StorageError> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: u64, draft: BookDraft) -> Result<Book, StorageError> {
        self.inner.update(id, draft).await
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        self.inner.delete(id).await
    }

    async fn find_where(&self, filter: &BookFilter) -> Result<Vec<Book>, StorageError> {
        self.inner.find_where(filter).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub books: Arc<CountingBookStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_cache(CacheStore::memory())
    }

    pub fn with_cache(cache: CacheStore) -> Self {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = SECRET.to_string();

        let books = Arc::new(CountingBookStore::default());
        let state = AppState::new(
            &settings,
            books.clone(),
            Arc::new(MemoryUserStore::new()),
            cache,
        )
        .unwrap();
        let router = bootstrap::router(&settings, state.clone()).unwrap();

        Self {
            router,
            state,
            books,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn bearer(&self, user_id: u64) -> String {
        format!("Bearer {}", self.state.tokens.create_token(user_id).unwrap())
    }

    pub fn session_cookie(&self, user_id: u64) -> String {
        format!("jwt={}", self.state.tokens.create_token(user_id).unwrap())
    }
}

/// Redis cache pointed at a port where nothing listens.
pub fn unreachable_redis() -> CacheStore {
    CacheStore::Redis(
        RedisCache::connect("redis://127.0.0.1:1", 1, Duration::from_secs(5)).unwrap(),
    )
}

/// Redis cache pointed at a listener that accepts connections and never
/// answers, so every command hangs until the caller gives up.
pub async fn silent_redis() -> CacheStore {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let url = format!("redis://{addr}");
    CacheStore::Redis(RedisCache::connect(&url, 1, Duration::from_secs(5)).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
