pub mod api;
pub mod error;
pub mod form;
pub mod pages;
pub mod search;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use crate::state::AppState;

pub use error::BookError;
pub use search::{SearchDispatcher, SearchQuery, SearchStrategy};

/// The personal library: HTML pages under `/books` and the JSON API.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache = self.state.book_list.store().mode(),
            ttl_secs = self.state.book_list.ttl().as_secs(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        api::router(self.state.clone())
    }

    fn pages(&self) -> Router {
        pages::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });
        let book = json!({
            "description": "A book",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
        });
        let draft_body = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookDraft" } } }
        });
        let id_param = json!([{
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "minimum": 1 }
        }]);
        let security = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books (served from cache when fresh)",
                        "tags": ["Books"],
                        "security": security,
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                                    }
                                }
                            },
                            "401": error
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": security,
                        "requestBody": draft_body,
                        "responses": { "201": book, "400": error, "401": error }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Find one book by id, or by title fragment",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": [
                            { "name": "id", "in": "query", "schema": { "type": "string" } },
                            { "name": "title", "in": "query", "schema": { "type": "string" } }
                        ],
                        "responses": { "200": book, "400": error, "401": error, "404": error }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": { "200": book, "400": error, "401": error, "404": error }
                    },
                    "put": {
                        "summary": "Replace a book's fields",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "requestBody": draft_body,
                        "responses": { "200": book, "400": error, "401": error, "404": error }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": { "204": { "description": "Deleted" }, "401": error, "404": error }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "genre": { "type": "string" },
                            "isbn": { "type": "string" },
                            "rating": { "type": "number", "description": "Rounded to one decimal" },
                            "read": { "type": "boolean" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "created_at", "updated_at"]
                    },
                    "BookDraft": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "genre": { "type": "string" },
                            "isbn": { "type": "string" },
                            "rating": { "type": "number" },
                            "read": { "type": "boolean" }
                        },
                        "required": ["title"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
