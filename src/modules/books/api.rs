//! JSON endpoints mounted under `/api/books`, behind the bearer guard.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use bookshelf_authz::{require_bearer, AuthenticatedUser};
use bookshelf_db::{Book, BookDraft};
use bookshelf_http::AppError;

use super::form::check_draft;
use super::search::{parse_book_id, SearchQuery};
use super::service;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/search", get(search_books))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            require_bearer,
        ))
        .with_state(state)
}

fn draft_from(payload: Result<Json<BookDraft>, JsonRejection>) -> Result<BookDraft, AppError> {
    let Json(draft) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(check_draft(draft)?)
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service::list(&state).await?))
}

async fn create_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<BookDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let draft = draft_from(payload)?;
    let book = service::create(&state, draft).await?;
    tracing::info!(user_id = user.id(), book_id = book.id, "book created via API");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service::search(&state, &query).await?))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service::get(&state, &id).await?))
}

async fn update_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<BookDraft>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = parse_book_id(&id)?;
    let draft = draft_from(payload)?;
    let book = service::update(&state, id, draft).await?;
    tracing::info!(user_id = user.id(), book_id = id, "book updated via API");
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_book_id(&id)?;
    service::delete(&state, id).await?;
    tracing::info!(user_id = user.id(), book_id = id, "book deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
