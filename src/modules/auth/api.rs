use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use bookshelf_authz::TOKEN_TTL;
use bookshelf_http::AppError;
use serde::Serialize;

use super::service::{self, Credentials};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/token", post(issue_token))
        .with_state(state)
}

async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(credentials) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let token = service::issue_token(&state, &credentials).await?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: TOKEN_TTL.whole_seconds(),
    }))
}
