//! Registration, sign-in and sign-out pages. All public.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::CookieJar;
use bookshelf_authz::{clear_session_cookie, session_cookie};

use super::service::{self, AuthError, Credentials};
use crate::state::AppState;
use crate::views::{MessageType, Page, Template};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", get(show_register).post(register))
        .route("/login", get(show_login).post(login))
        .route("/logout", get(logout))
        .with_state(state)
}

fn register_page() -> Page {
    Page::new().title("Register").page_title("Register")
}

fn login_page() -> Page {
    Page::new().title("Login").page_title("Login")
}

fn error_page(state: &AppState, template: Template, page: Page, err: AuthError) -> Response {
    let (status, kind, text) = match &err {
        AuthError::MissingCredentials | AuthError::EmailTaken => {
            (StatusCode::BAD_REQUEST, MessageType::Warning, err.to_string())
        }
        AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, MessageType::Warning, err.to_string()),
        AuthError::WrongPassword => (StatusCode::UNAUTHORIZED, MessageType::Danger, err.to_string()),
        AuthError::Internal(cause) => {
            tracing::error!(error = %cause, template = template.name(), "account operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MessageType::Danger,
                "Internal error. Please try again later.".to_string(),
            )
        }
    };
    state.pages.render(status, template, page.flash(kind, text))
}

async fn show_register(State(state): State<AppState>) -> Response {
    state.pages.render(
        StatusCode::OK,
        Template::Register,
        register_page().description("Create a new user account."),
    )
}

async fn register(State(state): State<AppState>, Form(credentials): Form<Credentials>) -> Response {
    match service::register(&state, &credentials).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "account registered");
            Redirect::to("/login").into_response()
        }
        Err(err) => error_page(&state, Template::Register, register_page(), err),
    }
}

async fn show_login(State(state): State<AppState>) -> Response {
    state.pages.render(
        StatusCode::OK,
        Template::Login,
        login_page().description("Enter your email and password."),
    )
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    match service::issue_token(&state, &credentials).await {
        Ok(token) => (jar.add(session_cookie(token)), Redirect::to("/books/list")).into_response(),
        Err(err) => error_page(&state, Template::Login, login_page(), err),
    }
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    (
        clear_session_cookie(jar),
        Redirect::to(state.guard.login_path()),
    )
        .into_response()
}
