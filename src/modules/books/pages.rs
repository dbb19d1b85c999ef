//! HTML pages under `/books`, behind the session-cookie guard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use bookshelf_authz::{require_cookie, AuthenticatedUser};

use super::error::BookError;
use super::form::BookForm;
use super::search::{parse_book_id, SearchQuery};
use super::service;
use crate::state::AppState;
use crate::views::{MessageType, Page, Template};

const LIST_DESCRIPTION: &str = "List of all books currently stored in your library.";
const EDIT_DESCRIPTION: &str = "Update the book information and save your changes.";

pub fn router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/books/list", get(list_books))
        .route("/books/add", get(show_add_page).post(add_book))
        .route("/books/edit/{id}", get(show_edit_page))
        .route(
            "/books/update/search",
            get(show_update_search).post(find_for_update),
        )
        .route("/books/update/{id}", post(update_book))
        .route(
            "/books/delete/search",
            get(show_delete_search).post(find_for_delete),
        )
        .route("/books/delete/{id}", post(delete_book))
        .route("/books/{id}", get(show_book))
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            require_cookie,
        ));

    guarded
        .route("/", get(welcome))
        .with_state(state)
}

/// Render `err` on `template` with the status and notice matching its kind.
fn error_page(state: &AppState, template: Template, page: Page, err: BookError) -> Response {
    let (status, kind, text) = match &err {
        BookError::InvalidArgument(_) | BookError::MissingArgument => {
            (StatusCode::BAD_REQUEST, MessageType::Warning, err.to_string())
        }
        BookError::Validation { message, .. } => (
            StatusCode::BAD_REQUEST,
            MessageType::Warning,
            message.to_string(),
        ),
        BookError::NotFound => (
            StatusCode::NOT_FOUND,
            MessageType::Info,
            "Book not found.".to_string(),
        ),
        BookError::Storage(e) => {
            tracing::error!(error = %e, template = template.name(), "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MessageType::Danger,
                "An unexpected database error occurred.".to_string(),
            )
        }
    };
    state.pages.render(status, template, page.flash(kind, text))
}

async fn welcome(State(state): State<AppState>) -> Response {
    state.pages.render(
        StatusCode::OK,
        Template::Index,
        Page::new()
            .title("Welcome to BookManager")
            .page_title("Welcome to BookManager"),
    )
}

async fn list_books(State(state): State<AppState>) -> Response {
    let page = Page::new().title("Book List").description(LIST_DESCRIPTION);

    match service::list(&state).await {
        Ok(books) if books.is_empty() => state.pages.render(
            StatusCode::OK,
            Template::BookList,
            page.page_title("Your Library").flash(
                MessageType::Info,
                "There are no saved books yet. Add your first book!",
            ),
        ),
        Ok(books) => state
            .pages
            .render(StatusCode::OK, Template::BookList, page.books(books)),
        Err(err) => error_page(&state, Template::BookList, page, err),
    }
}

async fn show_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match service::get(&state, &id).await {
        Ok(book) => state.pages.render(
            StatusCode::OK,
            Template::BookDetails,
            Page::new()
                .title("Book Details")
                .page_title(format!("Details of '{}'", book.title))
                .description("Detailed information about the selected book from your library.")
                .book(book),
        ),
        Err(err) => error_page(
            &state,
            Template::BookList,
            Page::new().title("Book Details"),
            err,
        ),
    }
}

async fn show_add_page(State(state): State<AppState>) -> Response {
    state.pages.render(
        StatusCode::OK,
        Template::BookAdd,
        Page::new()
            .title("Add Book")
            .page_title("Add a New Book")
            .description("Enter the details of the new book and click Save."),
    )
}

async fn add_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<BookForm>,
) -> Response {
    let page = Page::new().title("Add Book");
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(err) => return error_page(&state, Template::BookAdd, page, err),
    };

    match service::create(&state, draft).await {
        Ok(book) => {
            tracing::info!(user_id = user.id(), book_id = book.id, "book added");
            Redirect::to("/books/list").into_response()
        }
        Err(err) => error_page(&state, Template::BookAdd, page, err),
    }
}

fn edit_page(state: &AppState, book: bookshelf_db::Book) -> Response {
    state.pages.render(
        StatusCode::OK,
        Template::BookEdit,
        Page::new()
            .title("Edit Book")
            .page_title(format!("Edit: {}", book.title))
            .description(EDIT_DESCRIPTION)
            .book(book),
    )
}

async fn show_edit_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match service::get(&state, &id).await {
        Ok(book) => edit_page(&state, book),
        Err(err) => error_page(
            &state,
            Template::BookList,
            Page::new().title("Edit Book").description(EDIT_DESCRIPTION),
            err,
        ),
    }
}

fn search_page(action: &'static str, title: &str, description: &str) -> Page {
    Page::new()
        .title(title)
        .page_title(title)
        .description(description)
        .action(action)
}

fn update_search_page() -> Page {
    search_page(
        "update/search",
        "Find Book to Update",
        "Enter either the book ID or title to search for a book you want to update.",
    )
}

fn delete_search_page() -> Page {
    search_page(
        "delete/search",
        "Find Book to Delete",
        "Enter either the book ID or title to search for a book you want to delete.",
    )
}

async fn show_update_search(State(state): State<AppState>) -> Response {
    state
        .pages
        .render(StatusCode::OK, Template::BookSearch, update_search_page())
}

async fn find_for_update(
    State(state): State<AppState>,
    Form(query): Form<SearchQuery>,
) -> Response {
    match service::search(&state, &query).await {
        Ok(book) => edit_page(&state, book),
        Err(err) => error_page(&state, Template::BookSearch, update_search_page(), err),
    }
}

async fn update_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Response {
    let page = Page::new().title("Edit Book").description(EDIT_DESCRIPTION);

    let id = match parse_book_id(&id) {
        Ok(id) => id,
        Err(err) => return error_page(&state, Template::BookEdit, page, err),
    };
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(err) => return error_page(&state, Template::BookEdit, page, err),
    };

    match service::update(&state, id, draft).await {
        Ok(book) => {
            tracing::info!(user_id = user.id(), book_id = id, "book updated");
            state.pages.render(
                StatusCode::OK,
                Template::BookEdit,
                page.page_title("Edit Book")
                    .flash(
                        MessageType::Success,
                        format!("Book with ID {id} was successfully updated."),
                    )
                    .book(book),
            )
        }
        Err(err) => error_page(&state, Template::BookEdit, page, err),
    }
}

async fn show_delete_search(State(state): State<AppState>) -> Response {
    state
        .pages
        .render(StatusCode::OK, Template::BookSearch, delete_search_page())
}

async fn find_for_delete(
    State(state): State<AppState>,
    Form(query): Form<SearchQuery>,
) -> Response {
    match service::search(&state, &query).await {
        Ok(book) => state.pages.render(
            StatusCode::OK,
            Template::BookDelete,
            Page::new()
                .title("Confirm Book Deletion")
                .page_title("Confirm Book Deletion")
                .description(
                    "Please confirm that you want to permanently delete this book from your library.",
                )
                .book(book),
        ),
        Err(err) => error_page(&state, Template::BookSearch, delete_search_page(), err),
    }
}

async fn delete_book(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Response {
    let page = Page::new().title("Book List").description(LIST_DESCRIPTION);

    let id = match parse_book_id(&id) {
        Ok(id) => id,
        Err(err) => return error_page(&state, Template::BookList, page, err),
    };
    if let Err(err) = service::delete(&state, id).await {
        return error_page(&state, Template::BookList, page, err);
    }
    tracing::info!(user_id = user.id(), book_id = id, "book deleted");

    let page = page.page_title("Your Library").flash(
        MessageType::Success,
        format!("Book with ID {id} was successfully deleted."),
    );
    match service::list(&state).await {
        Ok(books) => state
            .pages
            .render(StatusCode::OK, Template::BookList, page.books(books)),
        Err(err) => error_page(&state, Template::BookList, page, err),
    }
}
