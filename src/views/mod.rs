//! Server-rendered pages.
//!
//! Handlers describe a page as a [`Template`] plus a [`Page`] payload and hand
//! both to a [`PageRenderer`] together with the status code. Fields left unset
//! on the payload fall back to site-wide defaults that depend on whether the
//! status is an error.

mod html;

use axum::{http::StatusCode, response::Response};
use bookshelf_db::Book;

pub use html::HtmlRenderer;

const SITE_TITLE: &str = "BookManager";
const ERROR_PAGE_TITLE: &str = "Error Situation";
const DEFAULT_DESCRIPTION: &str =
    "Manage your personal library. Add, edit, and organize your favorite books.";
const ERROR_DESCRIPTION: &str = "An unexpected error occurred. Please try again later.";

/// Renders a page for a response.
pub trait PageRenderer: Send + Sync {
    fn render(&self, status: StatusCode, template: Template, page: Page) -> Response;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Register,
    Login,
    BookList,
    BookDetails,
    BookAdd,
    BookEdit,
    BookSearch,
    BookDelete,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Index => "index.html",
            Template::Register => "register.html",
            Template::Login => "login.html",
            Template::BookList => "books_list.html",
            Template::BookDetails => "book_details.html",
            Template::BookAdd => "book_add.html",
            Template::BookEdit => "book_edit.html",
            Template::BookSearch => "book_search.html",
            Template::BookDelete => "book_delete.html",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Info,
    Warning,
    Danger,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Success => "success",
            MessageType::Info => "info",
            MessageType::Warning => "warning",
            MessageType::Danger => "danger",
        }
    }
}

/// One-line notice shown above the page body.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: MessageType,
    pub text: String,
}

/// Payload of a rendered page. Unset fields take the defaults in [`Page::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: Option<String>,
    pub page_title: Option<String>,
    pub description: Option<String>,
    pub flash: Option<Flash>,
    pub books: Vec<Book>,
    pub book: Option<Book>,
    /// Target of a search form, relative to `/books/`.
    pub action: Option<&'static str>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_title(mut self, page_title: impl Into<String>) -> Self {
        self.page_title = Some(page_title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn flash(mut self, kind: MessageType, text: impl Into<String>) -> Self {
        self.flash = Some(Flash {
            kind,
            text: text.into(),
        });
        self
    }

    pub fn books(mut self, books: Vec<Book>) -> Self {
        self.books = books;
        self
    }

    pub fn book(mut self, book: Book) -> Self {
        self.book = Some(book);
        self
    }

    pub fn action(mut self, action: &'static str) -> Self {
        self.action = Some(action);
        self
    }

    /// Fill unset fields with the site defaults for `status`.
    pub fn resolve(self, status: StatusCode) -> ResolvedPage {
        let is_error = status.as_u16() >= 400;
        ResolvedPage {
            title: self.title.unwrap_or_else(|| SITE_TITLE.to_string()),
            page_title: self.page_title.unwrap_or_else(|| {
                if is_error { ERROR_PAGE_TITLE } else { SITE_TITLE }.to_string()
            }),
            description: self.description.unwrap_or_else(|| {
                if is_error {
                    ERROR_DESCRIPTION
                } else {
                    DEFAULT_DESCRIPTION
                }
                .to_string()
            }),
            message: self.flash.as_ref().map(|f| f.text.clone()).unwrap_or_default(),
            message_type: self
                .flash
                .as_ref()
                .map(|f| f.kind.as_str())
                .unwrap_or_default(),
            books: self.books,
            book: self.book,
            action: self.action,
        }
    }
}

/// A [`Page`] with every default applied.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub title: String,
    pub page_title: String,
    pub description: String,
    pub message: String,
    pub message_type: &'static str,
    pub books: Vec<Book>,
    pub book: Option<Book>,
    pub action: Option<&'static str>,
}
