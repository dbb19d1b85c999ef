//! Built-in HTML pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use bookshelf_db::Book;

use super::{Page, PageRenderer, ResolvedPage, Template};

const STYLES: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f7f7f9; color: #222; }
header, main { max-width: 960px; margin: 0 auto; padding: 1rem; }
nav a { margin-right: 1rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }
.alert { padding: .6rem 1rem; border-radius: 4px; margin: 1rem 0; }
.alert-success { background: #e6f4ea; }
.alert-info { background: #e8f0fe; }
.alert-warning { background: #fef7e0; }
.alert-danger { background: #fce8e6; }
label { display: block; margin-top: .6rem; }
"#;

/// Renders pages as self-contained HTML documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl PageRenderer for HtmlRenderer {
    fn render(&self, status: StatusCode, template: Template, page: Page) -> Response {
        let page = page.resolve(status);
        tracing::debug!(
            template = template.name(),
            status = status.as_u16(),
            "rendering page"
        );
        (status, Html(render_document(template, &page))).into_response()
    }
}

fn render_document(template: Template, page: &ResolvedPage) -> String {
    let mut content = String::with_capacity(2048);

    if !page.message.is_empty() {
        content.push_str("<div class=\"alert alert-");
        content.push_str(page.message_type);
        content.push_str("\">");
        content.push_str(&html_escape(&page.message));
        content.push_str("</div>\n");
    }

    match template {
        Template::Index => render_index(&mut content),
        Template::Register => render_credentials_form(&mut content, "/register", "Register"),
        Template::Login => render_credentials_form(&mut content, "/login", "Sign in"),
        Template::BookList => render_book_list(&mut content, &page.books),
        Template::BookDetails => {
            if let Some(book) = &page.book {
                render_book_details(&mut content, book);
            }
        }
        Template::BookAdd => render_book_form(&mut content, "/books/add", None),
        Template::BookEdit => {
            let action = page
                .book
                .as_ref()
                .map(|b| format!("/books/update/{}", b.id))
                .unwrap_or_else(|| "/books/update/search".to_string());
            render_book_form(&mut content, &action, page.book.as_ref());
        }
        Template::BookSearch => {
            render_search_form(&mut content, page.action.unwrap_or("update/search"))
        }
        Template::BookDelete => {
            if let Some(book) = &page.book {
                render_delete_confirmation(&mut content, book);
            }
        }
    }

    html_page(page, &content)
}

fn html_page(page: &ResolvedPage, content: &str) -> String {
    let mut html = String::with_capacity(content.len() + 1500);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("    <meta name=\"description\" content=\"");
    html.push_str(&html_escape(&page.description));
    html.push_str("\">\n    <title>");
    html.push_str(&html_escape(&page.title));
    html.push_str("</title>\n    <style>");
    html.push_str(STYLES);
    html.push_str("</style>\n</head>\n<body>\n<header>\n");
    html.push_str("<nav><a href=\"/\">Home</a><a href=\"/books/list\">Library</a>");
    html.push_str("<a href=\"/books/add\">Add</a><a href=\"/logout\">Logout</a></nav>\n");
    html.push_str("<h1>");
    html.push_str(&html_escape(&page.page_title));
    html.push_str("</h1>\n<p>");
    html.push_str(&html_escape(&page.description));
    html.push_str("</p>\n</header>\n<main>\n");
    html.push_str(content);
    html.push_str("\n</main>\n</body>\n</html>");
    html
}

fn render_index(content: &mut String) {
    content.push_str("<ul>\n");
    for (href, label) in [
        ("/books/list", "Browse your library"),
        ("/books/add", "Add a book"),
        ("/books/update/search", "Update a book"),
        ("/books/delete/search", "Delete a book"),
        ("/login", "Sign in"),
        ("/register", "Create an account"),
    ] {
        content.push_str("<li><a href=\"");
        content.push_str(href);
        content.push_str("\">");
        content.push_str(label);
        content.push_str("</a></li>\n");
    }
    content.push_str("</ul>");
}

fn render_credentials_form(content: &mut String, action: &str, submit: &str) {
    content.push_str("<form method=\"POST\" action=\"");
    content.push_str(action);
    content.push_str("\">\n");
    content.push_str("<label for=\"email\">Email</label>\n");
    content.push_str("<input type=\"email\" id=\"email\" name=\"email\" required autocomplete=\"username\">\n");
    content.push_str("<label for=\"password\">Password</label>\n");
    content.push_str("<input type=\"password\" id=\"password\" name=\"password\" required>\n");
    content.push_str("<button type=\"submit\">");
    content.push_str(submit);
    content.push_str("</button>\n</form>");
}

fn render_book_list(content: &mut String, books: &[Book]) {
    content.push_str("<table>\n<thead><tr><th>ID</th><th>Title</th><th>Author</th>");
    content.push_str("<th>Year</th><th>Genre</th><th>ISBN</th><th>Rating</th><th>Read</th></tr></thead>\n<tbody>\n");
    for book in books {
        content.push_str(&format!(
            "<tr><td>{id}</td><td><a href=\"/books/{id}\">{title}</a></td><td>{author}</td>\
             <td>{year}</td><td>{genre}</td><td>{isbn}</td><td>{rating:.1}</td><td>{read}</td></tr>\n",
            id = book.id,
            title = html_escape(&book.title),
            author = html_escape(&book.author),
            year = book.year,
            genre = html_escape(&book.genre),
            isbn = html_escape(&book.isbn),
            rating = book.rating,
            read = if book.read { "yes" } else { "no" },
        ));
    }
    content.push_str("</tbody>\n</table>");
}

fn render_book_details(content: &mut String, book: &Book) {
    content.push_str(&format!(
        "<dl>\n<dt>Title</dt><dd>{title}</dd>\n<dt>Author</dt><dd>{author}</dd>\n\
         <dt>Year</dt><dd>{year}</dd>\n<dt>Genre</dt><dd>{genre}</dd>\n\
         <dt>ISBN</dt><dd>{isbn}</dd>\n<dt>Rating</dt><dd>{rating:.1}</dd>\n\
         <dt>Read</dt><dd>{read}</dd>\n</dl>\n\
         <a href=\"/books/edit/{id}\">Edit</a>\n",
        id = book.id,
        title = html_escape(&book.title),
        author = html_escape(&book.author),
        year = book.year,
        genre = html_escape(&book.genre),
        isbn = html_escape(&book.isbn),
        rating = book.rating,
        read = if book.read { "yes" } else { "no" },
    ));
}

fn render_book_form(content: &mut String, action: &str, book: Option<&Book>) {
    let value = |f: fn(&Book) -> String| book.map(f).map(|v| html_escape(&v)).unwrap_or_default();

    content.push_str("<form method=\"POST\" action=\"");
    content.push_str(&html_escape(action));
    content.push_str("\">\n");
    for (name, label, kind, current) in [
        ("title", "Title", "text", value(|b| b.title.clone())),
        ("author", "Author", "text", value(|b| b.author.clone())),
        ("year", "Year", "number", value(|b| b.year.to_string())),
        ("genre", "Genre", "text", value(|b| b.genre.clone())),
        ("isbn", "ISBN", "text", value(|b| b.isbn.clone())),
        ("rating", "Rating", "number", value(|b| format!("{:.1}", b.rating))),
    ] {
        content.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n\
             <input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{current}\"{step}>\n",
            step = if name == "rating" { " step=\"0.1\"" } else { "" },
        ));
    }

    let checked = if book.is_some_and(|b| b.read) { " checked" } else { "" };
    content.push_str(&format!(
        "<label><input type=\"checkbox\" name=\"read\" value=\"yes\"{checked}> Read</label>\n"
    ));
    content.push_str("<button type=\"submit\">Save</button>\n</form>");
}

fn render_search_form(content: &mut String, action: &str) {
    content.push_str("<form method=\"POST\" action=\"/books/");
    content.push_str(&html_escape(action));
    content.push_str("\">\n");
    content.push_str("<label for=\"id\">ID</label>\n<input type=\"text\" id=\"id\" name=\"id\">\n");
    content.push_str(
        "<label for=\"title\">Title</label>\n<input type=\"text\" id=\"title\" name=\"title\">\n",
    );
    content.push_str("<button type=\"submit\">Search</button>\n</form>");
}

fn render_delete_confirmation(content: &mut String, book: &Book) {
    content.push_str(&format!(
        "<p>Delete <strong>{title}</strong> by {author} (ID {id})?</p>\n\
         <form method=\"POST\" action=\"/books/delete/{id}\">\n\
         <button type=\"submit\">Delete</button>\n</form>\n\
         <a href=\"/books/list\">Cancel</a>",
        id = book.id,
        title = html_escape(&book.title),
        author = html_escape(&book.author),
    ));
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
