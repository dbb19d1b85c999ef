use bookshelf_db::BookDraft;
use serde::Deserialize;

use super::error::BookError;

/// Fields of the add and edit forms, all as submitted text.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub read: String,
}

impl BookForm {
    /// Lenient conversion: unparsable numbers become 0, the title is required.
    pub fn into_draft(self) -> Result<BookDraft, BookError> {
        let draft = BookDraft {
            year: parse_year(&self.year),
            rating: parse_rating(&self.rating),
            read: parse_read_flag(&self.read),
            title: self.title,
            author: self.author,
            genre: self.genre,
            isbn: self.isbn,
        }
        .normalized();

        if !draft.has_title() {
            return Err(BookError::title_required());
        }
        Ok(draft)
    }
}

/// Validate and normalise a draft that arrived as JSON.
pub fn check_draft(draft: BookDraft) -> Result<BookDraft, BookError> {
    let draft = draft.normalized();
    if !draft.has_title() {
        return Err(BookError::title_required());
    }
    Ok(draft)
}

fn parse_year(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

fn parse_rating(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

/// Checkbox and free-text spellings of "yes".
fn parse_read_flag(value: &str) -> bool {
    let value = value.trim();
    ["yes", "true", "on"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}
