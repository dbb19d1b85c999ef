use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A book in the personal library.
///
/// The JSON form of this struct is also the cache wire format, so field names
/// are part of the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
    pub isbn: String,
    /// Always rounded to one decimal place.
    pub rating: f64,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Soft-delete marker; deleted books are invisible to every query.
    #[serde(skip)]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Writable fields of a [`Book`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub read: bool,
}

impl BookDraft {
    /// Trim text fields and round the rating.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.genre = self.genre.trim().to_string();
        self.isbn = self.isbn.trim().to_string();
        self.rating = round_rating(self.rating);
        self
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Round a rating to one decimal place; non-finite input becomes 0.
pub fn round_rating(rating: f64) -> f64 {
    if !rating.is_finite() {
        return 0.0;
    }
    (rating * 10.0).round() / 10.0
}

/// A registered account that can sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn rating_rounds_to_one_decimal() {
        assert_eq!(round_rating(4.26), 4.3);
        assert_eq!(round_rating(4.24), 4.2);
        assert_eq!(round_rating(3.0), 3.0);
        assert_eq!(round_rating(f64::NAN), 0.0);
    }

    #[test]
    fn draft_normalization_trims_and_rounds() {
        let draft = BookDraft {
            title: "  Dune ".to_string(),
            author: " Frank Herbert".to_string(),
            rating: 4.66,
            ..BookDraft::default()
        }
        .normalized();

        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.author, "Frank Herbert");
        assert_eq!(draft.rating, 4.7);
    }

    #[test]
    fn blank_title_is_not_a_title() {
        let draft = BookDraft {
            title: "   ".to_string(),
            ..BookDraft::default()
        };
        assert!(!draft.has_title());
    }

    #[test]
    fn wire_format_uses_contract_field_names() {
        let book = Book {
            id: 7,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
            genre: "sci-fi".to_string(),
            isbn: "9780441013593".to_string(),
            rating: 4.5,
            read: true,
            created_at: datetime!(2024-01-01 10:00 UTC),
            updated_at: datetime!(2024-01-02 10:00 UTC),
            deleted_at: Some(datetime!(2024-01-03 10:00 UTC)),
        };

        let value = serde_json::to_value(&book).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "author",
                "created_at",
                "genre",
                "id",
                "isbn",
                "rating",
                "read",
                "title",
                "updated_at",
                "year"
            ]
        );
        assert_eq!(object["created_at"], "2024-01-01T10:00:00Z");
    }
}
