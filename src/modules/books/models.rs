use serde::{Deserialize, Serialize};

/// A persisted book record, keyed by isbn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier, immutable after creation
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Payload for creating a new book; the isbn is supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Payload replacing every mutable field of an existing book.
///
/// The isbn comes from the URL path and may not appear in the body.
#[derive(Debug, Clone, Deserialize)]
pub struct BookDraft {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}
