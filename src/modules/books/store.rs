//! Book persistence: one parameterized statement per operation.

use sqlx::SqlitePool;
use thiserror::Error;

use bookshelf_db::{is_unique_violation, Db};

use super::models::{Book, BookDraft, NewBook};

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no book found with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    DuplicateIsbn(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Entity operations over the `books` table.
///
/// Missing rows are decided by inspecting the result set or affected-row
/// count, never by classifying a driver error. Duplicate isbns are the one
/// storage-enforced invariant and are classified from the UNIQUE violation.
#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(db: &Db) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Insert a new book and return the created record.
    pub async fn create(&self, new: &NewBook) -> Result<Book, StoreError> {
        let result = sqlx::query_as::<_, Book>(
            "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&new.isbn)
        .bind(&new.amazon_url)
        .bind(&new.author)
        .bind(&new.language)
        .bind(new.pages)
        .bind(&new.publisher)
        .bind(&new.title)
        .bind(new.year)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|error| {
            if is_unique_violation(&error) {
                StoreError::DuplicateIsbn(new.isbn.clone())
            } else {
                StoreError::Db(error)
            }
        })
    }

    /// All books in insertion order.
    pub async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// The single book matching `isbn`.
    pub async fn get(&self, isbn: &str) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    /// Replace every mutable field of the book matching `isbn`.
    pub async fn replace(&self, isbn: &str, draft: &BookDraft) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "UPDATE books \
             SET amazon_url = ?, author = ?, language = ?, pages = ?, publisher = ?, title = ?, year = ? \
             WHERE isbn = ? \
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&draft.amazon_url)
        .bind(&draft.author)
        .bind(&draft.language)
        .bind(draft.pages)
        .bind(&draft.publisher)
        .bind(&draft.title)
        .bind(draft.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    /// Delete the book matching `isbn`.
    pub async fn delete(&self, isbn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(isbn.to_string()));
        }

        Ok(())
    }
}
