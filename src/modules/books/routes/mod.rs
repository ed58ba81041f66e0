//! HTTP route handlers for the books module.
//!
//! Every handler follows the same sequence: validate the payload (where
//! one exists), execute the store operation, serialize the response.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use bookshelf_db::Db;
use bookshelf_http::error::ApiError;

use super::schema;
use super::store::{BookStore, StoreError};

/// Build the books router with its store as shared state.
pub fn router(db: &Db) -> Router {
    let store = BookStore::new(db);

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(replace_book).delete(delete_book),
        )
        .with_state(store)
}

async fn create_book(
    State(store): State<BookStore>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let new = schema::validate_create(&payload).map_err(ApiError::validation)?;
    let book = store.create(&new).await.map_err(into_api_error)?;

    tracing::info!(isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(json!({ "book": book }))))
}

async fn list_books(State(store): State<BookStore>) -> Result<Json<Value>, ApiError> {
    let books = store.list().await.map_err(into_api_error)?;
    Ok(Json(json!({ "books": books })))
}

async fn get_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let book = store.get(&isbn).await.map_err(into_api_error)?;
    Ok(Json(json!({ "book": book })))
}

async fn replace_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let draft = schema::validate_replace(&payload).map_err(ApiError::validation)?;
    let book = store.replace(&isbn, &draft).await.map_err(into_api_error)?;

    tracing::info!(isbn = %book.isbn, "book replaced");
    Ok(Json(json!({ "book": book })))
}

async fn delete_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<Value>, ApiError> {
    store.delete(&isbn).await.map_err(into_api_error)?;

    tracing::info!(%isbn, "book deleted");
    Ok(Json(json!({ "message": "Book deleted" })))
}

fn into_api_error(error: StoreError) -> ApiError {
    match error {
        StoreError::NotFound(_) => ApiError::not_found(error.to_string()),
        StoreError::DuplicateIsbn(_) => ApiError::conflict(error.to_string()),
        StoreError::Db(_) => ApiError::Internal(anyhow::Error::new(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use crate::modules::books::models::NewBook;

    async fn test_app() -> (Router, BookStore) {
        let db = Db::connect("sqlite::memory:", 1).await.unwrap();
        db.apply_migration("books", "001_create_books", super::super::CREATE_BOOKS_TABLE)
            .await
            .unwrap();
        (router(&db), BookStore::new(&db))
    }

    async fn seed_book(store: &BookStore) -> String {
        let new = NewBook {
            isbn: "12345678".to_string(),
            amazon_url: "http://amazon-sample.com".to_string(),
            author: "Ben Davis".to_string(),
            language: "english".to_string(),
            pages: 200,
            publisher: "Oloye publishers".to_string(),
            title: "Get stronger".to_string(),
            year: 2010,
        };
        store.create(&new).await.unwrap().isbn
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(value) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn create_payload() -> Value {
        json!({
            "isbn": "98675634",
            "amazon_url": "https://amazon-testing.com",
            "author": "Kennedy Brown",
            "language": "english",
            "pages": 300,
            "publisher": "Princeton publisher",
            "title": "Eat a little less, exercise a little more",
            "year": 2020
        })
    }

    #[tokio::test]
    async fn create_returns_201_with_created_book() {
        let (app, _store) = test_app().await;

        let (status, body) = send(&app, "POST", "/", Some(create_payload())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["book"]["isbn"], json!("98675634"));
    }

    #[tokio::test]
    async fn create_without_author_is_400() {
        let (app, _store) = test_app().await;
        let mut payload = create_payload();
        payload.as_object_mut().unwrap().remove("author");

        let (status, body) = send(&app, "POST", "/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!(["missing required field: author"]));
    }

    #[tokio::test]
    async fn create_duplicate_isbn_is_409() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("isbn".to_string(), json!(isbn));

        let (status, _body) = send(&app, "POST", "/", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_returns_all_books() {
        let (app, store) = test_app().await;
        seed_book(&store).await;

        let (status, body) = send(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);

        let books = body["books"].as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["author"], json!("Ben Davis"));
    }

    #[tokio::test]
    async fn get_returns_single_book() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;

        let (status, body) = send(&app, "GET", &format!("/{isbn}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["book"]["isbn"], json!(isbn));
        assert_eq!(body["book"]["author"], json!("Ben Davis"));
    }

    #[tokio::test]
    async fn get_unknown_isbn_is_404() {
        let (app, _store) = test_app().await;

        let (status, body) = send(&app, "GET", "/25364783", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn replace_updates_book() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;

        let payload = json!({
            "amazon_url": "https://taco.com",
            "author": "Tester",
            "language": "english",
            "pages": 500,
            "publisher": "top publisher",
            "title": "Never give up",
            "year": 2000
        });
        let (status, body) = send(&app, "PUT", &format!("/{isbn}"), Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["book"]["title"], json!("Never give up"));
        assert_eq!(body["book"]["author"], json!("Tester"));
    }

    #[tokio::test]
    async fn replace_unknown_isbn_is_404() {
        let (app, _store) = test_app().await;

        let payload = json!({
            "amazon_url": "https://abc.com",
            "author": "Checker",
            "language": "english",
            "pages": 400,
            "publisher": "Main publisher",
            "title": "Keep going",
            "year": 2000
        });
        let (status, _body) = send(&app, "PUT", "/46573846", Some(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn replace_with_undeclared_fields_is_400() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;

        let payload = json!({
            "isbn": "32794782",
            "badField": "DO NOT ADD ME!",
            "amazon_url": "https://xyz.com",
            "author": "Tester",
            "language": "english",
            "pages": 1000,
            "publisher": "yeah right",
            "title": "UPDATED BOOK",
            "year": 2000
        });
        let (status, body) = send(&app, "PUT", &format!("/{isbn}"), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let messages = body["message"].as_array().unwrap();
        assert!(messages.contains(&json!("undeclared field: badField")));
        assert!(messages.contains(&json!("undeclared field: isbn")));

        // The stored record is untouched
        let (status, body) = send(&app, "GET", &format!("/{isbn}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["book"]["title"], json!("Get stronger"));
    }

    #[tokio::test]
    async fn delete_returns_confirmation() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;

        let (status, body) = send(&app, "DELETE", &format!("/{isbn}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Book deleted" }));
    }

    #[tokio::test]
    async fn delete_twice_is_404() {
        let (app, store) = test_app().await;
        let isbn = seed_book(&store).await;

        let (status, _body) = send(&app, "DELETE", &format!("/{isbn}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _body) = send(&app, "DELETE", &format!("/{isbn}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
