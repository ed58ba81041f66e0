pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Db;
use bookshelf_kernel::{InitCtx, Migration, Module};

pub(crate) const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    isbn        TEXT PRIMARY KEY,
    amazon_url  TEXT NOT NULL,
    author      TEXT NOT NULL,
    language    TEXT NOT NULL,
    pages       INTEGER NOT NULL,
    publisher   TEXT NOT NULL,
    title       TEXT NOT NULL,
    year        INTEGER NOT NULL
);
"#;

/// Books module: CRUD over the book catalog
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, db: &Db) -> Router {
        routes::router(db)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "books": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Book" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "The created book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "book": { "$ref": "#/components/schemas/Book" }
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation failed",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "409": {
                                "description": "A book with this isbn already exists",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by isbn",
                        "tags": ["Books"],
                        "parameters": [
                            { "$ref": "#/components/parameters/Isbn" }
                        ],
                        "responses": {
                            "200": {
                                "description": "The matching book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "book": { "$ref": "#/components/schemas/Book" }
                                            }
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book with this isbn",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [
                            { "$ref": "#/components/parameters/Isbn" }
                        ],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDraft" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The updated book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "book": { "$ref": "#/components/schemas/Book" }
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation failed",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book with this isbn",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [
                            { "$ref": "#/components/parameters/Isbn" }
                        ],
                        "responses": {
                            "200": {
                                "description": "Deletion confirmation",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string" }
                                            }
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book with this isbn",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "parameters": {
                    "Isbn": {
                        "name": "isbn",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" },
                        "description": "Unique book identifier"
                    }
                },
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string" },
                            "amazon_url": { "type": "string" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer", "minimum": 1 },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer" }
                        },
                        "required": ["isbn", "amazon_url", "author", "language", "pages", "publisher", "title", "year"]
                    },
                    "NewBook": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "isbn": { "type": "string" },
                            "amazon_url": { "type": "string" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer", "minimum": 1 },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer" }
                        },
                        "required": ["isbn", "amazon_url", "author", "language", "pages", "publisher", "title", "year"]
                    },
                    "BookDraft": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "amazon_url": { "type": "string" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer", "minimum": 1 },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer" }
                        },
                        "required": ["amazon_url", "author", "language", "pages", "publisher", "title", "year"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS_TABLE,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
