pub mod forms;
pub mod models;
mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use models::Shelf;
use shelf_http::{router::error_response, AppError};
use shelf_kernel::{AppState, InitCtx, Migration, Module};

/// Reviews shown per page on the shelf detail view
pub const REVIEWS_PER_PAGE: i64 = 3;
/// How many shelves the listing ranks
pub const RANKING_SIZE: i64 = 3;

/// Shelves (cataloged books) and their reviews
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
        tokio::fs::create_dir_all(&ctx.settings.media.root).await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            media_root = %ctx.settings.media.root.display(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, state: &AppState) -> Router {
        routes::router(state)
    }

    fn openapi(&self) -> Option<Value> {
        let id_param = json!([{
            "name": "id", "in": "path", "required": true, "schema": { "type": "integer" }
        }]);
        let redirect = |to: &str| {
            json!({
                "description": format!("Redirect to {}", to),
                "headers": { "Location": { "schema": { "type": "string" } } }
            })
        };
        let shelf_form = json!({
            "required": true,
            "content": {
                "multipart/form-data": {
                    "schema": { "$ref": "#/components/schemas/ShelfForm" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List shelves newest first with the top-3 ranking",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Shelves and ranking",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "shelves": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Shelf" }
                                                },
                                                "ranking": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/RankedShelf" }
                                                }
                                            }
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/book/create/": {
                    "get": {
                        "summary": "Describe the shelf form",
                        "tags": ["Books"],
                        "responses": { "200": { "description": "Fields and category choices" } }
                    },
                    "post": {
                        "summary": "Create a shelf",
                        "tags": ["Books"],
                        "requestBody": shelf_form.clone(),
                        "responses": {
                            "303": redirect("/"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/book/{id}/detail/": {
                    "get": {
                        "summary": "Shelf with a page of its reviews",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } },
                            { "name": "page", "in": "query", "required": false, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": { "description": "Shelf and paginated reviews" },
                            "404": error_response("Shelf not found")
                        }
                    }
                },
                "/book/{id}/update/": {
                    "get": {
                        "summary": "Current shelf values for editing (owner only)",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": { "description": "Shelf" },
                            "403": error_response("Not the owner"),
                            "404": error_response("Shelf not found")
                        }
                    },
                    "post": {
                        "summary": "Update a shelf (owner only)",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "requestBody": shelf_form,
                        "responses": {
                            "303": redirect("/"),
                            "403": error_response("Not the owner"),
                            "404": error_response("Shelf not found"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/book/{id}/delete/": {
                    "get": {
                        "summary": "Confirm deletion (owner only)",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": { "description": "Shelf" },
                            "403": error_response("Not the owner"),
                            "404": error_response("Shelf not found")
                        }
                    },
                    "post": {
                        "summary": "Delete a shelf with its reviews and notes (owner only)",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "303": redirect("/"),
                            "403": error_response("Not the owner"),
                            "404": error_response("Shelf not found")
                        }
                    }
                },
                "/book/{id}/review/": {
                    "get": {
                        "summary": "Shelf a review would be attached to",
                        "tags": ["Reviews"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": { "description": "Shelf" },
                            "404": error_response("Shelf not found")
                        }
                    },
                    "post": {
                        "summary": "Review a shelf",
                        "tags": ["Reviews"],
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/ReviewForm" }
                                }
                            }
                        },
                        "responses": {
                            "303": redirect("/book/{id}/detail/"),
                            "404": error_response("Shelf not found"),
                            "422": error_response("Validation error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Shelf": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string", "maxLength": 100 },
                            "text": { "type": "string" },
                            "category": { "type": "string", "enum": ["business", "life", "hobby", "other"] },
                            "thumbnail": { "type": ["string", "null"] },
                            "thumbnail_url": { "type": ["string", "null"] },
                            "user_id": { "type": "integer" }
                        },
                        "required": ["id", "title", "text", "category", "user_id"]
                    },
                    "RankedShelf": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Shelf" },
                            {
                                "type": "object",
                                "properties": { "average_rate": { "type": ["number", "null"] } }
                            }
                        ]
                    },
                    "ShelfForm": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "text": { "type": "string" },
                            "category": { "type": "string" },
                            "thumbnail": { "type": "string", "format": "binary" }
                        },
                        "required": ["title", "text", "category"]
                    },
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "shelf_id": { "type": "integer" },
                            "title": { "type": "string" },
                            "text": { "type": "string" },
                            "rate": { "type": "integer", "minimum": 0, "maximum": 5 },
                            "user_id": { "type": "integer" }
                        },
                        "required": ["id", "shelf_id", "title", "text", "rate", "user_id"]
                    },
                    "ReviewForm": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "text": { "type": "string" },
                            "rate": { "type": "integer" }
                        },
                        "required": ["title", "text", "rate"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE shelves (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL CHECK (length(title) <= 100),
                    text TEXT NOT NULL,
                    category TEXT NOT NULL
                        CHECK (category IN ('business', 'life', 'hobby', 'other')),
                    thumbnail TEXT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    shelf_id INTEGER NOT NULL REFERENCES shelves(id) ON DELETE CASCADE,
                    title TEXT NOT NULL CHECK (length(title) <= 100),
                    text TEXT NOT NULL,
                    rate INTEGER NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE INDEX reviews_shelf_id ON reviews (shelf_id);
                "#,
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

/// Load a shelf by id, or answer 404.
pub async fn shelf_or_404(state: &AppState, id: i64) -> Result<Shelf, AppError> {
    store::get_shelf(&state.db, id)
        .await?
        .map(|shelf| shelf.with_media(&state.settings().media))
        .ok_or_else(|| AppError::not_found(format!("shelf {} not found", id)))
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
