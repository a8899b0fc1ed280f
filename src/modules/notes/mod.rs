pub mod models;
mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use shelf_http::router::error_response;
use shelf_kernel::{AppState, InitCtx, Migration, Module};

/// Per-user notes attached to shelves
pub struct NotesModule;

impl NotesModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for NotesModule {
    fn name(&self) -> &'static str {
        "notes"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            shared_read = ctx.settings.notes.shared_read,
            "notes module initialized"
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
        let note_form = json!({
            "required": true,
            "content": {
                "application/x-www-form-urlencoded": {
                    "schema": { "$ref": "#/components/schemas/NoteForm" }
                }
            }
        });
        let redirect = |to: &str| {
            json!({
                "description": format!("Redirect to {}", to),
                "headers": { "Location": { "schema": { "type": "string" } } }
            })
        };
        let note = json!({
            "description": "Note",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "object",
                        "properties": { "note": { "$ref": "#/components/schemas/Note" } }
                    }
                }
            }
        });

        Some(json!({
            "paths": {
                "/book/{id}/note/add/": {
                    "get": {
                        "summary": "Shelf a new note would be attached to",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": { "description": "Shelf" },
                            "404": error_response("Shelf not found")
                        }
                    },
                    "post": {
                        "summary": "Add a note to a shelf",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "requestBody": note_form.clone(),
                        "responses": {
                            "303": redirect("/notes/"),
                            "404": error_response("Shelf not found"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/notes/": {
                    "get": {
                        "summary": "The caller's notes, newest first",
                        "tags": ["Notes"],
                        "responses": {
                            "200": {
                                "description": "Notes",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "notes": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Note" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/note/{id}/": {
                    "get": {
                        "summary": "A single note",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": note.clone(),
                            "403": error_response("Not the author"),
                            "404": error_response("Note not found")
                        }
                    }
                },
                "/note/{id}/update/": {
                    "get": {
                        "summary": "Current note values for editing (author only)",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": note.clone(),
                            "403": error_response("Not the author"),
                            "404": error_response("Note not found")
                        }
                    },
                    "post": {
                        "summary": "Update a note (author only)",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "requestBody": note_form,
                        "responses": {
                            "303": redirect("/note/{id}/"),
                            "403": error_response("Not the author"),
                            "404": error_response("Note not found"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/note/{id}/delete/": {
                    "get": {
                        "summary": "Confirm deletion (author only)",
                        "tags": ["Notes"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": note,
                            "403": error_response("Not the author"),
                            "404": error_response("Note not found")
                        }
                    },
                    "post": {
                        "summary": "Delete a note (author only)",
                        "tags": ["Notes"],
                        "parameters": id_param,
                        "responses": {
                            "303": redirect("/book/{shelf_id}/detail/"),
                            "403": error_response("Not the author"),
                            "404": error_response("Note not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Note": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "shelf_id": { "type": "integer" },
                            "user_id": { "type": "integer" },
                            "title": { "type": "string", "maxLength": 100 },
                            "content": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "shelf_id", "user_id", "title", "content", "created_at"]
                    },
                    "NoteForm": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "content": { "type": "string" }
                        },
                        "required": ["title", "content"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE notes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    shelf_id INTEGER NOT NULL REFERENCES shelves(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    title TEXT NOT NULL CHECK (length(title) <= 100),
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX notes_user_created ON notes (user_id, created_at);
                "#,
        }]
    }
}

/// Create a new instance of the notes module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(NotesModule::new())
}
