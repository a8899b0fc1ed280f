pub mod models;
pub mod session;
pub mod store;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::utils::forms::FieldErrors;
use models::{LoginForm, LoginQuery, SignupForm};
pub use session::CurrentUser;
use shelf_http::{router::error_response, AppError};
use shelf_kernel::{AppState, InitCtx, Migration, Module};

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

/// Users, sessions, and the login/logout/signup flow
pub struct AccountsModule;

impl AccountsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for AccountsModule {
    fn name(&self) -> &'static str {
        "accounts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            login_url = %ctx.settings.auth.login_url,
            "accounts module initialized"
        );
        Ok(())
    }

    fn routes(&self, state: &AppState) -> Router {
        Router::new()
            .route("/accounts/login/", get(login_page).post(login))
            .route("/accounts/logout/", post(logout))
            .route("/accounts/signup/", post(signup))
            .with_state(state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let redirect = json!({
            "description": "Redirect to the next page",
            "headers": { "Location": { "schema": { "type": "string" } } }
        });
        let form = |fields: &[&str]| {
            let properties: serde_json::Map<String, Value> = fields
                .iter()
                .map(|field| (field.to_string(), json!({ "type": "string" })))
                .collect();
            json!({
                "required": true,
                "content": {
                    "application/x-www-form-urlencoded": {
                        "schema": { "type": "object", "properties": properties }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/accounts/login/": {
                    "get": {
                        "summary": "Describe the login form",
                        "tags": ["Accounts"],
                        "responses": { "200": { "description": "Form fields and next target" } }
                    },
                    "post": {
                        "summary": "Sign in and start a session",
                        "tags": ["Accounts"],
                        "requestBody": form(&["username", "password", "next"]),
                        "responses": {
                            "303": redirect.clone(),
                            "401": error_response("Bad credentials")
                        }
                    }
                },
                "/accounts/logout/": {
                    "post": {
                        "summary": "End the current session",
                        "tags": ["Accounts"],
                        "responses": { "303": redirect.clone() }
                    }
                },
                "/accounts/signup/": {
                    "post": {
                        "summary": "Register and sign in",
                        "tags": ["Accounts"],
                        "requestBody": form(&["username", "password"]),
                        "responses": {
                            "303": redirect.clone(),
                            "409": error_response("Username already taken"),
                            "422": error_response("Validation error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" },
                            "date_joined": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "username", "date_joined"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE CHECK (length(username) BETWEEN 1 AND 150),
                    password_hash TEXT NOT NULL,
                    date_joined TEXT NOT NULL
                );
                CREATE TABLE sessions (
                    token TEXT PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at INTEGER NOT NULL,
                    expires_at INTEGER NOT NULL
                );
                CREATE INDEX sessions_expires_at ON sessions (expires_at);
                "#,
        }]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let purged = store::purge_expired_sessions(ctx.db).await?;
        tracing::info!(module = self.name(), purged, "accounts module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "accounts module stopped");
        Ok(())
    }
}

async fn login_page(Query(query): Query<LoginQuery>) -> Json<Value> {
    Json(json!({
        "fields": ["username", "password"],
        "next": session::safe_next(query.next.as_deref()),
    }))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let mut errors = FieldErrors::new();
    let username = errors.text("username", form.username.as_deref(), None);
    let password = form.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "required");
    }
    errors.finish("invalid login form")?;

    let Some(user) = store::authenticate(&state.db, &username, &password).await? else {
        tracing::debug!(username = %username, "login rejected");
        return Err(AppError::unauthorized(
            "Please enter a correct username and password.",
        ));
    };

    let auth = &state.settings().auth;
    let token = store::create_session(&state.db, user.id, auth.session_ttl_hours).await?;
    tracing::info!(user_id = user.id, "user logged in");

    let target = session::safe_next(form.next.as_deref()).to_string();
    Ok((
        jar.add(session::session_cookie(auth, token)),
        Redirect::to(&target),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let auth = &state.settings().auth;
    if let Some(cookie) = jar.get(&auth.session_cookie) {
        store::delete_session(&state.db, cookie.value()).await?;
    }

    Ok((
        jar.remove(session::expired_session_cookie(auth)),
        Redirect::to("/"),
    ))
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let mut errors = FieldErrors::new();
    let username = errors.text("username", form.username.as_deref(), Some(USERNAME_MAX_CHARS));
    let password = form.password.unwrap_or_default();
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("must contain at least {} characters", PASSWORD_MIN_CHARS),
        );
    }
    errors.finish("invalid signup form")?;

    if store::username_taken(&state.db, &username).await? {
        return Err(username_taken());
    }

    // A concurrent signup can still win the name between check and insert
    let user = match store::create_user(&state.db, &username, &password).await {
        Ok(user) => user,
        Err(e) if store::is_unique_violation(&e) => return Err(username_taken()),
        Err(e) => return Err(e.into()),
    };
    let auth = &state.settings().auth;
    let token = store::create_session(&state.db, user.id, auth.session_ttl_hours).await?;

    Ok((
        jar.add(session::session_cookie(auth, token)),
        Redirect::to("/"),
    ))
}

fn username_taken() -> AppError {
    AppError::conflict(
        vec![json!({ "field": "username", "error": "already taken" })],
        "A user with that username already exists.",
    )
}

/// Create a new instance of the accounts module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AccountsModule::new())
}
