//! HTTP handlers for notes.

use axum::{
    extract::State,
    response::Redirect,
    routing::get,
    Form, Json, Router,
};
use serde_json::{json, Value};

use super::models::{Note, NoteForm};
use super::store;
use crate::modules::accounts::CurrentUser;
use crate::modules::books::shelf_or_404;
use crate::utils::path::RecordId;
use shelf_authz::{authorize, Action};
use shelf_http::AppError;
use shelf_kernel::AppState;

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/book/{id}/note/add/", get(add_form).post(add))
        .route("/notes/", get(list))
        .route("/note/{id}/", get(detail))
        .route("/note/{id}/update/", get(update_form).post(update))
        .route("/note/{id}/delete/", get(delete_confirm).post(delete))
        .with_state(state.clone())
}

async fn note_or_404(state: &AppState, id: i64) -> Result<Note, AppError> {
    store::get_note(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("note {} not found", id)))
}

async fn add_form(
    State(state): State<AppState>,
    _user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    Ok(Json(json!({
        "book": shelf,
        "fields": ["title", "content"],
    })))
}

async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
    Form(form): Form<NoteForm>,
) -> Result<Redirect, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    let input = form.validate()?;

    let note = store::insert_note(&state.db, shelf.id, user.id(), &input).await?;
    tracing::info!(note_id = note.id, shelf_id = shelf.id, user_id = user.id(), "note created");

    Ok(Redirect::to("/notes/"))
}

async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Value>, AppError> {
    let notes = store::list_for_user(&state.db, user.id()).await?;
    Ok(Json(json!({ "notes": notes })))
}

async fn detail(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let note = note_or_404(&state, id).await?;
    if !state.settings().notes.shared_read {
        authorize(user.id(), &note, Action::Read)?;
    }

    Ok(Json(json!({ "note": note })))
}

async fn update_form(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let note = note_or_404(&state, id).await?;
    authorize(user.id(), &note, Action::Update)?;

    Ok(Json(json!({
        "note": note,
        "fields": ["title", "content"],
    })))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
    Form(form): Form<NoteForm>,
) -> Result<Redirect, AppError> {
    let note = note_or_404(&state, id).await?;
    authorize(user.id(), &note, Action::Update)?;
    let input = form.validate()?;

    store::update_note(&state.db, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(format!("note {} not found", id)))?;
    tracing::info!(note_id = id, user_id = user.id(), "note updated");

    Ok(Redirect::to(&format!("/note/{}/", id)))
}

async fn delete_confirm(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let note = note_or_404(&state, id).await?;
    authorize(user.id(), &note, Action::Delete)?;

    Ok(Json(json!({ "note": note })))
}

async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Redirect, AppError> {
    let note = note_or_404(&state, id).await?;
    authorize(user.id(), &note, Action::Delete)?;

    store::delete_note(&state.db, id).await?;
    tracing::info!(note_id = id, user_id = user.id(), "note deleted");

    Ok(Redirect::to(&format!("/book/{}/detail/", note.shelf_id)))
}
