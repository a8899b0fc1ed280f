use axum::{
    extract::State,
    response::Redirect,
    Form, Json,
};
use serde_json::{json, Value};

use crate::modules::accounts::CurrentUser;
use crate::modules::books::models::ReviewForm;
use crate::modules::books::{shelf_or_404, store};
use crate::utils::path::RecordId;
use shelf_http::AppError;
use shelf_kernel::AppState;

/// The shelf a new review would be attached to
pub(super) async fn form(
    State(state): State<AppState>,
    _user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    Ok(Json(json!({
        "book": shelf,
        "fields": ["title", "text", "rate"],
    })))
}

pub(super) async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    let input = form.validate()?;

    let review = store::insert_review(&state.db, shelf.id, user.id(), &input).await?;
    tracing::info!(
        review_id = review.id,
        shelf_id = shelf.id,
        user_id = user.id(),
        "review created"
    );

    Ok(Redirect::to(&format!("/book/{}/detail/", shelf.id)))
}
