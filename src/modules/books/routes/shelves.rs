use axum::{
    extract::{Multipart, Query, State},
    response::Redirect,
    Json,
};
use serde_json::{json, Value};

use crate::modules::books::forms::{category_choices, read_shelf_form, ShelfSubmission};
use crate::modules::books::models::PageParams;
use crate::modules::books::{shelf_or_404, store, RANKING_SIZE, REVIEWS_PER_PAGE};
use crate::modules::accounts::CurrentUser;
use crate::utils::media::{discard, store_thumbnail};
use crate::utils::pagination::Paginator;
use crate::utils::path::RecordId;
use shelf_authz::{authorize, Action};
use shelf_http::AppError;
use shelf_kernel::AppState;

/// All shelves plus the current top three by average review rate
pub(super) async fn list(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let media = &state.settings().media;

    let shelves: Vec<_> = store::list_shelves(&state.db)
        .await?
        .into_iter()
        .map(|shelf| shelf.with_media(media))
        .collect();

    let ranking: Vec<_> = store::ranking(&state.db, RANKING_SIZE)
        .await?
        .into_iter()
        .map(|mut ranked| {
            ranked.shelf = ranked.shelf.with_media(media);
            ranked
        })
        .collect();

    Ok(Json(json!({ "shelves": shelves, "ranking": ranking })))
}

pub(super) async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, AppError> {
    let shelf = shelf_or_404(&state, id).await?;

    let paginator = Paginator::new(store::count_reviews(&state.db, id).await?, REVIEWS_PER_PAGE);
    let number = paginator.resolve(params.page.as_deref());
    let reviews =
        store::reviews_page(&state.db, id, paginator.limit(), paginator.offset(number)).await?;

    Ok(Json(json!({
        "shelf": shelf,
        "reviews": paginator.page(number, reviews),
    })))
}

pub(super) async fn create_form(_user: CurrentUser) -> Json<Value> {
    Json(json!({
        "fields": ["title", "text", "category", "thumbnail"],
        "categories": category_choices(),
    }))
}

pub(super) async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let ShelfSubmission { input, thumbnail } = read_shelf_form(multipart).await?;

    let thumbnail = match &thumbnail {
        Some(upload) => Some(store_thumbnail(&state.settings().media, upload).await?),
        None => None,
    };

    let shelf = match store::insert_shelf(&state.db, user.id(), &input, thumbnail.as_deref()).await
    {
        Ok(shelf) => shelf,
        Err(e) => {
            if let Some(stored) = &thumbnail {
                discard(&state.settings().media, stored).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!(shelf_id = shelf.id, user_id = user.id(), "shelf created");

    Ok(Redirect::to("/"))
}

pub(super) async fn update_form(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    authorize(user.id(), &shelf, Action::Update)?;

    Ok(Json(json!({
        "shelf": shelf,
        "categories": category_choices(),
    })))
}

pub(super) async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    authorize(user.id(), &shelf, Action::Update)?;

    let media = &state.settings().media;
    let ShelfSubmission { input, thumbnail } = read_shelf_form(multipart).await?;
    let thumbnail = match &thumbnail {
        Some(upload) => Some(store_thumbnail(media, upload).await?),
        None => None,
    };

    let updated = match store::update_shelf(&state.db, id, &input, thumbnail.as_deref()).await {
        Ok(Some(updated)) => updated,
        result => {
            if let Some(stored) = &thumbnail {
                discard(media, stored).await;
            }
            result?;
            return Err(AppError::not_found(format!("shelf {} not found", id)));
        }
    };
    tracing::info!(shelf_id = id, user_id = user.id(), "shelf updated");

    // Replaced thumbnail
    if let Some(previous) = shelf.thumbnail.as_deref() {
        if updated.thumbnail.as_deref() != Some(previous) {
            discard(media, previous).await;
        }
    }

    Ok(Redirect::to("/"))
}

pub(super) async fn delete_confirm(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<Value>, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    authorize(user.id(), &shelf, Action::Delete)?;

    Ok(Json(json!({ "shelf": shelf })))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    RecordId(id): RecordId,
) -> Result<Redirect, AppError> {
    let shelf = shelf_or_404(&state, id).await?;
    authorize(user.id(), &shelf, Action::Delete)?;

    store::delete_shelf(&state.db, id).await?;
    tracing::info!(shelf_id = id, user_id = user.id(), "shelf deleted");

    if let Some(thumbnail) = shelf.thumbnail.as_deref() {
        discard(&state.settings().media, thumbnail).await;
    }

    Ok(Redirect::to("/"))
}
