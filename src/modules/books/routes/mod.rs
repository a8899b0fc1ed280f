//! HTTP handlers for shelves and their reviews.

mod reviews;
mod shelves;

use axum::{routing::get, Router};
use shelf_kernel::AppState;

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/", get(shelves::list))
        .route("/book/create/", get(shelves::create_form).post(shelves::create))
        .route("/book/{id}/detail/", get(shelves::detail))
        .route(
            "/book/{id}/update/",
            get(shelves::update_form).post(shelves::update),
        )
        .route(
            "/book/{id}/delete/",
            get(shelves::delete_confirm).post(shelves::delete),
        )
        .route("/book/{id}/review/", get(reviews::form).post(reviews::create))
        .with_state(state.clone())
}
