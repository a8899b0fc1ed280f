//! Integer record ids taken from the URL.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use shelf_http::AppError;

/// The `{id}` segment of a record route.
///
/// Only plain decimal digits that fit an `i64` name a record. Anything
/// else matches nothing and answers 404, same as an id with no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for RecordId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        parse_id(&raw)
            .map(RecordId)
            .ok_or_else(|| AppError::not_found(format!("no record with id '{}'", raw)))
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
