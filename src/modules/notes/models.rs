use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::utils::forms::FieldErrors;
use shelf_authz::{Owned, UserId};
use shelf_http::AppError;

pub const TITLE_MAX_CHARS: usize = 100;

/// A private note a user keeps about a shelf.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub shelf_id: i64,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Owned for Note {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

/// Note form as submitted
#[derive(Debug, Default, Deserialize)]
pub struct NoteForm {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

impl NoteForm {
    pub fn validate(self) -> Result<NoteInput, AppError> {
        let mut errors = FieldErrors::new();
        let title = errors.text("title", self.title.as_deref(), Some(TITLE_MAX_CHARS));
        let content = errors.text("content", self.content.as_deref(), None);
        errors.finish("invalid note form")?;

        Ok(NoteInput { title, content })
    }
}
