//! Submission parsing for shelves and reviews.

use axum::extract::Multipart;
use serde_json::{json, Value};

use super::models::{Category, ReviewForm, ReviewInput, ShelfInput};
use crate::utils::forms::FieldErrors;
use crate::utils::media::Upload;
use shelf_http::AppError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const RATE_MIN: i64 = 0;
pub const RATE_MAX: i64 = 5;

/// A validated shelf form plus the thumbnail, if one was attached.
#[derive(Debug)]
pub struct ShelfSubmission {
    pub input: ShelfInput,
    pub thumbnail: Option<Upload>,
}

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct RawShelfForm {
    title: Option<String>,
    text: Option<String>,
    category: Option<String>,
    thumbnail: Option<Upload>,
}

/// Read and validate `title`, `text`, `category` and an optional
/// `thumbnail` file from a multipart body.
pub async fn read_shelf_form(mut multipart: Multipart) -> Result<ShelfSubmission, AppError> {
    let mut raw = RawShelfForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "thumbnail" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("failed to read upload: {}", e)))?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    raw.thumbnail = Some(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "title" | "text" | "category" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("failed to read {}: {}", name, e)))?;
                match name.as_str() {
                    "title" => raw.title = Some(value),
                    "text" => raw.text = Some(value),
                    _ => raw.category = Some(value),
                }
            }
            _ => {}
        }
    }

    raw.validate()
}

impl RawShelfForm {
    fn validate(self) -> Result<ShelfSubmission, AppError> {
        let mut errors = FieldErrors::new();
        let title = errors.text("title", self.title.as_deref(), Some(TITLE_MAX_CHARS));
        let text = errors.text("text", self.text.as_deref(), None);

        // Placeholder on error; `finish` rejects the form before it is used
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("category", "required");
                Category::Other
            }
            Some(raw) => raw.parse::<Category>().unwrap_or_else(|message| {
                errors.add("category", message);
                Category::Other
            }),
        };

        if let Some(upload) = &self.thumbnail {
            if !upload.is_image() {
                errors.add("thumbnail", "upload a valid image");
            }
        }

        errors.finish("invalid shelf form")?;

        Ok(ShelfSubmission {
            input: ShelfInput {
                title,
                text,
                category,
            },
            thumbnail: self.thumbnail,
        })
    }
}

impl ReviewForm {
    pub fn validate(self) -> Result<ReviewInput, AppError> {
        let mut errors = FieldErrors::new();
        let title = errors.text("title", self.title.as_deref(), Some(TITLE_MAX_CHARS));
        let text = errors.text("text", self.text.as_deref(), None);
        let rate = errors.integer_in("rate", self.rate.as_deref(), RATE_MIN, RATE_MAX);
        errors.finish("invalid review form")?;

        Ok(ReviewInput { title, text, rate })
    }
}

/// Category choices as offered on the create/update forms.
pub fn category_choices() -> Vec<Value> {
    Category::ALL
        .into_iter()
        .map(|category| json!({ "value": category.as_str(), "label": category.label() }))
        .collect()
}
