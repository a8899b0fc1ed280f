//! Field validation shared by the submission handlers.

use serde_json::{json, Value};
use shelf_http::AppError;

/// Collects per-field problems and turns them into a 422 in one go.
#[derive(Debug, Default)]
pub struct FieldErrors {
    details: Vec<Value>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, error: impl Into<String>) {
        self.details
            .push(json!({ "field": field, "error": error.into() }));
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Trimmed non-empty text of at most `max_chars` characters, if given.
    /// Records an error and returns an empty string otherwise.
    pub fn text(&mut self, field: &str, value: Option<&str>, max_chars: Option<usize>) -> String {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.add(field, "required");
            return String::new();
        }
        if let Some(max) = max_chars {
            let len = value.chars().count();
            if len > max {
                self.add(
                    field,
                    format!("ensure this value has at most {} characters (it has {})", max, len),
                );
            }
        }
        value.to_string()
    }

    /// Integer within `min..=max`.
    pub fn integer_in(&mut self, field: &str, value: Option<&str>, min: i64, max: i64) -> i64 {
        let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
            self.add(field, "required");
            return min;
        };
        match raw.parse::<i64>() {
            Ok(number) if (min..=max).contains(&number) => number,
            Ok(_) => {
                self.add(field, format!("must be between {} and {}", min, max));
                min
            }
            Err(_) => {
                self.add(field, "enter a whole number");
                min
            }
        }
    }

    pub fn finish(self, message: &str) -> Result<(), AppError> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.details, message))
        }
    }
}
