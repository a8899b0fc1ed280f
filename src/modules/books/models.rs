use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shelf_authz::{Owned, UserId};
use shelf_kernel::settings::MediaSettings;

/// Fixed set of shelf categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Business,
    Life,
    Hobby,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Business,
        Category::Life,
        Category::Hobby,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Life => "life",
            Category::Hobby => "hobby",
            Category::Other => "other",
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Category::Business => "ビジネス",
            Category::Life => "生活",
            Category::Hobby => "趣味",
            Category::Other => "その他",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| {
                format!(
                    "select a valid choice; '{}' is not one of the available choices",
                    value
                )
            })
    }
}

/// A cataloged book.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Shelf {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub category: Category,
    /// Path relative to the media root
    pub thumbnail: Option<String>,
    pub user_id: UserId,
    /// Filled in by [`Shelf::with_media`]
    #[sqlx(skip)]
    pub thumbnail_url: Option<String>,
}

impl Shelf {
    pub fn with_media(mut self, media: &MediaSettings) -> Self {
        self.thumbnail_url = self.thumbnail.as_deref().map(|path| media.url_for(path));
        self
    }
}

impl Owned for Shelf {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

/// A shelf with the mean of its review rates; `None` when unreviewed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankedShelf {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shelf: Shelf,
    pub average_rate: Option<f64>,
}

/// Validated shelf fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfInput {
    pub title: String,
    pub text: String,
    pub category: Category,
}

/// A rated critique of a shelf.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub shelf_id: i64,
    pub title: String,
    pub text: String,
    pub rate: i64,
    pub user_id: UserId,
}

/// Review form as submitted
#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub title: String,
    pub text: String,
    pub rate: i64,
}

/// `?page=` on the detail page
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}
