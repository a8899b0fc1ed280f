//! Ownership guard shared by every mutating route.
//!
//! Resources expose the id of the user they belong to through [`Owned`];
//! [`authorize`] is the one predicate handlers call before touching them.

use thiserror::Error;

/// Identifier of a registered user.
pub type UserId = i64;

/// Anything stored with a reference to the user that owns it.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

/// What the acting user is trying to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Authorization failure. Displays as the localized message shown to users.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Denied {
    #[error("閲覧権限がありません。")]
    Read,
    #[error("編集権限がありません。")]
    Update,
    #[error("削除権限がありません。")]
    Delete,
}

impl Denied {
    pub fn action(&self) -> Action {
        match self {
            Denied::Read => Action::Read,
            Denied::Update => Action::Update,
            Denied::Delete => Action::Delete,
        }
    }
}

impl From<Action> for Denied {
    fn from(action: Action) -> Self {
        match action {
            Action::Read => Denied::Read,
            Action::Update => Denied::Update,
            Action::Delete => Denied::Delete,
        }
    }
}

/// Allow `action` only when `actor` owns `resource`.
pub fn authorize<R: Owned + ?Sized>(
    actor: UserId,
    resource: &R,
    action: Action,
) -> Result<(), Denied> {
    let owner = resource.owner_id();
    if owner == actor {
        return Ok(());
    }

    tracing::warn!(
        actor,
        owner,
        action = action.as_str(),
        "authorization denied"
    );
    Err(action.into())
}
