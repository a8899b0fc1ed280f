//! Project-specific utilities live here.

pub mod forms;
pub mod media;
pub mod pagination;
pub mod path;
