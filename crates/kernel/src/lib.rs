//! Kernel of the shelf app: layered settings, the module contract, the
//! registry that drives module lifecycles, and the state shared by handlers.

pub mod module;
pub mod registry;
pub mod settings;
pub mod state;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
pub use state::AppState;
