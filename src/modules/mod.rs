pub mod accounts;
pub mod books;
pub mod notes;

use shelf_kernel::ModuleRegistry;

/// Register every application module with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register_core(accounts::create_module());
    registry.register_custom(books::create_module());
    registry.register_custom(notes::create_module());
}
