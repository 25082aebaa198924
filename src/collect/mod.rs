pub mod bindings;
pub mod events;
