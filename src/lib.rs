//! Dynamic page configuration engine.
//!
//! Ingests a declarative JSON description of a page (components, data
//! bindings, permissions, event wiring, data sources) and turns it into a
//! permission-filtered, data-bound parsed model ready for rendering. The
//! core (validate / parse / collect) is purely synchronous and performs no
//! I/O; data-source loading and event actions go through the narrow
//! `Transport` collaborator.

pub mod cli;
pub mod collect;
pub mod config;
pub mod data;
pub mod parse;
pub mod render;
pub mod trace;
pub mod validate;

pub use crate::collect::bindings::{get_data_bindings, BindingIndex};
pub use crate::collect::events::get_event_configs;
pub use crate::config::config_model::PageConfig;
pub use crate::config::registry::ComponentTypeRegistry;
pub use crate::parse::parsed_model::{ParsedComponent, ParsedPage};
pub use crate::parse::parser::{parse_page_config, ParseError};
pub use crate::validate::validation_model::{ErrorCode, ValidationError, ValidationReport};
pub use crate::validate::validator::validate_page_config;

/// Convenience check mirroring the validator's registry lookup.
pub fn is_component_type_supported(type_name: &str) -> bool {
    ComponentTypeRegistry::standard().is_supported(type_name)
}
