use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::config_model::{DataBinding, EventBinding};

// ============================================================================
// Parsed Page Model — the trusted output of the parser
// ============================================================================

/// A page after validation, permission resolution and data-source
/// initialization: ready for a renderer to walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPage {
    pub page_code: String,
    pub title: String,
    pub components: Vec<ParsedComponent>,

    /// Data-source values by id. `static` sources hold their literal data;
    /// `api`/`computed` sources start at `Null` until the loader fills them.
    pub data_sources: HashMap<String, Value>,
}

/// One resolved component node.
///
/// `visible` is always a concrete boolean. Components are never dropped or
/// reordered relative to the input: invisibility is a property on the node,
/// not an exclusion from the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedComponent {
    pub id: String,

    #[serde(rename = "type")]
    pub component_type: String,

    pub props: HashMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ParsedComponent>>,

    pub visible: bool,

    /// Unresolved `visible` expression, evaluated at render time when a
    /// data context is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_expression: Option<String>,

    // Binding/event wiring is threaded through so the renderer never has to
    // reach back into the raw config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_binding: Option<DataBinding>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "crate::config::config_model::event_bindings_from_map",
        serialize_with = "crate::config::config_model::event_bindings_to_map"
    )]
    pub events: Vec<EventBinding>,
}
