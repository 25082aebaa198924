use std::collections::HashMap;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// Wire-format models for the declarative page configuration document
// ============================================================================

/// One screen's declarative description: components, data sources, events.
///
/// This is the untrusted wire shape. Instances are only built from raw JSON
/// that already passed `validate_page_config` (or directly in tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub page_code: String,
    pub title: String,

    /// Page-level permission token; `None` means visible to everyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    pub components: Vec<ComponentConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Vec<DataSourceConfig>>,

    /// Page-level events, fired by the host (e.g. onLoad).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventConfig>>,
}

/// A single component node. Recursive via `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub id: String,

    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default)]
    pub props: HashMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ComponentConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_binding: Option<DataBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<VisibleFlag>,

    /// Trigger-name → event wiring, kept in document order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "event_bindings_from_map",
        serialize_with = "event_bindings_to_map"
    )]
    pub events: Vec<EventBinding>,
}

/// A declared link from a component property to a field of a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    pub source: String,
    pub field: String,

    /// Optional named transform, applied by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// The `visible` field as authored: a literal flag or a binding expression.
///
/// A string form is an unresolved expression to be evaluated against the
/// live data context at render time. The parser never coerces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisibleFlag {
    Flag(bool),
    Expression(String),
}

/// One entry of a component's `events` map: trigger name plus the event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub trigger: String,
    pub event: EventConfig,
}

// ============================================================================
// Data sources
// ============================================================================

/// A named, typed provider of data to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub id: String,

    #[serde(rename = "type")]
    pub source_type: DataSourceType,

    /// Type-specific configuration; validated only to be an object, the
    /// concrete shape is checked at load time.
    pub config: serde_json::Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_load: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Api,
    Static,
    Computed,
}

impl DataSourceConfig {
    /// Whether the loading collaborator should fetch this source eagerly.
    pub fn should_auto_load(&self) -> bool {
        self.auto_load != Some(false)
    }

    /// Typed view of `config` for an `api` source.
    pub fn api_config(&self) -> Result<ApiSourceConfig, serde_json::Error> {
        serde_json::from_value(Value::Object(self.config.clone()))
    }

    /// Typed view of `config` for a `computed` source.
    pub fn computed_config(&self) -> Result<ComputedSourceConfig, serde_json::Error> {
        serde_json::from_value(Value::Object(self.config.clone()))
    }

    /// The literal payload of a `static` source (`config.data`).
    pub fn static_data(&self) -> Value {
        self.config.get("data").cloned().unwrap_or(Value::Null)
    }
}

/// `config` shape for `type: "api"` data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSourceConfig {
    pub url: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Dotted path applied to the response `data` before storing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u64>,
}

/// `config` shape for `type: "computed"` data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedSourceConfig {
    /// Dotted path into the data-source map, e.g. `orders.items`.
    pub expression: String,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

// ============================================================================
// Events
// ============================================================================

/// A declarative event action, discriminated on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventConfig {
    Api {
        url: String,

        #[serde(default = "default_method")]
        method: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Value>,

        #[serde(
            default,
            rename = "onSuccess",
            skip_serializing_if = "Option::is_none"
        )]
        on_success: Option<Box<EventConfig>>,

        #[serde(default, rename = "onError", skip_serializing_if = "Option::is_none")]
        on_error: Option<Box<EventConfig>>,
    },

    Navigate {
        target: String,

        #[serde(default)]
        intent: NavigationIntent,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<HashMap<String, String>>,
    },

    /// Arbitrary script hook. Not executed by this engine (see ActionRunner).
    Script { code: String },

    /// Bubbles to the host application; no built-in handling.
    Emit {
        event: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NavigationIntent {
    #[default]
    Push,
    Replace,
    Back,
}

fn default_method() -> String {
    "GET".to_string()
}

// ============================================================================
// events map <-> ordered Vec<EventBinding>
// ============================================================================

// JSON objects carry the author's insertion order; a plain HashMap would
// lose it and make event collection non-deterministic.
pub(crate) fn event_bindings_from_map<'de, D>(
    deserializer: D,
) -> Result<Vec<EventBinding>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BindingsVisitor;

    impl<'de> Visitor<'de> for BindingsVisitor {
        type Value = Vec<EventBinding>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a map of trigger name to event config")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut bindings = Vec::new();
            while let Some((trigger, event)) = map.next_entry::<String, EventConfig>()? {
                bindings.push(EventBinding { trigger, event });
            }
            Ok(bindings)
        }
    }

    deserializer.deserialize_map(BindingsVisitor)
}

pub(crate) fn event_bindings_to_map<S>(
    bindings: &[EventBinding],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(bindings.len()))?;
    for binding in bindings {
        map.serialize_entry(&binding.trigger, &binding.event)?;
    }
    map.end()
}
