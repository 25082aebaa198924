use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::registry::STANDARD_COMPONENT_TYPES;
use crate::parse::parsed_model::ParsedComponent;

// ============================================================================
// Render output model and the render-time component registry
// ============================================================================

/// The result of rendering one component.
///
/// Unknown types become a visible `Placeholder` rather than an error or a
/// silently-dropped node, so config/registry mismatches stay diagnosable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderedNode {
    Element {
        id: String,
        type_name: String,
        props: HashMap<String, Value>,
        children: Vec<RenderedNode>,
    },
    Placeholder {
        id: String,
        type_name: String,
    },
}

impl RenderedNode {
    pub fn id(&self) -> &str {
        match self {
            RenderedNode::Element { id, .. } => id,
            RenderedNode::Placeholder { id, .. } => id,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            RenderedNode::Element { type_name, .. } => type_name,
            RenderedNode::Placeholder { type_name, .. } => type_name,
        }
    }
}

/// Builds the concrete node for one component type.
pub trait ComponentFactory {
    fn build(
        &self,
        component: &ParsedComponent,
        props: HashMap<String, Value>,
        children: Vec<RenderedNode>,
    ) -> RenderedNode;
}

/// Generic factory producing a plain element node. Sufficient for every
/// standard type; hosts register richer factories where they need them.
pub struct ElementFactory;

impl ComponentFactory for ElementFactory {
    fn build(
        &self,
        component: &ParsedComponent,
        props: HashMap<String, Value>,
        children: Vec<RenderedNode>,
    ) -> RenderedNode {
        RenderedNode::Element {
            id: component.id.clone(),
            type_name: component.component_type.clone(),
            props,
            children,
        }
    }
}

/// Render-time name → factory table, supplied by the host application.
///
/// Administratively separate from the validation-time type registry: a type
/// can validate yet be unregistered here, which yields the placeholder
/// behavior above. That divergence is an intentional safety valve.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Box<dyn ComponentFactory>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with an `ElementFactory` for every standard type.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for type_name in STANDARD_COMPONENT_TYPES {
            registry.register(type_name, Box::new(ElementFactory));
        }
        registry
    }

    pub fn register(&mut self, type_name: &str, factory: Box<dyn ComponentFactory>) {
        self.factories.insert(type_name.to_string(), factory);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn ComponentFactory> {
        self.factories.get(type_name).map(|factory| &**factory)
    }
}
