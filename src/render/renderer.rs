use serde_json::Value;

use crate::parse::parsed_model::{ParsedComponent, ParsedPage};
use crate::render::context::{resolve_binding, resolve_data_binding, DataContext};
use crate::render::render_model::{ComponentRegistry, RenderedNode};

// ============================================================================
// Renderer — Parsed Page Model + DataContext -> rendered node tree
// ============================================================================

/// Render every top-level component of a parsed page.
pub fn render_page(
    page: &ParsedPage,
    context: &DataContext,
    registry: &ComponentRegistry,
) -> Vec<RenderedNode> {
    page.components
        .iter()
        .filter_map(|component| render_component(component, context, registry))
        .collect()
}

/// Render one component subtree.
///
/// Returns `None` for invisible nodes (nothing is rendered, children
/// included). An unknown type renders as a placeholder, never an error.
pub fn render_component(
    component: &ParsedComponent,
    context: &DataContext,
    registry: &ComponentRegistry,
) -> Option<RenderedNode> {
    if !component.visible {
        return None;
    }

    // A carried `visible` expression gets its evaluation pass here, now that
    // a live context exists. Only a resolved boolean `false` hides the node.
    if let Some(expression) = &component.visible_expression {
        if matches!(resolve_binding(expression, context), Some(Value::Bool(false))) {
            return None;
        }
    }

    let children = component
        .children
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|child| render_component(child, context, registry))
        .collect();

    let mut props = component.props.clone();
    if let Some(binding) = &component.data_binding {
        if let Some(value) = resolve_data_binding(binding, context) {
            props.insert("value".to_string(), value.clone());
        }
    }

    let node = match registry.get(&component.component_type) {
        Some(factory) => factory.build(component, props, children),
        None => RenderedNode::Placeholder {
            id: component.id.clone(),
            type_name: component.component_type.clone(),
        },
    };

    Some(node)
}
