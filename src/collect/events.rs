use crate::config::config_model::{ComponentConfig, EventConfig, PageConfig};

// ============================================================================
// Event collection
// ============================================================================

/// Collect every event configuration on the page: page-level events first,
/// then each component's events in depth-first tree order. Within one
/// component, events keep the author's insertion order.
pub fn get_event_configs(config: &PageConfig) -> Vec<EventConfig> {
    let mut events: Vec<EventConfig> = config.events.clone().unwrap_or_default();

    for component in &config.components {
        collect_component(component, &mut events);
    }

    events
}

fn collect_component(component: &ComponentConfig, events: &mut Vec<EventConfig>) {
    for binding in &component.events {
        events.push(binding.event.clone());
    }

    for child in component.children.as_deref().unwrap_or_default() {
        collect_component(child, events);
    }
}
