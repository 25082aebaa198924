use crate::config::config_model::{ComponentConfig, PageConfig};

// ============================================================================
// Data-binding collection — for diagnostics and renderer subscription wiring
// ============================================================================

/// Bound fields grouped by data-source id, in first-seen order.
///
/// Insertion order within each group matches depth-first tree traversal
/// (children in array order), so diagnostics and renderer subscription
/// ordering are reproducible run to run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingIndex {
    entries: Vec<(String, Vec<String>)>,
}

impl BindingIndex {
    fn push(&mut self, source: &str, field: &str) {
        match self.entries.iter_mut().find(|(s, _)| s == source) {
            Some((_, fields)) => fields.push(field.to_string()),
            None => self
                .entries
                .push((source.to_string(), vec![field.to_string()])),
        }
    }

    /// Bound fields for one source, in traversal order.
    pub fn fields(&self, source: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, fields)| fields.as_slice())
    }

    /// Source ids in first-seen order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(s, fields)| (s.as_str(), fields.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collect every `dataBinding` declared anywhere in the component tree.
pub fn get_data_bindings(config: &PageConfig) -> BindingIndex {
    let mut index = BindingIndex::default();
    for component in &config.components {
        collect_component(component, &mut index);
    }
    index
}

fn collect_component(component: &ComponentConfig, index: &mut BindingIndex) {
    if let Some(binding) = &component.data_binding {
        index.push(&binding.source, &binding.field);
    }

    for child in component.children.as_deref().unwrap_or_default() {
        collect_component(child, index);
    }
}
