use std::collections::HashMap;

use serde_json::Value;

use crate::config::config_model::DataBinding;
use crate::parse::parsed_model::ParsedPage;

// ============================================================================
// Data context — the live runtime bundle bindings are resolved against
// ============================================================================

/// Data-source values, form state and page parameters for one rendered page.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    pub data_sources: HashMap<String, Value>,
    pub form_data: HashMap<String, Value>,
    pub params: HashMap<String, Value>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context from a parsed page's data-source map.
    pub fn from_parsed(page: &ParsedPage) -> Self {
        Self {
            data_sources: page.data_sources.clone(),
            form_data: HashMap::new(),
            params: HashMap::new(),
        }
    }

    pub fn set_param(&mut self, key: &str, value: Value) {
        self.params.insert(key.to_string(), value);
    }

    pub fn set_form_value(&mut self, key: &str, value: Value) {
        self.form_data.insert(key.to_string(), value);
    }
}

/// Dotted-path traversal into a JSON value. Object keys and numeric array
/// indexes are supported; any missing segment or non-container intermediate
/// yields `None`. Never panics.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Resolve a binding expression against the context.
///
/// The first segment selects a section (`dataSources`, `formData`, `params`);
/// a bare first segment is treated as a data-source id. The remainder is a
/// dotted path into the selected value. `None` on any miss.
pub fn resolve_binding<'a>(expression: &str, context: &'a DataContext) -> Option<&'a Value> {
    let (head, rest) = match expression.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (expression, None),
    };

    let (section, rest) = match head {
        "dataSources" => (&context.data_sources, rest),
        "formData" => (&context.form_data, rest),
        "params" => (&context.params, rest),
        _ => return resolve_in_map(&context.data_sources, head, rest),
    };

    let (key, rest) = match rest {
        Some(rest) => match rest.split_once('.') {
            Some((key, tail)) => (key, Some(tail)),
            None => (rest, None),
        },
        // A section name alone addresses nothing.
        None => return None,
    };

    resolve_in_map(section, key, rest)
}

/// Resolve a component's declared data binding to the bound field's value.
/// An empty `field` binds the whole source value.
pub fn resolve_data_binding<'a>(
    binding: &DataBinding,
    context: &'a DataContext,
) -> Option<&'a Value> {
    let field = match binding.field.as_str() {
        "" => None,
        field => Some(field),
    };
    resolve_in_map(&context.data_sources, &binding.source, field)
}

fn resolve_in_map<'a>(
    map: &'a HashMap<String, Value>,
    key: &str,
    rest: Option<&str>,
) -> Option<&'a Value> {
    let root = map.get(key)?;
    match rest {
        Some(path) => resolve_path(root, path),
        None => Some(root),
    }
}
