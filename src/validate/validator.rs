use serde_json::Value;

use crate::config::registry::ComponentTypeRegistry;
use crate::validate::validation_model::{ErrorCode, ValidationError, ValidationReport};

// ============================================================================
// Structural validation of raw (untrusted) page configuration JSON
// ============================================================================

const DATA_SOURCE_TYPES: &[&str] = &["api", "static", "computed"];

/// Validate a raw page configuration document.
///
/// Total: never panics, reports every problem it can find as data. The only
/// short-circuit is a non-object root, where nothing else can be checked.
pub fn validate_page_config(raw: &Value, registry: &ComponentTypeRegistry) -> ValidationReport {
    let Some(page) = raw.as_object() else {
        return ValidationReport::from_errors(vec![ValidationError::new(
            "",
            "page config must be a JSON object",
            ErrorCode::InvalidConfig,
        )]);
    };

    let mut errors = Vec::new();

    if !is_non_empty_string(page.get("pageCode")) {
        errors.push(ValidationError::new(
            "pageCode",
            "pageCode is required and must be a non-empty string",
            ErrorCode::RequiredField,
        ));
    }

    if !is_non_empty_string(page.get("title")) {
        errors.push(ValidationError::new(
            "title",
            "title is required and must be a non-empty string",
            ErrorCode::RequiredField,
        ));
    }

    match page.get("components").and_then(Value::as_array) {
        Some(components) => {
            for (i, component) in components.iter().enumerate() {
                validate_component_config(
                    component,
                    &format!("components[{}]", i),
                    registry,
                    &mut errors,
                );
            }
        }
        None => {
            errors.push(ValidationError::new(
                "components",
                "components must be an array",
                ErrorCode::InvalidType,
            ));
        }
    }

    if let Some(data_sources) = page.get("dataSource") {
        match data_sources.as_array() {
            Some(sources) => {
                for (i, source) in sources.iter().enumerate() {
                    validate_data_source_config(source, &format!("dataSource[{}]", i), &mut errors);
                }
            }
            None => {
                errors.push(ValidationError::new(
                    "dataSource",
                    "dataSource must be an array",
                    ErrorCode::InvalidType,
                ));
            }
        }
    }

    ValidationReport::from_errors(errors)
}

/// Validate one component sub-document, recursing through `children`.
/// Accumulates into `errors`; never stops at the first problem.
pub fn validate_component_config(
    raw: &Value,
    path: &str,
    registry: &ComponentTypeRegistry,
    errors: &mut Vec<ValidationError>,
) {
    let Some(component) = raw.as_object() else {
        errors.push(ValidationError::new(
            path,
            "component must be a JSON object",
            ErrorCode::InvalidConfig,
        ));
        return;
    };

    if !is_non_empty_string(component.get("id")) {
        errors.push(ValidationError::new(
            format!("{}.id", path),
            "id is required and must be a non-empty string",
            ErrorCode::RequiredField,
        ));
    }

    // REQUIRED_FIELD and UNSUPPORTED_TYPE are mutually exclusive: the
    // membership check only runs on a present, non-empty string.
    match component.get("type").and_then(Value::as_str) {
        Some(type_name) if !type_name.is_empty() => {
            if !registry.is_supported(type_name) {
                errors.push(ValidationError::new(
                    format!("{}.type", path),
                    format!("unsupported component type '{}'", type_name),
                    ErrorCode::UnsupportedType,
                ));
            }
        }
        _ => {
            errors.push(ValidationError::new(
                format!("{}.type", path),
                "type is required and must be a non-empty string",
                ErrorCode::RequiredField,
            ));
        }
    }

    if let Some(props) = component.get("props") {
        if !props.is_object() {
            errors.push(ValidationError::new(
                format!("{}.props", path),
                "props must be an object",
                ErrorCode::InvalidType,
            ));
        }
    }

    if let Some(children) = component.get("children") {
        match children.as_array() {
            Some(children) => {
                for (i, child) in children.iter().enumerate() {
                    validate_component_config(
                        child,
                        &format!("{}.children[{}]", path, i),
                        registry,
                        errors,
                    );
                }
            }
            None => {
                errors.push(ValidationError::new(
                    format!("{}.children", path),
                    "children must be an array",
                    ErrorCode::InvalidType,
                ));
            }
        }
    }
}

/// Validate one data-source sub-document.
///
/// The type-specific shape of `config` is deliberately not checked here: a
/// malformed `api` config surfaces at load time, not at parse time.
pub fn validate_data_source_config(raw: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(source) = raw.as_object() else {
        errors.push(ValidationError::new(
            path,
            "data source must be a JSON object",
            ErrorCode::InvalidConfig,
        ));
        return;
    };

    if !is_non_empty_string(source.get("id")) {
        errors.push(ValidationError::new(
            format!("{}.id", path),
            "id is required and must be a non-empty string",
            ErrorCode::RequiredField,
        ));
    }

    match source.get("type").and_then(Value::as_str) {
        Some(type_name) => {
            if !DATA_SOURCE_TYPES.contains(&type_name) {
                errors.push(ValidationError::new(
                    format!("{}.type", path),
                    format!(
                        "data source type must be one of api, static, computed (got '{}')",
                        type_name
                    ),
                    ErrorCode::InvalidType,
                ));
            }
        }
        None => {
            errors.push(ValidationError::new(
                format!("{}.type", path),
                "type is required and must be a string",
                ErrorCode::RequiredField,
            ));
        }
    }

    if !source.get("config").is_some_and(Value::is_object) {
        errors.push(ValidationError::new(
            format!("{}.config", path),
            "config is required and must be an object",
            ErrorCode::RequiredField,
        ));
    }
}

fn is_non_empty_string(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}
