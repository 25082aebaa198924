use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::config::config_model::{
    ComponentConfig, DataSourceConfig, DataSourceType, PageConfig, VisibleFlag,
};
use crate::config::registry::ComponentTypeRegistry;
use crate::parse::parsed_model::{ParsedComponent, ParsedPage};
use crate::parse::permission::{resolve_visibility, PermissionSet};
use crate::validate::validation_model::{ErrorCode, ValidationError};
use crate::validate::validator::validate_page_config;

// ============================================================================
// Parser — validated config -> Parsed Page Model
// ============================================================================

/// Raised when a configuration fails validation. Carries the full batch of
/// errors so an authoring tool can highlight every problem at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page config failed validation ({} errors)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Parse a raw page configuration into a `ParsedPage`.
///
/// Validation is all-or-nothing at the page level: any validation error
/// anywhere in the tree refuses the whole parse. On success every component
/// survives in input order with a concrete `visible`, and the data-source
/// map is initialized (`static` literals, `Null` placeholders otherwise).
pub fn parse_page_config(
    raw: &Value,
    user_permissions: &[String],
    registry: &ComponentTypeRegistry,
) -> Result<ParsedPage, ParseError> {
    let report = validate_page_config(raw, registry);
    if !report.valid {
        return Err(ParseError {
            errors: report.errors,
        });
    }

    // Structure is verified, but field shapes the validator is lenient about
    // (e.g. a numeric `visible`) can still fail typed deserialization.
    let config: PageConfig = serde_json::from_value(raw.clone()).map_err(|e| ParseError {
        errors: vec![ValidationError::new(
            "",
            format!("config does not match the expected shape: {}", e),
            ErrorCode::InvalidConfig,
        )],
    })?;

    Ok(parse_validated(&config, user_permissions))
}

/// Parse an already-validated, typed configuration.
pub fn parse_validated(config: &PageConfig, user_permissions: &[String]) -> ParsedPage {
    let permissions = PermissionSet::from_tokens(user_permissions);

    let components = config
        .components
        .iter()
        .map(|c| parse_component(c, &permissions))
        .collect();

    ParsedPage {
        page_code: config.page_code.clone(),
        title: config.title.clone(),
        components,
        data_sources: init_data_sources(config.data_source.as_deref()),
    }
}

fn parse_component(component: &ComponentConfig, permissions: &PermissionSet) -> ParsedComponent {
    let children = component
        .children
        .as_ref()
        .map(|children| children.iter().map(|c| parse_component(c, permissions)).collect());

    let visible_expression = match &component.visible {
        Some(VisibleFlag::Expression(expr)) => Some(expr.clone()),
        _ => None,
    };

    ParsedComponent {
        id: component.id.clone(),
        component_type: component.component_type.clone(),
        // Defensive copy: mutating the parsed model must not alias the input.
        props: component.props.clone(),
        children,
        visible: resolve_visibility(component, permissions),
        visible_expression,
        data_binding: component.data_binding.clone(),
        events: component.events.clone(),
    }
}

fn init_data_sources(sources: Option<&[DataSourceConfig]>) -> HashMap<String, Value> {
    let mut data_sources = HashMap::new();

    for source in sources.unwrap_or_default() {
        let initial = match source.source_type {
            DataSourceType::Static => source.static_data(),
            DataSourceType::Api | DataSourceType::Computed => Value::Null,
        };
        data_sources.insert(source.id.clone(), initial);
    }

    data_sources
}
