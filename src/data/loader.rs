use std::fmt;

use serde_json::Value;

use crate::config::config_model::{DataSourceConfig, DataSourceType};
use crate::data::transport::{Transport, TransportError};
use crate::parse::parsed_model::ParsedPage;
use crate::render::context::resolve_path;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::EngineEvent;

// ============================================================================
// Data-source loading — the engine's only I/O boundary
// ============================================================================

#[derive(Debug)]
pub enum LoadError {
    /// The source's `config` object does not match its type's shape.
    Config {
        source_id: String,
        source: serde_json::Error,
    },

    Transport(TransportError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Config { source_id, source } => {
                write!(f, "data source '{}' has a malformed config: {}", source_id, source)
            }
            LoadError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Config { source, .. } => Some(source),
            LoadError::Transport(e) => Some(e),
        }
    }
}

/// Fill a parsed page's data-source map.
///
/// Every `autoLoad != false` api source is fetched independently: one
/// failure is logged and leaves that entry at `Null`, the rest proceed.
/// Computed sources are then evaluated to a fixpoint so dependency chains
/// resolve regardless of declaration order.
pub fn load_data_sources(
    page: &mut ParsedPage,
    sources: &[DataSourceConfig],
    transport: &dyn Transport,
    logger: &TraceLogger,
) {
    for source in sources {
        if source.source_type != DataSourceType::Api || !source.should_auto_load() {
            continue;
        }

        match load_api_source(source, transport) {
            Ok(value) => {
                page.data_sources.insert(source.id.clone(), value);
                logger.log(
                    &EngineEvent::now("data_load")
                        .with_page(&page.page_code)
                        .with_source(&source.id)
                        .with_detail("loaded"),
                );
            }
            Err(e) => {
                // The placeholder stays Null; the page still renders.
                logger.log(
                    &EngineEvent::now("data_load")
                        .with_page(&page.page_code)
                        .with_source(&source.id)
                        .with_error(e),
                );
            }
        }
    }

    resolve_computed_sources(page, sources, logger);
}

/// Fetch one api source and apply its optional `transform` path.
pub fn load_api_source(
    source: &DataSourceConfig,
    transport: &dyn Transport,
) -> Result<Value, LoadError> {
    let config = source.api_config().map_err(|e| LoadError::Config {
        source_id: source.id.clone(),
        source: e,
    })?;

    let response = transport
        .request(&config.url, &config.method, config.params.as_ref())
        .map_err(LoadError::Transport)?;

    let data = match &config.transform {
        Some(path) => resolve_path(&response.data, path)
            .cloned()
            .unwrap_or(Value::Null),
        None => response.data,
    };

    Ok(data)
}

fn resolve_computed_sources(
    page: &mut ParsedPage,
    sources: &[DataSourceConfig],
    logger: &TraceLogger,
) {
    let mut computed = Vec::new();
    for source in sources {
        if source.source_type != DataSourceType::Computed || !source.should_auto_load() {
            continue;
        }
        match source.computed_config() {
            Ok(config) => computed.push((source, config)),
            Err(e) => {
                logger.log(
                    &EngineEvent::now("data_load")
                        .with_page(&page.page_code)
                        .with_source(&source.id)
                        .with_error(format!("malformed computed config: {}", e)),
                );
            }
        }
    }

    // Iterate until no expression makes progress; cycles and missing
    // dependencies simply stop resolving and stay Null.
    loop {
        let mut progressed = false;

        for (source, config) in &computed {
            let already_resolved = page
                .data_sources
                .get(&source.id)
                .is_some_and(|v| !v.is_null());
            if already_resolved {
                continue;
            }

            if let Some(value) = evaluate_expression(&config.expression, page) {
                if !value.is_null() {
                    page.data_sources.insert(source.id.clone(), value);
                    progressed = true;
                }
            }
        }

        if !progressed {
            break;
        }
    }

    for (source, _) in &computed {
        let unresolved = page
            .data_sources
            .get(&source.id)
            .is_none_or(Value::is_null);
        if unresolved {
            logger.log(
                &EngineEvent::now("data_load")
                    .with_page(&page.page_code)
                    .with_source(&source.id)
                    .with_detail("computed source unresolved"),
            );
        }
    }
}

/// A computed expression is a dotted path into the data-source map: the
/// first segment names a source, the rest descends into its value.
fn evaluate_expression(expression: &str, page: &ParsedPage) -> Option<Value> {
    let (source_id, rest) = match expression.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (expression, None),
    };

    let root = page.data_sources.get(source_id)?;
    match rest {
        Some(path) => resolve_path(root, path).cloned(),
        None => Some(root.clone()),
    }
}
