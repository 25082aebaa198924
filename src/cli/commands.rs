use std::time::Duration;

use serde_json::Value;

use crate::cli::config::AppConfig;
use crate::collect::bindings::get_data_bindings;
use crate::collect::events::get_event_configs;
use crate::config::config_model::PageConfig;
use crate::config::registry::ComponentTypeRegistry;
use crate::data::config_source::ConfigSource;
use crate::data::loader::load_data_sources;
use crate::data::store::ConfigStore;
use crate::data::transport::HttpTransport;
use crate::parse::parsed_model::{ParsedComponent, ParsedPage};
use crate::parse::parser::parse_page_config;
use crate::trace::logger::TraceLogger;
use crate::validate::validation_model::ValidationReport;
use crate::validate::validator::validate_page_config;

// ============================================================================
// validate subcommand
// ============================================================================

/// Validate a config file and print the report. Returns whether it was valid.
pub fn cmd_validate(
    config_path: &str,
    format: &str,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let raw = read_config_file(config_path)?;
    let registry = ComponentTypeRegistry::standard();
    let report = validate_page_config(&raw, &registry);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", format_validation_report(config_path, &report)),
    }

    if verbose > 0 && report.valid {
        eprintln!("{} checked against {} component types", config_path, registry.len());
    }

    Ok(report.valid)
}

// ============================================================================
// parse subcommand
// ============================================================================

/// Validate + parse a config file; optionally load data sources over HTTP.
/// Returns false when the config failed validation.
pub fn cmd_parse(
    config_path: &str,
    permissions: &[String],
    load: bool,
    format: &str,
    app: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let raw = read_config_file(config_path)?;
    let registry = ComponentTypeRegistry::standard();

    let mut page = match parse_page_config(&raw, permissions, &registry) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(false);
        }
    };

    if load {
        let config: PageConfig = serde_json::from_value(raw)?;
        let sources = config.data_source.unwrap_or_default();
        let transport = HttpTransport::with_retries(app.service.retries);
        let logger = build_logger(app);

        if verbose > 0 {
            eprintln!("Loading {} data sources...", sources.len());
        }
        load_data_sources(&mut page, &sources, &transport, &logger);
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&page)?),
        _ => print!("{}", format_parsed_page(&page)),
    }

    Ok(true)
}

// ============================================================================
// bindings subcommand
// ============================================================================

/// Print collected data bindings and event configs for a config file.
pub fn cmd_bindings(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_config_file(config_path)?;
    let config: PageConfig = serde_json::from_value(raw)?;

    let bindings = get_data_bindings(&config);
    println!("Data bindings ({} sources):", bindings.len());
    for (source, fields) in bindings.iter() {
        println!("  {} -> [{}]", source, fields.join(", "));
    }

    let events = get_event_configs(&config);
    println!("Events ({} total):", events.len());
    for event in &events {
        println!("  {}", serde_json::to_string(event)?);
    }

    Ok(())
}

// ============================================================================
// fetch subcommand
// ============================================================================

/// Fetch a config by page code from the configuration service, then parse.
pub fn cmd_fetch(
    page_code: &str,
    endpoint: Option<&str>,
    permissions: &[String],
    app: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let endpoint = endpoint
        .or(app.service.endpoint.as_deref())
        .ok_or("no service endpoint: pass --endpoint or set service.endpoint in page-engine.yaml")?;

    let transport = HttpTransport::with_retries(app.service.retries);
    let store = ConfigStore::new();
    let logger = build_logger(app);
    let source = ConfigSource::new(endpoint, &transport, &store)
        .cache_ttl(Some(Duration::from_secs(app.service.cache_ttl_secs)));

    if verbose > 0 {
        eprintln!("Fetching page '{}' from {}...", page_code, endpoint);
    }
    let raw = source.fetch(page_code, &logger)?;

    let registry = ComponentTypeRegistry::standard();
    match parse_page_config(&raw, permissions, &registry) {
        Ok(page) => {
            print!("{}", format_parsed_page(&page));
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(false)
        }
    }
}

// ============================================================================
// Console formatting
// ============================================================================

/// Format a validation report for terminal output.
///
/// Produces output like:
/// ```text
/// === page.json: INVALID (2 errors) ===
///   [REQUIRED_FIELD] pageCode: pageCode is required and must be a non-empty string
///   [UNSUPPORTED_TYPE] components[0].type: unsupported component type 'MBogus'
/// ```
pub fn format_validation_report(config_path: &str, report: &ValidationReport) -> String {
    let mut out = String::new();

    if report.valid {
        out.push_str(&format!("=== {}: VALID ===\n", config_path));
        return out;
    }

    out.push_str(&format!(
        "=== {}: INVALID ({} errors) ===\n",
        config_path,
        report.errors.len()
    ));
    for error in &report.errors {
        out.push_str(&format!("  {}\n", error));
    }

    out
}

/// Format a parsed page as an indented component tree with visibility
/// markers and the initialized data-source map.
pub fn format_parsed_page(page: &ParsedPage) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} — {} ===\n", page.page_code, page.title));

    for component in &page.components {
        format_component(component, 0, &mut out);
    }

    if !page.data_sources.is_empty() {
        out.push_str(&format!("Data sources ({}):\n", page.data_sources.len()));
        let mut ids: Vec<&String> = page.data_sources.keys().collect();
        ids.sort();
        for id in ids {
            let value = &page.data_sources[id];
            let summary = if value.is_null() {
                "<pending>".to_string()
            } else {
                serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".to_string())
            };
            out.push_str(&format!("  {} = {}\n", id, summary));
        }
    }

    out
}

fn format_component(component: &ParsedComponent, depth: usize, out: &mut String) {
    let marker = if component.visible {
        "\u{2713}"
    } else {
        "\u{2717}"
    };

    out.push_str(&format!(
        "{}{} {} ({})\n",
        "  ".repeat(depth + 1),
        marker,
        component.id,
        component.component_type
    ));

    for child in component.children.as_deref().unwrap_or_default() {
        format_component(child, depth + 1, out);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_config_file(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path, e))?;
    let raw = serde_json::from_str(&content)
        .map_err(|e| format!("'{}' is not valid JSON: {}", path, e))?;
    Ok(raw)
}

fn build_logger(app: &AppConfig) -> TraceLogger {
    match app.trace.path.as_deref() {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    }
}
