use std::time::Duration;

use serde_json::{json, Value};

use page_engine::config::config_model::{DataSourceConfig, PageConfig};
use page_engine::config::registry::ComponentTypeRegistry;
use page_engine::data::config_source::ConfigSource;
use page_engine::data::loader::load_data_sources;
use page_engine::data::queue::OfflineQueue;
use page_engine::data::store::{config_cache_key, ConfigStore};
use page_engine::data::transport::{ApiResponse, MockTransport};
use page_engine::parse::parser::parse_page_config;
use page_engine::trace::logger::TraceLogger;

// ============================================================================
// Helpers
// ============================================================================

fn parse_with_sources(raw: Value) -> (page_engine::ParsedPage, Vec<DataSourceConfig>) {
    let page =
        parse_page_config(&raw, &[], &ComponentTypeRegistry::standard()).expect("valid config");
    let config: PageConfig = serde_json::from_value(raw).expect("typed config");
    (page, config.data_source.unwrap_or_default())
}

// ============================================================================
// Data source loading
// ============================================================================

#[test]
fn one_failing_source_does_not_abort_the_others() {
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            { "id": "broken", "type": "api", "config": { "url": "/api/broken" } },
            { "id": "healthy", "type": "api", "config": { "url": "/api/healthy" } }
        ]
    }));

    let transport = MockTransport::new();
    transport.fail_with("/api/broken", "boom");
    transport.respond_with("/api/healthy", ApiResponse::ok(json!([1, 2, 3])));

    load_data_sources(&mut page, &sources, &transport, &TraceLogger::disabled());

    assert_eq!(page.data_sources.get("broken"), Some(&Value::Null));
    assert_eq!(page.data_sources.get("healthy"), Some(&json!([1, 2, 3])));
}

#[test]
fn auto_load_false_sources_are_skipped() {
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            { "id": "lazy", "type": "api", "config": { "url": "/api/lazy" }, "autoLoad": false }
        ]
    }));

    let transport = MockTransport::new();
    transport.respond_with("/api/lazy", ApiResponse::ok(json!("eager")));

    load_data_sources(&mut page, &sources, &transport, &TraceLogger::disabled());

    assert_eq!(page.data_sources.get("lazy"), Some(&Value::Null));
    assert!(transport.requests().is_empty());
}

#[test]
fn transform_path_is_applied_to_response_data() {
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            {
                "id": "names",
                "type": "api",
                "config": { "url": "/api/users", "transform": "page.rows" }
            }
        ]
    }));

    let transport = MockTransport::new();
    transport.respond_with(
        "/api/users",
        ApiResponse::ok(json!({ "page": { "rows": ["a", "b"] }, "total": 2 })),
    );

    load_data_sources(&mut page, &sources, &transport, &TraceLogger::disabled());
    assert_eq!(page.data_sources.get("names"), Some(&json!(["a", "b"])));
}

#[test]
fn malformed_api_config_surfaces_at_load_time_only() {
    // Passed validation (config is an object), fails the typed api shape.
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            { "id": "odd", "type": "api", "config": { "nonsense": true } }
        ]
    }));

    let transport = MockTransport::new();
    load_data_sources(&mut page, &sources, &transport, &TraceLogger::disabled());

    assert_eq!(page.data_sources.get("odd"), Some(&Value::Null));
    assert!(transport.requests().is_empty());
}

#[test]
fn computed_sources_resolve_regardless_of_declaration_order() {
    // The computed source is declared before the api source it reads from.
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            {
                "id": "firstItem",
                "type": "computed",
                "config": { "expression": "orders.items.0", "dependencies": ["orders"] }
            },
            { "id": "orders", "type": "api", "config": { "url": "/api/orders" } }
        ]
    }));

    let transport = MockTransport::new();
    transport.respond_with(
        "/api/orders",
        ApiResponse::ok(json!({ "items": ["widget", "gadget"] })),
    );

    load_data_sources(&mut page, &sources, &transport, &TraceLogger::disabled());
    assert_eq!(page.data_sources.get("firstItem"), Some(&json!("widget")));
}

#[test]
fn computed_chain_reaches_fixpoint() {
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            {
                "id": "second",
                "type": "computed",
                "config": { "expression": "first", "dependencies": ["first"] }
            },
            {
                "id": "first",
                "type": "computed",
                "config": { "expression": "base.value", "dependencies": ["base"] }
            },
            { "id": "base", "type": "static", "config": { "data": { "value": 7 } } }
        ]
    }));

    load_data_sources(
        &mut page,
        &sources,
        &MockTransport::new(),
        &TraceLogger::disabled(),
    );

    assert_eq!(page.data_sources.get("first"), Some(&json!(7)));
    assert_eq!(page.data_sources.get("second"), Some(&json!(7)));
}

#[test]
fn computed_source_with_missing_dependency_stays_null() {
    let (mut page, sources) = parse_with_sources(json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            {
                "id": "orphan",
                "type": "computed",
                "config": { "expression": "ghost.value", "dependencies": ["ghost"] }
            }
        ]
    }));

    load_data_sources(
        &mut page,
        &sources,
        &MockTransport::new(),
        &TraceLogger::disabled(),
    );

    assert_eq!(page.data_sources.get("orphan"), Some(&Value::Null));
}

// ============================================================================
// Config store
// ============================================================================

#[test]
fn store_round_trips_unexpired_entries() {
    let store = ConfigStore::new();
    store.put("k", json!({ "a": 1 }), Some(Duration::from_secs(60)));

    assert_eq!(store.get("k"), Some(json!({ "a": 1 })));
    assert_eq!(store.len(), 1);
}

#[test]
fn store_expires_entries_after_ttl() {
    let store = ConfigStore::new();
    store.put("gone", json!("x"), Some(Duration::from_millis(0)));

    assert_eq!(store.get("gone"), None);
    // Expired entries are evicted on read.
    assert!(store.is_empty());
}

#[test]
fn store_without_ttl_never_expires() {
    let store = ConfigStore::new();
    store.put("forever", json!("y"), None);

    assert_eq!(store.get("forever"), Some(json!("y")));
}

#[test]
fn cache_keys_distinguish_endpoint_and_page_code() {
    let a = config_cache_key("https://svc", "home");
    let b = config_cache_key("https://svc", "detail");
    let c = config_cache_key("https://other", "home");

    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, config_cache_key("https://svc", "home"));
    assert!(a.starts_with("page-config:"));
}

// ============================================================================
// Config source
// ============================================================================

#[test]
fn config_source_hits_cache_on_second_fetch() {
    let transport = MockTransport::new();
    transport.respond_with(
        "https://svc/page/home",
        ApiResponse::ok(json!({ "pageCode": "home", "title": "Home", "components": [] })),
    );

    let store = ConfigStore::new();
    let source = ConfigSource::new("https://svc/", &transport, &store);
    let logger = TraceLogger::disabled();

    let first = source.fetch("home", &logger).expect("first fetch");
    let second = source.fetch("home", &logger).expect("second fetch");

    assert_eq!(first, second);
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn config_source_propagates_transport_failure() {
    let transport = MockTransport::new();
    transport.fail_with("https://svc/page/missing", "not found");

    let store = ConfigStore::new();
    let source = ConfigSource::new("https://svc", &transport, &store);

    let result = source.fetch("missing", &TraceLogger::disabled());
    assert!(result.is_err());
    assert!(store.is_empty());
}

// ============================================================================
// Offline queue
// ============================================================================

#[test]
fn flush_delivers_and_requeues_in_order() {
    let queue = OfflineQueue::new();
    queue.enqueue("/api/a", "POST", json!({ "n": 1 }));
    queue.enqueue("/api/b", "POST", json!({ "n": 2 }));
    queue.enqueue("/api/c", "PUT", json!({ "n": 3 }));

    let transport = MockTransport::new();
    transport.respond_with("/api/a", ApiResponse::ok(Value::Null));
    transport.fail_with("/api/b", "offline");
    transport.respond_with("/api/c", ApiResponse::ok(Value::Null));

    let outcome = queue.flush(&transport, &TraceLogger::disabled());

    assert_eq!(outcome.sent, 2);
    assert_eq!(outcome.requeued, 1);

    let pending = queue.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, "/api/b");
    assert_eq!(pending[0].body, json!({ "n": 2 }));
}

#[test]
fn successful_flush_empties_the_queue() {
    let queue = OfflineQueue::new();
    queue.enqueue("/api/a", "POST", json!(1));

    let transport = MockTransport::new();
    transport.respond_with("/api/a", ApiResponse::ok(Value::Null));

    let outcome = queue.flush(&transport, &TraceLogger::disabled());
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.requeued, 0);
    assert!(queue.is_empty());
}
