use serde_json::{json, Value};

use page_engine::config::registry::ComponentTypeRegistry;
use page_engine::parse::parser::parse_page_config;
use page_engine::validate::validation_model::ErrorCode;

// ============================================================================
// Helpers
// ============================================================================

fn registry() -> ComponentTypeRegistry {
    ComponentTypeRegistry::standard()
}

fn perms(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn three_component_page() -> Value {
    json!({
        "pageCode": "inventory",
        "title": "Inventory",
        "components": [
            { "id": "header", "type": "MText", "props": { "text": "Stock" } },
            { "id": "table", "type": "MTable" },
            { "id": "scan", "type": "MScanner" }
        ]
    })
}

// ============================================================================
// Structure preservation
// ============================================================================

#[test]
fn parse_preserves_component_count_order_and_identity() {
    let parsed = parse_page_config(&three_component_page(), &[], &registry())
        .expect("valid config should parse");

    assert_eq!(parsed.page_code, "inventory");
    assert_eq!(parsed.title, "Inventory");
    assert_eq!(parsed.components.len(), 3);
    assert_eq!(parsed.components[0].id, "header");
    assert_eq!(parsed.components[0].component_type, "MText");
    assert_eq!(parsed.components[1].id, "table");
    assert_eq!(parsed.components[2].id, "scan");
}

#[test]
fn invisible_components_stay_in_the_tree() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MText" },
            { "id": "b", "type": "MText", "visible": false },
            { "id": "c", "type": "MText", "permission": "secret" }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");

    // Invisibility is a property on the node, never an exclusion.
    assert_eq!(parsed.components.len(), 3);
    assert!(parsed.components[0].visible);
    assert!(!parsed.components[1].visible);
    assert!(!parsed.components[2].visible);
}

#[test]
fn children_are_mapped_recursively_with_same_length() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            {
                "id": "root",
                "type": "MContainer",
                "children": [
                    { "id": "x", "type": "MText" },
                    { "id": "y", "type": "MRow", "children": [
                        { "id": "z", "type": "MIcon" }
                    ] }
                ]
            }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    let root = &parsed.components[0];
    let children = root.children.as_ref().expect("children kept");

    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id, "x");
    let grandchildren = children[1].children.as_ref().expect("nested children");
    assert_eq!(grandchildren.len(), 1);
    assert_eq!(grandchildren[0].id, "z");
}

#[test]
fn props_are_copied_not_shared() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MButton", "props": { "text": "Go", "count": 3 } }
        ]
    });

    let mut parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    parsed.components[0]
        .props
        .insert("text".to_string(), json!("Changed"));

    // The raw document is untouched by mutations of the parsed model.
    assert_eq!(raw["components"][0]["props"]["text"], json!("Go"));
}

// ============================================================================
// Visibility resolution
// ============================================================================

#[test]
fn default_visibility_is_true() {
    let parsed = parse_page_config(&three_component_page(), &[], &registry()).expect("parse");

    for component in &parsed.components {
        assert!(component.visible, "{} should default to visible", component.id);
    }
}

#[test]
fn permission_gates_visibility() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "admin-panel", "type": "MCard", "permission": "admin" }
        ]
    });

    let denied = parse_page_config(&raw, &perms(&["view"]), &registry()).expect("parse");
    assert!(!denied.components[0].visible);

    let granted =
        parse_page_config(&raw, &perms(&["view", "admin"]), &registry()).expect("parse");
    assert!(granted.components[0].visible);
}

#[test]
fn explicit_false_beats_granted_permission() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MCard", "permission": "admin", "visible": false }
        ]
    });

    let parsed = parse_page_config(&raw, &perms(&["admin"]), &registry()).expect("parse");
    assert!(!parsed.components[0].visible);
}

#[test]
fn empty_permission_string_passes() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MCard", "permission": "" }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    assert!(parsed.components[0].visible);
}

#[test]
fn child_visibility_is_independent_of_hidden_parent() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            {
                "id": "parent",
                "type": "MContainer",
                "permission": "admin",
                "children": [
                    { "id": "child", "type": "MText" },
                    { "id": "locked", "type": "MText", "permission": "admin" }
                ]
            }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    let parent = &parsed.components[0];
    let children = parent.children.as_ref().expect("children");

    assert!(!parent.visible);
    // Each node records its own answer; the renderer handles subtree skipping.
    assert!(children[0].visible);
    assert!(!children[1].visible);
}

#[test]
fn string_visible_is_kept_as_unresolved_expression() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MCard", "visible": "formData.showCard" }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    let component = &parsed.components[0];

    // A string is not a literal truthy flag: parse-time visibility falls back
    // to the permission check, and the expression rides along for render time.
    assert!(component.visible);
    assert_eq!(
        component.visible_expression.as_deref(),
        Some("formData.showCard")
    );
}

// ============================================================================
// Data source initialization
// ============================================================================

#[test]
fn static_source_materializes_its_data() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            {
                "id": "categories",
                "type": "static",
                "config": { "data": [ { "name": "Tools" }, { "name": "Parts" } ] }
            }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    assert_eq!(
        parsed.data_sources.get("categories"),
        Some(&json!([ { "name": "Tools" }, { "name": "Parts" } ]))
    );
}

#[test]
fn api_and_computed_sources_start_null() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [],
        "dataSource": [
            { "id": "orders", "type": "api", "config": { "url": "/api/orders" } },
            {
                "id": "orderCount",
                "type": "computed",
                "config": { "expression": "orders.total", "dependencies": ["orders"] }
            }
        ]
    });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    assert_eq!(parsed.data_sources.get("orders"), Some(&Value::Null));
    assert_eq!(parsed.data_sources.get("orderCount"), Some(&Value::Null));
}

// ============================================================================
// Failure channel
// ============================================================================

#[test]
fn parse_refuses_invalid_config_with_full_error_batch() {
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "type": "MButton" },
            { "id": "b", "type": "Bogus" }
        ]
    });

    let err = parse_page_config(&raw, &[], &registry()).expect_err("must refuse");

    // Validation is all-or-nothing at the page level; every error is carried.
    assert_eq!(err.errors.len(), 2);
    assert_eq!(err.errors[0].path, "components[0].id");
    assert_eq!(err.errors[1].path, "components[1].type");
    assert_eq!(err.errors[1].code, ErrorCode::UnsupportedType);

    let rendered = err.to_string();
    assert!(rendered.contains("2 errors"));
    assert!(rendered.contains("components[1].type"));
}

#[test]
fn structurally_valid_but_untyped_visible_fails_as_invalid_config() {
    // The validator is lenient about `visible`; typed deserialization is not.
    let raw = json!({
        "pageCode": "p",
        "title": "T",
        "components": [
            { "id": "a", "type": "MCard", "visible": 7 }
        ]
    });

    let err = parse_page_config(&raw, &[], &registry()).expect_err("must refuse");
    assert_eq!(err.errors.len(), 1);
    assert_eq!(err.errors[0].code, ErrorCode::InvalidConfig);
}

#[test]
fn zero_component_page_parses() {
    let raw = json!({ "pageCode": "empty", "title": "Empty", "components": [] });

    let parsed = parse_page_config(&raw, &[], &registry()).expect("parse");
    assert!(parsed.components.is_empty());
    assert!(parsed.data_sources.is_empty());
}
