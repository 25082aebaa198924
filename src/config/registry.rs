use std::collections::HashSet;

// ============================================================================
// Component Type Registry — the closed set of renderable type names
// ============================================================================

/// Every component type the validator accepts. The render-time registry is
/// seeded from the same list so the two never diverge in what they accept.
pub const STANDARD_COMPONENT_TYPES: &[&str] = &[
    // Base atoms
    "MButton",
    "MInput",
    "MCard",
    "MList",
    "MText",
    "MImage",
    "MIcon",
    // Business widgets
    "MScanner",
    "MTable",
    "MForm",
    "MWorkOrderCard",
    "MLocationPicker",
    // Layout containers
    "MContainer",
    "MRow",
    "MColumn",
    "MGrid",
    "MScrollView",
    // Form controls
    "MSelect",
    "MDatePicker",
    "MSwitch",
    "MRadio",
    "MCheckbox",
];

/// Membership oracle for component type names.
///
/// Constructed explicitly and passed to the validator — never a process-wide
/// singleton, so independent page hosts (and tests) cannot interfere.
#[derive(Debug, Clone)]
pub struct ComponentTypeRegistry {
    types: HashSet<String>,
}

impl ComponentTypeRegistry {
    /// The standard closed set used in production.
    pub fn standard() -> Self {
        Self::with_types(STANDARD_COMPONENT_TYPES.iter().map(|t| t.to_string()))
    }

    /// A registry over an arbitrary set of names (for hosts and tests).
    pub fn with_types(types: impl IntoIterator<Item = String>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    /// O(1) membership test.
    pub fn is_supported(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ComponentTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
