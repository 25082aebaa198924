use std::collections::HashSet;

use crate::config::config_model::{ComponentConfig, VisibleFlag};

// ============================================================================
// Permission resolution
// ============================================================================

/// The caller's permission tokens, deduplicated.
///
/// Always passed in explicitly — the parser never reads ambient state, so a
/// permission change between page visits simply means a fresh parse.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    tokens: HashSet<String>,
}

impl PermissionSet {
    pub fn from_tokens(tokens: &[String]) -> Self {
        Self {
            tokens: tokens.iter().cloned().collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Whether a declared permission requirement passes.
    /// No requirement (or an empty one) always passes.
    pub fn allows(&self, required: Option<&str>) -> bool {
        match required {
            None => true,
            Some("") => true,
            Some(token) => self.tokens.contains(token),
        }
    }
}

/// Compute a component's own visibility from its `permission` and `visible`
/// fields. Each node is resolved independently; a hidden parent never
/// short-circuits its children (the renderer skips hidden subtrees instead).
///
/// A string-valued `visible` is an unresolved expression, not a literal
/// truthy string: it does not force invisibility here and is carried on the
/// parsed node for a later evaluation pass against the data context.
pub fn resolve_visibility(component: &ComponentConfig, permissions: &PermissionSet) -> bool {
    let explicitly_hidden = matches!(component.visible, Some(VisibleFlag::Flag(false)));

    !explicitly_hidden && permissions.allows(component.permission.as_deref())
}
