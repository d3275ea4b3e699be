//! Access Decision Function
//!
//! `has_permission(role, module, action)` is the single predicate the rest of
//! the application asks. It is pure: no I/O, no interior state, safe to call
//! on every render and every navigation.

use serde::{Deserialize, Serialize};

use super::grants::GrantSet;
use crate::models::ADMIN_ROLE_ID;

/// Action assumed when the caller does not name one
pub const DEFAULT_ACTION: &str = "read";

/// Decide whether `role_id` may perform `action` on `module`
///
/// # Rules
///
/// 1. The administrator role is always allowed (hard-coded, never stored)
/// 2. A missing or blank module is never allowed (fail closed)
/// 3. A missing or blank action means [`DEFAULT_ACTION`]
/// 4. Otherwise the pair must be in the role's grant set
pub fn has_permission(
    role_id: i64,
    grants: &GrantSet,
    module: Option<&str>,
    action: Option<&str>,
) -> bool {
    if role_id == ADMIN_ROLE_ID {
        return true;
    }

    let Some(module) = module.filter(|m| !m.trim().is_empty()) else {
        return false;
    };

    grants.contains(module, effective_action(action))
}

/// Resolve the action a request refers to, applying the default
pub fn effective_action(action: Option<&str>) -> &str {
    action
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(DEFAULT_ACTION)
}

/// Permissions of the current caller, loaded once per session
///
/// Client-side checks go through this snapshot instead of a network round
/// trip per check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSnapshot {
    pub role_id: i64,
    pub grants: GrantSet,
}

impl AccessSnapshot {
    pub fn new(role_id: i64, grants: GrantSet) -> Self {
        Self { role_id, grants }
    }

    pub fn is_admin(&self) -> bool {
        self.role_id == ADMIN_ROLE_ID
    }

    pub fn has_permission(&self, module: Option<&str>, action: Option<&str>) -> bool {
        has_permission(self.role_id, &self.grants, module, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ModuleCatalog;
    use crate::models::ModuleAction;

    #[test]
    fn test_admin_bypass_without_rows() {
        let empty = GrantSet::new();
        for entry in ModuleCatalog::builtin().entries() {
            assert!(has_permission(
                ADMIN_ROLE_ID,
                &empty,
                Some(&entry.module),
                Some(&entry.action)
            ));
        }
        assert!(has_permission(ADMIN_ROLE_ID, &empty, Some("not-a-module"), Some("fly")));
        assert!(has_permission(ADMIN_ROLE_ID, &empty, None, None));
    }

    #[test]
    fn test_fail_closed_on_missing_module() {
        let grants: GrantSet = vec![ModuleAction::new("leads", "read")].into();
        for role_id in [2, 7, 99] {
            assert!(!has_permission(role_id, &grants, Some(""), Some("read")));
            assert!(!has_permission(role_id, &grants, Some("   "), Some("read")));
            assert!(!has_permission(role_id, &grants, None, Some("read")));
        }
    }

    #[test]
    fn test_default_action_is_read() {
        let grants: GrantSet = vec![ModuleAction::new("leads", "read")].into();
        assert!(has_permission(7, &grants, Some("leads"), None));
        assert!(has_permission(7, &grants, Some("leads"), Some("")));

        let view_only: GrantSet = vec![ModuleAction::new("leads", "view")].into();
        assert!(!has_permission(7, &view_only, Some("leads"), None));
    }

    #[test]
    fn test_viewer_scenario() {
        let snapshot = AccessSnapshot::new(7, vec![ModuleAction::new("leads", "read")].into());
        assert!(snapshot.has_permission(Some("leads"), Some("read")));
        assert!(!snapshot.has_permission(Some("customers"), Some("view")));
        assert!(!snapshot.has_permission(Some("leads"), Some("delete")));
        assert!(!snapshot.is_admin());
    }
}
