//! Route Guard / Redirect Policy
//!
//! Decides, for a navigation to `(module, action)`, whether to render the
//! protected view, keep showing a loading state, or redirect.
//!
//! # 状态
//!
//! | state | meaning |
//! |-------|---------|
//! | `Loading` | permission data for the session not yet available |
//! | `Granted` | render the protected content |
//! | `Denied` | render a fallback, with the redirect target and reason |
//!
//! Only a denied **home view** (`home_module`, `read`) gets role-specific
//! routing (lead-gen → front-sales → upsell → default). Every other denial
//! bounces to the default dashboard.

use serde::{Deserialize, Serialize};

use super::classify::{RoleClass, RolePredicates};
use super::decision::{AccessSnapshot, effective_action, has_permission};
use super::grants::GrantSet;

/// Loading state of the session's permission data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready(GrantSet),
    /// Fetch failed; access cannot be verified
    Failed(String),
}

/// Explicit per-session caller context
///
/// Created when the caller's role is known; the role class is computed once
/// here and never re-evaluated for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSession {
    role_id: i64,
    class: RoleClass,
    load: LoadState,
}

impl AccessSession {
    /// New session whose permissions are still being fetched
    pub fn new(role_id: i64, predicates: &dyn RolePredicates) -> Self {
        Self {
            role_id,
            class: RoleClass::of(role_id, predicates),
            load: LoadState::Loading,
        }
    }

    /// New session with permissions already available
    pub fn ready(role_id: i64, predicates: &dyn RolePredicates, grants: GrantSet) -> Self {
        let mut session = Self::new(role_id, predicates);
        session.loaded(grants);
        session
    }

    pub fn loaded(&mut self, grants: GrantSet) {
        self.load = LoadState::Ready(grants);
    }

    pub fn failed(&mut self, reason: impl Into<String>) {
        self.load = LoadState::Failed(reason.into());
    }

    pub fn role_id(&self) -> i64 {
        self.role_id
    }

    pub fn role_class(&self) -> RoleClass {
        self.class
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Snapshot for local permission checks, once loaded
    pub fn snapshot(&self) -> Option<AccessSnapshot> {
        match &self.load {
            LoadState::Ready(grants) => Some(AccessSnapshot::new(self.role_id, grants.clone())),
            _ => None,
        }
    }

    /// Local permission check; anything not positively loaded is denied
    /// (the administrator bypass still applies)
    pub fn has_permission(&self, module: Option<&str>, action: Option<&str>) -> bool {
        match &self.load {
            LoadState::Ready(grants) => has_permission(self.role_id, grants, module, action),
            _ => has_permission(self.role_id, &GrantSet::new(), module, action),
        }
    }
}

/// Why a navigation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The request named no module
    NoModule,
    /// The decision function said no
    NotPermitted,
    /// Permission data failed to load ("cannot verify access")
    Unverifiable,
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardDecision {
    Loading,
    Granted,
    Denied { redirect: String, reason: DenyReason },
}

impl GuardDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardDecision::Granted)
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            GuardDecision::Denied { redirect, .. } => Some(redirect),
            _ => None,
        }
    }
}

/// Redirect targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    pub default_dashboard: String,
    pub lead_gen_dashboard: String,
    pub front_sales_dashboard: String,
    pub upsell_dashboard: String,
}

impl Default for Destinations {
    fn default() -> Self {
        Self {
            default_dashboard: "/dashboard".to_string(),
            lead_gen_dashboard: "/lead-gen/dashboard".to_string(),
            front_sales_dashboard: "/front-sales/dashboard".to_string(),
            upsell_dashboard: "/upsell/dashboard".to_string(),
        }
    }
}

/// Route guard with its redirect policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGuard {
    /// Module of the primary dashboard / home view
    pub home_module: String,
    pub destinations: Destinations,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            home_module: "dashboard".to_string(),
            destinations: Destinations::default(),
        }
    }
}

impl RouteGuard {
    pub fn new(home_module: impl Into<String>, destinations: Destinations) -> Self {
        Self {
            home_module: home_module.into(),
            destinations,
        }
    }

    /// Evaluate a navigation
    ///
    /// Order: loading → load failure → administrator → missing module →
    /// decision function → fallback policy.
    pub fn evaluate(
        &self,
        session: &AccessSession,
        module: Option<&str>,
        action: Option<&str>,
    ) -> GuardDecision {
        let grants = match session.load_state() {
            LoadState::Loading => return GuardDecision::Loading,
            LoadState::Failed(_) => {
                return self.deny(
                    self.destinations.default_dashboard.clone(),
                    DenyReason::Unverifiable,
                );
            }
            LoadState::Ready(grants) => grants,
        };

        if session.role_class().is_admin() {
            return GuardDecision::Granted;
        }

        let Some(module) = module.filter(|m| !m.trim().is_empty()) else {
            return self.deny(
                self.destinations.default_dashboard.clone(),
                DenyReason::NoModule,
            );
        };

        if has_permission(session.role_id(), grants, Some(module), action) {
            return GuardDecision::Granted;
        }

        let redirect = if self.is_home_view(module, action) {
            self.home_fallback(session.role_class())
        } else {
            &self.destinations.default_dashboard
        };
        self.deny(redirect.clone(), DenyReason::NotPermitted)
    }

    /// Whether `(module, action)` addresses the primary dashboard
    pub fn is_home_view(&self, module: &str, action: Option<&str>) -> bool {
        module == self.home_module && effective_action(action) == "read"
    }

    fn home_fallback(&self, class: RoleClass) -> &String {
        match class {
            RoleClass::LeadGen => &self.destinations.lead_gen_dashboard,
            RoleClass::FrontSales => &self.destinations.front_sales_dashboard,
            RoleClass::Upsell => &self.destinations.upsell_dashboard,
            RoleClass::Admin | RoleClass::Other => &self.destinations.default_dashboard,
        }
    }

    fn deny(&self, redirect: String, reason: DenyReason) -> GuardDecision {
        tracing::debug!(redirect = %redirect, reason = ?reason, "Navigation denied");
        GuardDecision::Denied { redirect, reason }
    }
}
