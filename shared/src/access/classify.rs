//! Role classification
//!
//! A small closed set of role classes consumed by the route guard's fallback
//! policy. Computed once per session from the [`RolePredicates`] seam.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::ADMIN_ROLE_ID;

/// Boolean classification predicates over a role id
///
/// Implementations must return `true` for [`ADMIN_ROLE_ID`] from every
/// predicate, mirroring the administrator bypass of the decision function.
pub trait RolePredicates {
    fn is_lead_gen(&self, role_id: i64) -> bool;
    fn is_front_sales(&self, role_id: i64) -> bool;
    fn is_upsell(&self, role_id: i64) -> bool;
}

/// Closed role classification, in fallback precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    Admin,
    LeadGen,
    FrontSales,
    Upsell,
    Other,
}

impl RoleClass {
    /// Classify a role; the first matching predicate wins
    ///
    /// Lead-gen precedes front-sales, which precedes upsell. A role matching
    /// several predicates takes the earliest class.
    pub fn of(role_id: i64, predicates: &dyn RolePredicates) -> Self {
        if role_id == ADMIN_ROLE_ID {
            RoleClass::Admin
        } else if predicates.is_lead_gen(role_id) {
            RoleClass::LeadGen
        } else if predicates.is_front_sales(role_id) {
            RoleClass::FrontSales
        } else if predicates.is_upsell(role_id) {
            RoleClass::Upsell
        } else {
            RoleClass::Other
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, RoleClass::Admin)
    }
}

/// Classification driven by configured role id sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClassifier {
    #[serde(default)]
    pub lead_gen: BTreeSet<i64>,
    #[serde(default)]
    pub front_sales: BTreeSet<i64>,
    #[serde(default)]
    pub upsell: BTreeSet<i64>,
}

impl RoleClassifier {
    pub fn new(
        lead_gen: impl IntoIterator<Item = i64>,
        front_sales: impl IntoIterator<Item = i64>,
        upsell: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            lead_gen: lead_gen.into_iter().collect(),
            front_sales: front_sales.into_iter().collect(),
            upsell: upsell.into_iter().collect(),
        }
    }

    pub fn classify(&self, role_id: i64) -> RoleClass {
        RoleClass::of(role_id, self)
    }
}

impl RolePredicates for RoleClassifier {
    fn is_lead_gen(&self, role_id: i64) -> bool {
        role_id == ADMIN_ROLE_ID || self.lead_gen.contains(&role_id)
    }

    fn is_front_sales(&self, role_id: i64) -> bool {
        role_id == ADMIN_ROLE_ID || self.front_sales.contains(&role_id)
    }

    fn is_upsell(&self, role_id: i64) -> bool {
        role_id == ADMIN_ROLE_ID || self.upsell.contains(&role_id)
    }
}
