//! Grant set - the persisted permissions of one role, indexed for lookup

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::ModuleAction;

/// Set of granted `(module, action)` pairs for a single role
///
/// Indexed by module so that a check is two hash lookups with no allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ModuleAction>", into = "Vec<ModuleAction>")]
pub struct GrantSet {
    by_module: HashMap<String, HashSet<String>>,
}

impl GrantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, module: &str, action: &str) -> bool {
        self.by_module
            .get(module)
            .is_some_and(|actions| actions.contains(action))
    }

    /// Returns `false` if the pair was already present
    pub fn insert(&mut self, grant: ModuleAction) -> bool {
        self.by_module
            .entry(grant.module)
            .or_default()
            .insert(grant.action)
    }

    pub fn len(&self) -> usize {
        self.by_module.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grants sorted by module then action
    pub fn to_sorted_vec(&self) -> Vec<ModuleAction> {
        let mut grants: Vec<ModuleAction> = self
            .by_module
            .iter()
            .flat_map(|(module, actions)| {
                actions
                    .iter()
                    .map(move |action| ModuleAction::new(module.as_str(), action.as_str()))
            })
            .collect();
        grants.sort();
        grants
    }
}

impl FromIterator<ModuleAction> for GrantSet {
    fn from_iter<I: IntoIterator<Item = ModuleAction>>(iter: I) -> Self {
        let mut set = GrantSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<ModuleAction> for GrantSet {
    fn extend<I: IntoIterator<Item = ModuleAction>>(&mut self, iter: I) {
        for grant in iter {
            self.insert(grant);
        }
    }
}

impl From<Vec<ModuleAction>> for GrantSet {
    fn from(grants: Vec<ModuleAction>) -> Self {
        grants.into_iter().collect()
    }
}

impl From<GrantSet> for Vec<ModuleAction> {
    fn from(set: GrantSet) -> Self {
        set.to_sorted_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_len() {
        let set: GrantSet = vec![
            ModuleAction::new("leads", "read"),
            ModuleAction::new("leads", "read"),
            ModuleAction::new("customers", "view"),
        ]
        .into();
        assert_eq!(set.len(), 2);
        assert!(set.contains("leads", "read"));
        assert!(!set.contains("leads", "delete"));
        assert!(!set.contains("customers", "read"));
        assert!(!set.contains("", "read"));
    }

    #[test]
    fn test_serde_as_sorted_list() {
        let set: GrantSet = vec![
            ModuleAction::new("leads", "read"),
            ModuleAction::new("customers", "view"),
        ]
        .into();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"module": "customers", "action": "view"},
                {"module": "leads", "action": "read"}
            ])
        );
        let back: GrantSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
