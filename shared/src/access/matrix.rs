//! Permission Matrix
//!
//! Module × action grid for one role, projected from the catalog and the
//! role's persisted grants. Edits are staged in memory with [`PermissionMatrix::toggle`]
//! and written back as a whole set (full replace), never row by row.
//!
//! # 流程
//!
//! ```text
//! build(catalog, persisted) → toggle()* → staged() → save (full replace)
//!                                      └→ diff()    (granted / revoked vs. baseline)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::ModuleCatalog;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Action, ModuleAction};

/// Editable permission grid for one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    role_id: i64,
    cells: BTreeMap<String, BTreeMap<Action, bool>>,
    baseline: BTreeSet<ModuleAction>,
}

/// Pending changes of a matrix relative to what was loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDiff {
    /// Pairs that will be granted on save
    pub granted: Vec<ModuleAction>,
    /// Pairs that will be revoked on save
    pub revoked: Vec<ModuleAction>,
}

impl MatrixDiff {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

/// Serializable rendering of a matrix (one row per module)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixView {
    pub role_id: i64,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub module: String,
    pub cells: Vec<MatrixCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub action: Action,
    pub granted: bool,
}

impl PermissionMatrix {
    /// Project the catalog and a role's persisted grants into a grid
    ///
    /// Pure: nothing is written. Persisted pairs that the catalog no longer
    /// offers have no cell and are dropped from the baseline.
    pub fn build<'a, I>(role_id: i64, catalog: &ModuleCatalog, persisted: I) -> Self
    where
        I: IntoIterator<Item = &'a ModuleAction>,
    {
        let persisted: BTreeSet<&ModuleAction> = persisted.into_iter().collect();

        let mut cells = BTreeMap::new();
        let mut baseline = BTreeSet::new();
        for module in catalog.modules() {
            let Some(actions) = catalog.actions(module) else {
                continue;
            };
            let mut row = BTreeMap::new();
            for action in actions {
                let pair = ModuleAction::new(module, action.as_str());
                let granted = persisted.contains(&pair);
                if granted {
                    baseline.insert(pair);
                }
                row.insert(*action, granted);
            }
            cells.insert(module.to_string(), row);
        }

        Self {
            role_id,
            cells,
            baseline,
        }
    }

    pub fn role_id(&self) -> i64 {
        self.role_id
    }

    /// Current (staged) flag of a cell, `None` if the catalog has no such cell
    pub fn is_granted(&self, module: &str, action: &str) -> Option<bool> {
        let action = action.parse::<Action>().ok()?;
        self.cells.get(module)?.get(&action).copied()
    }

    /// Flip one cell; returns the new flag
    ///
    /// Touches only the in-memory grid. Toggling the same cell twice restores
    /// its previous value.
    pub fn toggle(&mut self, module: &str, action: &str) -> AppResult<bool> {
        let cell = self.cell_mut(module, action)?;
        *cell = !*cell;
        Ok(*cell)
    }

    /// Set one cell to an explicit value
    pub fn set(&mut self, module: &str, action: &str, granted: bool) -> AppResult<()> {
        *self.cell_mut(module, action)? = granted;
        Ok(())
    }

    /// Grant or revoke every action of a module at once
    pub fn set_module(&mut self, module: &str, granted: bool) -> AppResult<()> {
        let row = self.cells.get_mut(module).ok_or_else(|| unknown_cell(module, None))?;
        row.values_mut().for_each(|cell| *cell = granted);
        Ok(())
    }

    /// The set that a save would persist
    pub fn staged(&self) -> BTreeSet<ModuleAction> {
        self.cells
            .iter()
            .flat_map(|(module, row)| {
                row.iter()
                    .filter(|(_, granted)| **granted)
                    .map(move |(action, _)| ModuleAction::new(module.as_str(), action.as_str()))
            })
            .collect()
    }

    /// Changes of the staged set against the loaded baseline
    pub fn diff(&self) -> MatrixDiff {
        let staged = self.staged();
        MatrixDiff {
            granted: staged.difference(&self.baseline).cloned().collect(),
            revoked: self.baseline.difference(&staged).cloned().collect(),
        }
    }

    /// Whether there are unsaved edits
    pub fn is_dirty(&self) -> bool {
        self.staged() != self.baseline
    }

    /// Rows in module order, cells in action display order
    pub fn to_view(&self) -> MatrixView {
        MatrixView {
            role_id: self.role_id,
            rows: self
                .cells
                .iter()
                .map(|(module, row)| MatrixRow {
                    module: module.clone(),
                    cells: row
                        .iter()
                        .map(|(action, granted)| MatrixCell {
                            action: *action,
                            granted: *granted,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn cell_mut(&mut self, module: &str, action: &str) -> AppResult<&mut bool> {
        let parsed = action
            .parse::<Action>()
            .map_err(|_| unknown_cell(module, Some(action)))?;
        self.cells
            .get_mut(module)
            .and_then(|row| row.get_mut(&parsed))
            .ok_or_else(|| unknown_cell(module, Some(action)))
    }
}

fn unknown_cell(module: &str, action: Option<&str>) -> AppError {
    let err = match action {
        Some(action) => AppError::with_message(
            ErrorCode::ModuleActionNotInCatalog,
            format!("{module}:{action} is not in the module catalog"),
        )
        .with_detail("action", action),
        None => AppError::with_message(
            ErrorCode::UnknownModule,
            format!("Module '{module}' is not in the module catalog"),
        ),
    };
    err.with_detail("module", module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer_catalog() -> ModuleCatalog {
        ModuleCatalog::from_json(r#"{"leads": ["read"], "customers": ["read", "view"]}"#).unwrap()
    }

    #[test]
    fn test_build_projects_persisted_grants() {
        let persisted = vec![
            ModuleAction::new("leads", "read"),
            // not offered by the catalog any more
            ModuleAction::new("leads", "delete"),
        ];
        let matrix = PermissionMatrix::build(7, &viewer_catalog(), &persisted);

        assert_eq!(matrix.is_granted("leads", "read"), Some(true));
        assert_eq!(matrix.is_granted("customers", "view"), Some(false));
        assert_eq!(matrix.is_granted("customers", "read"), Some(false));
        assert_eq!(matrix.is_granted("leads", "delete"), None);
        assert_eq!(
            matrix.staged(),
            BTreeSet::from([ModuleAction::new("leads", "read")])
        );
        assert!(!matrix.is_dirty());
    }

    #[test]
    fn test_toggle_twice_is_noop() {
        let catalog = ModuleCatalog::builtin();
        let persisted = vec![ModuleAction::new("leads", "read")];
        let fresh = PermissionMatrix::build(3, &catalog, &persisted);

        for entry in catalog.entries() {
            let mut matrix = fresh.clone();
            let before = matrix.is_granted(&entry.module, &entry.action);
            assert_eq!(matrix.toggle(&entry.module, &entry.action).unwrap(), !before.unwrap());
            matrix.toggle(&entry.module, &entry.action).unwrap();
            assert_eq!(matrix.is_granted(&entry.module, &entry.action), before);
            assert_eq!(matrix, fresh);
        }
    }

    #[test]
    fn test_toggle_unknown_cell() {
        let mut matrix = PermissionMatrix::build(7, &viewer_catalog(), &[]);
        let err = matrix.toggle("leads", "delete").unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleActionNotInCatalog);
        let err = matrix.toggle("leads", "approve").unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleActionNotInCatalog);
        let err = matrix.set_module("payroll", true).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownModule);
    }

    #[test]
    fn test_diff_against_baseline() {
        let persisted = vec![ModuleAction::new("leads", "read")];
        let mut matrix = PermissionMatrix::build(7, &viewer_catalog(), &persisted);

        matrix.toggle("leads", "read").unwrap();
        matrix.toggle("customers", "view").unwrap();

        let diff = matrix.diff();
        assert_eq!(diff.granted, vec![ModuleAction::new("customers", "view")]);
        assert_eq!(diff.revoked, vec![ModuleAction::new("leads", "read")]);
        assert!(matrix.is_dirty());

        matrix.toggle("leads", "read").unwrap();
        matrix.toggle("customers", "view").unwrap();
        assert!(matrix.diff().is_empty());
    }

    #[test]
    fn test_set_module() {
        let mut matrix = PermissionMatrix::build(7, &viewer_catalog(), &[]);
        matrix.set_module("customers", true).unwrap();
        assert_eq!(matrix.staged().len(), 2);
        matrix.set("customers", "read", false).unwrap();
        assert_eq!(
            matrix.staged(),
            BTreeSet::from([ModuleAction::new("customers", "view")])
        );
    }

    #[test]
    fn test_view_orders_cells_by_display_priority() {
        let matrix = PermissionMatrix::build(7, &viewer_catalog(), &[]);
        let view = matrix.to_view();
        assert_eq!(view.rows[0].module, "customers");
        let actions: Vec<Action> = view.rows[0].cells.iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![Action::View, Action::Read]);
    }
}
