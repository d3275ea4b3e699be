//! Module Catalog
//!
//! The fixed universe of `(module, action)` pairs the application understands.
//! Stored as a lookup table `module → {actions}` so that "unknown module" and
//! "action not offered by this module" are structural checks rather than
//! string matching scattered across callers.
//!
//! 目录在启动时加载一次，运行期间只读。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Action, ModuleAction};

/// Built-in catalog of the business application
///
/// | module | actions |
/// |--------|---------|
/// | dashboard | view, read |
/// | leads / sales / projects / customers / teams | full CRUD + view |
/// | targets / payments / chargebacks | view, create, read, update |
/// | documents | view, create, read, delete |
/// | imports | create, read |
/// | reports | view, read |
/// | roles / users | full CRUD + view |
const BUILTIN_CATALOG: &[(&str, &[Action])] = &[
    ("dashboard", &[Action::View, Action::Read]),
    ("leads", &Action::ALL),
    ("sales", &Action::ALL),
    ("projects", &Action::ALL),
    ("customers", &Action::ALL),
    ("teams", &Action::ALL),
    (
        "targets",
        &[Action::View, Action::Create, Action::Read, Action::Update],
    ),
    (
        "payments",
        &[Action::View, Action::Create, Action::Read, Action::Update],
    ),
    (
        "chargebacks",
        &[Action::View, Action::Create, Action::Read, Action::Update],
    ),
    (
        "documents",
        &[Action::View, Action::Create, Action::Read, Action::Delete],
    ),
    ("imports", &[Action::Create, Action::Read]),
    ("reports", &[Action::View, Action::Read]),
    ("roles", &Action::ALL),
    ("users", &Action::ALL),
];

/// Raw catalog definition as read from a file: `{"leads": ["read", "view"], ...}`
pub type CatalogDefinition = BTreeMap<String, Vec<String>>;

/// Validated module catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, BTreeSet<Action>>,
}

impl ModuleCatalog {
    /// The catalog shipped with the application
    pub fn builtin() -> Self {
        let modules = BUILTIN_CATALOG
            .iter()
            .map(|(module, actions)| (module.to_string(), actions.iter().copied().collect()))
            .collect();
        Self { modules }
    }

    /// Build a catalog from a raw definition, rejecting anything malformed
    ///
    /// # Rules
    ///
    /// - module names are non-empty and use only `[a-z0-9_-]`
    /// - every module offers at least one action
    /// - every action belongs to the vocabulary (`view, create, read, update, delete`)
    /// - no action is listed twice for the same module
    pub fn from_definition(definition: CatalogDefinition) -> AppResult<Self> {
        if definition.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::CatalogInvalid,
                "Module catalog must define at least one module",
            ));
        }

        let mut modules = BTreeMap::new();
        for (module, raw_actions) in definition {
            validate_module_name(&module)?;

            if raw_actions.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::CatalogInvalid,
                    format!("Module '{module}' must offer at least one action"),
                )
                .with_detail("module", module));
            }

            let mut actions = BTreeSet::new();
            for raw in &raw_actions {
                let action: Action = raw.parse().map_err(|_| {
                    AppError::with_message(
                        ErrorCode::UnknownAction,
                        format!("Module '{module}' lists unknown action '{raw}'"),
                    )
                    .with_detail("module", module.clone())
                    .with_detail("action", raw.clone())
                })?;
                if !actions.insert(action) {
                    return Err(AppError::with_message(
                        ErrorCode::CatalogInvalid,
                        format!("Module '{module}' lists action '{raw}' twice"),
                    )
                    .with_detail("module", module.clone())
                    .with_detail("action", raw.clone()));
                }
            }
            modules.insert(module, actions);
        }

        Ok(Self { modules })
    }

    /// Parse and validate a JSON catalog definition
    pub fn from_json(json: &str) -> AppResult<Self> {
        let definition: CatalogDefinition = serde_json::from_str(json).map_err(|e| {
            AppError::with_message(
                ErrorCode::CatalogInvalid,
                format!("Malformed catalog definition: {e}"),
            )
        })?;
        Self::from_definition(definition)
    }

    /// Whether the catalog offers `action` on `module`
    pub fn contains(&self, module: &str, action: &str) -> bool {
        let Ok(action) = action.parse::<Action>() else {
            return false;
        };
        self.modules
            .get(module)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Actions offered by a module, in display order
    pub fn actions(&self, module: &str) -> Option<&BTreeSet<Action>> {
        self.modules.get(module)
    }

    /// Module names in alphabetical order
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Flattened catalog, grouped by module with actions in display order
    pub fn entries(&self) -> Vec<ModuleAction> {
        self.modules
            .iter()
            .flat_map(|(module, actions)| {
                actions
                    .iter()
                    .map(move |action| ModuleAction::new(module.as_str(), action.as_str()))
            })
            .collect()
    }

    /// Number of `(module, action)` pairs
    pub fn len(&self) -> usize {
        self.modules.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check a write payload against the catalog
    ///
    /// All-or-nothing: any pair the catalog does not offer fails the whole
    /// payload, and every rejected pair is reported in the `rejected` detail.
    /// Duplicates collapse into one entry.
    pub fn validate<'a, I>(&self, pairs: I) -> AppResult<BTreeSet<ModuleAction>>
    where
        I: IntoIterator<Item = &'a ModuleAction>,
    {
        let mut accepted = BTreeSet::new();
        let mut rejected = BTreeSet::new();

        for pair in pairs {
            if self.contains(&pair.module, &pair.action) {
                accepted.insert(pair.clone());
            } else {
                rejected.insert(pair.to_string());
            }
        }

        if !rejected.is_empty() {
            let listed = rejected.iter().cloned().collect::<Vec<_>>();
            return Err(AppError::with_message(
                ErrorCode::ModuleActionNotInCatalog,
                format!(
                    "{} permission(s) not in module catalog: {}",
                    listed.len(),
                    listed.join(", ")
                ),
            )
            .with_detail("rejected", listed));
        }

        Ok(accepted)
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_module_name(module: &str) -> AppResult<()> {
    let valid = !module.is_empty()
        && module
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::CatalogInvalid,
            format!("Invalid module name '{module}'"),
        )
        .with_detail("module", module))
    }
}
