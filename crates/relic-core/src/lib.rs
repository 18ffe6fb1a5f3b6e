#![deny(warnings)]

//! Core domain models and invariants for relic upgrade tracking.
//!
//! This crate defines the serializable static definitions of an upgrade line
//! (units, steps, materials), the two pieces of mutable state a line owns
//! (the completion matrix and the held inventory) and validation helpers for
//! line configuration.

pub mod inventory;
pub mod matrix;

pub use inventory::{coerce_quantity, Inventory, RawQuantity};
pub use matrix::{CompletionMatrix, StepCounts};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an upgrade line, e.g. "zodiac" or "eureka".
    LineId
);
string_id!(
    /// Identifier of a trackable unit (a job, or an armor set), e.g. "pld".
    UnitId
);
string_id!(
    /// Identifier of an upgrade step, e.g. "step3".
    StepId
);
string_id!(
    /// Identifier of a material, e.g. "novusInk".
    MaterialId
);

/// A trackable unit: one column of the checklist grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
}

/// One ordered stage of an upgrade line: one row of the checklist grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: String,
}

/// How much of a material a line needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// `quantity` is consumed once per unit at each of `steps`.
    PerUnit { quantity: u64, steps: Vec<StepId> },
    /// A fixed total regardless of unit count or completion state.
    Flat { total: u64 },
}

/// A material definition, in display order within its line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub category: String,
    pub requirement: Requirement,
}

/// How toggling one cell affects the other cells of the same unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Flip exactly the targeted cell.
    #[default]
    Independent,
    /// Checking a step checks every earlier step; unchecking it clears it and
    /// every later step.
    Monotonic,
}

/// Kind of equipment tracked by a line. Selects the default storage keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    #[default]
    Weapon,
    Armor,
}

/// Key names under which a line persists its two documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub progress_key: String,
    pub inventory_key: String,
}

impl StorageKeys {
    /// Default key pair: `<line>WeaponProgress`/`<line>Inventory` for weapons,
    /// `<line>ArmorProgress`/`<line>ArmorInventory` for armor.
    pub fn for_line(line: &LineId, equipment: Equipment) -> Self {
        match equipment {
            Equipment::Weapon => Self {
                progress_key: format!("{line}WeaponProgress"),
                inventory_key: format!("{line}Inventory"),
            },
            Equipment::Armor => Self {
                progress_key: format!("{line}ArmorProgress"),
                inventory_key: format!("{line}ArmorInventory"),
            },
        }
    }
}

/// Static configuration of one tracked upgrade line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Line identifier, also the prefix of the default storage keys.
    pub id: LineId,
    /// Human-readable title, e.g. "Zodiac Weapons (ARR)".
    pub name: String,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub policy: StepPolicy,
    pub units: Vec<Unit>,
    pub steps: Vec<Step>,
    pub materials: Vec<Material>,
    /// Overrides the default storage keys.
    #[serde(default)]
    pub storage: Option<StorageKeys>,
}

impl LineConfig {
    pub fn unit_count(&self) -> u64 {
        self.units.len() as u64
    }

    pub fn storage_keys(&self) -> StorageKeys {
        self.storage
            .clone()
            .unwrap_or_else(|| StorageKeys::for_line(&self.id, self.equipment))
    }

    pub fn has_step(&self, id: &StepId) -> bool {
        self.steps.iter().any(|s| &s.id == id)
    }

    pub fn has_unit(&self, id: &UnitId) -> bool {
        self.units.iter().any(|u| &u.id == id)
    }

    pub fn material(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.iter().find(|m| &m.id == id)
    }
}

/// Validation errors for line configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("line id must not be empty")]
    EmptyLineId,
    #[error("line {0} has no units")]
    NoUnits(LineId),
    #[error("duplicate unit id: {0}")]
    DuplicateUnit(UnitId),
    #[error("duplicate step id: {0}")]
    DuplicateStep(StepId),
    #[error("duplicate material id: {0}")]
    DuplicateMaterial(MaterialId),
    /// A material references a step that is not part of the line.
    #[error("material {material} references unknown step {step}")]
    UnknownStep { material: MaterialId, step: StepId },
    /// Per-unit materials must be consumed at one step at least.
    #[error("material {0} is not linked to any step")]
    UnlinkedMaterial(MaterialId),
    #[error("material {material} lists step {step} more than once")]
    RepeatedStep { material: MaterialId, step: StepId },
}

/// Validate a line configuration, including material→step references.
pub fn validate_line(line: &LineConfig) -> Result<(), ValidationError> {
    if line.id.as_str().trim().is_empty() {
        return Err(ValidationError::EmptyLineId);
    }
    if line.units.is_empty() {
        return Err(ValidationError::NoUnits(line.id.clone()));
    }

    let mut units = BTreeSet::new();
    for u in &line.units {
        if !units.insert(&u.id) {
            return Err(ValidationError::DuplicateUnit(u.id.clone()));
        }
    }
    let mut steps = BTreeSet::new();
    for s in &line.steps {
        if !steps.insert(&s.id) {
            return Err(ValidationError::DuplicateStep(s.id.clone()));
        }
    }
    let mut materials = BTreeSet::new();
    for m in &line.materials {
        if !materials.insert(&m.id) {
            return Err(ValidationError::DuplicateMaterial(m.id.clone()));
        }
        if let Requirement::PerUnit { steps: linked, .. } = &m.requirement {
            if linked.is_empty() {
                return Err(ValidationError::UnlinkedMaterial(m.id.clone()));
            }
            let mut seen = BTreeSet::new();
            for step in linked {
                if !seen.insert(step) {
                    return Err(ValidationError::RepeatedStep {
                        material: m.id.clone(),
                        step: step.clone(),
                    });
                }
                if !steps.contains(step) {
                    return Err(ValidationError::UnknownStep {
                        material: m.id.clone(),
                        step: step.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn line() -> LineConfig {
        LineConfig {
            id: LineId::from("test"),
            name: "Test Weapons".to_string(),
            equipment: Equipment::Weapon,
            policy: StepPolicy::Independent,
            units: vec![
                Unit { id: "pld".into(), name: "PLD".to_string() },
                Unit { id: "war".into(), name: "WAR".to_string() },
            ],
            steps: vec![
                Step { id: "step1".into(), name: "Base".to_string() },
                Step { id: "step2".into(), name: "Upgraded".to_string() },
                Step { id: "step3".into(), name: "Final".to_string() },
            ],
            materials: vec![
                Material {
                    id: "ore".into(),
                    name: "Ore".to_string(),
                    category: "Base".to_string(),
                    requirement: Requirement::PerUnit { quantity: 3, steps: vec!["step1".into()] },
                },
                Material {
                    id: "token".into(),
                    name: "Token".to_string(),
                    category: "Final".to_string(),
                    requirement: Requirement::Flat { total: 18 },
                },
            ],
            storage: None,
        }
    }

    #[test]
    fn default_storage_keys() {
        let mut l = line();
        let keys = l.storage_keys();
        assert_eq!(keys.progress_key, "testWeaponProgress");
        assert_eq!(keys.inventory_key, "testInventory");

        l.equipment = Equipment::Armor;
        let keys = l.storage_keys();
        assert_eq!(keys.progress_key, "testArmorProgress");
        assert_eq!(keys.inventory_key, "testArmorInventory");
    }

    #[test]
    fn storage_override_wins() {
        let mut l = line();
        l.storage = Some(StorageKeys {
            progress_key: "a".to_string(),
            inventory_key: "b".to_string(),
        });
        assert_eq!(l.storage_keys().inventory_key, "b");
    }

    #[test]
    fn valid_line_passes() {
        assert_eq!(validate_line(&line()), Ok(()));
    }

    #[test]
    fn rejects_unknown_step_reference() {
        let mut l = line();
        l.materials[0].requirement = Requirement::PerUnit { quantity: 1, steps: vec!["step9".into()] };
        assert_eq!(
            validate_line(&l),
            Err(ValidationError::UnknownStep { material: "ore".into(), step: "step9".into() })
        );
    }

    #[test]
    fn rejects_duplicates_and_unlinked() {
        let mut l = line();
        l.units.push(Unit { id: "pld".into(), name: "PLD again".to_string() });
        assert_eq!(validate_line(&l), Err(ValidationError::DuplicateUnit("pld".into())));

        let mut l = line();
        l.materials[0].requirement = Requirement::PerUnit { quantity: 1, steps: vec![] };
        assert_eq!(validate_line(&l), Err(ValidationError::UnlinkedMaterial("ore".into())));

        let mut l = line();
        l.materials[0].requirement = Requirement::PerUnit {
            quantity: 3,
            steps: vec!["step1".into(), "step2".into(), "step1".into()],
        };
        assert_eq!(
            validate_line(&l),
            Err(ValidationError::RepeatedStep { material: "ore".into(), step: "step1".into() })
        );

        let mut l = line();
        l.units.clear();
        assert_eq!(validate_line(&l), Err(ValidationError::NoUnits("test".into())));
    }

    #[test]
    fn requirement_serde_shape() {
        let r = Requirement::PerUnit { quantity: 5, steps: vec!["step2".into()] };
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"kind":"per_unit","quantity":5,"steps":["step2"]}"#);
        let back: Requirement = serde_json::from_str(r#"{"kind":"flat","total":18}"#).unwrap();
        assert_eq!(back, Requirement::Flat { total: 18 });
    }

    #[test]
    fn line_config_roundtrip() {
        let l = line();
        let s = serde_json::to_string_pretty(&l).unwrap();
        let back: LineConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, l);
    }
}
