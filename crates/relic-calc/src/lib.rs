#![deny(warnings)]

//! Requirement calculator: turns completion counts and held inventory into
//! per-material requirement rows.
//!
//! Everything here is pure. For a per-unit material consumed at steps `S`:
//! - `total_needed = quantity × units × |S|`
//! - `total_held = quantity × Σ count(s ∈ S) + held`
//!
//! A flat material needs its fixed `total` and counts only what is held.

use relic_core::{Inventory, LineConfig, Material, MaterialId, Requirement, StepCounts};
use serde::Serialize;

/// Derived requirement figures for one material.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRow {
    pub id: MaterialId,
    pub name: String,
    pub category: String,
    /// Full-completion target across all units.
    pub total_needed: u64,
    /// Quantity currently held in reserve.
    pub held: u64,
    /// Quantity already consumed by completed units plus `held`.
    #[serde(rename = "totalHeldMaterials")]
    pub total_held: u64,
    /// `total_needed - total_held`, floored at 0.
    pub remaining: u64,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
}

/// Full-completion target of a requirement.
///
/// ```
/// use relic_calc::total_needed;
/// use relic_core::Requirement;
///
/// let r = Requirement::PerUnit { quantity: 5, steps: vec!["step2".into()] };
/// assert_eq!(total_needed(&r, 10), 50);
/// ```
pub fn total_needed(requirement: &Requirement, unit_count: u64) -> u64 {
    match requirement {
        Requirement::PerUnit { quantity, steps } => quantity
            .saturating_mul(unit_count)
            .saturating_mul(steps.len() as u64),
        Requirement::Flat { total } => *total,
    }
}

/// Quantity already used up by completed steps. Steps missing from `counts`
/// contribute 0.
pub fn consumed(requirement: &Requirement, counts: &StepCounts) -> u64 {
    match requirement {
        Requirement::PerUnit { quantity, steps } => quantity.saturating_mul(counts.sum(steps)),
        Requirement::Flat { .. } => 0,
    }
}

/// Progress percentage clamped to `[0, 100]`. A zero target reads as done.
pub fn progress_pct(total_held: u64, total_needed: u64) -> f64 {
    if total_needed == 0 {
        return 100.0;
    }
    (100.0 * total_held as f64 / total_needed as f64).min(100.0)
}

/// Compute the row for one material.
pub fn compute_row(material: &Material, counts: &StepCounts, held: u64, unit_count: u64) -> MaterialRow {
    let needed = total_needed(&material.requirement, unit_count);
    let total_held = consumed(&material.requirement, counts).saturating_add(held);
    MaterialRow {
        id: material.id.clone(),
        name: material.name.clone(),
        category: material.category.clone(),
        total_needed: needed,
        held,
        total_held,
        remaining: needed.saturating_sub(total_held),
        progress: progress_pct(total_held, needed),
    }
}

/// Compute rows for every material, in the order given.
pub fn compute_all(
    materials: &[Material],
    counts: &StepCounts,
    inventory: &Inventory,
    unit_count: u64,
) -> Vec<MaterialRow> {
    materials
        .iter()
        .map(|m| compute_row(m, counts, inventory.held(&m.id), unit_count))
        .collect()
}

/// [`compute_all`] over a line's own material list and unit count.
pub fn compute_line(line: &LineConfig, counts: &StepCounts, inventory: &Inventory) -> Vec<MaterialRow> {
    compute_all(&line.materials, counts, inventory, line.unit_count())
}
