//! Completion matrix: the boolean step × unit checklist of a line.

use crate::{Step, StepId, StepPolicy, Unit, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping step → unit → done.
///
/// A freshly created matrix is dense. A matrix restored from storage is kept
/// as persisted; absent cells read as `false` and are never backfilled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionMatrix(BTreeMap<StepId, BTreeMap<UnitId, bool>>);

impl CompletionMatrix {
    /// Dense all-`false` grid over the given steps and units.
    pub fn zeroed(steps: &[Step], units: &[Unit]) -> Self {
        let grid = steps
            .iter()
            .map(|s| {
                let row = units.iter().map(|u| (u.id.clone(), false)).collect();
                (s.id.clone(), row)
            })
            .collect();
        Self(grid)
    }

    pub fn is_done(&self, step: &StepId, unit: &UnitId) -> bool {
        self.0
            .get(step)
            .and_then(|row| row.get(unit))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, step: &StepId, unit: &UnitId, done: bool) {
        self.0
            .entry(step.clone())
            .or_default()
            .insert(unit.clone(), done);
    }

    /// Returns the matrix after toggling `(step, unit)` under `policy`.
    ///
    /// `steps` supplies the ordering used by [`StepPolicy::Monotonic`]. A step
    /// missing from `steps` is flipped on its own.
    pub fn toggled(&self, steps: &[Step], step: &StepId, unit: &UnitId, policy: StepPolicy) -> Self {
        let done = !self.is_done(step, unit);
        let mut next = self.clone();
        let position = steps.iter().position(|s| &s.id == step);
        match (policy, position) {
            (StepPolicy::Monotonic, Some(i)) if done => {
                for s in &steps[..=i] {
                    next.set(&s.id, unit, true);
                }
            }
            (StepPolicy::Monotonic, Some(i)) => {
                for s in &steps[i..] {
                    if next.is_done(&s.id, unit) || s.id == *step {
                        next.set(&s.id, unit, false);
                    }
                }
            }
            _ => next.set(step, unit, done),
        }
        next
    }

    /// Count of done units per persisted step.
    pub fn counts(&self) -> StepCounts {
        StepCounts(
            self.0
                .iter()
                .map(|(step, row)| (step.clone(), row.values().filter(|d| **d).count() as u64))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Number of done units for each step. Derived, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepCounts(BTreeMap<StepId, u64>);

impl StepCounts {
    /// Count for `step`; a step without an entry counts 0.
    pub fn get(&self, step: &StepId) -> u64 {
        self.0.get(step).copied().unwrap_or(0)
    }

    /// Saturating sum of the counts of `steps`.
    pub fn sum(&self, steps: &[StepId]) -> u64 {
        steps.iter().fold(0u64, |acc, s| acc.saturating_add(self.get(s)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StepId, u64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(StepId, u64)> for StepCounts {
    fn from_iter<I: IntoIterator<Item = (StepId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
