//! Persisted state holders: the completion matrix and the held inventory.
//!
//! Both stores restore from the medium on load, falling back to a zeroed
//! default when the document is missing or malformed, and write the whole
//! document back after every value-changing mutation. Write failures are
//! logged and swallowed; the in-memory state stays authoritative.

use persistence::KeyValueStore;
use relic_core::{
    coerce_quantity, CompletionMatrix, Inventory, Material, MaterialId, RawQuantity, Step, StepCounts,
    StepId, StepPolicy, Unit, UnitId,
};
use tracing::{debug, info, warn};

/// Read `key`, treating read failures like absence.
fn read<M: KeyValueStore>(medium: &M, key: &str) -> Option<String> {
    match medium.get(key) {
        Ok(text) => text,
        Err(e) => {
            warn!(key, error = %e, "read failed; using defaults");
            None
        }
    }
}

fn write<M: KeyValueStore>(medium: &mut M, key: &str, text: Result<String, serde_json::Error>) {
    let text = match text {
        Ok(t) => t,
        Err(e) => {
            warn!(key, error = %e, "serialization failed; not persisted");
            return;
        }
    };
    if let Err(e) = medium.set(key, text) {
        warn!(key, error = %e, "write failed; change kept in memory only");
    }
}

/// Owns a line's completion matrix and its derived step counts.
#[derive(Debug, Clone)]
pub struct CompletionMatrixStore {
    key: String,
    matrix: CompletionMatrix,
    counts: StepCounts,
}

impl CompletionMatrixStore {
    /// Restore the matrix under `key`, or zero-initialize it over `steps` × `units`.
    pub fn load<M: KeyValueStore>(medium: &M, key: &str, steps: &[Step], units: &[Unit]) -> Self {
        let matrix = match read(medium, key) {
            Some(text) => match CompletionMatrix::from_json(&text) {
                Ok(m) => {
                    info!(key, "restored completion matrix");
                    m
                }
                Err(e) => {
                    warn!(key, error = %e, "malformed completion matrix; starting fresh");
                    CompletionMatrix::zeroed(steps, units)
                }
            },
            None => CompletionMatrix::zeroed(steps, units),
        };
        let counts = matrix.counts();
        Self {
            key: key.to_string(),
            matrix,
            counts,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matrix(&self) -> &CompletionMatrix {
        &self.matrix
    }

    pub fn counts(&self) -> &StepCounts {
        &self.counts
    }

    /// Toggle `(step, unit)` under `policy`, persist the matrix and return the
    /// fresh step counts.
    pub fn toggle<M: KeyValueStore>(
        &mut self,
        medium: &mut M,
        steps: &[Step],
        step: &StepId,
        unit: &UnitId,
        policy: StepPolicy,
    ) -> &StepCounts {
        self.matrix = self.matrix.toggled(steps, step, unit, policy);
        self.counts = self.matrix.counts();
        debug!(key = %self.key, %step, %unit, done = self.matrix.is_done(step, unit), "toggled");
        write(medium, &self.key, self.matrix.to_json());
        &self.counts
    }
}

/// Owns a line's held inventory.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    key: String,
    inventory: Inventory,
}

impl InventoryStore {
    /// Restore the inventory under `key`, or start every material at 0.
    pub fn load<M: KeyValueStore>(medium: &M, key: &str, materials: &[Material]) -> Self {
        let inventory = match read(medium, key) {
            Some(text) => match Inventory::from_json(&text) {
                Ok(inv) => {
                    info!(key, "restored inventory");
                    inv
                }
                Err(e) => {
                    warn!(key, error = %e, "malformed inventory; starting fresh");
                    Inventory::zeroed(materials)
                }
            },
            None => Inventory::zeroed(materials),
        };
        Self {
            key: key.to_string(),
            inventory,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Coerce `raw` and store it. Returns `false`, without persisting, when
    /// the coerced value equals the current one.
    pub fn set_held<M: KeyValueStore>(&mut self, medium: &mut M, id: &MaterialId, raw: RawQuantity<'_>) -> bool {
        let quantity = coerce_quantity(raw);
        if !self.inventory.set_held(id, quantity) {
            return false;
        }
        debug!(key = %self.key, material = %id, quantity, "held changed");
        write(medium, &self.key, self.inventory.to_json());
        true
    }
}
