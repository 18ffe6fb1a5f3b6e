#![deny(warnings)]

//! Tracker orchestration: one [`Tracker`] per upgrade line.
//!
//! A tracker wires the line's [`CompletionMatrixStore`] and [`InventoryStore`]
//! to the requirement calculator. Its visible state is the pair
//! (completion matrix, inventory); the only transitions are
//! [`Tracker::on_step_toggled`] and [`Tracker::on_held_changed`].

pub mod store;

pub use store::{CompletionMatrixStore, InventoryStore};

use persistence::KeyValueStore;
use relic_calc::MaterialRow;
use relic_core::{
    validate_line, CompletionMatrix, LineConfig, LineId, MaterialId, RawQuantity, Step, StepId, Unit,
    UnitId, ValidationError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned by tracker entry points.
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("invalid line configuration: {0}")]
    Invalid(#[from] ValidationError),
    #[error("line {line} has no step {step}")]
    UnknownStep { line: LineId, step: StepId },
    #[error("line {line} has no unit {unit}")]
    UnknownUnit { line: LineId, unit: UnitId },
    #[error("line {line} has no material {material}")]
    UnknownMaterial { line: LineId, material: MaterialId },
}

/// Outcome of a mutation entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// State changed, rows were recomputed and listeners notified.
    Updated,
    /// The mutation was a no-op; nothing was persisted or recomputed.
    Unchanged,
}

/// Read model handed to the presentation layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerView<'a> {
    pub line: &'a LineId,
    pub name: &'a str,
    pub ordered_units: &'a [Unit],
    pub ordered_steps: &'a [Step],
    pub completion_matrix: &'a CompletionMatrix,
    pub derived_material_rows: &'a [MaterialRow],
}

type Listener = Box<dyn FnMut(&[MaterialRow])>;

/// Orchestrator for one upgrade line over a key-value medium `M`.
pub struct Tracker<M> {
    line: LineConfig,
    medium: M,
    matrix: CompletionMatrixStore,
    inventory: InventoryStore,
    rows: Vec<MaterialRow>,
    listeners: Vec<Listener>,
}

impl<M: KeyValueStore> Tracker<M> {
    /// Validate `line`, restore (or default) both stores from `medium` and
    /// compute the initial rows.
    pub fn new(line: LineConfig, medium: M) -> Result<Self, TrackerError> {
        validate_line(&line)?;
        let keys = line.storage_keys();
        let matrix = CompletionMatrixStore::load(&medium, &keys.progress_key, &line.steps, &line.units);
        let inventory = InventoryStore::load(&medium, &keys.inventory_key, &line.materials);
        let rows = relic_calc::compute_line(&line, matrix.counts(), inventory.inventory());
        info!(line = %line.id, equipment = ?line.equipment, materials = rows.len(), "tracker ready");
        Ok(Self {
            line,
            medium,
            matrix,
            inventory,
            rows,
            listeners: Vec::new(),
        })
    }

    pub fn line(&self) -> &LineConfig {
        &self.line
    }

    pub fn rows(&self) -> &[MaterialRow] {
        &self.rows
    }

    pub fn matrix(&self) -> &CompletionMatrix {
        self.matrix.matrix()
    }

    pub fn inventory(&self) -> &relic_core::Inventory {
        self.inventory.inventory()
    }

    pub fn view(&self) -> TrackerView<'_> {
        TrackerView {
            line: &self.line.id,
            name: &self.line.name,
            ordered_units: &self.line.units,
            ordered_steps: &self.line.steps,
            completion_matrix: self.matrix.matrix(),
            derived_material_rows: &self.rows,
        }
    }

    /// Register a callback receiving the fresh rows after every change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[MaterialRow]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }

    /// Toggle `(step, unit)` under the line's step policy.
    pub fn on_step_toggled(&mut self, step: &StepId, unit: &UnitId) -> Result<Change, TrackerError> {
        if !self.line.has_step(step) {
            return Err(TrackerError::UnknownStep {
                line: self.line.id.clone(),
                step: step.clone(),
            });
        }
        if !self.line.has_unit(unit) {
            return Err(TrackerError::UnknownUnit {
                line: self.line.id.clone(),
                unit: unit.clone(),
            });
        }
        self.matrix
            .toggle(&mut self.medium, &self.line.steps, step, unit, self.line.policy);
        self.recompute();
        Ok(Change::Updated)
    }

    /// Set the held quantity of `material` from raw user input.
    pub fn on_held_changed<'a, R>(&mut self, material: &MaterialId, raw: R) -> Result<Change, TrackerError>
    where
        R: Into<RawQuantity<'a>>,
    {
        if self.line.material(material).is_none() {
            return Err(TrackerError::UnknownMaterial {
                line: self.line.id.clone(),
                material: material.clone(),
            });
        }
        if !self.inventory.set_held(&mut self.medium, material, raw.into()) {
            debug!(line = %self.line.id, %material, "held unchanged");
            return Ok(Change::Unchanged);
        }
        self.recompute();
        Ok(Change::Updated)
    }

    fn recompute(&mut self) {
        self.rows = relic_calc::compute_line(&self.line, self.matrix.counts(), self.inventory.inventory());
        for listener in &mut self.listeners {
            listener(&self.rows);
        }
    }
}
