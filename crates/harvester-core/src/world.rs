//! Multi-unit driver.
//!
//! A [`GatherWorld`] owns every extracting unit, the arena of live
//! extractables they share, and the stockpile their deliveries land in.
//! Each [`GatherWorld::step`] updates units in insertion order against the
//! same arena, so a unit that empties a mine is seen by the next unit in the
//! same tick.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::event::ExtractionEvent;
use crate::extractor::ExtractionEngine;
use crate::fixed::Ticks;
use crate::id::{ExtractableId, ExtractorId, ResourceTypeId};
use crate::resource::{ExtractableModel, Extractables};

/// Units, live resources and the shared stockpile.
#[derive(Debug, Default)]
pub struct GatherWorld {
    extractors: SlotMap<ExtractorId, ExtractionEngine>,
    extractables: Extractables,
    stockpile: BTreeMap<ResourceTypeId, u64>,
    tick: Ticks,
    paused: bool,
}

impl GatherWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Units
    // -----------------------------------------------------------------------

    pub fn add_extractor(&mut self, engine: ExtractionEngine) -> ExtractorId {
        self.extractors.insert(engine)
    }

    /// Remove a unit. Whatever it was carrying is lost with it.
    pub fn remove_extractor(&mut self, id: ExtractorId) -> Option<ExtractionEngine> {
        self.extractors.remove(id)
    }

    pub fn extractor(&self, id: ExtractorId) -> Option<&ExtractionEngine> {
        self.extractors.get(id)
    }

    pub fn extractor_mut(&mut self, id: ExtractorId) -> Option<&mut ExtractionEngine> {
        self.extractors.get_mut(id)
    }

    /// Borrow a unit together with the arena, e.g. to assign a live resource.
    pub fn extractor_with_arena(
        &mut self,
        id: ExtractorId,
    ) -> Option<(&mut ExtractionEngine, &Extractables)> {
        let engine = self.extractors.get_mut(id)?;
        Some((engine, &self.extractables))
    }

    pub fn extractor_count(&self) -> usize {
        self.extractors.len()
    }

    /// Number of units not idle.
    pub fn active_count(&self) -> usize {
        self.extractors
            .values()
            .filter(|e| e.is_extracting())
            .count()
    }

    // -----------------------------------------------------------------------
    // Live extractables
    // -----------------------------------------------------------------------

    pub fn spawn_extractable(&mut self, model: ExtractableModel) -> ExtractableId {
        self.extractables.spawn(model)
    }

    /// Destroy a live extractable. Units working it go idle on their next step.
    pub fn despawn_extractable(&mut self, id: ExtractableId) -> Option<ExtractableModel> {
        self.extractables.despawn(id)
    }

    pub fn extractables(&self) -> &Extractables {
        &self.extractables
    }

    pub fn extractables_mut(&mut self) -> &mut Extractables {
        &mut self.extractables
    }

    // -----------------------------------------------------------------------
    // Stockpile
    // -----------------------------------------------------------------------

    /// Total delivered so far for one resource type.
    pub fn stockpile(&self, resource_type: ResourceTypeId) -> u64 {
        self.stockpile.get(&resource_type).copied().unwrap_or(0)
    }

    pub fn stockpile_iter(&self) -> impl Iterator<Item = (ResourceTypeId, u64)> + '_ {
        self.stockpile.iter().map(|(k, v)| (*k, *v))
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    /// Pause the simulation. `step` becomes a no-op until resumed.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Update every unit by `dt` and credit deliveries to the stockpile.
    pub fn step(&mut self, dt: f64) -> Vec<(ExtractorId, ExtractionEvent)> {
        let mut out = Vec::new();
        if self.paused {
            return out;
        }

        for (id, engine) in &mut self.extractors {
            for event in engine.update(dt, &mut self.extractables) {
                if let ExtractionEvent::DroppedOff {
                    resource_type,
                    quantity,
                } = event
                {
                    *self.stockpile.entry(resource_type).or_insert(0) += u64::from(quantity);
                }
                out.push((id, event));
            }
        }

        self.tick += 1;
        tracing::trace!(tick = self.tick, events = out.len(), "gather step");
        out
    }
}
