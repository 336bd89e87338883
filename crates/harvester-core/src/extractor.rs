//! The extraction state machine.
//!
//! An [`ExtractionEngine`] drives one unit through repeated gathering
//! cycles:
//!
//! ```text
//! Idle -> GoingToResource -> Extracting -> Carrying -> DroppingOff
//!              ^                                          |
//!              +------------------------------------------+
//! ```
//!
//! Quantities accumulate in Q32.32 fixed point so that sub-unit rates
//! progress across ticks. Every state entry produces exactly one
//! [`ExtractionEvent`]; events are returned from the control calls and
//! pushed to registered listeners in the same order.

use crate::config::{validate_capacity, validate_rate, validate_tick_rate, ExtractorConfig};
use crate::event::{ExtractionEvent, ExtractionListener};
use crate::fixed::{fixed64_to_f64, progress_for, Fixed64};
use crate::gate::{AlwaysPermit, ExtractionGate};
use crate::id::{ExtractableId, ResourceTypeId};
use crate::resource::{Availability, Extractables, ResourceReference, Tiled};

// ---------------------------------------------------------------------------
// State and errors
// ---------------------------------------------------------------------------

/// Where a unit is in its gathering cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExtractorState {
    #[default]
    Idle,
    GoingToResource,
    Extracting,
    /// Load complete; waiting for the carry gate before unloading.
    Carrying,
    DroppingOff,
}

/// Errors raised by engine configuration and control calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("capacity must be greater than zero, got {0}")]
    InvalidCapacity(u32),
    #[error("{name} must be positive and finite, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("tick rate must be positive and finite, got {0}")]
    InvalidTickRate(f64),
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ExtractorState,
    },
    #[error("no resource assigned")]
    NoResource,
    #[error("extractable {0:?} does not exist")]
    UnknownExtractable(ExtractableId),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Gathering behavior owned by a single unit.
pub struct ExtractionEngine {
    capacity: u32,
    extraction_per_second: f64,
    drop_off_per_second: f64,
    tick_rate: f64,
    gate: Box<dyn ExtractionGate>,
    listeners: Vec<Box<dyn ExtractionListener>>,
    resource: Option<ResourceReference>,
    state: ExtractorState,
    carried: u32,
    /// Fractional extraction progress. Whole units are moved into `carried`.
    extraction_progress: Fixed64,
    /// Fractional unloading progress.
    drop_off_progress: Fixed64,
    /// Units unloaded since the last `DroppedOff`.
    dropped: u32,
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("capacity", &self.capacity)
            .field("extraction_per_second", &self.extraction_per_second)
            .field("drop_off_per_second", &self.drop_off_per_second)
            .field("tick_rate", &self.tick_rate)
            .field("listeners", &self.listeners.len())
            .field("resource", &self.resource)
            .field("state", &self.state)
            .field("carried", &self.carried)
            .field("extraction_progress", &self.extraction_progress)
            .field("drop_off_progress", &self.drop_off_progress)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionEngine {
    /// Create an idle engine with the default [`ExtractorConfig`].
    pub fn new() -> Self {
        let config = ExtractorConfig::default();
        Self {
            capacity: config.capacity,
            extraction_per_second: config.extraction_per_second,
            drop_off_per_second: config.drop_off_per_second,
            tick_rate: config.tick_rate,
            gate: Box::new(AlwaysPermit),
            listeners: Vec::new(),
            resource: None,
            state: ExtractorState::Idle,
            carried: 0,
            extraction_progress: Fixed64::ZERO,
            drop_off_progress: Fixed64::ZERO,
            dropped: 0,
        }
    }

    /// Create an idle engine from a validated config.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        config.validate()?;
        let mut engine = Self::new();
        engine.capacity = config.capacity;
        engine.extraction_per_second = config.extraction_per_second;
        engine.drop_off_per_second = config.drop_off_per_second;
        engine.tick_rate = config.tick_rate;
        Ok(engine)
    }

    // -- Configuration --

    /// Set the maximum carried quantity. A load already above the new
    /// capacity is carried as-is.
    pub fn set_capacity(&mut self, capacity: u32) -> Result<(), ExtractionError> {
        self.capacity = validate_capacity(capacity)?;
        Ok(())
    }

    pub fn set_extraction_per_second(&mut self, rate: f64) -> Result<(), ExtractionError> {
        self.extraction_per_second = validate_rate("extraction_per_second", rate)?;
        Ok(())
    }

    pub fn set_drop_off_per_second(&mut self, rate: f64) -> Result<(), ExtractionError> {
        self.drop_off_per_second = validate_rate("drop_off_per_second", rate)?;
        Ok(())
    }

    /// Set how many updates make up one second of simulation.
    pub fn set_tick_rate(&mut self, tick_rate: f64) -> Result<(), ExtractionError> {
        self.tick_rate = validate_tick_rate(tick_rate)?;
        Ok(())
    }

    /// Replace the gating policy. The default permits everything.
    pub fn set_gate(&mut self, gate: impl ExtractionGate + 'static) {
        self.gate = Box::new(gate);
    }

    pub fn add_listener(&mut self, listener: impl ExtractionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            capacity: self.capacity,
            extraction_per_second: self.extraction_per_second,
            drop_off_per_second: self.drop_off_per_second,
            tick_rate: self.tick_rate,
        }
    }

    // -- Resource assignment --

    /// Assign a resource. Only valid while idle.
    pub fn set_resource(&mut self, resource: ResourceReference) -> Result<(), ExtractionError> {
        self.require_idle("assign a resource")?;
        self.resource = Some(resource);
        Ok(())
    }

    /// Assign a static, never-depleting deposit covering the given tile area.
    pub fn set_deposit(
        &mut self,
        resource_type: ResourceTypeId,
        location: Tiled,
    ) -> Result<(), ExtractionError> {
        self.set_resource(ResourceReference::deposit(resource_type, location))
    }

    /// Assign a live extractable entity.
    pub fn set_extractable(
        &mut self,
        id: ExtractableId,
        extractables: &Extractables,
    ) -> Result<(), ExtractionError> {
        self.require_idle("assign a resource")?;
        let resource =
            ResourceReference::live(id, extractables).ok_or(ExtractionError::UnknownExtractable(id))?;
        self.resource = Some(resource);
        Ok(())
    }

    // -- Control --

    /// Begin a gathering cycle on the assigned resource.
    pub fn start(&mut self) -> Result<ExtractionEvent, ExtractionError> {
        self.require_idle("start")?;
        let resource = self.resource.ok_or(ExtractionError::NoResource)?;
        self.transition(ExtractorState::GoingToResource);
        let event = ExtractionEvent::StartGoToResource {
            resource_type: resource.resource_type(),
            location: resource.location(),
        };
        self.notify(std::slice::from_ref(&event));
        Ok(event)
    }

    /// Cancel the cycle. The carried load, the resource and fractional
    /// progress are kept; nothing is emitted.
    pub fn stop(&mut self) {
        if self.state != ExtractorState::Idle {
            self.transition(ExtractorState::Idle);
        }
    }

    /// Advance by `dt` updates (seconds at the default tick rate).
    ///
    /// Returns the events produced, in order. Negative or NaN `dt` counts as
    /// zero.
    pub fn update(&mut self, dt: f64, extractables: &mut Extractables) -> Vec<ExtractionEvent> {
        let mut events = Vec::new();
        if self.state == ExtractorState::Idle {
            return events;
        }

        let Some(mut resource) = self.resource else {
            self.transition(ExtractorState::Idle);
            return events;
        };
        if resource.resolve(extractables) == Availability::Gone {
            tracing::warn!(
                carried = self.carried,
                resource_type = ?resource.resource_type(),
                "extractable disappeared mid-cycle; abandoning load"
            );
            self.abandon();
            return events;
        }
        self.resource = Some(resource);

        let dt = if dt > 0.0 { dt } else { 0.0 };
        match self.state {
            ExtractorState::Idle => {}
            ExtractorState::GoingToResource => {
                if self.gate.can_extract() {
                    self.transition(ExtractorState::Extracting);
                    events.push(ExtractionEvent::StartExtraction {
                        resource_type: resource.resource_type(),
                        location: resource.location(),
                    });
                    self.extract(dt, &resource, extractables, &mut events);
                }
            }
            ExtractorState::Extracting => {
                if self.gate.can_extract() {
                    self.extract(dt, &resource, extractables, &mut events);
                } else {
                    self.go_to_resource(&resource, &mut events);
                }
            }
            ExtractorState::Carrying => {
                if self.gate.can_carry() {
                    self.transition(ExtractorState::DroppingOff);
                    events.push(ExtractionEvent::StartDropOff {
                        resource_type: resource.resource_type(),
                        quantity: self.carried,
                    });
                }
            }
            ExtractorState::DroppingOff => self.drop_off(dt, &resource, extractables, &mut events),
        }

        self.notify(&events);
        events
    }

    // -- Queries --

    /// True in every state except [`ExtractorState::Idle`].
    pub fn is_extracting(&self) -> bool {
        self.state != ExtractorState::Idle
    }

    pub fn state(&self) -> ExtractorState {
        self.state
    }

    pub fn resource(&self) -> Option<&ResourceReference> {
        self.resource.as_ref()
    }

    /// Type of the assigned resource. For a live entity this is the value
    /// seen at assignment or the last update; see [`Self::current_resource`].
    pub fn resource_type(&self) -> Option<ResourceTypeId> {
        self.resource.map(|r| r.resource_type())
    }

    /// Location of the assigned resource, with the same snapshot caveat as
    /// [`Self::resource_type`].
    pub fn resource_location(&self) -> Option<Tiled> {
        self.resource.map(|r| r.location())
    }

    /// The assigned resource re-read from `extractables`, so a live entity
    /// reports where it is now even while the unit is idle. `None` if nothing
    /// is assigned or the entity has been destroyed.
    pub fn current_resource(&self, extractables: &Extractables) -> Option<ResourceReference> {
        let mut resource = self.resource?;
        match resource.resolve(extractables) {
            Availability::Gone => None,
            Availability::Remaining(_) => Some(resource),
        }
    }

    pub fn carried(&self) -> u32 {
        self.carried
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn extraction_per_second(&self) -> f64 {
        self.extraction_per_second
    }

    pub fn drop_off_per_second(&self) -> f64 {
        self.drop_off_per_second
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Fractional progress toward the next unit in the current state, in
    /// `[0, 1)`. Zero outside extraction and drop-off. For display only.
    pub fn unit_progress(&self) -> f64 {
        let progress = match self.state {
            ExtractorState::Extracting => self.extraction_progress,
            ExtractorState::DroppingOff => self.drop_off_progress,
            _ => Fixed64::ZERO,
        };
        fixed64_to_f64(progress.frac())
    }

    // -- Internals --

    fn require_idle(&self, operation: &'static str) -> Result<(), ExtractionError> {
        if self.state != ExtractorState::Idle {
            return Err(ExtractionError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: ExtractorState) {
        tracing::debug!(
            from = ?self.state,
            to = ?to,
            resource_type = ?self.resource_type(),
            carried = self.carried,
            "extractor transition"
        );
        self.state = to;
    }

    fn go_to_resource(&mut self, resource: &ResourceReference, events: &mut Vec<ExtractionEvent>) {
        self.transition(ExtractorState::GoingToResource);
        events.push(ExtractionEvent::StartGoToResource {
            resource_type: resource.resource_type(),
            location: resource.location(),
        });
    }

    fn extract(
        &mut self,
        dt: f64,
        resource: &ResourceReference,
        extractables: &mut Extractables,
        events: &mut Vec<ExtractionEvent>,
    ) {
        if !resource.is_depleted(extractables) && self.carried < self.capacity {
            self.extraction_progress = self.extraction_progress.saturating_add(progress_for(
                self.extraction_per_second,
                self.tick_rate,
                dt,
            ));

            let before = self.carried;
            while self.extraction_progress >= Fixed64::ONE && self.carried < self.capacity {
                if !resource.take_one(extractables) {
                    break;
                }
                self.extraction_progress -= Fixed64::ONE;
                self.carried += 1;
                events.push(ExtractionEvent::Extracted {
                    resource_type: resource.resource_type(),
                    quantity: self.carried,
                });
            }
            if self.carried > before {
                tracing::trace!(extracted = self.carried - before, carried = self.carried);
            }
        }

        if self.carried >= self.capacity || resource.is_depleted(extractables) {
            self.extraction_progress = Fixed64::ZERO;
            self.transition(ExtractorState::Carrying);
            events.push(ExtractionEvent::StartCarry {
                resource_type: resource.resource_type(),
                quantity: self.carried,
            });
        }
    }

    fn drop_off(
        &mut self,
        dt: f64,
        resource: &ResourceReference,
        extractables: &Extractables,
        events: &mut Vec<ExtractionEvent>,
    ) {
        self.drop_off_progress = self.drop_off_progress.saturating_add(progress_for(
            self.drop_off_per_second,
            self.tick_rate,
            dt,
        ));
        while self.drop_off_progress >= Fixed64::ONE && self.carried > 0 {
            self.drop_off_progress -= Fixed64::ONE;
            self.carried -= 1;
            self.dropped += 1;
        }

        if self.carried > 0 {
            return;
        }

        events.push(ExtractionEvent::DroppedOff {
            resource_type: resource.resource_type(),
            quantity: self.dropped,
        });
        self.dropped = 0;
        self.drop_off_progress = Fixed64::ZERO;

        if resource.is_depleted(extractables) {
            self.transition(ExtractorState::Idle);
        } else {
            self.go_to_resource(resource, events);
        }
    }

    /// The live resource vanished: drop everything and go idle.
    fn abandon(&mut self) {
        self.transition(ExtractorState::Idle);
        self.resource = None;
        self.carried = 0;
        self.dropped = 0;
        self.extraction_progress = Fixed64::ZERO;
        self.drop_off_progress = Fixed64::ZERO;
    }

    fn notify(&mut self, events: &[ExtractionEvent]) {
        for listener in &mut self.listeners {
            for event in events {
                event.dispatch(listener.as_mut());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::gate::FnGate;
    use crate::resource::ExtractableModel;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn wood() -> ResourceTypeId {
        ResourceTypeId(0)
    }

    fn gold() -> ResourceTypeId {
        ResourceTypeId(1)
    }

    fn spot() -> Tiled {
        Tiled::new(1, 2, 1, 1)
    }

    fn engine(capacity: u32, extraction: f64, drop_off: f64, tick_rate: f64) -> ExtractionEngine {
        ExtractionEngine::from_config(&ExtractorConfig {
            capacity,
            extraction_per_second: extraction,
            drop_off_per_second: drop_off,
            tick_rate,
        })
        .unwrap()
    }

    fn kinds(events: &[ExtractionEvent]) -> Vec<EventKind> {
        events.iter().map(ExtractionEvent::kind).collect()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    #[test]
    fn config_accessors() {
        let mut e = ExtractionEngine::new();
        e.set_capacity(5).unwrap();
        e.set_extraction_per_second(1.0).unwrap();
        e.set_drop_off_per_second(2.0).unwrap();
        assert_eq!(e.capacity(), 5);
        assert_eq!(e.extraction_per_second(), 1.0);
        assert_eq!(e.drop_off_per_second(), 2.0);
        assert_eq!(e.tick_rate(), 1.0);
        assert_eq!(e.config().capacity, 5);
    }

    #[test]
    fn invalid_configuration_rejected_and_unchanged() {
        let mut e = ExtractionEngine::new();
        e.set_capacity(4).unwrap();
        assert_eq!(e.set_capacity(0), Err(ExtractionError::InvalidCapacity(0)));
        assert_eq!(e.capacity(), 4);
        assert!(e.set_extraction_per_second(0.0).is_err());
        assert!(e.set_drop_off_per_second(-3.0).is_err());
        assert!(e.set_tick_rate(f64::NAN).is_err());
        assert_eq!(e.extraction_per_second(), 1.0);
    }

    // -----------------------------------------------------------------------
    // Preconditions
    // -----------------------------------------------------------------------

    #[test]
    fn start_without_resource_fails() {
        let mut e = ExtractionEngine::new();
        assert_eq!(e.start(), Err(ExtractionError::NoResource));
        assert_eq!(e.state(), ExtractorState::Idle);
    }

    #[test]
    fn set_resource_mid_cycle_fails() {
        let mut e = ExtractionEngine::new();
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        let err = e.set_deposit(gold(), spot()).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InvalidState {
                operation: "assign a resource",
                state: ExtractorState::GoingToResource,
            }
        );
        assert_eq!(e.resource_type(), Some(wood()));
    }

    #[test]
    fn start_twice_fails() {
        let mut e = ExtractionEngine::new();
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        assert!(matches!(
            e.start(),
            Err(ExtractionError::InvalidState { operation: "start", .. })
        ));
    }

    #[test]
    fn unknown_extractable_rejected() {
        let mut arena = Extractables::new();
        let id = arena.spawn(ExtractableModel::new(gold(), spot(), 5));
        arena.despawn(id);
        let mut e = ExtractionEngine::new();
        assert_eq!(
            e.set_extractable(id, &arena),
            Err(ExtractionError::UnknownExtractable(id))
        );
        assert!(e.resource().is_none());
    }

    #[test]
    fn idle_update_is_noop() {
        let mut arena = Extractables::new();
        let mut e = ExtractionEngine::new();
        e.set_deposit(wood(), spot()).unwrap();
        assert!(e.update(10.0, &mut arena).is_empty());
        assert!(!e.is_extracting());
    }

    // -----------------------------------------------------------------------
    // Cycle
    // -----------------------------------------------------------------------

    #[test]
    fn start_emits_go_to_resource() {
        let mut e = ExtractionEngine::new();
        e.set_deposit(wood(), spot()).unwrap();
        assert_eq!(e.resource_location(), Some(spot()));
        let event = e.start().unwrap();
        assert_eq!(
            event,
            ExtractionEvent::StartGoToResource {
                resource_type: wood(),
                location: spot(),
            }
        );
        assert!(e.is_extracting());
    }

    #[test]
    fn full_cycle_on_deposit_loops() {
        let mut arena = Extractables::new();
        let mut e = engine(6, 50.0, 100.0, 50.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();

        let first = e.update(1.0, &mut arena);
        assert_eq!(kinds(&first), vec![EventKind::StartExtraction, EventKind::Extracted]);

        for _ in 0..4 {
            assert_eq!(kinds(&e.update(1.0, &mut arena)), vec![EventKind::Extracted]);
        }
        let sixth = e.update(1.0, &mut arena);
        assert_eq!(
            sixth,
            vec![
                ExtractionEvent::Extracted {
                    resource_type: wood(),
                    quantity: 6,
                },
                ExtractionEvent::StartCarry {
                    resource_type: wood(),
                    quantity: 6,
                },
            ]
        );
        assert_eq!(e.state(), ExtractorState::Carrying);

        assert_eq!(kinds(&e.update(1.0, &mut arena)), vec![EventKind::StartDropOff]);
        assert!(e.update(1.0, &mut arena).is_empty());
        assert_eq!(e.carried(), 4);
        assert!(e.update(1.0, &mut arena).is_empty());
        let last = e.update(1.0, &mut arena);
        assert_eq!(
            last[0],
            ExtractionEvent::DroppedOff {
                resource_type: wood(),
                quantity: 6,
            }
        );
        assert_eq!(last[1].kind(), EventKind::StartGoToResource);
        assert_eq!(e.state(), ExtractorState::GoingToResource);
        assert!(e.is_extracting());
    }

    #[test]
    fn large_dt_emits_one_event_per_unit() {
        let mut arena = Extractables::new();
        let mut e = engine(10, 1.0, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        let events = e.update(4.0, &mut arena);
        let extracted = events
            .iter()
            .filter(|ev| ev.kind() == EventKind::Extracted)
            .count();
        assert_eq!(extracted, 4);
        assert_eq!(e.carried(), 4);
    }

    #[test]
    fn capacity_caps_single_large_tick() {
        let mut arena = Extractables::new();
        let mut e = engine(3, 1.0, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        let events = e.update(100.0, &mut arena);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::StartExtraction,
                EventKind::Extracted,
                EventKind::Extracted,
                EventKind::Extracted,
                EventKind::StartCarry,
            ]
        );
        assert_eq!(e.carried(), 3);
    }

    #[test]
    fn sub_unit_rate_accumulates_across_ticks() {
        let mut arena = Extractables::new();
        let mut e = engine(1, 0.25, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        for _ in 0..3 {
            let events = e.update(1.0, &mut arena);
            assert!(events.iter().all(|ev| ev.kind() != EventKind::Extracted));
        }
        let events = e.update(1.0, &mut arena);
        assert_eq!(kinds(&events), vec![EventKind::Extracted, EventKind::StartCarry]);
    }

    #[test]
    fn unit_progress_reports_fraction() {
        let mut arena = Extractables::new();
        let mut e = engine(4, 1.0, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        assert_eq!(e.unit_progress(), 0.0);
        e.start().unwrap();
        e.update(1.25, &mut arena);
        assert_eq!(e.carried(), 1);
        assert_eq!(e.unit_progress(), 0.25);
    }

    #[test]
    fn negative_dt_makes_no_progress() {
        let mut arena = Extractables::new();
        let mut e = engine(2, 1.0, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        e.update(-5.0, &mut arena);
        assert_eq!(e.state(), ExtractorState::Extracting);
        assert_eq!(e.carried(), 0);
        e.update(1.0, &mut arena);
        assert_eq!(e.carried(), 1);
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    #[test]
    fn stop_preserves_load_and_emits_nothing() {
        let mut arena = Extractables::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut e = engine(6, 1.0, 1.0, 1.0);
        e.add_listener(move |event: &ExtractionEvent| sink.borrow_mut().push(*event));
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        e.update(2.0, &mut arena);
        assert_eq!(e.carried(), 2);
        let before = seen.borrow().len();

        e.stop();
        assert!(!e.is_extracting());
        assert!(e.update(1.0, &mut arena).is_empty());
        assert_eq!(seen.borrow().len(), before);
        assert_eq!(e.carried(), 2);
        assert_eq!(e.resource_type(), Some(wood()));

        e.start().unwrap();
        let events = e.update(1.0, &mut arena);
        assert_eq!(
            events[1],
            ExtractionEvent::Extracted {
                resource_type: wood(),
                quantity: 3,
            }
        );
    }

    #[test]
    fn stop_keeps_fractional_progress() {
        let mut arena = Extractables::new();
        let mut e = engine(5, 1.0, 1.0, 1.0);
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        e.update(0.5, &mut arena);
        e.stop();
        e.start().unwrap();
        let events = e.update(0.5, &mut arena);
        assert_eq!(kinds(&events), vec![EventKind::StartExtraction, EventKind::Extracted]);
    }

    // -----------------------------------------------------------------------
    // Gating
    // -----------------------------------------------------------------------

    #[test]
    fn extraction_gate_holds_in_going_to_resource() {
        let mut arena = Extractables::new();
        let mut e = engine(1, 50.0, 50.0, 50.0);
        e.set_gate(FnGate::new(|| false, || true));
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        for _ in 0..20 {
            assert!(e.update(1.0, &mut arena).is_empty());
            assert_eq!(e.state(), ExtractorState::GoingToResource);
        }
    }

    #[test]
    fn closing_gate_mid_extraction_reverts_and_reemits() {
        let mut arena = Extractables::new();
        let open = Rc::new(Cell::new(true));
        let handle = Rc::clone(&open);
        let mut e = engine(10, 1.0, 1.0, 1.0);
        e.set_gate(FnGate::new(move || handle.get(), || true));
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        e.update(1.0, &mut arena);
        assert_eq!(e.state(), ExtractorState::Extracting);

        open.set(false);
        let reverted = e.update(1.0, &mut arena);
        assert_eq!(kinds(&reverted), vec![EventKind::StartGoToResource]);
        assert_eq!(e.state(), ExtractorState::GoingToResource);
        assert!(e.update(1.0, &mut arena).is_empty());
        assert_eq!(e.carried(), 1);

        open.set(true);
        let resumed = e.update(1.0, &mut arena);
        assert_eq!(kinds(&resumed), vec![EventKind::StartExtraction, EventKind::Extracted]);
        assert_eq!(e.carried(), 2);
    }

    #[test]
    fn carry_gate_holds_load() {
        let mut arena = Extractables::new();
        let mut e = engine(1, 50.0, 50.0, 50.0);
        e.set_gate(FnGate::new(|| true, || false));
        e.set_deposit(wood(), spot()).unwrap();
        e.start().unwrap();
        e.update(1.0, &mut arena);
        assert_eq!(e.state(), ExtractorState::Carrying);
        for _ in 0..10 {
            assert!(e.update(1.0, &mut arena).is_empty());
        }
        assert_eq!(e.state(), ExtractorState::Carrying);
        assert_eq!(e.carried(), 1);
        assert!(e.is_extracting());
    }

    // -----------------------------------------------------------------------
    // Live extractables
    // -----------------------------------------------------------------------

    #[test]
    fn live_extractable_depletes_and_goes_idle() {
        let mut arena = Extractables::new();
        let mine = arena.spawn(ExtractableModel::new(gold(), spot(), 3));
        let mut e = engine(2, 25.0, 100.0, 50.0);
        e.set_extractable(mine, &arena).unwrap();
        e.start().unwrap();

        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(e.update(1.0, &mut arena));
        }
        assert_eq!(
            kinds(&all),
            vec![
                EventKind::StartExtraction,
                EventKind::Extracted,
                EventKind::Extracted,
                EventKind::StartCarry,
                EventKind::StartDropOff,
                EventKind::DroppedOff,
                EventKind::StartGoToResource,
                EventKind::StartExtraction,
                EventKind::Extracted,
                EventKind::StartCarry,
                EventKind::StartDropOff,
                EventKind::DroppedOff,
            ]
        );
        assert_eq!(
            all.last(),
            Some(&ExtractionEvent::DroppedOff {
                resource_type: gold(),
                quantity: 1,
            })
        );
        assert_eq!(arena.get(mine).unwrap().quantity(), 0);
        assert!(!e.is_extracting());
    }

    #[test]
    fn empty_extractable_short_circuits_to_carry() {
        let mut arena = Extractables::new();
        let mine = arena.spawn(ExtractableModel::new(gold(), spot(), 0));
        let mut e = engine(6, 50.0, 100.0, 50.0);
        e.set_extractable(mine, &arena).unwrap();
        e.start().unwrap();

        let events = e.update(1.0, &mut arena);
        assert_eq!(
            events,
            vec![
                ExtractionEvent::StartExtraction {
                    resource_type: gold(),
                    location: spot(),
                },
                ExtractionEvent::StartCarry {
                    resource_type: gold(),
                    quantity: 0,
                },
            ]
        );
        assert_eq!(e.carried(), 0);
        assert_eq!(e.state(), ExtractorState::Carrying);
    }

    #[test]
    fn despawned_extractable_abandons_load() {
        let mut arena = Extractables::new();
        let mine = arena.spawn(ExtractableModel::new(gold(), spot(), 10));
        let mut e = engine(5, 1.0, 1.0, 1.0);
        e.set_extractable(mine, &arena).unwrap();
        e.start().unwrap();
        e.update(3.0, &mut arena);
        assert_eq!(e.carried(), 3);

        arena.despawn(mine);
        assert!(e.update(1.0, &mut arena).is_empty());
        assert!(!e.is_extracting());
        assert_eq!(e.carried(), 0);
        assert!(e.resource().is_none());
        assert_eq!(e.start(), Err(ExtractionError::NoResource));
    }

    #[test]
    fn live_location_follows_entity() {
        let mut arena = Extractables::new();
        let herd = arena.spawn(ExtractableModel::new(gold(), spot(), 10));
        let mut e = engine(5, 1.0, 1.0, 1.0);
        e.set_extractable(herd, &arena).unwrap();
        e.start().unwrap();
        arena.get_mut(herd).unwrap().set_location(Tiled::new(9, 9, 1, 1));
        e.update(0.0, &mut arena);
        assert_eq!(e.resource_location(), Some(Tiled::new(9, 9, 1, 1)));
    }

    #[test]
    fn current_resource_tracks_entity_while_idle() {
        let mut arena = Extractables::new();
        let herd = arena.spawn(ExtractableModel::new(gold(), spot(), 10));
        let mut e = engine(5, 1.0, 1.0, 1.0);
        e.set_extractable(herd, &arena).unwrap();
        e.start().unwrap();
        e.update(1.0, &mut arena);
        e.stop();

        let moved = Tiled::new(4, 7, 1, 1);
        arena.get_mut(herd).unwrap().set_location(moved);
        // The cached snapshot stays put until the next update.
        assert_eq!(e.resource_location(), Some(spot()));
        let current = e.current_resource(&arena).unwrap();
        assert_eq!(current.location(), moved);
        assert_eq!(current.extractable(), Some(herd));

        arena.despawn(herd);
        assert_eq!(e.current_resource(&arena), None);
    }

    #[test]
    fn deposit_current_resource_is_the_assignment() {
        let arena = Extractables::new();
        let mut e = engine(5, 1.0, 1.0, 1.0);
        assert_eq!(e.current_resource(&arena), None);
        e.set_deposit(wood(), spot()).unwrap();
        assert_eq!(
            e.current_resource(&arena),
            Some(ResourceReference::deposit(wood(), spot()))
        );
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    #[test]
    fn listeners_see_returned_events_in_order() {
        let mut arena = Extractables::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut e = engine(2, 1.0, 2.0, 1.0);
        e.add_listener(move |event: &ExtractionEvent| sink.borrow_mut().push(*event));
        e.set_deposit(wood(), spot()).unwrap();

        let mut returned = vec![e.start().unwrap()];
        for _ in 0..5 {
            returned.extend(e.update(1.0, &mut arena));
        }
        assert_eq!(*seen.borrow(), returned);
    }
}
