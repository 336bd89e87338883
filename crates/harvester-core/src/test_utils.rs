//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ExtractorConfig;
use crate::event::{EventKind, ExtractionEvent};
use crate::extractor::ExtractionEngine;
use crate::gate::ExtractionGate;
use crate::id::ResourceTypeId;
use crate::resource::{Extractables, Tiled};

// ===========================================================================
// Resource types
// ===========================================================================

pub fn wood() -> ResourceTypeId {
    ResourceTypeId(0)
}
pub fn gold() -> ResourceTypeId {
    ResourceTypeId(1)
}
pub fn stone() -> ResourceTypeId {
    ResourceTypeId(2)
}

pub fn at(tile_x: u32, tile_y: u32) -> Tiled {
    Tiled::new(tile_x, tile_y, 1, 1)
}

// ===========================================================================
// Engine builders
// ===========================================================================

/// Build an idle engine. Panics on invalid values.
pub fn make_extractor(
    capacity: u32,
    extraction_per_second: f64,
    drop_off_per_second: f64,
    tick_rate: f64,
) -> ExtractionEngine {
    ExtractionEngine::from_config(&ExtractorConfig {
        capacity,
        extraction_per_second,
        drop_off_per_second,
        tick_rate,
    })
    .expect("valid extractor config")
}

/// The peon of the classic RTS demo: capacity 6, 50/s extraction, 100/s
/// drop-off, 50 updates per second.
pub fn make_peon() -> ExtractionEngine {
    make_extractor(6, 50.0, 100.0, 50.0)
}

/// Run `n` updates of `dt`, concatenating the returned events.
pub fn run_ticks(
    engine: &mut ExtractionEngine,
    arena: &mut Extractables,
    n: usize,
    dt: f64,
) -> Vec<ExtractionEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        events.extend(engine.update(dt, arena));
    }
    events
}

pub fn kinds(events: &[ExtractionEvent]) -> Vec<EventKind> {
    events.iter().map(ExtractionEvent::kind).collect()
}

pub fn count_kind(events: &[ExtractionEvent], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

// ===========================================================================
// Listener and gate doubles
// ===========================================================================

/// Listener that records every event into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    log: Rc<RefCell<Vec<ExtractionEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a recorder to `engine` and return a handle sharing its log.
    pub fn attach(engine: &mut ExtractionEngine) -> Self {
        let recorder = Self::new();
        let handle = recorder.clone();
        engine.add_listener(move |event: &ExtractionEvent| handle.log.borrow_mut().push(*event));
        recorder
    }

    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.log.borrow().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        count_kind(&self.log.borrow(), kind)
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Gate whose predicates are flipped from the test through shared cells.
#[derive(Debug, Clone)]
pub struct ToggleGate {
    extract: Rc<Cell<bool>>,
    carry: Rc<Cell<bool>>,
}

impl ToggleGate {
    pub fn new(extract: bool, carry: bool) -> Self {
        Self {
            extract: Rc::new(Cell::new(extract)),
            carry: Rc::new(Cell::new(carry)),
        }
    }

    pub fn set_extract(&self, allowed: bool) {
        self.extract.set(allowed);
    }

    pub fn set_carry(&self, allowed: bool) {
        self.carry.set(allowed);
    }
}

impl ExtractionGate for ToggleGate {
    fn can_extract(&self) -> bool {
        self.extract.get()
    }

    fn can_carry(&self) -> bool {
        self.carry.get()
    }
}
