//! Extraction events and the listener protocol.
//!
//! Every state-entry edge of the extraction engine produces exactly one
//! [`ExtractionEvent`]. Events are returned from the engine's control calls
//! and also pushed to registered [`ExtractionListener`]s in emission order.
//!
//! # Listeners
//!
//! - Implement [`ExtractionListener`] and override the notifications you
//!   care about (all default to no-ops).
//! - Or pass any `FnMut(&ExtractionEvent)` closure.

use crate::id::ResourceTypeId;
use crate::resource::Tiled;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A state transition observed by an extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExtractionEvent {
    /// The unit should head for the resource.
    StartGoToResource {
        resource_type: ResourceTypeId,
        location: Tiled,
    },
    /// The unit reached the resource and began extracting.
    StartExtraction {
        resource_type: ResourceTypeId,
        location: Tiled,
    },
    /// One unit was extracted. `quantity` is the carried total afterwards.
    Extracted {
        resource_type: ResourceTypeId,
        quantity: u32,
    },
    /// The load is complete and ready to be carried.
    StartCarry {
        resource_type: ResourceTypeId,
        quantity: u32,
    },
    /// The unit began unloading at the drop-off point.
    StartDropOff {
        resource_type: ResourceTypeId,
        quantity: u32,
    },
    /// Unloading finished. `quantity` is the total delivered this cycle.
    DroppedOff {
        resource_type: ResourceTypeId,
        quantity: u32,
    },
}

/// Discriminant tag for event types, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StartGoToResource,
    StartExtraction,
    Extracted,
    StartCarry,
    StartDropOff,
    DroppedOff,
}

impl ExtractionEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ExtractionEvent::StartGoToResource { .. } => EventKind::StartGoToResource,
            ExtractionEvent::StartExtraction { .. } => EventKind::StartExtraction,
            ExtractionEvent::Extracted { .. } => EventKind::Extracted,
            ExtractionEvent::StartCarry { .. } => EventKind::StartCarry,
            ExtractionEvent::StartDropOff { .. } => EventKind::StartDropOff,
            ExtractionEvent::DroppedOff { .. } => EventKind::DroppedOff,
        }
    }

    pub fn resource_type(&self) -> ResourceTypeId {
        match self {
            ExtractionEvent::StartGoToResource { resource_type, .. }
            | ExtractionEvent::StartExtraction { resource_type, .. }
            | ExtractionEvent::Extracted { resource_type, .. }
            | ExtractionEvent::StartCarry { resource_type, .. }
            | ExtractionEvent::StartDropOff { resource_type, .. }
            | ExtractionEvent::DroppedOff { resource_type, .. } => *resource_type,
        }
    }

    /// Route this event to the matching listener notification.
    pub fn dispatch(&self, listener: &mut dyn ExtractionListener) {
        match *self {
            ExtractionEvent::StartGoToResource {
                resource_type,
                location,
            } => listener.notify_start_go_to_resource(resource_type, location),
            ExtractionEvent::StartExtraction {
                resource_type,
                location,
            } => listener.notify_start_extraction(resource_type, location),
            ExtractionEvent::Extracted {
                resource_type,
                quantity,
            } => listener.notify_extracted(resource_type, quantity),
            ExtractionEvent::StartCarry {
                resource_type,
                quantity,
            } => listener.notify_start_carry(resource_type, quantity),
            ExtractionEvent::StartDropOff {
                resource_type,
                quantity,
            } => listener.notify_start_drop_off(resource_type, quantity),
            ExtractionEvent::DroppedOff {
                resource_type,
                quantity,
            } => listener.notify_dropped_off(resource_type, quantity),
        }
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Observer of extraction transitions. One call per state-entry edge.
#[allow(unused_variables)]
pub trait ExtractionListener {
    fn notify_start_go_to_resource(&mut self, resource_type: ResourceTypeId, location: Tiled) {}

    fn notify_start_extraction(&mut self, resource_type: ResourceTypeId, location: Tiled) {}

    fn notify_extracted(&mut self, resource_type: ResourceTypeId, current_quantity: u32) {}

    fn notify_start_carry(&mut self, resource_type: ResourceTypeId, total_quantity: u32) {}

    fn notify_start_drop_off(&mut self, resource_type: ResourceTypeId, total_quantity: u32) {}

    fn notify_dropped_off(&mut self, resource_type: ResourceTypeId, dropped_quantity: u32) {}
}

impl<F> ExtractionListener for F
where
    F: FnMut(&ExtractionEvent),
{
    fn notify_start_go_to_resource(&mut self, resource_type: ResourceTypeId, location: Tiled) {
        self(&ExtractionEvent::StartGoToResource {
            resource_type,
            location,
        });
    }

    fn notify_start_extraction(&mut self, resource_type: ResourceTypeId, location: Tiled) {
        self(&ExtractionEvent::StartExtraction {
            resource_type,
            location,
        });
    }

    fn notify_extracted(&mut self, resource_type: ResourceTypeId, current_quantity: u32) {
        self(&ExtractionEvent::Extracted {
            resource_type,
            quantity: current_quantity,
        });
    }

    fn notify_start_carry(&mut self, resource_type: ResourceTypeId, total_quantity: u32) {
        self(&ExtractionEvent::StartCarry {
            resource_type,
            quantity: total_quantity,
        });
    }

    fn notify_start_drop_off(&mut self, resource_type: ResourceTypeId, total_quantity: u32) {
        self(&ExtractionEvent::StartDropOff {
            resource_type,
            quantity: total_quantity,
        });
    }

    fn notify_dropped_off(&mut self, resource_type: ResourceTypeId, dropped_quantity: u32) {
        self(&ExtractionEvent::DroppedOff {
            resource_type,
            quantity: dropped_quantity,
        });
    }
}
