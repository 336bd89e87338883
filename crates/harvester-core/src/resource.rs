//! What a unit extracts from.
//!
//! A [`ResourceReference`] is either a static terrain deposit (infinite
//! supply at a fixed tile area) or a handle to a live [`ExtractableModel`]
//! stored in the [`Extractables`] arena. Live handles are weak: the entity
//! may be despawned between ticks and every lookup can miss.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::{ExtractableId, ResourceTypeId};

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// A rectangular tile area on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tiled {
    pub tile_x: u32,
    pub tile_y: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl Tiled {
    pub fn new(tile_x: u32, tile_y: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_x,
            tile_y,
            tile_width,
            tile_height,
        }
    }
}

// ---------------------------------------------------------------------------
// Live extractables
// ---------------------------------------------------------------------------

/// A depletable resource source that is itself a simulated object
/// (a gold mine, a tree, a fish school).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractableModel {
    resource_type: ResourceTypeId,
    location: Tiled,
    quantity: u32,
}

impl ExtractableModel {
    pub fn new(resource_type: ResourceTypeId, location: Tiled, quantity: u32) -> Self {
        Self {
            resource_type,
            location,
            quantity,
        }
    }

    pub fn resource_type(&self) -> ResourceTypeId {
        self.resource_type
    }

    pub fn location(&self) -> Tiled {
        self.location
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Moves the entity. Extractors pick up the new location on their next update.
    pub fn set_location(&mut self, location: Tiled) {
        self.location = location;
    }

    /// Remove up to `amount` units. Returns how many were actually removed.
    pub fn decrease(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.quantity);
        self.quantity -= actual;
        actual
    }

    pub fn is_exhausted(&self) -> bool {
        self.quantity == 0
    }
}

/// Arena of live extractables. Removing an entry is the destruction
/// notification: outstanding [`ExtractableId`]s stop resolving.
#[derive(Debug, Default, Clone)]
pub struct Extractables {
    entries: SlotMap<ExtractableId, ExtractableModel>,
}

impl Extractables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, model: ExtractableModel) -> ExtractableId {
        self.entries.insert(model)
    }

    /// Destroy an entity. Returns the model if it was still alive.
    pub fn despawn(&mut self, id: ExtractableId) -> Option<ExtractableModel> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: ExtractableId) -> Option<&ExtractableModel> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: ExtractableId) -> Option<&mut ExtractableModel> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: ExtractableId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtractableId, &ExtractableModel)> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Resource reference
// ---------------------------------------------------------------------------

/// What an extractor is currently assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceReference {
    /// Terrain-bound deposit. Never depletes.
    Deposit {
        resource_type: ResourceTypeId,
        location: Tiled,
    },
    /// Live entity. `resource_type` and `location` are the values observed at
    /// the last successful lookup.
    Live {
        id: ExtractableId,
        resource_type: ResourceTypeId,
        location: Tiled,
    },
}

/// Result of resolving a reference against the arena for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Availability {
    /// Quantity left to extract. `None` means unbounded.
    Remaining(Option<u32>),
    /// The live entity no longer exists.
    Gone,
}

impl ResourceReference {
    pub fn deposit(resource_type: ResourceTypeId, location: Tiled) -> Self {
        ResourceReference::Deposit {
            resource_type,
            location,
        }
    }

    /// Build a live reference by reading the entity's current type and location.
    pub fn live(id: ExtractableId, extractables: &Extractables) -> Option<Self> {
        let model = extractables.get(id)?;
        Some(ResourceReference::Live {
            id,
            resource_type: model.resource_type(),
            location: model.location(),
        })
    }

    pub fn resource_type(&self) -> ResourceTypeId {
        match self {
            ResourceReference::Deposit { resource_type, .. }
            | ResourceReference::Live { resource_type, .. } => *resource_type,
        }
    }

    pub fn location(&self) -> Tiled {
        match self {
            ResourceReference::Deposit { location, .. }
            | ResourceReference::Live { location, .. } => *location,
        }
    }

    pub fn extractable(&self) -> Option<ExtractableId> {
        match self {
            ResourceReference::Deposit { .. } => None,
            ResourceReference::Live { id, .. } => Some(*id),
        }
    }

    /// Look the reference up, refreshing the cached snapshot of a live entity.
    pub(crate) fn resolve(&mut self, extractables: &Extractables) -> Availability {
        match self {
            ResourceReference::Deposit { .. } => Availability::Remaining(None),
            ResourceReference::Live {
                id,
                resource_type,
                location,
            } => match extractables.get(*id) {
                Some(model) => {
                    *resource_type = model.resource_type();
                    *location = model.location();
                    Availability::Remaining(Some(model.quantity()))
                }
                None => Availability::Gone,
            },
        }
    }

    /// Whether the source has nothing left. Deposits never deplete; a missing
    /// live entity counts as depleted.
    pub(crate) fn is_depleted(&self, extractables: &Extractables) -> bool {
        match self {
            ResourceReference::Deposit { .. } => false,
            ResourceReference::Live { id, .. } => {
                extractables.get(*id).is_none_or(ExtractableModel::is_exhausted)
            }
        }
    }

    /// Take one unit from the source. Deposits always yield; live entities
    /// yield while they have quantity left.
    pub(crate) fn take_one(&self, extractables: &mut Extractables) -> bool {
        match self {
            ResourceReference::Deposit { .. } => true,
            ResourceReference::Live { id, .. } => extractables
                .get_mut(*id)
                .is_some_and(|model| model.decrease(1) == 1),
        }
    }
}
