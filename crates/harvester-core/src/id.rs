use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a live extractable entity in the [`Extractables`] arena.
    ///
    /// [`Extractables`]: crate::resource::Extractables
    pub struct ExtractableId;

    /// Identifies an extracting unit inside a [`GatherWorld`].
    ///
    /// [`GatherWorld`]: crate::world::GatherWorld
    pub struct ExtractorId;
}

/// Opaque resource type tag (wood, gold, ...). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceTypeId(pub u32);
