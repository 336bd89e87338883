//! Data-driven unit profiles loaded from JSON.
//!
//! Feature-gated behind `data-loader`. A profile document names resource
//! types, extractor profiles and optional live extractables:
//!
//! ```json
//! {
//!   "resources": ["wood", "gold"],
//!   "extractors": [
//!     { "name": "peon", "capacity": 6, "extraction_per_second": 50.0,
//!       "drop_off_per_second": 100.0, "tick_rate": 50.0 }
//!   ],
//!   "extractables": [
//!     { "resource": "gold", "tile_x": 4, "tile_y": 4, "tile_width": 3,
//!       "tile_height": 3, "quantity": 500 }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use crate::config::ExtractorConfig;
use crate::extractor::{ExtractionEngine, ExtractionError};
use crate::id::{ExtractableId, ResourceTypeId};
use crate::resource::{ExtractableModel, Extractables, Tiled};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("invalid profile {name}: {source}")]
    InvalidProfile {
        name: String,
        #[source]
        source: ExtractionError,
    },
    #[error("unknown resource reference: {0}")]
    UnknownResourceRef(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level profile document for JSON deserialization.
#[derive(Debug, serde::Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub extractors: Vec<ExtractorData>,
    #[serde(default)]
    pub extractables: Vec<ExtractableData>,
}

/// JSON representation of a named extractor profile.
#[derive(Debug, serde::Deserialize)]
pub struct ExtractorData {
    pub name: String,
    #[serde(flatten)]
    pub config: ExtractorConfig,
}

/// JSON representation of a live extractable placed on the map.
#[derive(Debug, serde::Deserialize)]
pub struct ExtractableData {
    pub resource: String, // references a resource by name
    pub tile_x: u32,
    pub tile_y: u32,
    #[serde(default = "one")]
    pub tile_width: u32,
    #[serde(default = "one")]
    pub tile_height: u32,
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Loaded profiles
// ---------------------------------------------------------------------------

/// Resolved, validated profile document.
#[derive(Debug, Default)]
pub struct ProfileSet {
    resource_ids: HashMap<String, ResourceTypeId>,
    profiles: HashMap<String, ExtractorConfig>,
    extractables: Vec<ExtractableModel>,
}

impl ProfileSet {
    /// Lookup resource type ID by name.
    pub fn resource_id(&self, name: &str) -> Option<ResourceTypeId> {
        self.resource_ids.get(name).copied()
    }

    pub fn profile(&self, name: &str) -> Option<&ExtractorConfig> {
        self.profiles.get(name)
    }

    /// Build an idle engine from a named profile.
    pub fn build_extractor(&self, name: &str) -> Option<ExtractionEngine> {
        // Profiles are validated on load.
        self.profiles
            .get(name)
            .and_then(|config| ExtractionEngine::from_config(config).ok())
    }

    pub fn extractables(&self) -> &[ExtractableModel] {
        &self.extractables
    }

    /// Spawn every listed extractable into `arena`, in document order.
    pub fn spawn_extractables(&self, arena: &mut Extractables) -> Vec<ExtractableId> {
        self.extractables
            .iter()
            .map(|model| arena.spawn(model.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load profiles from a JSON string.
pub fn load_profiles_json(json: &str) -> Result<ProfileSet, DataLoadError> {
    let data: ProfileData = serde_json::from_str(json)?;
    build_profiles(data)
}

/// Load profiles from JSON bytes.
pub fn load_profiles_json_bytes(bytes: &[u8]) -> Result<ProfileSet, DataLoadError> {
    let data: ProfileData = serde_json::from_slice(bytes)?;
    build_profiles(data)
}

fn build_profiles(data: ProfileData) -> Result<ProfileSet, DataLoadError> {
    let mut set = ProfileSet::default();

    // Phase 1: Register resource types in document order.
    for (index, name) in data.resources.iter().enumerate() {
        let id = ResourceTypeId(index as u32);
        if set.resource_ids.insert(name.clone(), id).is_some() {
            return Err(DataLoadError::DuplicateName(name.clone()));
        }
    }

    // Phase 2: Validate extractor profiles.
    for extractor in data.extractors {
        extractor
            .config
            .validate()
            .map_err(|source| DataLoadError::InvalidProfile {
                name: extractor.name.clone(),
                source,
            })?;
        if set.profiles.contains_key(&extractor.name) {
            return Err(DataLoadError::DuplicateName(extractor.name));
        }
        set.profiles.insert(extractor.name, extractor.config);
    }

    // Phase 3: Resolve extractables (resource refs by name).
    for entry in data.extractables {
        let resource_type = set
            .resource_id(&entry.resource)
            .ok_or_else(|| DataLoadError::UnknownResourceRef(entry.resource.clone()))?;
        set.extractables.push(ExtractableModel::new(
            resource_type,
            Tiled::new(entry.tile_x, entry.tile_y, entry.tile_width, entry.tile_height),
            entry.quantity,
        ));
    }

    Ok(set)
}

// ===========================================================================
// Tests
// ===========================================================================
