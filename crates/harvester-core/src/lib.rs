//! Harvester Core -- tick-driven resource gathering for autonomous units.
//!
//! A unit is given a resource to work, walks to it, extracts at a
//! configurable rate up to its carrying capacity, carries the load back and
//! unloads at a configurable rate, then repeats until the resource runs dry
//! or the behavior is cancelled.
//!
//! # Gathering Cycle
//!
//! Each call to [`extractor::ExtractionEngine::update`] advances one unit
//! through its current state:
//!
//! 1. **GoingToResource** -- waits for the gate to permit extraction.
//! 2. **Extracting** -- accumulates fractional progress and moves whole units
//!    from the resource into the carried load.
//! 3. **Carrying** -- the load is complete; waits for the gate to permit
//!    carrying.
//! 4. **DroppingOff** -- unloads, then loops back or goes idle.
//!
//! Every state entry yields exactly one [`event::ExtractionEvent`].
//!
//! ```rust,ignore
//! let mut arena = Extractables::new();
//! let mut peon = ExtractionEngine::from_config(&config)?;
//! peon.set_deposit(wood, Tiled::new(1, 2, 1, 1))?;
//! peon.start()?;
//! for event in peon.update(1.0, &mut arena) {
//!     // drive movement, animation, UI
//! }
//! ```
//!
//! # Key Types
//!
//! - [`extractor::ExtractionEngine`] -- The per-unit state machine.
//! - [`resource::ResourceReference`] -- Static deposit or live extractable.
//! - [`resource::Extractables`] -- Arena of live, depletable resources.
//! - [`gate::ExtractionGate`] -- Host predicates gating extraction/carrying.
//! - [`event::ExtractionListener`] -- Observer of the six transitions.
//! - [`world::GatherWorld`] -- Steps many units and tallies deliveries.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod config;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod event;
pub mod extractor;
pub mod fixed;
pub mod gate;
pub mod id;
pub mod resource;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
