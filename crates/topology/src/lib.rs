//! Hardware topology inference
//!
//! Derives the SLS hardware inventory of a Shasta system from its site
//! inputs:
//!
//! - [`classify`]: sorts HMN connection rows into device kinds
//! - [`engine`]: synthesizes river hardware from the rows, generates Hill and
//!   Mountain hardware from the cabinet file and records the management
//!   switches
//! - [`cabinets`]: cabinet records carrying their cabinet subnets
//! - [`state`]: the combined hardware and network state handed to SLS

pub mod cabinets;
pub mod classify;
pub mod engine;
pub mod error;
pub mod nid;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use cabinets::cabinet_hardware;
pub use classify::{classify_row, Location, ManagementRole, NodeClass, RowClass, Side};
pub use engine::{TopologyEngine, TopologyInputs, TopologyOptions, RIVER_CHASSIS_BMC};
pub use error::TopologyError;
pub use nid::{NidAllocator, DEFAULT_MOUNTAIN_STARTING_NID, MANAGEMENT_STARTING_NID};
pub use state::{sorted_cabinet_xnames, SlsState};
