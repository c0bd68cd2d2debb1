//! SLS data model
//!
//! Types shared by the topology engine, the address allocator and the
//! `csi` generator:
//!
//! - [`hardware`]: `GenericHardware` records and the xname-keyed inventory
//! - [`cabinets`]: cabinet groups, per-cabinet details and cabinet filters
//! - [`switches`]: management switch metadata
//! - [`hmn`]: raw HMN connection rows
//! - [`application_node`]: application node prefixes, subroles and aliases

pub mod application_node;
pub mod cabinets;
pub mod error;
pub mod hardware;
pub mod hmn;
pub mod switches;

pub use application_node::{ApplicationNodeConfig, SUBROLE_PLACEHOLDER};
pub use cabinets::{
    cabinet_class_filter, cabinet_ex2500_air_cooled_chassis_filter, cabinet_filter_and,
    cabinet_filter_or, cabinet_kind_filter, CabinetDetail, CabinetDetailFile, CabinetFilter,
    CabinetGroupDetail, ChassisCount,
};
pub use error::SlsError;
pub use hardware::{
    CabinetNetwork, CabinetProperties, ExtraProperties, GenericHardware, HardwareClass,
    HardwareInventory, HardwareType, MgmtSwitchConnectorProperties, MgmtSwitchProperties,
    NodeProperties, NodeRole, RouterBmcProperties, SnmpCredentials,
};
pub use hmn::HmnRow;
pub use switches::{assign_switch_aliases, ManagementSwitch, ManagementSwitchBrand, ManagementSwitchType};
