//! CSM network address planning
//!
//! Carves the default CSM networks into subnets and hands out addresses
//! inside them:
//!
//! - [`network`]: supernets, first-fit subnet carving, per-cabinet subnets
//!   and the supernet hack
//! - [`subnet`]: address reservations and DHCP ranges
//! - [`ncn`]: management node reservations
//! - [`layout`]: the default CSM networks and how each one is populated
//!
//! # Example
//!
//! ```
//! use ipam::{build_networks, csm_layouts, LayoutOptions, NetworkInputs};
//!
//! let layouts = csm_layouts(LayoutOptions::default()).unwrap();
//! let inputs = NetworkInputs { cabinets: &[], switches: &[], ncns: &[] };
//! let networks = build_networks(&layouts, inputs).unwrap();
//! assert!(networks["NMN"].lookup_subnet("bootstrap_dhcp").is_ok());
//! ```

pub mod error;
pub mod layout;
pub mod ncn;
pub mod network;
pub mod subnet;

pub use error::IpamError;
pub use layout::{
    build_network, build_networks, csm_layouts, default_networks, BaseSubnet, CabinetSubdivision,
    LayoutOptions, NetworkInputs, NetworkLayout, PinnedReservation, DEFAULT_CABINET_PREFIX,
};
pub use ncn::{reserve_ncn_ips, Ncn};
pub use network::{CabinetNetworkOverride, NetType, Network, VlanRange, SUPERNET_HACK_SUBNETS};
pub use subnet::{IpReservation, MgmtSwitchXnames, Subnet, SPARE_SWITCH_PREFIX};
