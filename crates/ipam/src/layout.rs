//! Network layouts
//!
//! A [`NetworkLayout`] describes how one CSM network is populated: which
//! install subnets it carries, which addresses are pinned, whether it is
//! subdivided per cabinet and whether the supernet hack applies.
//! [`build_network`] turns a layout plus the site inputs into a [`Network`].

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use sls::{
    cabinet_class_filter, cabinet_ex2500_air_cooled_chassis_filter, cabinet_filter_or,
    cabinet_kind_filter, CabinetFilter, CabinetGroupDetail, HardwareClass, ManagementSwitch,
    ManagementSwitchType,
};
use tracing::info;

use crate::error::IpamError;
use crate::ncn::{reserve_ncn_ips, Ncn};
use crate::network::{CabinetNetworkOverride, NetType, Network, VlanRange};
use crate::subnet::MgmtSwitchXnames;

/// Per-cabinet subnet size.
pub const DEFAULT_CABINET_PREFIX: u8 = 22;

/// Names the layouts give their subnets.
pub mod subnet_name {
    pub const BOOTSTRAP_DHCP: &str = "bootstrap_dhcp";
    pub const NETWORK_HARDWARE: &str = "network_hardware";
    pub const UAI_MACVLAN: &str = "uai_macvlan";
    pub const CAN_METALLB_STATIC_POOL: &str = "can_metallb_static_pool";
    pub const CAN_METALLB_ADDRESS_POOL: &str = "can_metallb_address_pool";
}

/// Addresses in the UAI subnet reserved for services.
const UAI_RESERVATIONS: [(&str, &str); 5] = [
    ("uai_nmn_blackhole", "Blackhole route for UAIs"),
    ("slurmctld_service", "Slurm controller"),
    ("slurmdbd_service", "Slurm database"),
    ("pbs_service", "PBS server"),
    ("pbs_comm_service", "PBS comm"),
];

/// A reservation forced onto a fixed last octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedReservation {
    pub name: String,
    pub comment: String,
    pub last_octet: u8,
}

impl PinnedReservation {
    pub fn new(name: &str, comment: &str, last_octet: u8) -> Self {
        Self {
            name: name.to_string(),
            comment: comment.to_string(),
            last_octet,
        }
    }
}

/// A single subnet filling (as much as possible of) the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSubnet {
    pub name: String,
    pub full_name: String,
    pub prefix: u8,
    pub metallb_pool_name: Option<String>,
}

/// Per-cabinet subdivision of a network.
pub struct CabinetSubdivision {
    pub prefix: u8,
    pub filter: CabinetFilter,
    pub overrides: Option<CabinetNetworkOverride>,
}

impl fmt::Debug for CabinetSubdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CabinetSubdivision")
            .field("prefix", &self.prefix)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

/// How to populate one network.
#[derive(Debug)]
pub struct NetworkLayout {
    pub template: Network,
    /// Size of the `bootstrap_dhcp` subnet, if the network has one
    pub bootstrap_dhcp_prefix: Option<u8>,
    /// Pinned addresses inside `bootstrap_dhcp`
    pub pinned_reservations: Vec<PinnedReservation>,
    /// Reserve NCN addresses inside `bootstrap_dhcp`
    pub reserve_ncns: bool,
    pub network_hardware_prefix: Option<u8>,
    /// Spare switch slots reserved in `network_hardware`
    pub additional_networking_space: usize,
    pub uai_prefix: Option<u8>,
    /// CAN MetalLB static and address pools
    pub metallb_pools: bool,
    pub base_subnet: Option<BaseSubnet>,
    pub cabinet_subdivision: Option<CabinetSubdivision>,
    pub supernet_hack: bool,
}

impl NetworkLayout {
    /// Layout that carves nothing; enable parts field by field.
    pub fn new(template: Network) -> Self {
        Self {
            template,
            bootstrap_dhcp_prefix: None,
            pinned_reservations: Vec::new(),
            reserve_ncns: false,
            network_hardware_prefix: None,
            additional_networking_space: 0,
            uai_prefix: None,
            metallb_pools: false,
            base_subnet: None,
            cabinet_subdivision: None,
            supernet_hack: false,
        }
    }
}

/// Site inputs shared by every layout.
#[derive(Debug, Clone, Copy)]
pub struct NetworkInputs<'a> {
    pub cabinets: &'a [CabinetGroupDetail],
    pub switches: &'a [ManagementSwitch],
    pub ncns: &'a [Ncn],
}

/// Options for [`csm_layouts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub supernet_hack: bool,
    pub cabinet_prefix: u8,
    pub additional_networking_space: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            supernet_hack: false,
            cabinet_prefix: DEFAULT_CABINET_PREFIX,
            additional_networking_space: 0,
        }
    }
}

fn cidr(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> Result<Ipv4Network, IpamError> {
    Ok(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), prefix)?)
}

/// Default CSM network templates (no subnets carved yet).
pub fn default_networks() -> Result<Vec<Network>, IpamError> {
    let eth = NetType::Ethernet;
    Ok(vec![
        Network::new("NMN", "Node Management Network", cidr(10, 252, 0, 0, 17)?, VlanRange::single(2), 9000, eth),
        Network::new("HMN", "Hardware Management Network", cidr(10, 254, 0, 0, 17)?, VlanRange::single(4), 9000, eth),
        Network::new(
            "NMN_RVR",
            "River Compute Node Management Network",
            cidr(10, 106, 0, 0, 17)?,
            VlanRange(1770, 1999),
            9000,
            eth,
        ),
        Network::new(
            "HMN_RVR",
            "River Compute Hardware Management Network",
            cidr(10, 107, 0, 0, 17)?,
            VlanRange(1513, 1769),
            9000,
            eth,
        ),
        Network::new(
            "NMN_MTN",
            "Mountain Compute Node Management Network",
            cidr(10, 100, 0, 0, 17)?,
            VlanRange(2000, 2999),
            9000,
            eth,
        ),
        Network::new(
            "HMN_MTN",
            "Mountain Compute Hardware Management Network",
            cidr(10, 104, 0, 0, 17)?,
            VlanRange(3000, 3999),
            9000,
            eth,
        ),
        Network::new("CAN", "Customer Access Network", cidr(10, 102, 11, 0, 24)?, VlanRange::single(7), 9000, eth),
        Network::new("MTL", "Provisioning Network (untagged)", cidr(10, 1, 0, 0, 16)?, VlanRange::single(0), 9000, eth),
        Network::new(
            "HSN",
            "High Speed Network",
            cidr(10, 253, 0, 0, 16)?,
            VlanRange(613, 868),
            9000,
            NetType::Slingshot10,
        ),
        Network::new(
            "NMNLB",
            "Node Management Network LoadBalancers",
            cidr(10, 92, 100, 0, 24)?,
            VlanRange::single(2),
            9000,
            eth,
        ),
        Network::new(
            "HMNLB",
            "Hardware Management Network LoadBalancers",
            cidr(10, 94, 100, 0, 24)?,
            VlanRange::single(4),
            9000,
            eth,
        ),
    ])
}

fn river_filter() -> CabinetFilter {
    cabinet_filter_or(
        cabinet_kind_filter(sls::cabinets::KIND_RIVER),
        cabinet_ex2500_air_cooled_chassis_filter(),
    )
}

fn liquid_cooled_filter() -> CabinetFilter {
    cabinet_filter_or(
        cabinet_class_filter(HardwareClass::Hill),
        cabinet_class_filter(HardwareClass::Mountain),
    )
}

/// Layout for every default CSM network.
pub fn csm_layouts(options: LayoutOptions) -> Result<Vec<NetworkLayout>, IpamError> {
    let layouts = default_networks()?
        .into_iter()
        .map(|template| {
            let name = template.name.clone();
            let mut layout = NetworkLayout::new(template);
            match name.as_str() {
                "NMN" => {
                    layout.bootstrap_dhcp_prefix = Some(24);
                    layout.pinned_reservations = vec![
                        PinnedReservation::new("kubeapi-vip", "k8s-virtual-ip", 2),
                        PinnedReservation::new("rgw-vip", "rgw-virtual-ip", 3),
                    ];
                    layout.reserve_ncns = true;
                    layout.network_hardware_prefix = Some(24);
                    layout.additional_networking_space = options.additional_networking_space;
                    layout.uai_prefix = Some(24);
                    layout.supernet_hack = options.supernet_hack;
                }
                "HMN" | "MTL" => {
                    layout.bootstrap_dhcp_prefix = Some(24);
                    layout.reserve_ncns = true;
                    layout.network_hardware_prefix = Some(24);
                    layout.additional_networking_space = options.additional_networking_space;
                    layout.supernet_hack = options.supernet_hack;
                }
                "CAN" => {
                    layout.bootstrap_dhcp_prefix = Some(26);
                    layout.pinned_reservations = vec![
                        PinnedReservation::new("can-switch-1", "", 2),
                        PinnedReservation::new("can-switch-2", "", 3),
                    ];
                    layout.reserve_ncns = true;
                    layout.metallb_pools = true;
                    layout.supernet_hack = options.supernet_hack;
                }
                "NMN_RVR" | "HMN_RVR" | "NMN_MTN" | "HMN_MTN" => {
                    let filter = if name.ends_with("_RVR") {
                        river_filter()
                    } else {
                        liquid_cooled_filter()
                    };
                    let overrides = if name.starts_with("NMN") {
                        CabinetNetworkOverride::Nmn
                    } else {
                        CabinetNetworkOverride::Hmn
                    };
                    layout.cabinet_subdivision = Some(CabinetSubdivision {
                        prefix: options.cabinet_prefix,
                        filter,
                        overrides: Some(overrides),
                    });
                }
                "HSN" => {
                    layout.base_subnet = Some(BaseSubnet {
                        name: "hsn_base_subnet".to_string(),
                        full_name: "HSN Base Subnet".to_string(),
                        prefix: 16,
                        metallb_pool_name: None,
                    });
                }
                "NMNLB" | "HMNLB" => {
                    let (short, pool) = if name == "NMNLB" {
                        ("nmn", "node-management")
                    } else {
                        ("hmn", "hardware-management")
                    };
                    layout.base_subnet = Some(BaseSubnet {
                        name: format!("{short}_metallb_address_pool"),
                        full_name: format!("{} MetalLB", short.to_uppercase()),
                        prefix: 24,
                        metallb_pool_name: Some(pool.to_string()),
                    });
                }
                _ => {}
            }
            layout
        })
        .collect();
    Ok(layouts)
}

fn switch_xnames(switches: &[ManagementSwitch], kind: ManagementSwitchType) -> Vec<String> {
    switches
        .iter()
        .filter(|s| s.switch_type == kind)
        .map(|s| s.xname.clone())
        .collect()
}

/// Populate one network from its layout.
///
/// Order: bootstrap DHCP (pins, NCNs, DHCP range), network hardware, UAI,
/// MetalLB pools, base subnet, cabinet subnets, and the supernet hack last.
pub fn build_network(layout: &NetworkLayout, inputs: NetworkInputs<'_>) -> Result<Network, IpamError> {
    let mut net = layout.template.clone();
    let vlan = net.vlan_range.start();
    let full_name = net.full_name.clone();

    if let Some(prefix) = layout.bootstrap_dhcp_prefix {
        let name = net.name.clone();
        let subnet = net.add_subnet(prefix, subnet_name::BOOTSTRAP_DHCP, vlan)?;
        subnet.full_name = format!("{full_name} Bootstrap DHCP Subnet");
        for pin in &layout.pinned_reservations {
            subnet.add_reservation_with_pin(&pin.name, &pin.comment, pin.last_octet)?;
        }
        if layout.reserve_ncns {
            reserve_ncn_ips(subnet, &name, inputs.ncns)?;
        }
        subnet.update_dhcp_range()?;
    }

    if let Some(prefix) = layout.network_hardware_prefix {
        let spine = switch_xnames(inputs.switches, ManagementSwitchType::Spine);
        let leaf = switch_xnames(inputs.switches, ManagementSwitchType::Leaf);
        let leaf_bmc = switch_xnames(inputs.switches, ManagementSwitchType::LeafBMC);
        let aggregation = switch_xnames(inputs.switches, ManagementSwitchType::Aggregation);
        let cdu = switch_xnames(inputs.switches, ManagementSwitchType::CDU);
        let subnet = net.add_subnet(prefix, subnet_name::NETWORK_HARDWARE, vlan)?;
        subnet.full_name = format!("{full_name} Management Network Infrastructure");
        subnet.reserve_net_mgmt_ips(
            MgmtSwitchXnames {
                spine: &spine,
                leaf: &leaf,
                leaf_bmc: &leaf_bmc,
                aggregation: &aggregation,
                cdu: &cdu,
            },
            layout.additional_networking_space,
        )?;
    }

    if let Some(prefix) = layout.uai_prefix {
        let subnet = net.add_subnet(prefix, subnet_name::UAI_MACVLAN, vlan)?;
        subnet.full_name = format!("{} UAIs", net_short(&full_name));
        for (name, comment) in UAI_RESERVATIONS {
            subnet.add_reservation(name, comment)?;
        }
        subnet.update_dhcp_range()?;
    }

    if layout.metallb_pools {
        let subnet = net.add_subnet(28, subnet_name::CAN_METALLB_STATIC_POOL, vlan)?;
        subnet.full_name = "CAN Static Pool MetalLB".to_string();
        subnet.metallb_pool_name = Some("customer-access-static".to_string());
        let subnet = net.add_subnet(27, subnet_name::CAN_METALLB_ADDRESS_POOL, vlan)?;
        subnet.full_name = "CAN Dynamic MetalLB".to_string();
        subnet.metallb_pool_name = Some("customer-access".to_string());
    }

    if let Some(base) = &layout.base_subnet {
        let subnet = net.add_biggest_subnet(base.prefix, &base.name, vlan)?;
        subnet.full_name.clone_from(&base.full_name);
        subnet.metallb_pool_name.clone_from(&base.metallb_pool_name);
    }

    if let Some(subdivision) = &layout.cabinet_subdivision {
        net.gen_subnets(
            inputs.cabinets,
            subdivision.prefix,
            &subdivision.filter,
            subdivision.overrides,
        )?;
    }

    if layout.supernet_hack {
        net.apply_supernet_hack()?;
    }

    info!("Built network {} with {} subnets", net, net.subnets.len());
    Ok(net)
}

fn net_short(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(char::is_ascii_uppercase)
        .collect()
}

/// Build every layout, keyed by network name.
pub fn build_networks(
    layouts: &[NetworkLayout],
    inputs: NetworkInputs<'_>,
) -> Result<BTreeMap<String, Network>, IpamError> {
    layouts
        .iter()
        .map(|layout| build_network(layout, inputs).map(|net| (net.name.clone(), net)))
        .collect()
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
