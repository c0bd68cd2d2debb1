//! Networks and subnet carving
//!
//! A [`Network`] owns a supernet and carves non-overlapping [`Subnet`]s out
//! of it first-fit, lowest address first. Every subnet is aligned to its own
//! size, so a `/22` only ever starts on a `/22` boundary.

use std::fmt;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use sls::{CabinetDetail, CabinetFilter, CabinetGroupDetail};
use tracing::{debug, info};

use crate::error::IpamError;
use crate::subnet::Subnet;

/// Subnets the supernet hack rewrites; every other subnet is left alone.
pub const SUPERNET_HACK_SUBNETS: [&str; 4] = [
    "bootstrap_dhcp",
    "network_hardware",
    "can_metallb_static_pool",
    "can_metallb_address_pool",
];

/// Smallest block [`Network::add_biggest_subnet`] will settle for.
pub const SMALLEST_BIGGEST_SUBNET_PREFIX: u8 = 28;

/// Inclusive VLAN range, serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanRange(pub u16, pub u16);

impl VlanRange {
    pub fn single(vlan: u16) -> Self {
        Self(vlan, vlan)
    }

    pub fn start(&self) -> u16 {
        self.0
    }

    pub fn end(&self) -> u16 {
        self.1
    }

    /// The `n`th VLAN of the range, if the range is that long.
    pub fn nth(&self, n: usize) -> Option<u16> {
        let vlan = u16::try_from(n).ok()?.checked_add(self.0)?;
        (vlan <= self.1).then_some(vlan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetType {
    Ethernet,
    Slingshot10,
}

/// Which per-cabinet overrides of a [`CabinetDetail`] apply to a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CabinetNetworkOverride {
    Nmn,
    Hmn,
}

impl CabinetNetworkOverride {
    pub fn subnet(self, cabinet: &CabinetDetail) -> Option<Ipv4Network> {
        match self {
            Self::Nmn => cabinet.nmn_subnet,
            Self::Hmn => cabinet.hmn_subnet,
        }
    }

    pub fn vlan(self, cabinet: &CabinetDetail) -> Option<u16> {
        match self {
            Self::Nmn => cabinet.nmn_vlan,
            Self::Hmn => cabinet.hmn_vlan,
        }
    }
}

/// A named supernet and the subnets carved from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(rename = "CIDR")]
    pub cidr: Ipv4Network,
    pub vlan_range: VlanRange,
    #[serde(rename = "MTU")]
    pub mtu: u16,
    #[serde(rename = "Type")]
    pub net_type: NetType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(skip)]
    sealed: bool,
}

/// First and last address of a block as integers.
fn block_range(cidr: Ipv4Network) -> (u32, u32) {
    (u32::from(cidr.network()), u32::from(cidr.broadcast()))
}

fn align_up(addr: u64, size: u64) -> u64 {
    addr.div_ceil(size) * size
}

impl Network {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        cidr: Ipv4Network,
        vlan_range: VlanRange,
        mtu: u16,
        net_type: NetType,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            cidr,
            vlan_range,
            mtu,
            net_type,
            comment: String::new(),
            subnets: Vec::new(),
            sealed: false,
        }
    }

    /// True once the supernet hack ran; carving is refused afterwards.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn subnet_names(&self) -> Vec<&str> {
        self.subnets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn lookup_subnet(&self, name: &str) -> Result<&Subnet, IpamError> {
        self.subnets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| self.not_found(name))
    }

    pub fn lookup_subnet_mut(&mut self, name: &str) -> Result<&mut Subnet, IpamError> {
        let Some(idx) = self.subnets.iter().position(|s| s.name == name) else {
            return Err(self.not_found(name));
        };
        Ok(&mut self.subnets[idx])
    }

    fn not_found(&self, name: &str) -> IpamError {
        IpamError::SubnetNotFound {
            network: self.name.clone(),
            subnet: name.to_string(),
        }
    }

    fn check_can_carve(&self, name: &str) -> Result<(), IpamError> {
        if self.sealed {
            return Err(IpamError::Sealed(self.name.clone()));
        }
        if self.subnets.iter().any(|s| s.name == name) {
            return Err(IpamError::DuplicateSubnet {
                network: self.name.clone(),
                subnet: name.to_string(),
            });
        }
        Ok(())
    }

    fn check_prefix(&self, prefix: u8) -> Result<(), IpamError> {
        if prefix < self.cidr.prefix() || prefix > 32 {
            return Err(IpamError::PrefixTooShort {
                network: self.name.clone(),
                cidr: self.cidr,
                prefix,
            });
        }
        Ok(())
    }

    /// Lowest aligned block of `prefix` that overlaps neither a carved
    /// subnet nor any of the `extra` address ranges.
    fn free_block(&self, prefix: u8, extra: &[(u32, u32)]) -> Option<Ipv4Network> {
        let size = 1u64 << (32 - u32::from(prefix));
        let (space_start, space_end) = block_range(self.cidr);

        let mut used: Vec<(u32, u32)> = self
            .subnets
            .iter()
            .map(|s| block_range(s.cidr))
            .chain(extra.iter().copied())
            .collect();
        used.sort_unstable();

        let mut candidate = align_up(u64::from(space_start), size);
        for (start, end) in used {
            if u64::from(end) < candidate {
                continue;
            }
            if candidate + size - 1 < u64::from(start) {
                break;
            }
            candidate = align_up(u64::from(end) + 1, size);
        }

        if candidate + size - 1 > u64::from(space_end) {
            return None;
        }
        let addr = u32::try_from(candidate).ok()?;
        Ipv4Network::new(Ipv4Addr::from(addr), prefix).ok()
    }

    fn push(&mut self, subnet: Subnet) -> &mut Subnet {
        debug!("Carved subnet {} {} from {}", subnet.name, subnet.cidr, self.name);
        self.subnets.push(subnet);
        let last = self.subnets.len() - 1;
        &mut self.subnets[last]
    }

    fn no_free_block(&self, prefix: u8, name: &str) -> IpamError {
        IpamError::NoFreeBlock {
            network: self.name.clone(),
            cidr: self.cidr,
            prefix,
            subnet: name.to_string(),
        }
    }

    /// Carve the next free `/prefix` block.
    pub fn add_subnet(&mut self, prefix: u8, name: &str, vlan: u16) -> Result<&mut Subnet, IpamError> {
        self.check_can_carve(name)?;
        self.check_prefix(prefix)?;
        let cidr = self
            .free_block(prefix, &[])
            .ok_or_else(|| self.no_free_block(prefix, name))?;
        Ok(self.push(Subnet::new(name, cidr, vlan)))
    }

    /// Carve a caller-chosen block; fails if it leaves the network or
    /// overlaps an existing subnet.
    pub fn add_subnet_by_cidr(&mut self, cidr: Ipv4Network, name: &str, vlan: u16) -> Result<&mut Subnet, IpamError> {
        self.check_can_carve(name)?;
        let cidr = Ipv4Network::new(cidr.network(), cidr.prefix())?;
        let (start, end) = block_range(cidr);
        let (space_start, space_end) = block_range(self.cidr);
        if start < space_start || end > space_end {
            return Err(IpamError::OutOfRange {
                cidr,
                network: self.name.clone(),
                network_cidr: self.cidr,
            });
        }
        if let Some(existing) = self.subnets.iter().find(|s| {
            let (s_start, s_end) = block_range(s.cidr);
            start <= s_end && s_start <= end
        }) {
            return Err(IpamError::Overlap {
                cidr,
                existing: existing.name.clone(),
                existing_cidr: existing.cidr,
            });
        }
        Ok(self.push(Subnet::new(name, cidr, vlan)))
    }

    /// Carve the largest free block no bigger than `/max_prefix`, shrinking
    /// down to a `/28`.
    pub fn add_biggest_subnet(&mut self, max_prefix: u8, name: &str, vlan: u16) -> Result<&mut Subnet, IpamError> {
        self.check_can_carve(name)?;
        let first = max_prefix.max(self.cidr.prefix());
        self.check_prefix(first)?;
        let prefix = (first..=SMALLEST_BIGGEST_SUBNET_PREFIX.max(first))
            .find(|prefix| self.free_block(*prefix, &[]).is_some())
            .ok_or_else(|| self.no_free_block(max_prefix, name))?;
        self.add_subnet(prefix, name, vlan)
    }

    /// Carve one `cabinet_<id>` subnet per cabinet accepted by `filter`.
    ///
    /// Cabinets are processed in increasing ID order so generation is
    /// repeatable. Cabinet `i` gets VLAN `vlan_range.start + i` unless it
    /// pins its own; pinned subnets are honoured and automatic blocks are
    /// carved around them.
    pub fn gen_subnets(
        &mut self,
        cabinets: &[CabinetGroupDetail],
        prefix: u8,
        filter: &CabinetFilter,
        overrides: Option<CabinetNetworkOverride>,
    ) -> Result<(), IpamError> {
        if self.sealed {
            return Err(IpamError::Sealed(self.name.clone()));
        }
        self.check_prefix(prefix)?;

        let mut selected: Vec<&CabinetDetail> = cabinets
            .iter()
            .flat_map(|group| group.cabinet_details.iter().map(move |cabinet| (group, cabinet)))
            .filter(|&(group, cabinet)| filter(group, cabinet))
            .map(|(_, cabinet)| cabinet)
            .collect();
        selected.sort_by_key(|cabinet| cabinet.id);

        let pinned: Vec<(u32, u32)> = selected
            .iter()
            .filter_map(|cabinet| overrides.and_then(|o| o.subnet(cabinet)))
            .map(block_range)
            .collect();

        for (i, cabinet) in selected.iter().enumerate() {
            let name = format!("cabinet_{}", cabinet.id);
            let vlan = match overrides.and_then(|o| o.vlan(cabinet)) {
                Some(vlan) => vlan,
                None => self.vlan_range.nth(i).ok_or_else(|| IpamError::VlanRangeExhausted {
                    network: self.name.clone(),
                    start: self.vlan_range.start(),
                    end: self.vlan_range.end(),
                    subnet: name.clone(),
                })?,
            };
            let full_name = format!("{} Cabinet {}", self.full_name, cabinet.id);
            let subnet = match overrides.and_then(|o| o.subnet(cabinet)) {
                Some(cidr) => self.add_subnet_by_cidr(cidr, &name, vlan)?,
                None => {
                    self.check_can_carve(&name)?;
                    let cidr = self
                        .free_block(prefix, &pinned)
                        .ok_or_else(|| self.no_free_block(prefix, &name))?;
                    self.push(Subnet::new(name, cidr, vlan))
                }
            };
            subnet.full_name = full_name;
        }
        Ok(())
    }

    /// Overwrite gateway and mask of the legacy install subnets with the
    /// supernet's, then seal the network.
    ///
    /// Reproduces the overlapping broadcast domains an earlier deployment
    /// generation expects. Only [`SUPERNET_HACK_SUBNETS`] are touched; any of
    /// them missing from this network is skipped. Must run after every
    /// subnet has been carved.
    pub fn apply_supernet_hack(&mut self) -> Result<(), IpamError> {
        let supernet = self.cidr;
        for subnet in &mut self.subnets {
            if SUPERNET_HACK_SUBNETS.contains(&subnet.name.as_str()) {
                subnet.apply_supernet(supernet)?;
                debug!("Supernet hack applied to {} {}", self.name, subnet.name);
            }
        }
        self.sealed = true;
        info!("Network {} sealed by supernet hack", self.name);
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.cidr)
    }
}

#[cfg(test)]
#[path = "network_test.rs"]
mod network_test;
