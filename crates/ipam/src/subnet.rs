//! Subnets and address reservations

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IpamError;

/// One named address inside a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpReservation {
    pub name: String,
    #[serde(rename = "IPAddress")]
    pub ip_address: Ipv4Addr,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl IpReservation {
    pub fn new(name: impl Into<String>, ip_address: Ipv4Addr, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_address,
            comment: comment.into(),
            aliases: Vec::new(),
        }
    }
}

/// A subnet carved out of a [`crate::Network`].
///
/// Reservations keep insertion order; names are unique within the subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(rename = "CIDR")]
    pub cidr: Ipv4Network,
    pub gateway: Ipv4Addr,
    #[serde(rename = "VlanID")]
    pub vlan_id: u16,
    #[serde(rename = "IPReservations", default, skip_serializing_if = "Vec::is_empty")]
    pub ip_reservations: Vec<IpReservation>,
    #[serde(rename = "DHCPStart", default, skip_serializing_if = "Option::is_none")]
    pub dhcp_start: Option<Ipv4Addr>,
    #[serde(rename = "DHCPEnd", default, skip_serializing_if = "Option::is_none")]
    pub dhcp_end: Option<Ipv4Addr>,
    #[serde(rename = "MetalLBPoolName", default, skip_serializing_if = "Option::is_none")]
    pub metallb_pool_name: Option<String>,
}

/// Switch xnames of a network, grouped by role, for [`Subnet::reserve_net_mgmt_ips`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MgmtSwitchXnames<'a> {
    pub spine: &'a [String],
    pub leaf: &'a [String],
    pub leaf_bmc: &'a [String],
    pub aggregation: &'a [String],
    pub cdu: &'a [String],
}

/// Name prefix of the placeholder reservations kept free for future switches.
pub const SPARE_SWITCH_PREFIX: &str = "sw-spare";

impl Subnet {
    /// New subnet with the gateway on the first usable address.
    pub fn new(name: impl Into<String>, cidr: Ipv4Network, vlan_id: u16) -> Self {
        Self {
            name: name.into(),
            full_name: String::new(),
            cidr,
            gateway: offset(cidr.network(), 1),
            vlan_id,
            ip_reservations: Vec::new(),
            dhcp_start: None,
            dhcp_end: None,
            metallb_pool_name: None,
        }
    }

    /// Addresses already handed out, in reservation order.
    pub fn reserved_ips(&self) -> Vec<Ipv4Addr> {
        self.ip_reservations.iter().map(|r| r.ip_address).collect()
    }

    pub fn reservations_by_name(&self) -> BTreeMap<&str, &IpReservation> {
        self.ip_reservations
            .iter()
            .map(|r| (r.name.as_str(), r))
            .collect()
    }

    pub fn lookup_reservation(&self, name: &str) -> Result<&IpReservation, IpamError> {
        self.ip_reservations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| IpamError::ReservationNotFound {
                subnet: self.name.clone(),
                name: name.to_string(),
            })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.ip_reservations.iter().position(|r| r.name == name)
    }

    fn owner_of(&self, ip: Ipv4Addr) -> Option<&IpReservation> {
        self.ip_reservations.iter().find(|r| r.ip_address == ip)
    }

    fn push(&mut self, reservation: IpReservation) -> &mut IpReservation {
        debug!(
            "Reserved {} for {} in subnet {}",
            reservation.ip_address, reservation.name, self.name
        );
        self.ip_reservations.push(reservation);
        let last = self.ip_reservations.len() - 1;
        &mut self.ip_reservations[last]
    }

    /// Reserve the next free address for `name`.
    ///
    /// The walk starts after the subnet address and skips the gateway and
    /// every address already reserved. Reserving a name twice returns the
    /// existing reservation.
    pub fn add_reservation(&mut self, name: &str, comment: &str) -> Result<&mut IpReservation, IpamError> {
        if let Some(idx) = self.position(name) {
            return Ok(&mut self.ip_reservations[idx]);
        }
        let taken: Vec<u32> = self.ip_reservations.iter().map(|r| u32::from(r.ip_address)).collect();
        let gateway = u32::from(self.gateway);
        let first = u32::from(self.cidr.ip()).saturating_add(1);
        let last = u32::from(self.cidr.broadcast()).saturating_sub(1);
        let ip = (first..=last)
            .find(|ip| *ip != gateway && !taken.contains(ip))
            .ok_or_else(|| IpamError::SubnetExhausted {
                subnet: self.name.clone(),
                cidr: self.cidr,
                name: name.to_string(),
            })?;
        Ok(self.push(IpReservation::new(name, Ipv4Addr::from(ip), comment)))
    }

    /// Reserve `name` at the subnet's first three octets plus `last_octet`.
    ///
    /// Keeps addresses stable across schema generations regardless of what
    /// sequential allocation would have chosen.
    pub fn add_reservation_with_pin(
        &mut self,
        name: &str,
        comment: &str,
        last_octet: u8,
    ) -> Result<&mut IpReservation, IpamError> {
        if let Some(idx) = self.position(name) {
            return Ok(&mut self.ip_reservations[idx]);
        }
        let [a, b, c, _] = self.cidr.network().octets();
        let ip = Ipv4Addr::new(a, b, c, last_octet);
        if let Some(owner) = self.owner_of(ip) {
            return Err(IpamError::AddressInUse {
                subnet: self.name.clone(),
                ip,
                owner: owner.name.clone(),
            });
        }
        Ok(self.push(IpReservation::new(name, ip, comment)))
    }

    /// Reserve `name` at an explicit address inside the subnet.
    pub fn add_reservation_with_ip(
        &mut self,
        name: &str,
        ip: Ipv4Addr,
        comment: &str,
    ) -> Result<&mut IpReservation, IpamError> {
        if !self.cidr.contains(ip) {
            return Err(IpamError::AddressOutOfRange {
                subnet: self.name.clone(),
                ip,
                cidr: self.cidr,
            });
        }
        if let Some(owner) = self.owner_of(ip) {
            return Err(IpamError::AddressInUse {
                subnet: self.name.clone(),
                ip,
                owner: owner.name.clone(),
            });
        }
        Ok(self.push(IpReservation::new(name, ip, comment)))
    }

    /// Reserve one address per management switch, then `extra_slots`
    /// placeholders for switches added later.
    ///
    /// Switches are named `sw-<role>-NNN` (spine, leaf, leaf-bmc, agg, cdu)
    /// with their xname as the comment; placeholders are `sw-spare-NNN`.
    pub fn reserve_net_mgmt_ips(&mut self, switches: MgmtSwitchXnames<'_>, extra_slots: usize) -> Result<(), IpamError> {
        let groups = [
            ("sw-spine", switches.spine),
            ("sw-leaf", switches.leaf),
            ("sw-leaf-bmc", switches.leaf_bmc),
            ("sw-agg", switches.aggregation),
            ("sw-cdu", switches.cdu),
        ];
        for (prefix, xnames) in groups {
            for (i, xname) in xnames.iter().enumerate() {
                self.add_reservation(&format!("{prefix}-{:03}", i + 1), xname)?;
            }
        }
        for i in 0..extra_slots {
            self.add_reservation(
                &format!("{SPARE_SWITCH_PREFIX}-{:03}", i + 1),
                "reserved for a future management switch",
            )?;
        }
        Ok(())
    }

    /// Set the DHCP pool to run from just past the highest reserved address
    /// to the last address before broadcast.
    pub fn update_dhcp_range(&mut self) -> Result<(), IpamError> {
        let highest = self
            .ip_reservations
            .iter()
            .map(|r| u32::from(r.ip_address))
            .filter(|ip| self.cidr.contains(Ipv4Addr::from(*ip)))
            .chain(std::iter::once(u32::from(self.gateway)))
            .max()
            .unwrap_or_default();
        let start = highest.saturating_add(1);
        let end = u32::from(self.cidr.broadcast()).saturating_sub(1);
        if start > end {
            return Err(IpamError::NoDhcpRange {
                subnet: self.name.clone(),
            });
        }
        self.dhcp_start = Some(Ipv4Addr::from(start));
        self.dhcp_end = Some(Ipv4Addr::from(end));
        Ok(())
    }

    /// Widen the subnet to the supernet's mask and move the gateway to the
    /// supernet gateway. The subnet address itself is kept.
    pub(crate) fn apply_supernet(&mut self, supernet: Ipv4Network) -> Result<(), IpamError> {
        self.cidr = Ipv4Network::new(self.cidr.ip(), supernet.prefix())?;
        self.gateway = offset(supernet.network(), 1);
        Ok(())
    }
}

pub(crate) fn offset(ip: Ipv4Addr, by: u32) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip).saturating_add(by))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(cidr: &str) -> Subnet {
        Subnet::new("bootstrap_dhcp", cidr.parse().expect("valid cidr"), 2)
    }

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().expect("valid ip")
    }

    #[test]
    fn test_gateway_is_first_usable_address() {
        assert_eq!(subnet("10.252.1.0/24").gateway, ip("10.252.1.1"));
    }

    #[test]
    fn test_add_reservation_is_sequential_after_gateway() {
        let mut s = subnet("10.252.1.0/24");
        let a = s.add_reservation("ncn-m001", "x3000c0s1b0n0").expect("room").ip_address;
        let b = s.add_reservation("ncn-m002", "x3000c0s3b0n0").expect("room").ip_address;
        assert_eq!(a, ip("10.252.1.2"));
        assert_eq!(b, ip("10.252.1.3"));
        assert_eq!(s.reserved_ips(), vec![a, b], "insertion order is kept");
    }

    #[test]
    fn test_add_reservation_skips_pinned_addresses() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation_with_pin("kubeapi-vip", "k8s-virtual-ip", 2).expect("pin");
        s.add_reservation_with_pin("rgw-vip", "rgw-virtual-ip", 3).expect("pin");
        let next = s.add_reservation("ncn-s001", "").expect("room").ip_address;
        assert_eq!(next, ip("10.252.1.4"));
        assert_eq!(s.lookup_reservation("kubeapi-vip").expect("pinned").ip_address, ip("10.252.1.2"));
    }

    #[test]
    fn test_add_reservation_existing_name_returns_existing() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation("ncn-w001", "first").expect("room");
        let again = s.add_reservation("ncn-w001", "second").expect("existing");
        assert_eq!(again.ip_address, ip("10.252.1.2"));
        assert_eq!(again.comment, "first");
        assert_eq!(s.ip_reservations.len(), 1);
    }

    #[test]
    fn test_add_reservation_exhausted() {
        let mut s = subnet("10.0.0.0/30");
        s.add_reservation("only", "").expect("one usable address after the gateway");
        let err = s.add_reservation("second", "").expect_err("no room");
        assert!(matches!(err, IpamError::SubnetExhausted { name, .. } if name == "second"));
    }

    #[test]
    fn test_pin_conflict_is_an_error() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation("ncn-m001", "").expect("room");
        let err = s.add_reservation_with_pin("kubeapi-vip", "", 2).expect_err(".2 taken");
        assert_eq!(
            err.to_string(),
            "Address 10.252.1.2 in subnet bootstrap_dhcp is already reserved by ncn-m001"
        );
    }

    #[test]
    fn test_add_reservation_with_ip() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation_with_ip("pit", ip("10.252.1.10"), "").expect("free");
        assert!(s.add_reservation_with_ip("other", ip("10.252.1.10"), "").is_err());
        assert!(matches!(
            s.add_reservation_with_ip("outside", ip("10.252.2.10"), ""),
            Err(IpamError::AddressOutOfRange { .. })
        ));
    }

    #[test]
    fn test_reserve_net_mgmt_ips() {
        let mut s = Subnet::new("network_hardware", "10.252.0.0/24".parse().expect("cidr"), 2);
        let spine = vec!["x3000c0h33s1".to_string(), "x3000c0h34s1".to_string()];
        let leaf_bmc = vec!["x3000c0w14".to_string()];
        s.reserve_net_mgmt_ips(
            MgmtSwitchXnames {
                spine: &spine,
                leaf_bmc: &leaf_bmc,
                ..Default::default()
            },
            2,
        )
        .expect("room");
        let names: Vec<&str> = s.ip_reservations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["sw-spine-001", "sw-spine-002", "sw-leaf-bmc-001", "sw-spare-001", "sw-spare-002"]
        );
        let spine_two = s.lookup_reservation("sw-spine-002").expect("reserved");
        assert_eq!(spine_two.ip_address, ip("10.252.0.3"));
        assert_eq!(spine_two.comment, "x3000c0h34s1");
    }

    #[test]
    fn test_update_dhcp_range() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation("ncn-m001", "").expect("room");
        s.add_reservation("ncn-m002", "").expect("room");
        s.update_dhcp_range().expect("room for dhcp");
        assert_eq!(s.dhcp_start, Some(ip("10.252.1.4")));
        assert_eq!(s.dhcp_end, Some(ip("10.252.1.254")));
    }

    #[test]
    fn test_reservations_by_name() {
        let mut s = subnet("10.252.1.0/24");
        s.add_reservation("b", "").expect("room");
        s.add_reservation("a", "").expect("room");
        let by_name = s.reservations_by_name();
        assert_eq!(by_name.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(
            s.lookup_reservation("missing"),
            Err(IpamError::ReservationNotFound { .. })
        ));
    }
}
