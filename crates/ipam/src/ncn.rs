//! Management node (NCN) address reservations

use serde::{Deserialize, Serialize};
use sls::{HardwareInventory, NodeRole};

use crate::error::IpamError;
use crate::subnet::Subnet;

/// A management node as the address plan sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ncn {
    pub xname: String,
    /// Hostname, e.g. `ncn-m001`
    pub alias: String,
}

impl Ncn {
    pub fn new(xname: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            xname: xname.into(),
            alias: alias.into(),
        }
    }

    /// Management nodes of an inventory, ordered by hostname.
    ///
    /// Nodes without an alias are skipped; they have no hostname to reserve.
    pub fn from_inventory(inventory: &HardwareInventory) -> Vec<Self> {
        let mut ncns: Vec<Self> = inventory
            .iter()
            .filter_map(|hw| {
                let props = hw.node_properties()?;
                if props.role != NodeRole::Management {
                    return None;
                }
                let alias = props.aliases.first()?;
                Some(Self::new(hw.xname.clone(), alias.clone()))
            })
            .collect();
        ncns.sort_by(|a, b| a.alias.cmp(&b.alias));
        ncns
    }
}

/// Reserve one address per NCN, named by hostname with the xname as comment
/// and a `<hostname>-<net>` alias (plus `<hostname>.local` on the NMN).
pub fn reserve_ncn_ips(subnet: &mut Subnet, network_name: &str, ncns: &[Ncn]) -> Result<(), IpamError> {
    let net = network_name.to_lowercase();
    for ncn in ncns {
        let reservation = subnet.add_reservation(&ncn.alias, &ncn.xname)?;
        let alias = format!("{}-{net}", ncn.alias);
        if !reservation.aliases.contains(&alias) {
            reservation.aliases.push(alias);
        }
        if net == "nmn" {
            let local = format!("{}.local", ncn.alias);
            if !reservation.aliases.contains(&local) {
                reservation.aliases.push(local);
            }
        }
    }
    Ok(())
}
