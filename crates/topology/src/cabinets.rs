//! Cabinet hardware records
//!
//! Cabinets are recorded after the networks are carved: each record lists
//! the HMN and NMN cabinet subnets its hardware lives on.

use std::collections::BTreeMap;

use ipam::Network;
use sls::{
    CabinetGroupDetail, CabinetNetwork, CabinetProperties, ExtraProperties, GenericHardware,
    HardwareClass,
};
use tracing::debug;

use crate::error::TopologyError;

/// Network family cabinet subnets are recorded under.
const COMPUTE_NETWORKS: &str = "cn";

/// Per-class networks holding the cabinet subnets, as `(HMN, NMN)`.
fn cabinet_networks(class: HardwareClass) -> [(&'static str, &'static str); 2] {
    match class {
        HardwareClass::River => [("HMN", "HMN_RVR"), ("NMN", "NMN_RVR")],
        HardwareClass::Hill | HardwareClass::Mountain => [("HMN", "HMN_MTN"), ("NMN", "NMN_MTN")],
    }
}

/// One `comptype_cabinet` record per declared cabinet.
///
/// A network without a `cabinet_<id>` subnet for the cabinet is left out of
/// its record.
pub fn cabinet_hardware(
    cabinets: &[CabinetGroupDetail],
    networks: &BTreeMap<String, Network>,
) -> Result<Vec<GenericHardware>, TopologyError> {
    let mut hardware = Vec::new();
    for group in cabinets {
        let Some(class) = group.class() else {
            debug!("Cabinet group {} has no hardware class, no cabinet records", group.kind);
            continue;
        };
        for cabinet in &group.cabinet_details {
            let subnet_name = format!("cabinet_{}", cabinet.id);
            let cn: BTreeMap<String, CabinetNetwork> = cabinet_networks(class)
                .into_iter()
                .filter_map(|(key, network)| {
                    let subnet = networks.get(network)?.lookup_subnet(&subnet_name).ok()?;
                    Some((
                        key.to_string(),
                        CabinetNetwork {
                            cidr: subnet.cidr.to_string(),
                            gateway: subnet.gateway.to_string(),
                            vlan: subnet.vlan_id,
                        },
                    ))
                })
                .collect();

            let mut props = CabinetProperties {
                networks: BTreeMap::new(),
                model: cabinet.model.clone(),
            };
            if !cn.is_empty() {
                props.networks.insert(COMPUTE_NETWORKS.to_string(), cn);
            }
            hardware.push(GenericHardware::new(
                cabinet.xname(),
                class,
                Some(ExtraProperties::Cabinet(props)),
            )?);
        }
    }
    Ok(hardware)
}
