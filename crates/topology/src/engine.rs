//! Hardware synthesis
//!
//! [`TopologyEngine`] turns the site inputs into SLS hardware records:
//!
//! - river hardware from HMN connection rows (nodes, chassis controllers,
//!   router BMCs, PDU controllers and the switch ports they are cabled to)
//! - liquid-cooled hardware generated from the cabinet file, Hill cabinets
//!   first and Mountain cabinets after them
//! - management switches from the switch metadata
//!
//! One engine instance owns the NID counters for one generation run.

use std::collections::{BTreeMap, BTreeSet};

use sls::{
    ApplicationNodeConfig, CabinetGroupDetail, ExtraProperties, GenericHardware, HardwareClass,
    HardwareInventory, HmnRow, ManagementSwitch, ManagementSwitchBrand, MgmtSwitchConnectorProperties,
    MgmtSwitchProperties, NodeProperties, NodeRole, RouterBmcProperties, SnmpCredentials,
};
use tracing::{debug, info, warn};
use xname::{Chassis, XnameType};

use crate::classify::{
    classify_row, parse_location, parse_number, parse_rack, parse_sub_location, NodeClass, RowClass,
};
use crate::error::TopologyError;
use crate::nid::{NidAllocator, DEFAULT_MOUNTAIN_STARTING_NID, MANAGEMENT_STARTING_NID};

/// BMC ordinal of the chassis controller in a river enclosure.
pub const RIVER_CHASSIS_BMC: u32 = 999;

/// Nodes sharing one enclosure controller.
const NODES_PER_ENCLOSURE: u64 = 4;

const MOUNTAIN_CHASSIS: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const HILL_CHASSIS: [u32; 2] = [1, 3];
const SLOTS_PER_CHASSIS: u32 = 8;
const BMCS_PER_SLOT: u32 = 2;
const NODES_PER_BMC: u32 = 2;

/// Site inputs the engine reads.
#[derive(Debug, Clone, Copy)]
pub struct TopologyInputs<'a> {
    pub cabinets: &'a [CabinetGroupDetail],
    pub switches: &'a [ManagementSwitch],
    pub application_nodes: &'a ApplicationNodeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyOptions {
    /// First NID for Hill and Mountain compute nodes
    pub mountain_starting_nid: u64,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            mountain_starting_nid: DEFAULT_MOUNTAIN_STARTING_NID,
        }
    }
}

/// Vault path HMS reads a device's credentials from.
fn vault_ref(xname: &str) -> String {
    format!("vault://hms-creds/{xname}")
}

#[derive(Debug)]
pub struct TopologyEngine<'a> {
    inputs: TopologyInputs<'a>,
    switches: BTreeMap<String, &'a ManagementSwitch>,
    management_nids: NidAllocator,
    liquid_cooled_nids: NidAllocator,
}

impl<'a> TopologyEngine<'a> {
    pub fn new(inputs: TopologyInputs<'a>, options: TopologyOptions) -> Self {
        let switches = inputs
            .switches
            .iter()
            .map(|switch| (xname::normalize(&switch.xname), switch))
            .collect();
        Self {
            inputs,
            switches,
            management_nids: NidAllocator::starting_at(MANAGEMENT_STARTING_NID),
            liquid_cooled_nids: NidAllocator::starting_at(options.mountain_starting_nid),
        }
    }

    /// River, liquid-cooled and switch hardware in one inventory.
    pub fn build_inventory(&mut self, rows: &[HmnRow]) -> Result<HardwareInventory, TopologyError> {
        let mut inventory = HardwareInventory::new();
        inventory.extend(self.switch_hardware()?)?;
        inventory.extend(self.river_hardware(rows)?)?;
        inventory.extend(self.liquid_cooled_hardware()?)?;
        info!("Built hardware inventory with {} records", inventory.len());
        Ok(inventory)
    }

    /// Hardware described by the HMN connection rows.
    ///
    /// Door rows and rows with an unrecognized source are logged and dropped.
    pub fn river_hardware(&mut self, rows: &[HmnRow]) -> Result<Vec<GenericHardware>, TopologyError> {
        let parents = parent_locations(rows)?;
        let mut hardware = Vec::new();
        for row in rows {
            hardware.extend(self.row_hardware(row, &parents)?);
        }
        info!("Synthesized {} river hardware records from {} HMN rows", hardware.len(), rows.len());
        Ok(hardware)
    }

    fn row_hardware(
        &mut self,
        row: &HmnRow,
        parents: &BTreeMap<String, u32>,
    ) -> Result<Vec<GenericHardware>, TopologyError> {
        let class = classify_row(row, self.inputs.application_nodes)?;
        match class {
            RowClass::Door => {
                warn!("Skipping door hardware {} in {}: no xname mapping", row.source, row.source_rack);
                return Ok(Vec::new());
            }
            RowClass::MgmtSwitch => {
                debug!("Skipping management switch row {}", row.source);
                return Ok(Vec::new());
            }
            _ => {}
        }

        let cabinet = xname::Cabinet {
            cabinet: parse_rack("rack", &row.source_rack, row)?,
        };
        let chassis = cabinet.chassis(0);
        let is_parent = parents.contains_key(&row.source.trim().to_lowercase());

        let device = match class {
            RowClass::RouterBmc(location) => {
                let xname = chassis
                    .router_module(location.u_number)
                    .router_bmc(location.side.bmc_ordinal())
                    .to_string();
                let props = RouterBmcProperties {
                    username: vault_ref(&xname),
                    password: vault_ref(&xname),
                };
                GenericHardware::new(xname, HardwareClass::River, Some(ExtraProperties::RouterBmc(props)))?
            }
            RowClass::Pdu { controller } => {
                GenericHardware::new(cabinet.pdu_controller(controller).to_string(), HardwareClass::River, None)?
            }
            RowClass::Node(NodeClass::System) => river_chassis_bmc(row, chassis)?,
            RowClass::Node(_) if is_parent => river_chassis_bmc(row, chassis)?,
            RowClass::Node(node) => match self.river_node(row, node, chassis, parents)? {
                Some(node) => node,
                None => return Ok(Vec::new()),
            },
            RowClass::Door | RowClass::MgmtSwitch => return Ok(Vec::new()),
        };

        // Nodes are cabled through their BMC.
        let connector = if row.has_destination_port() {
            let nic = if device.type_string == XnameType::Node {
                device.parent.clone()
            } else {
                device.xname.clone()
            };
            Some(self.connector(row, nic)?)
        } else {
            None
        };
        let mut hardware = vec![device];
        hardware.extend(connector);
        Ok(hardware)
    }

    fn river_node(
        &mut self,
        row: &HmnRow,
        node: NodeClass,
        chassis: Chassis,
        parents: &BTreeMap<String, u32>,
    ) -> Result<Option<GenericHardware>, TopologyError> {
        let (role, sub_role, nid, mut aliases) = match node {
            NodeClass::Management { role, number } => (
                NodeRole::Management,
                Some(role.sub_role().to_string()),
                Some(self.management_nids.allocate()),
                vec![role.alias(number)],
            ),
            NodeClass::Compute { nid } => (NodeRole::Compute, None, Some(nid), vec![format!("nid{nid:06}")]),
            NodeClass::Application { sub_role } => (NodeRole::Application, sub_role, None, Vec::new()),
            NodeClass::System | NodeClass::Unknown => {
                warn!("Unrecognized HMN source {} in {}, skipping row", row.source, row.source_rack);
                return Ok(None);
            }
        };

        let enclosure = row
            .has_parent()
            .then(|| parents.get(&row.source_parent.trim().to_lowercase()))
            .flatten();
        let (u_number, bmc) = match enclosure {
            Some(&u_number) => (u_number, enclosure_bmc(row, nid)?),
            None => {
                let location = parse_location(row)?;
                (location.u_number, location.side.bmc_ordinal())
            }
        };

        let xname = chassis.compute_module(u_number).node_bmc(bmc).node(0).to_string();
        for alias in self.inputs.application_nodes.aliases_for(&xname) {
            if !aliases.contains(alias) {
                aliases.push(alias.clone());
            }
        }
        let props = NodeProperties {
            nid,
            role,
            sub_role,
            aliases,
        };
        debug!("HMN row {} -> {} ({:?})", row.source, xname, role);
        Ok(Some(GenericHardware::new(
            xname,
            HardwareClass::River,
            Some(ExtraProperties::Node(props)),
        )?))
    }

    /// Switch port record for a row with a `DestinationPort`.
    fn connector(&self, row: &HmnRow, nic: String) -> Result<GenericHardware, TopologyError> {
        let rack = parse_rack("destination rack", &row.destination_rack, row)?;
        let slot = parse_number("destination location", &row.destination_location, row)?;
        let port = parse_number("destination port", &row.destination_port, row)?;
        let mgmt_switch = xname::Cabinet { cabinet: rack }.chassis(0).mgmt_switch(slot);
        let switch_xname = mgmt_switch.to_string();

        let switch = self
            .switches
            .get(&switch_xname)
            .ok_or_else(|| TopologyError::MissingSwitch {
                switch: switch_xname.clone(),
                row: row.source.clone(),
            })?;
        let vendor_name = match switch.brand {
            ManagementSwitchBrand::Dell => format!("ethernet1/1/{port}"),
            ManagementSwitchBrand::Aruba => format!("1/1/{port}"),
            brand @ ManagementSwitchBrand::Mellanox => {
                return Err(TopologyError::UnsupportedSwitchBrand {
                    brand,
                    switch: switch_xname,
                    row: row.source.clone(),
                });
            }
        };

        let props = MgmtSwitchConnectorProperties {
            node_nics: vec![nic],
            vendor_name,
        };
        Ok(GenericHardware::new(
            mgmt_switch.connector(port).to_string(),
            HardwareClass::River,
            Some(ExtraProperties::MgmtSwitchConnector(props)),
        )?)
    }

    /// Chassis, chassis controllers and compute nodes of every Hill and
    /// Mountain cabinet.
    ///
    /// All Hill cabinets are numbered before any Mountain cabinet, so the
    /// Mountain NIDs continue where the Hill NIDs stop.
    pub fn liquid_cooled_hardware(&mut self) -> Result<Vec<GenericHardware>, TopologyError> {
        let mut hardware = Vec::new();
        for class in [HardwareClass::Hill, HardwareClass::Mountain] {
            let cabinets = self.inputs.cabinets;
            for group in cabinets.iter().filter(|g| g.class() == Some(class)) {
                for cabinet in &group.cabinet_details {
                    let chassis_list = match (cabinet.liquid_cooled_chassis(), class) {
                        (Some(count), _) => (0..count).collect(),
                        (None, HardwareClass::Hill) => HILL_CHASSIS.to_vec(),
                        (None, _) => MOUNTAIN_CHASSIS.to_vec(),
                    };
                    let cabinet = xname::Cabinet { cabinet: cabinet.id };
                    for chassis in chassis_list {
                        self.liquid_cooled_chassis(cabinet.chassis(chassis), class, &mut hardware)?;
                    }
                }
            }
        }
        info!(
            "Synthesized {} liquid-cooled hardware records, next NID {}",
            hardware.len(),
            self.liquid_cooled_nids.peek()
        );
        Ok(hardware)
    }

    fn liquid_cooled_chassis(
        &mut self,
        chassis: Chassis,
        class: HardwareClass,
        hardware: &mut Vec<GenericHardware>,
    ) -> Result<(), TopologyError> {
        hardware.push(GenericHardware::new(chassis.to_string(), class, None)?);
        hardware.push(GenericHardware::new(chassis.chassis_bmc(0).to_string(), class, None)?);
        for slot in 0..SLOTS_PER_CHASSIS {
            let module = chassis.compute_module(slot);
            for bmc in 0..BMCS_PER_SLOT {
                let node_bmc = module.node_bmc(bmc);
                for node in 0..NODES_PER_BMC {
                    let nid = self.liquid_cooled_nids.allocate();
                    let props = NodeProperties {
                        nid: Some(nid),
                        role: NodeRole::Compute,
                        sub_role: None,
                        aliases: vec![format!("nid{nid:06}")],
                    };
                    hardware.push(GenericHardware::new(
                        node_bmc.node(node).to_string(),
                        class,
                        Some(ExtraProperties::Node(props)),
                    )?);
                }
            }
        }
        Ok(())
    }

    /// One record per management switch in the switch metadata.
    ///
    /// Leaf-BMC switches carry SNMP credential references so HSM can poll
    /// them. Every rack-mounted switch must sit in a declared cabinet.
    pub fn switch_hardware(&self) -> Result<Vec<GenericHardware>, TopologyError> {
        let cabinets: BTreeSet<u32> = self
            .inputs
            .cabinets
            .iter()
            .flat_map(CabinetGroupDetail::cabinet_ids)
            .collect();

        let mut hardware = Vec::with_capacity(self.inputs.switches.len());
        for switch in self.inputs.switches {
            switch.validate()?;
            let xname = xname::normalize(&switch.xname);
            let class = if xname::get_type(&xname) == XnameType::CDUMgmtSwitch {
                HardwareClass::Mountain
            } else {
                let cabinet = xname::ordinals(&xname)?.first().copied().unwrap_or_default();
                if !cabinets.contains(&cabinet) {
                    return Err(TopologyError::MissingCabinet {
                        switch: xname,
                        cabinet: xname::Cabinet { cabinet }.to_string(),
                    });
                }
                HardwareClass::River
            };

            let snmp = (switch.switch_type == sls::ManagementSwitchType::LeafBMC).then(|| SnmpCredentials {
                username: vault_ref(&xname),
                auth_password: vault_ref(&xname),
                auth_protocol: "MD5".to_string(),
                priv_password: vault_ref(&xname),
                priv_protocol: "DES".to_string(),
            });
            let props = MgmtSwitchProperties {
                ip4_addr: switch.management_interface.map(|ip| ip.to_string()),
                brand: switch.brand.to_string(),
                model: (!switch.model.is_empty()).then(|| switch.model.clone()),
                snmp,
                aliases: if switch.alias.is_empty() {
                    Vec::new()
                } else {
                    vec![switch.alias.clone()]
                },
            };
            hardware.push(GenericHardware::new(xname, class, Some(ExtraProperties::MgmtSwitch(props)))?);
        }
        Ok(hardware)
    }
}

/// Chassis controller of a river enclosure, `{rack}c0s{U}b999`.
fn river_chassis_bmc(row: &HmnRow, chassis: Chassis) -> Result<GenericHardware, TopologyError> {
    let location = parse_location(row)?;
    let xname = chassis
        .compute_module(location.u_number)
        .node_bmc(RIVER_CHASSIS_BMC)
        .to_string();
    Ok(GenericHardware::new_as(xname, XnameType::ChassisBMC, HardwareClass::River, None)?)
}

/// BMC ordinal of a node inside a four-node enclosure, from its NID.
fn enclosure_bmc(row: &HmnRow, nid: Option<u64>) -> Result<u32, TopologyError> {
    let Some(nid) = nid else {
        return Ok(parse_sub_location(row).bmc_ordinal());
    };
    let ordinal = nid
        .checked_sub(1)
        .map(|n| n % NODES_PER_ENCLOSURE + 1)
        .and_then(|ordinal| u32::try_from(ordinal).ok())
        .ok_or_else(|| TopologyError::InvalidNid {
            nid,
            row: row.source.clone(),
        })?;
    Ok(ordinal)
}

/// U-number of every row another row names as its `SourceParent`, keyed by
/// lower-cased source name.
fn parent_locations(rows: &[HmnRow]) -> Result<BTreeMap<String, u32>, TopologyError> {
    let by_source: BTreeMap<String, &HmnRow> = rows
        .iter()
        .map(|row| (row.source.trim().to_lowercase(), row))
        .collect();

    let mut parents = BTreeMap::new();
    for row in rows.iter().filter(|row| row.has_parent()) {
        let name = row.source_parent.trim().to_lowercase();
        if parents.contains_key(&name) {
            continue;
        }
        let parent = by_source.get(&name).ok_or_else(|| TopologyError::MissingParent {
            parent: row.source_parent.trim().to_string(),
            row: row.source.clone(),
        })?;
        parents.insert(name, parse_location(parent)?.u_number);
    }
    Ok(parents)
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
