//! SLS hardware records
//!
//! These models match the SLS `GenericHardware` JSON: `Parent`, `Xname`,
//! `Type`, `Class`, `TypeString` and a type-specific `ExtraProperties`
//! payload. Records are created once per device and never mutated after
//! they are inserted into a [`HardwareInventory`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xname::XnameType;

use crate::error::SlsError;

/// Cooling/packaging class of a piece of hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HardwareClass {
    River,
    Hill,
    Mountain,
}

impl std::fmt::Display for HardwareClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HardwareClass::River => "River",
            HardwareClass::Hill => "Hill",
            HardwareClass::Mountain => "Mountain",
        };
        f.write_str(s)
    }
}

/// Legacy SLS `Type` tag (`comptype_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareType {
    #[serde(rename = "comptype_cabinet")]
    Cabinet,
    #[serde(rename = "comptype_cab_pdu_controller")]
    CabinetPduController,
    #[serde(rename = "comptype_chassis")]
    Chassis,
    #[serde(rename = "comptype_chassis_bmc")]
    ChassisBmc,
    #[serde(rename = "comptype_compmod")]
    ComputeModule,
    #[serde(rename = "comptype_ncard")]
    NodeBmc,
    #[serde(rename = "comptype_node")]
    Node,
    #[serde(rename = "comptype_rtrmod")]
    RouterModule,
    #[serde(rename = "comptype_rtr_bmc")]
    RouterBmc,
    #[serde(rename = "comptype_mgmt_switch")]
    MgmtSwitch,
    #[serde(rename = "comptype_mgmt_switch_connector")]
    MgmtSwitchConnector,
    #[serde(rename = "comptype_hl_switch")]
    MgmtHlSwitch,
    #[serde(rename = "comptype_cdu")]
    Cdu,
    #[serde(rename = "comptype_cdu_mgmt_switch")]
    CduMgmtSwitch,
}

impl HardwareType {
    /// The legacy tag for an xname type, if SLS tracks that type.
    #[must_use]
    pub fn for_xname_type(kind: XnameType) -> Option<Self> {
        let t = match kind {
            XnameType::Cabinet => HardwareType::Cabinet,
            XnameType::CabinetPDUController => HardwareType::CabinetPduController,
            XnameType::Chassis => HardwareType::Chassis,
            XnameType::ChassisBMC => HardwareType::ChassisBmc,
            XnameType::ComputeModule => HardwareType::ComputeModule,
            XnameType::NodeBMC => HardwareType::NodeBmc,
            XnameType::Node => HardwareType::Node,
            XnameType::RouterModule => HardwareType::RouterModule,
            XnameType::RouterBMC => HardwareType::RouterBmc,
            XnameType::MgmtSwitch => HardwareType::MgmtSwitch,
            XnameType::MgmtSwitchConnector => HardwareType::MgmtSwitchConnector,
            XnameType::MgmtHLSwitch => HardwareType::MgmtHlSwitch,
            XnameType::CDU => HardwareType::Cdu,
            XnameType::CDUMgmtSwitch => HardwareType::CduMgmtSwitch,
            _ => return None,
        };
        Some(t)
    }
}

/// Node role as recorded in HSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Management,
    Compute,
    Application,
    System,
}

/// Management node subroles.
pub mod subrole {
    pub const MASTER: &str = "Master";
    pub const WORKER: &str = "Worker";
    pub const STORAGE: &str = "Storage";
}

/// `ExtraProperties` of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeProperties {
    #[serde(rename = "NID", default, skip_serializing_if = "Option::is_none")]
    pub nid: Option<u64>,
    pub role: NodeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// `ExtraProperties` of a management switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MgmtSwitchConnectorProperties {
    pub node_nics: Vec<String>,
    pub vendor_name: String,
}

/// SNMP credentials for switches that HSM polls for MAC addresses.
///
/// Secrets are vault references, never literal passwords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpCredentials {
    #[serde(rename = "SNMPUsername")]
    pub username: String,
    #[serde(rename = "SNMPAuthPassword")]
    pub auth_password: String,
    #[serde(rename = "SNMPAuthProtocol")]
    pub auth_protocol: String,
    #[serde(rename = "SNMPPrivPassword")]
    pub priv_password: String,
    #[serde(rename = "SNMPPrivProtocol")]
    pub priv_protocol: String,
}

/// `ExtraProperties` of a management switch (leaf-bmc, high-level or CDU).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MgmtSwitchProperties {
    #[serde(rename = "IP4addr", default, skip_serializing_if = "Option::is_none")]
    pub ip4_addr: Option<String>,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub snmp: Option<SnmpCredentials>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// `ExtraProperties` of a router BMC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouterBmcProperties {
    pub username: String,
    pub password: String,
}

/// One network a cabinet's hardware lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetNetwork {
    #[serde(rename = "CIDR")]
    pub cidr: String,
    #[serde(rename = "Gateway")]
    pub gateway: String,
    #[serde(rename = "VLan")]
    pub vlan: u16,
}

/// `ExtraProperties` of a cabinet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CabinetProperties {
    /// Keyed by network family (`cn`), then network name (`HMN`, `NMN`)
    pub networks: BTreeMap<String, BTreeMap<String, CabinetNetwork>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Type-specific payload.
///
/// Each variant has at least one required field no other variant has, so
/// untagged deserialization picks the right one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraProperties {
    Node(NodeProperties),
    MgmtSwitchConnector(MgmtSwitchConnectorProperties),
    MgmtSwitch(MgmtSwitchProperties),
    RouterBmc(RouterBmcProperties),
    Cabinet(CabinetProperties),
}

/// One SLS hardware record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenericHardware {
    pub parent: String,
    pub xname: String,
    #[serde(rename = "Type")]
    pub hardware_type: HardwareType,
    pub class: HardwareClass,
    pub type_string: XnameType,
    #[serde(rename = "ExtraProperties", default, skip_serializing_if = "Option::is_none")]
    pub extra_properties: Option<ExtraProperties>,
}

impl GenericHardware {
    /// Build a record whose parent and types are derived from the xname.
    pub fn new(
        xname: impl Into<String>,
        class: HardwareClass,
        extra_properties: Option<ExtraProperties>,
    ) -> Result<Self, SlsError> {
        let xname = xname.into();
        let kind = xname::get_type(&xname);
        Self::new_as(xname, kind, class, extra_properties)
    }

    /// Build a record recorded as `kind` regardless of its xname grammar.
    ///
    /// River chassis controllers live at `xXcCsSb999` (node BMC grammar) but
    /// are recorded as `ChassisBMC`.
    pub fn new_as(
        xname: impl Into<String>,
        kind: XnameType,
        class: HardwareClass,
        extra_properties: Option<ExtraProperties>,
    ) -> Result<Self, SlsError> {
        let xname = xname.into();
        let parent = xname::parent(&xname)?;
        let hardware_type = HardwareType::for_xname_type(kind).ok_or_else(|| {
            SlsError::UnsupportedHardwareType {
                xname: xname.clone(),
                kind,
            }
        })?;
        Ok(Self {
            parent,
            xname,
            hardware_type,
            class,
            type_string: kind,
            extra_properties,
        })
    }

    /// Node payload, if this record is a node.
    #[must_use]
    pub fn node_properties(&self) -> Option<&NodeProperties> {
        match &self.extra_properties {
            Some(ExtraProperties::Node(props)) => Some(props),
            _ => None,
        }
    }
}

/// All hardware records, keyed by xname.
///
/// Insertion refuses a second record for an xname already present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareInventory {
    entries: BTreeMap<String, GenericHardware>,
}

impl HardwareInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; fails if its xname is already present.
    pub fn insert(&mut self, hardware: GenericHardware) -> Result<(), SlsError> {
        if self.entries.contains_key(&hardware.xname) {
            return Err(SlsError::DuplicateXname(hardware.xname));
        }
        self.entries.insert(hardware.xname.clone(), hardware);
        Ok(())
    }

    /// Insert every record of `other`, failing on the first duplicate.
    pub fn extend<I: IntoIterator<Item = GenericHardware>>(&mut self, other: I) -> Result<(), SlsError> {
        other.into_iter().try_for_each(|hw| self.insert(hw))
    }

    #[must_use]
    pub fn get(&self, xname: &str) -> Option<&GenericHardware> {
        self.entries.get(xname)
    }

    #[must_use]
    pub fn contains(&self, xname: &str) -> bool {
        self.entries.contains_key(xname)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in xname string order.
    pub fn iter(&self) -> impl Iterator<Item = &GenericHardware> {
        self.entries.values()
    }

    /// Records of one SLS type.
    pub fn of_type(&self, hardware_type: HardwareType) -> impl Iterator<Item = &GenericHardware> {
        self.entries
            .values()
            .filter(move |hw| hw.hardware_type == hardware_type)
    }
}

impl IntoIterator for HardwareInventory {
    type Item = GenericHardware;
    type IntoIter = std::collections::btree_map::IntoValues<String, GenericHardware>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
