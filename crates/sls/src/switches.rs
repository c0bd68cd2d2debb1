//! Management switch metadata
//!
//! Management switches come exclusively from the switch metadata file, never
//! from the HMN connections file. Each switch carries its xname, role, brand
//! and model, plus an optional management address.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xname::XnameType;

use crate::error::SlsError;

/// Role of a management switch in the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms, reason = "matches the switch metadata vocabulary")]
pub enum ManagementSwitchType {
    CDU,
    Leaf,
    Spine,
    Aggregation,
    LeafBMC,
}

impl ManagementSwitchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CDU => "CDU",
            Self::Leaf => "Leaf",
            Self::Spine => "Spine",
            Self::Aggregation => "Aggregation",
            Self::LeafBMC => "LeafBMC",
        }
    }

    /// Alias prefix used for the generated `sw-<kind>-NNN` names.
    pub fn alias_prefix(&self) -> &'static str {
        match self {
            Self::CDU => "sw-cdu",
            Self::Leaf => "sw-leaf",
            Self::Spine => "sw-spine",
            Self::Aggregation => "sw-agg",
            Self::LeafBMC => "sw-leaf-bmc",
        }
    }

    /// Xname types a switch of this role may use.
    pub fn allowed_xname_types(&self) -> &'static [XnameType] {
        match self {
            Self::LeafBMC => &[XnameType::MgmtSwitch],
            Self::Leaf | Self::Spine | Self::Aggregation => &[XnameType::MgmtHLSwitch],
            Self::CDU => &[XnameType::CDUMgmtSwitch, XnameType::MgmtHLSwitch],
        }
    }
}

impl fmt::Display for ManagementSwitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagementSwitchType {
    type Err = SlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdu" => Ok(Self::CDU),
            "leaf" => Ok(Self::Leaf),
            "spine" => Ok(Self::Spine),
            "aggregation" => Ok(Self::Aggregation),
            "leafbmc" => Ok(Self::LeafBMC),
            _ => Err(SlsError::UnknownSwitchType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementSwitchBrand {
    Aruba,
    Dell,
    Mellanox,
}

impl ManagementSwitchBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aruba => "Aruba",
            Self::Dell => "Dell",
            Self::Mellanox => "Mellanox",
        }
    }
}

impl fmt::Display for ManagementSwitchBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagementSwitchBrand {
    type Err = SlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aruba" => Ok(Self::Aruba),
            "dell" => Ok(Self::Dell),
            "mellanox" => Ok(Self::Mellanox),
            _ => Err(SlsError::UnknownSwitchBrand(s.to_string())),
        }
    }
}

/// One management switch from the switch metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementSwitch {
    pub xname: String,
    #[serde(default)]
    pub alias: String,
    pub switch_type: ManagementSwitchType,
    pub brand: ManagementSwitchBrand,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_interface: Option<Ipv4Addr>,
}

impl ManagementSwitch {
    pub fn new(
        xname: impl Into<String>,
        switch_type: ManagementSwitchType,
        brand: ManagementSwitchBrand,
        model: impl Into<String>,
    ) -> Self {
        Self {
            xname: xname.into(),
            alias: String::new(),
            switch_type,
            brand,
            model: model.into(),
            management_interface: None,
        }
    }

    /// Check the xname grammar matches the switch role.
    ///
    /// A Spine at `x3000c0w22` is rejected; the same switch at `x3000c0h22s1`
    /// passes.
    pub fn validate(&self) -> Result<(), SlsError> {
        let actual = xname::get_type(&self.xname);
        let allowed = self.switch_type.allowed_xname_types();
        if allowed.contains(&actual) {
            return Ok(());
        }
        Err(SlsError::SwitchXnameMismatch {
            xname: self.xname.clone(),
            switch_type: self.switch_type,
            actual,
            expected: allowed
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(" or "),
        })
    }
}

/// Give every switch its `sw-<kind>-NNN` alias, numbered per role in input
/// order starting at 001.
pub fn assign_switch_aliases(switches: &mut [ManagementSwitch]) {
    let mut counters = std::collections::BTreeMap::<ManagementSwitchType, u32>::new();
    for switch in switches.iter_mut() {
        let n = counters.entry(switch.switch_type).or_insert(0);
        *n += 1;
        switch.alias = format!("{}-{:03}", switch.switch_type.alias_prefix(), n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch(xname: &str, switch_type: ManagementSwitchType) -> ManagementSwitch {
        ManagementSwitch::new(xname, switch_type, ManagementSwitchBrand::Aruba, "8325")
    }

    #[test]
    fn test_spine_requires_hl_switch_xname() {
        let err = switch("x3000c0w22", ManagementSwitchType::Spine)
            .validate()
            .expect_err("spine with MgmtSwitch xname");
        assert_eq!(
            err.to_string(),
            "Switch x3000c0w22 of type Spine has xname type MgmtSwitch, expected MgmtHLSwitch"
        );
        switch("x3000c0h22s1", ManagementSwitchType::Spine)
            .validate()
            .expect("spine with MgmtHLSwitch xname");
    }

    #[test]
    fn test_role_xname_rules() {
        assert!(switch("x3000c0w14", ManagementSwitchType::LeafBMC).validate().is_ok());
        assert!(switch("x3000c0h14s1", ManagementSwitchType::LeafBMC).validate().is_err());
        assert!(switch("x3000c0h12s1", ManagementSwitchType::Leaf).validate().is_ok());
        assert!(switch("x3000c0h13s1", ManagementSwitchType::Aggregation).validate().is_ok());
        assert!(switch("d0w1", ManagementSwitchType::CDU).validate().is_ok());
        assert!(switch("x3000c0h20s1", ManagementSwitchType::CDU).validate().is_ok());
        assert!(switch("x3000c0w20", ManagementSwitchType::CDU).validate().is_err());
        assert!(switch("not-an-xname", ManagementSwitchType::Leaf).validate().is_err());
    }

    #[test]
    fn test_assign_aliases_per_role() {
        let mut switches = vec![
            switch("x3000c0h33s1", ManagementSwitchType::Spine),
            switch("x3000c0w14", ManagementSwitchType::LeafBMC),
            switch("x3000c0h34s1", ManagementSwitchType::Spine),
            switch("d0w1", ManagementSwitchType::CDU),
            switch("x3000c0h12s1", ManagementSwitchType::Leaf),
        ];
        assign_switch_aliases(&mut switches);
        let aliases: Vec<&str> = switches.iter().map(|s| s.alias.as_str()).collect();
        assert_eq!(
            aliases,
            vec!["sw-spine-001", "sw-leaf-bmc-001", "sw-spine-002", "sw-cdu-001", "sw-leaf-001"]
        );
    }

    #[test]
    fn test_parse_type_and_brand() {
        assert_eq!("LeafBMC".parse::<ManagementSwitchType>().ok(), Some(ManagementSwitchType::LeafBMC));
        assert_eq!(" spine ".parse::<ManagementSwitchType>().ok(), Some(ManagementSwitchType::Spine));
        assert!("Core".parse::<ManagementSwitchType>().is_err());
        assert_eq!("dell".parse::<ManagementSwitchBrand>().ok(), Some(ManagementSwitchBrand::Dell));
        assert!("Cisco".parse::<ManagementSwitchBrand>().is_err());
    }
}
