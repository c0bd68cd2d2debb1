//! HMN row classification
//!
//! Every row of the HMN connections sheet is sorted into a [`RowClass`] by
//! looking at its lower-cased `Source` column. Device rules are tried in
//! table order and the first match wins; rows no rule claims are nodes and
//! are sub-classified by hostname prefix.
//!
//! Classification is pure. NID counters, parent lookups and xname synthesis
//! live in [`crate::engine`].

use std::sync::LazyLock;

use regex::Regex;
use sls::hardware::subrole;
use sls::{ApplicationNodeConfig, HmnRow};

use crate::error::TopologyError;

/// `u19`, `U17L`, `19R`: letters, the U-number, then an optional side.
#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z]*(\d+)([a-zA-Z]*)").expect("location pattern is a valid regex")
});

#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("trailing digit pattern is a valid regex"));

#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static PDU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(x\d+p|pdu)(\d+)").expect("pdu pattern is a valid regex"));

#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static MANAGEMENT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(mn|wn|sn)(\d+)").expect("management node pattern is a valid regex")
});

#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static COMPUTE_NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(nid|cn-?)\d+").expect("compute node pattern is a valid regex"));

/// Management switches come from switch metadata, never from HMN rows.
const MGMT_SWITCH_PREFIXES: [&str; 6] = ["sw-leaf", "sw-25g", "sw-40g", "sw-leaf-bmc", "sw-agg", "sw-smn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceRule {
    RouterBmc,
    Pdu,
    Door,
    MgmtSwitch,
}

fn is_router_bmc(source: &str) -> bool {
    source == "columbia" || source.starts_with("sw-hsn")
}

fn is_pdu(source: &str) -> bool {
    PDU.is_match(source)
}

fn is_door(source: &str) -> bool {
    source.contains("door")
}

fn is_mgmt_switch(source: &str) -> bool {
    MGMT_SWITCH_PREFIXES.iter().any(|prefix| source.starts_with(prefix))
}

/// Device rules in precedence order.
const DEVICE_RULES: [(DeviceRule, fn(&str) -> bool); 4] = [
    (DeviceRule::RouterBmc, is_router_bmc),
    (DeviceRule::Pdu, is_pdu),
    (DeviceRule::Door, is_door),
    (DeviceRule::MgmtSwitch, is_mgmt_switch),
];

/// Left/right half of a shared enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Unspecified,
}

impl Side {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Side::Left,
            "r" | "right" => Side::Right,
            _ => Side::Unspecified,
        }
    }

    /// BMC ordinal of the side: left 1, right 2, otherwise 0.
    pub fn bmc_ordinal(self) -> u32 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
            Side::Unspecified => 0,
        }
    }
}

/// Rack position parsed from `SourceLocation`/`SourceSubLocation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub u_number: u32,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementRole {
    Master,
    Worker,
    Storage,
}

impl ManagementRole {
    pub fn sub_role(self) -> &'static str {
        match self {
            ManagementRole::Master => subrole::MASTER,
            ManagementRole::Worker => subrole::WORKER,
            ManagementRole::Storage => subrole::STORAGE,
        }
    }

    /// Hostname, e.g. `ncn-w002`.
    pub fn alias(self, number: u32) -> String {
        let letter = match self {
            ManagementRole::Master => 'm',
            ManagementRole::Worker => 'w',
            ManagementRole::Storage => 's',
        };
        format!("ncn-{letter}{number:03}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeClass {
    /// `mnNN`, `wnNN`, `snNN`; NIDs are handed out by the engine
    Management { role: ManagementRole, number: u32 },
    /// `nidNNNNNN` or `cn-NN`, NID from the trailing digits
    Compute { nid: u64 },
    Application { sub_role: Option<String> },
    /// Chassis management controller
    System,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowClass {
    RouterBmc(Location),
    Pdu { controller: u32 },
    /// Cooling door; there is no xname for it
    Door,
    MgmtSwitch,
    Node(NodeClass),
}

fn malformed(field: &'static str, value: &str, row: &HmnRow) -> TopologyError {
    TopologyError::MalformedField {
        field,
        value: value.to_string(),
        row: row.source.clone(),
    }
}

/// Parse the U-number and side of a row.
///
/// The side comes from `SourceSubLocation` when it names one, otherwise from
/// a trailing `L`/`R` on the location.
pub fn parse_location(row: &HmnRow) -> Result<Location, TopologyError> {
    let location = row.source_location.trim();
    let caps = LOCATION
        .captures(location)
        .ok_or_else(|| malformed("location", location, row))?;
    let u_number = caps[1]
        .parse()
        .map_err(|_| malformed("location", location, row))?;
    let side = match Side::parse(&row.source_sub_location) {
        Side::Unspecified => Side::parse(&caps[2]),
        side => side,
    };
    Ok(Location { u_number, side })
}

/// Side named by `SourceSubLocation` alone.
pub fn parse_sub_location(row: &HmnRow) -> Side {
    Side::parse(&row.source_sub_location)
}

/// Number embedded in a port or location column, e.g. `37` from `j37`.
pub fn parse_number(field: &'static str, value: &str, row: &HmnRow) -> Result<u32, TopologyError> {
    let value = value.trim();
    LOCATION
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| malformed(field, value, row))
}

/// Cabinet ordinal of a rack column, e.g. `3000` from `x3000`.
pub fn parse_rack(field: &'static str, value: &str, row: &HmnRow) -> Result<u32, TopologyError> {
    let rack = xname::normalize(&value.trim().to_lowercase());
    match xname::ordinals_of_type(&rack, xname::XnameType::Cabinet)?.as_slice() {
        [cabinet] => Ok(*cabinet),
        _ => Err(malformed(field, value, row)),
    }
}

/// Classify one HMN row.
///
/// Fails only when a numeric field the matching rule needs is malformed.
pub fn classify_row(row: &HmnRow, config: &ApplicationNodeConfig) -> Result<RowClass, TopologyError> {
    let source = row.source.trim().to_lowercase();
    let rule = DEVICE_RULES
        .iter()
        .find(|(_, matches)| matches(&source))
        .map(|(rule, _)| *rule);

    match rule {
        Some(DeviceRule::RouterBmc) => Ok(RowClass::RouterBmc(parse_location(row)?)),
        Some(DeviceRule::Pdu) => {
            let controller = PDU
                .captures(&source)
                .and_then(|caps| caps[2].parse().ok())
                .ok_or_else(|| malformed("PDU number", &row.source, row))?;
            Ok(RowClass::Pdu { controller })
        }
        Some(DeviceRule::Door) => Ok(RowClass::Door),
        Some(DeviceRule::MgmtSwitch) => Ok(RowClass::MgmtSwitch),
        None => classify_node(&source, row, config).map(RowClass::Node),
    }
}

fn classify_node(source: &str, row: &HmnRow, config: &ApplicationNodeConfig) -> Result<NodeClass, TopologyError> {
    if let Some(caps) = MANAGEMENT_NODE.captures(source) {
        let role = match &caps[1] {
            "mn" => ManagementRole::Master,
            "wn" => ManagementRole::Worker,
            _ => ManagementRole::Storage,
        };
        let number = caps[2]
            .parse()
            .map_err(|_| malformed("management node number", &row.source, row))?;
        return Ok(NodeClass::Management { role, number });
    }

    if COMPUTE_NODE.is_match(source) {
        let nid = TRAILING_DIGITS
            .captures(source)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| malformed("NID", &row.source, row))?;
        return Ok(NodeClass::Compute { nid });
    }

    if let Some(prefix) = config.match_prefix(source) {
        let sub_role = config.subrole_for_prefix(prefix).map(str::to_string);
        return Ok(NodeClass::Application { sub_role });
    }

    if source.contains("cmc") {
        return Ok(NodeClass::System);
    }

    Ok(NodeClass::Unknown)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
