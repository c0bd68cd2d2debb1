//! Cabinet model
//!
//! Cabinets are declared in groups of one kind (`river`, `hill`, `mountain`,
//! or an EX model). A group either lists its IDs explicitly or gives a
//! starting ID and a count; [`CabinetGroupDetail::populate_ids`] turns either
//! form into one [`CabinetDetail`] per cabinet.
//!
//! The cabinets file looks like:
//!
//! ```yaml
//! cabinets:
//!   - type: hill
//!     total_number: 1
//!     starting_id: 9000
//!   - type: mountain
//!     ids: [1000, 1001]
//!     cabinet-details:
//!       - id: 1001
//!         model: EX2500
//!         chassis-count:
//!           liquid-cooled: 1
//!           air-cooled: 1
//! ```

use std::collections::BTreeMap;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SlsError;
use crate::hardware::HardwareClass;

pub const KIND_RIVER: &str = "river";
pub const KIND_HILL: &str = "hill";
pub const KIND_MOUNTAIN: &str = "mountain";
pub const KIND_EX2000: &str = "EX2000";
pub const KIND_EX2500: &str = "EX2500";
pub const KIND_EX3000: &str = "EX3000";
pub const KIND_EX4000: &str = "EX4000";

/// Chassis population of a cabinet that mixes cooling types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChassisCount {
    /// Liquid-cooled chassis, numbered from `c0`
    #[serde(default)]
    pub liquid_cooled: u32,
    /// Air-cooled chassis
    #[serde(default)]
    pub air_cooled: u32,
}

/// One physical cabinet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CabinetDetail {
    /// Cabinet ordinal, `3000` for `x3000`
    pub id: u32,

    /// Hardware model (e.g. "EX2500")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Mixed-cooling chassis population
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis_count: Option<ChassisCount>,

    /// Pinned NMN subnet for this cabinet instead of the next free block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nmn_subnet: Option<Ipv4Network>,

    /// Pinned NMN VLAN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nmn_vlan: Option<u16>,

    /// Pinned HMN subnet for this cabinet instead of the next free block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmn_subnet: Option<Ipv4Network>,

    /// Pinned HMN VLAN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmn_vlan: Option<u16>,
}

impl CabinetDetail {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Cabinet xname, e.g. `x3000`.
    #[must_use]
    pub fn xname(&self) -> String {
        xname::Cabinet { cabinet: self.id }.to_string()
    }

    #[must_use]
    pub fn liquid_cooled_chassis(&self) -> Option<u32> {
        self.chassis_count.map(|c| c.liquid_cooled)
    }

    #[must_use]
    pub fn air_cooled_chassis(&self) -> u32 {
        self.chassis_count.map_or(0, |c| c.air_cooled)
    }
}

/// A group of cabinets of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetGroupDetail {
    /// Cabinet kind or model: river, hill, mountain, EX2500, ...
    #[serde(rename = "type")]
    pub kind: String,

    /// Number of cabinets in the group
    #[serde(rename = "total_number", default)]
    pub cabinets: usize,

    /// First cabinet ID when IDs are generated
    #[serde(rename = "starting_id", default)]
    pub starting_cabinet: u32,

    /// Explicit IDs; take precedence over `starting_id`/`total_number`
    #[serde(rename = "ids", default, skip_serializing_if = "Vec::is_empty")]
    pub cabinet_ids: Vec<u32>,

    /// Per-cabinet details, one per ID after [`Self::populate_ids`]
    #[serde(rename = "cabinet-details", default, skip_serializing_if = "Vec::is_empty")]
    pub cabinet_details: Vec<CabinetDetail>,
}

impl CabinetGroupDetail {
    #[must_use]
    pub fn new(kind: impl Into<String>, cabinets: usize, starting_cabinet: u32) -> Self {
        Self {
            kind: kind.into(),
            cabinets,
            starting_cabinet,
            ..Default::default()
        }
    }

    /// Fill `cabinet_details` with one entry per cabinet ID.
    ///
    /// Explicit `ids` win over `starting_id`/`total_number`. Details already
    /// present for an ID (model, chassis counts, network overrides) are kept;
    /// a detail whose ID is not among the derived IDs is appended with a
    /// warning, never dropped.
    pub fn populate_ids(&mut self) {
        let mut ids: Vec<u32> = if !self.cabinet_ids.is_empty() {
            if self.cabinets != 0 && self.cabinets != self.cabinet_ids.len() {
                warn!(
                    "{} cabinets: total_number {} ignored in favour of {} explicit ids",
                    self.kind,
                    self.cabinets,
                    self.cabinet_ids.len()
                );
            }
            self.cabinet_ids.clone()
        } else if self.cabinet_details.len() >= self.cabinets && !self.cabinet_details.is_empty() {
            self.cabinet_details.iter().map(|d| d.id).collect()
        } else {
            (self.starting_cabinet..)
                .take(self.cabinets)
                .collect()
        };

        for detail in &self.cabinet_details {
            if !ids.contains(&detail.id) {
                warn!(
                    "{} cabinets: detail for cabinet {} is outside the declared ids, adding it",
                    self.kind, detail.id
                );
                ids.push(detail.id);
            }
        }

        let mut existing: BTreeMap<u32, CabinetDetail> = self
            .cabinet_details
            .drain(..)
            .map(|d| (d.id, d))
            .collect();
        self.cabinet_details = ids
            .iter()
            .map(|id| existing.remove(id).unwrap_or_else(|| CabinetDetail::new(*id)))
            .collect();
        self.cabinet_ids = ids;
        self.cabinets = self.cabinet_details.len();
    }

    /// Cabinet IDs in declaration order.
    #[must_use]
    pub fn cabinet_ids(&self) -> Vec<u32> {
        self.cabinet_details.iter().map(|d| d.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cabinet_details.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cabinet_details.is_empty()
    }

    /// Hardware class of the cabinets in this group.
    #[must_use]
    pub fn class(&self) -> Option<HardwareClass> {
        match self.kind.to_ascii_lowercase().as_str() {
            "river" => Some(HardwareClass::River),
            "hill" | "ex2000" | "ex2500" => Some(HardwareClass::Hill),
            "mountain" | "ex3000" | "ex4000" => Some(HardwareClass::Mountain),
            _ => None,
        }
    }
}

/// Top-level cabinets file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetDetailFile {
    /// Cabinet groups in file order
    pub cabinets: Vec<CabinetGroupDetail>,
}

impl CabinetDetailFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn populate_ids(&mut self) {
        self.cabinets.iter_mut().for_each(CabinetGroupDetail::populate_ids);
    }

    /// Every group kind must be known and no cabinet ID may appear twice.
    pub fn validate(&self) -> Result<(), SlsError> {
        let mut seen: BTreeMap<u32, &str> = BTreeMap::new();
        for group in &self.cabinets {
            if group.class().is_none() {
                return Err(SlsError::UnknownCabinetKind(group.kind.clone()));
            }
            for id in group.cabinet_ids() {
                if let Some(first_kind) = seen.insert(id, &group.kind) {
                    return Err(SlsError::DuplicateCabinetId {
                        id,
                        first_kind: first_kind.to_string(),
                        second_kind: group.kind.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Groups of one hardware class.
    pub fn groups_of_class(&self, class: HardwareClass) -> impl Iterator<Item = &CabinetGroupDetail> {
        self.cabinets
            .iter()
            .filter(move |group| group.class() == Some(class))
    }
}

/// Predicate selecting cabinets, e.g. which cabinets get per-cabinet subnets.
pub type CabinetFilter = Box<dyn Fn(&CabinetGroupDetail, &CabinetDetail) -> bool>;

/// Accept cabinets whose group kind is exactly `kind` (case-sensitive).
#[must_use]
pub fn cabinet_kind_filter(kind: impl Into<String>) -> CabinetFilter {
    let kind = kind.into();
    Box::new(move |group, _| group.kind == kind)
}

/// Accept EX2500 cabinets that carry at least one air-cooled chassis.
#[must_use]
pub fn cabinet_ex2500_air_cooled_chassis_filter() -> CabinetFilter {
    Box::new(|_, cabinet| {
        cabinet.model.as_deref() == Some(KIND_EX2500) && cabinet.air_cooled_chassis() > 0
    })
}

/// Accept cabinets of a hardware class.
#[must_use]
pub fn cabinet_class_filter(class: HardwareClass) -> CabinetFilter {
    Box::new(move |group, _| group.class() == Some(class))
}

#[must_use]
pub fn cabinet_filter_or(a: CabinetFilter, b: CabinetFilter) -> CabinetFilter {
    Box::new(move |group, cabinet| a(group, cabinet) || b(group, cabinet))
}

#[must_use]
pub fn cabinet_filter_and(a: CabinetFilter, b: CabinetFilter) -> CabinetFilter {
    Box::new(move |group, cabinet| a(group, cabinet) && b(group, cabinet))
}

#[cfg(test)]
#[path = "cabinets_test.rs"]
mod cabinets_test;
