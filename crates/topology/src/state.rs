//! SLS state: the hardware inventory plus the carved networks

use std::collections::BTreeMap;

use ipam::Network;
use serde::{Deserialize, Serialize};
use sls::{GenericHardware, HardwareInventory};
use xname::XnameType;

use crate::error::TopologyError;

/// Everything SLS is loaded with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlsState {
    pub hardware: HardwareInventory,
    pub networks: BTreeMap<String, Network>,
}

impl SlsState {
    pub fn new(hardware: HardwareInventory, networks: BTreeMap<String, Network>) -> Self {
        Self { hardware, networks }
    }

    /// Add records; a record for an xname already present is an error.
    pub fn add_hardware<I: IntoIterator<Item = GenericHardware>>(&mut self, records: I) -> Result<(), TopologyError> {
        Ok(self.hardware.extend(records)?)
    }

    /// Cabinet xnames of the inventory in numeric order.
    pub fn cabinet_xnames(&self) -> Vec<String> {
        sorted_cabinet_xnames(self.hardware.iter().map(|hw| hw.xname.as_str()))
    }
}

/// The cabinet xnames among `xnames`, ordered numerically (`x10` before
/// `x100`), duplicates removed.
pub fn sorted_cabinet_xnames<'a>(xnames: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut cabinets: Vec<String> = xnames
        .into_iter()
        .filter(|xname| xname::get_type(xname) == XnameType::Cabinet)
        .map(str::to_string)
        .collect();
    xname::sort_xnames(&mut cabinets);
    cabinets.dedup();
    cabinets
}

#[cfg(test)]
mod tests {
    use super::*;
    use sls::HardwareClass;

    #[test]
    fn test_sorted_cabinet_xnames_is_numeric() {
        let xnames = ["x9000", "x111", "x3000", "x10", "x0", "x5001", "x110", "x100", "x3000c0s1b0n0", "x10"];
        assert_eq!(
            sorted_cabinet_xnames(xnames),
            vec!["x0", "x10", "x100", "x110", "x111", "x3000", "x5001", "x9000"]
        );
    }

    #[test]
    fn test_add_hardware_rejects_duplicates() {
        let mut state = SlsState::default();
        let cabinet = GenericHardware::new("x3000", HardwareClass::River, None).expect("valid cabinet");
        state.add_hardware([cabinet.clone()]).expect("first insert");
        assert!(state.add_hardware([cabinet]).is_err());
        assert_eq!(state.cabinet_xnames(), vec!["x3000"]);
    }

    #[test]
    fn test_serializes_hardware_and_networks() {
        let mut state = SlsState::default();
        state
            .add_hardware([GenericHardware::new("x1000", HardwareClass::Mountain, None).expect("valid cabinet")])
            .expect("insert");
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["Hardware"]["x1000"]["Class"], "Mountain");
        assert!(json["Networks"].as_object().is_some_and(serde_json::Map::is_empty));
    }
}
