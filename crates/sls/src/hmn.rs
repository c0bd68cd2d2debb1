//! HMN connection rows
//!
//! One row of the hardware-management-network cabling sheet. Fields are free
//! text exactly as exported; interpreting them is left to the topology engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HmnRow {
    pub source: String,
    pub source_rack: String,
    pub source_location: String,
    pub source_sub_location: String,
    pub source_parent: String,
    pub destination_rack: String,
    pub destination_location: String,
    pub destination_port: String,
}

impl HmnRow {
    pub fn has_parent(&self) -> bool {
        !self.source_parent.trim().is_empty()
    }

    pub fn has_destination_port(&self) -> bool {
        !self.destination_port.trim().is_empty()
    }
}
