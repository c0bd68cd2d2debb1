//! Topology engine errors

use sls::{ManagementSwitchBrand, SlsError};
use thiserror::Error;
use xname::XnameError;

/// Errors that abort hardware synthesis.
///
/// Unknown source prefixes and door hardware are not errors: those rows are
/// logged and dropped.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// SLS model error (duplicate xname, unsupported hardware type)
    #[error("SLS error: {0}")]
    Sls(#[from] SlsError),

    /// Xname parse/derivation error
    #[error("Xname error: {0}")]
    Xname(#[from] XnameError),

    /// A numeric column (U-number, NID, PDU number, port) could not be read
    #[error("Malformed {field} {value:?} in HMN row {row}")]
    MalformedField {
        field: &'static str,
        value: String,
        row: String,
    },

    /// A row names a `SourceParent` that no row describes
    #[error("HMN row {row} declares parent {parent}, but no row has that source")]
    MissingParent { parent: String, row: String },

    /// A connection points at a switch missing from the switch metadata
    #[error("HMN row {row} is cabled to {switch}, which is not in the switch metadata")]
    MissingSwitch { switch: String, row: String },

    /// Port naming for this switch brand is unknown
    #[error("HMN row {row} is cabled to {brand} switch {switch}, which is not supported")]
    UnsupportedSwitchBrand {
        brand: ManagementSwitchBrand,
        switch: String,
        row: String,
    },

    /// A node in a dense enclosure has a NID that yields no BMC ordinal
    #[error("NID {nid} of HMN row {row} cannot be mapped to an enclosure BMC")]
    InvalidNid { nid: u64, row: String },

    /// A switch sits in a cabinet the cabinet file does not declare
    #[error("Switch {switch} is in cabinet {cabinet}, which is not declared in the cabinet file")]
    MissingCabinet { switch: String, cabinet: String },
}
