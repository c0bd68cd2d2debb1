//! SLS model errors

use thiserror::Error;
use xname::{XnameError, XnameType};

use crate::switches::ManagementSwitchType;

/// Errors raised while building or validating SLS inputs.
///
/// All of these are configuration problems: they are reported before any
/// hardware or network generation starts.
#[derive(Debug, Error)]
pub enum SlsError {
    /// Xname parse/derivation error
    #[error("Xname error: {0}")]
    Xname(#[from] XnameError),

    /// Two hardware records share an xname
    #[error("Duplicate hardware xname: {0}")]
    DuplicateXname(String),

    /// SLS has no record type for this kind of xname
    #[error("SLS does not track {kind} hardware: {xname}")]
    UnsupportedHardwareType { xname: String, kind: XnameType },

    /// The same cabinet ID is declared by two cabinet groups
    #[error("Cabinet ID {id} is declared by both {first_kind} and {second_kind} cabinets")]
    DuplicateCabinetId {
        id: u32,
        first_kind: String,
        second_kind: String,
    },

    /// Cabinet group kind is not one we know how to classify
    #[error("Unknown cabinet type: {0}")]
    UnknownCabinetKind(String),

    /// A switch xname does not match the grammar its type requires
    #[error("Switch {xname} of type {switch_type} has xname type {actual}, expected {expected}")]
    SwitchXnameMismatch {
        xname: String,
        switch_type: ManagementSwitchType,
        actual: XnameType,
        expected: String,
    },

    /// Unknown management switch type in switch metadata
    #[error("Unknown switch type: {0}")]
    UnknownSwitchType(String),

    /// Unknown management switch brand in switch metadata
    #[error("Unknown switch brand: {0}")]
    UnknownSwitchBrand(String),

    /// Two prefixes become identical once lower-cased
    #[error("Duplicate application node prefix after normalization: {0}")]
    DuplicatePrefix(String),

    /// Two map keys become identical once normalized
    #[error("Normalization of {field} produced duplicate key: {key}")]
    NormalizationCollision { field: &'static str, key: String },

    /// Alias map key is not an xname
    #[error("Invalid xname in application node aliases: {xname}")]
    InvalidAliasXname { xname: String },

    /// Alias map key is an xname, but not a node
    #[error("Alias xname {xname} is a {actual}, only Node xnames may have aliases")]
    AliasXnameNotNode { xname: String, actual: XnameType },

    /// One alias is assigned to two different xnames
    #[error("Alias {alias} is used by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// Prefixes still mapped to the placeholder subrole
    #[error("Application node prefixes with unresolved subrole placeholder: {}", .0.join(", "))]
    PlaceholderSubrole(Vec<String>),

    /// A prefix has no subrole mapping
    #[error("Application node prefix {0} has no HSM subrole")]
    MissingSubrole(String),
}
