//! Xname errors

use thiserror::Error;

use crate::types::XnameType;

/// Errors produced while parsing or deriving xnames.
///
/// Callers treat every variant as fatal configuration input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XnameError {
    /// The string matches none of the xname templates
    #[error("invalid xname: {0}")]
    Invalid(String),

    /// The string is a valid xname, but not of the requested type
    #[error("xname {xname} is a {actual}, expected a {expected}")]
    WrongType {
        xname: String,
        expected: XnameType,
        actual: XnameType,
    },

    /// The system root has no parent
    #[error("xname {0} has no parent")]
    NoParent(String),

    /// An ordinal does not fit in 32 bits
    #[error("ordinal {ordinal} in xname {xname} is out of range")]
    OrdinalOutOfRange { xname: String, ordinal: String },
}
