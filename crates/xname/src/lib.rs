//! Xname grammar
//!
//! Component-location names identify every piece of hardware in a Shasta
//! system by its position: cabinet `x3000`, chassis `x3000c0`, node
//! `x3000c0s17b0n0`, and so on. This crate validates and classifies xnames,
//! normalizes zero-padded input, derives parents, and builds xnames from typed
//! ordinals.
//!
//! # Example
//!
//! ```
//! use xname::{get_type, normalize, parent, Node, XnameType};
//!
//! let node = Node { cabinet: 3000, chassis: 0, compute_module: 17, node_bmc: 0, node: 0 };
//! assert_eq!(node.to_string(), "x3000c0s17b0n0");
//! assert_eq!(get_type("x3000c0s17b0n0"), XnameType::Node);
//! assert_eq!(normalize("x3000c0s017b0n0"), "x3000c0s17b0n0");
//! assert_eq!(parent("x3000c0s17b0n0").unwrap(), "x3000c0s17b0");
//! ```

pub mod components;
pub mod error;
pub mod types;

pub use components::*;
pub use error::XnameError;
pub use types::{
    compare, get_type, is_valid, normalize, ordinals, ordinals_of_type, parent, sort_xnames,
    XnameType, SYSTEM_XNAME,
};
