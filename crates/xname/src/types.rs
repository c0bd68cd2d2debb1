//! Xname grammar
//!
//! Every xname type is described by a single template: the ordered sequence of
//! type letters that precede its ordinals (`xcsbn` for a node, giving
//! `x3000c0s17b0n0`). The system root `s0` is the one fixed literal.
//!
//! Every prefix of a template is itself a template, so stripping the last
//! `(letter, ordinal)` segment of a valid xname always yields its parent.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::XnameError;

/// The system root xname.
pub const SYSTEM_XNAME: &str = "s0";

/// Structural type of an xname.
#[allow(clippy::upper_case_acronyms, reason = "names follow the HMS type names")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XnameType {
    System,
    CDU,
    CDUMgmtSwitch,
    Cabinet,
    CabinetBMC,
    CabinetPDUController,
    CabinetPDU,
    CabinetPDUOutlet,
    Chassis,
    ChassisBMC,
    CMMRectifier,
    ComputeModule,
    NodeBMC,
    NodeBMCNic,
    NodeEnclosure,
    Node,
    NodeNic,
    NodeHsnNic,
    Processor,
    Memory,
    RouterModule,
    RouterBMC,
    HSNBoard,
    HSNConnector,
    MgmtSwitch,
    MgmtSwitchConnector,
    MgmtHLSwitchEnclosure,
    MgmtHLSwitch,
    Invalid,
}

/// Type letters for every valid xname type.
const TEMPLATES: &[(XnameType, &str)] = &[
    (XnameType::System, "s"),
    (XnameType::CDU, "d"),
    (XnameType::CDUMgmtSwitch, "dw"),
    (XnameType::Cabinet, "x"),
    (XnameType::CabinetBMC, "xb"),
    (XnameType::CabinetPDUController, "xm"),
    (XnameType::CabinetPDU, "xmp"),
    (XnameType::CabinetPDUOutlet, "xmpj"),
    (XnameType::Chassis, "xc"),
    (XnameType::ChassisBMC, "xcb"),
    (XnameType::CMMRectifier, "xct"),
    (XnameType::ComputeModule, "xcs"),
    (XnameType::NodeBMC, "xcsb"),
    (XnameType::NodeBMCNic, "xcsbi"),
    (XnameType::NodeEnclosure, "xcse"),
    (XnameType::Node, "xcsbn"),
    (XnameType::NodeNic, "xcsbni"),
    (XnameType::NodeHsnNic, "xcsbnh"),
    (XnameType::Processor, "xcsbnp"),
    (XnameType::Memory, "xcsbnd"),
    (XnameType::RouterModule, "xcr"),
    (XnameType::RouterBMC, "xcrb"),
    (XnameType::HSNBoard, "xcre"),
    (XnameType::HSNConnector, "xcrj"),
    (XnameType::MgmtSwitch, "xcw"),
    (XnameType::MgmtSwitchConnector, "xcwj"),
    (XnameType::MgmtHLSwitchEnclosure, "xch"),
    (XnameType::MgmtHLSwitch, "xchs"),
];

#[allow(clippy::expect_used, reason = "patterns are built from the constant template table")]
static TEMPLATE_REGEXES: LazyLock<Vec<(XnameType, Regex)>> = LazyLock::new(|| {
    TEMPLATES
        .iter()
        .map(|(kind, letters)| {
            let pattern = if *kind == XnameType::System {
                format!("^{SYSTEM_XNAME}$")
            } else {
                let body: String = letters.chars().map(|l| format!(r"{l}(\d+)")).collect();
                format!("^{body}$")
            };
            let regex = Regex::new(&pattern).expect("xname templates are valid regexes");
            (*kind, regex)
        })
        .collect()
});

// A letter followed by zero padding, e.g. the `c00` in `x3000c002`.
#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static LEADING_ZEROS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])0+(\d)").expect("leading zero pattern is a valid regex"));

impl XnameType {
    /// Every valid type, in template order.
    pub fn all() -> impl Iterator<Item = XnameType> {
        TEMPLATES.iter().map(|(kind, _)| *kind)
    }

    /// The type letters of this type's template (`None` for `Invalid`).
    #[must_use]
    pub fn template(self) -> Option<&'static str> {
        TEMPLATES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, letters)| *letters)
    }

    /// The type of the structural parent.
    ///
    /// Cabinets and CDUs hang off the system root; the root and `Invalid`
    /// have no parent.
    #[must_use]
    pub fn parent_type(self) -> Option<XnameType> {
        let letters = self.template()?;
        if self == XnameType::System {
            return None;
        }
        let parent_letters = &letters[..letters.len() - 1];
        if parent_letters.is_empty() {
            return Some(XnameType::System);
        }
        TEMPLATES
            .iter()
            .find(|(_, l)| *l == parent_letters)
            .map(|(kind, _)| *kind)
    }

    /// HMS name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            XnameType::System => "System",
            XnameType::CDU => "CDU",
            XnameType::CDUMgmtSwitch => "CDUMgmtSwitch",
            XnameType::Cabinet => "Cabinet",
            XnameType::CabinetBMC => "CabinetBMC",
            XnameType::CabinetPDUController => "CabinetPDUController",
            XnameType::CabinetPDU => "CabinetPDU",
            XnameType::CabinetPDUOutlet => "CabinetPDUOutlet",
            XnameType::Chassis => "Chassis",
            XnameType::ChassisBMC => "ChassisBMC",
            XnameType::CMMRectifier => "CMMRectifier",
            XnameType::ComputeModule => "ComputeModule",
            XnameType::NodeBMC => "NodeBMC",
            XnameType::NodeBMCNic => "NodeBMCNic",
            XnameType::NodeEnclosure => "NodeEnclosure",
            XnameType::Node => "Node",
            XnameType::NodeNic => "NodeNic",
            XnameType::NodeHsnNic => "NodeHsnNic",
            XnameType::Processor => "Processor",
            XnameType::Memory => "Memory",
            XnameType::RouterModule => "RouterModule",
            XnameType::RouterBMC => "RouterBMC",
            XnameType::HSNBoard => "HSNBoard",
            XnameType::HSNConnector => "HSNConnector",
            XnameType::MgmtSwitch => "MgmtSwitch",
            XnameType::MgmtSwitchConnector => "MgmtSwitchConnector",
            XnameType::MgmtHLSwitchEnclosure => "MgmtHLSwitchEnclosure",
            XnameType::MgmtHLSwitch => "MgmtHLSwitch",
            XnameType::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for XnameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XnameType {
    type Err = XnameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XnameType::all()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| XnameError::Invalid(s.to_string()))
    }
}

/// Classify an xname by the template it matches.
///
/// Templates have distinct letter sequences, so at most one can match.
#[must_use]
pub fn get_type(xname: &str) -> XnameType {
    TEMPLATE_REGEXES
        .iter()
        .find(|(_, regex)| regex.is_match(xname))
        .map_or(XnameType::Invalid, |(kind, _)| *kind)
}

/// Check that `xname` matches exactly one template with no extra characters.
#[must_use]
pub fn is_valid(xname: &str) -> bool {
    get_type(xname) != XnameType::Invalid
}

/// Lower-case the xname and strip leading zeros from every ordinal.
///
/// Idempotent. Input that is not an xname is returned lower-cased and
/// otherwise untouched apart from the zero stripping.
#[must_use]
pub fn normalize(xname: &str) -> String {
    let lowered = xname.trim().to_lowercase();
    LEADING_ZEROS.replace_all(&lowered, "$1$2").into_owned()
}

/// The ordinals of a valid xname, in template order.
pub fn ordinals(xname: &str) -> Result<Vec<u32>, XnameError> {
    let (_, regex) = TEMPLATE_REGEXES
        .iter()
        .find(|(_, regex)| regex.is_match(xname))
        .ok_or_else(|| XnameError::Invalid(xname.to_string()))?;
    let captures = regex
        .captures(xname)
        .ok_or_else(|| XnameError::Invalid(xname.to_string()))?;

    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| {
            m.as_str()
                .parse::<u32>()
                .map_err(|_| XnameError::OrdinalOutOfRange {
                    xname: xname.to_string(),
                    ordinal: m.as_str().to_string(),
                })
        })
        .collect()
}

/// Ordinals of `xname`, requiring it to be of type `expected`.
pub fn ordinals_of_type(xname: &str, expected: XnameType) -> Result<Vec<u32>, XnameError> {
    match get_type(xname) {
        XnameType::Invalid => Err(XnameError::Invalid(xname.to_string())),
        actual if actual != expected => Err(XnameError::WrongType {
            xname: xname.to_string(),
            expected,
            actual,
        }),
        _ => ordinals(xname),
    }
}

/// Strip the last `(letter, ordinal)` segment.
///
/// Cabinets and CDUs return the system root; the root itself has no parent.
pub fn parent(xname: &str) -> Result<String, XnameError> {
    match get_type(xname) {
        XnameType::Invalid => Err(XnameError::Invalid(xname.to_string())),
        XnameType::System => Err(XnameError::NoParent(xname.to_string())),
        _ => {
            let cut = xname
                .rfind(|c: char| c.is_ascii_alphabetic())
                .ok_or_else(|| XnameError::Invalid(xname.to_string()))?;
            if cut == 0 {
                Ok(SYSTEM_XNAME.to_string())
            } else {
                Ok(xname[..cut].to_string())
            }
        }
    }
}

/// Numeric-aware ordering: letter runs compare as text, digit runs as numbers.
///
/// Gives `x9 < x10 < x100 < x3000` where plain string ordering would not.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = segments(a);
    let mut right = segments(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l, r) {
                    (Segment::Number(l), Segment::Number(r)) => {
                        let (l, r) = (l.trim_start_matches('0'), r.trim_start_matches('0'));
                        l.len().cmp(&r.len()).then_with(|| l.cmp(r))
                    }
                    (Segment::Text(l), Segment::Text(r)) => l.cmp(r),
                    (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
                    (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Sort xnames in place with [`compare`].
pub fn sort_xnames<S: AsRef<str>>(xnames: &mut [S]) {
    xnames.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

enum Segment<'a> {
    Text(&'a str),
    Number(&'a str),
}

fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(if digits {
            Segment::Number(head)
        } else {
            Segment::Text(head)
        })
    })
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
