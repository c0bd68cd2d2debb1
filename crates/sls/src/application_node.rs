//! Application node classification config
//!
//! Rows in the HMN connections file that are not management or compute nodes
//! are matched against a list of source-name prefixes (`uan`, `login`, ...)
//! to decide they are application nodes and which HSM subrole they get. Sites
//! extend the built-in list and pin aliases to specific node xnames:
//!
//! ```yaml
//! prefixes:
//!   - gateway
//! prefix_hsm_subroles:
//!   gateway: Gateway
//! aliases:
//!   x3000c0s26b0n0: [uan01, uan01-nmn]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use xname::XnameType;

use crate::error::SlsError;

/// Subrole value the config template ships with; must be replaced by the site.
pub const SUBROLE_PLACEHOLDER: &str = "~~FIXME~~";

/// Built-in prefixes, in match order.
pub const DEFAULT_PREFIXES: [&str; 6] = ["uan", "login", "lnet", "ln", "gn", "vn"];

const DEFAULT_SUBROLES: [(&str, &str); 6] = [
    ("uan", "UAN"),
    ("login", "UAN"),
    ("lnet", "LNETRouter"),
    ("ln", "UAN"),
    ("gn", "Gateway"),
    ("vn", "Visualization"),
];

fn default_subrole(prefix: &str) -> Option<&'static str> {
    DEFAULT_SUBROLES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, subrole)| *subrole)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationNodeConfig {
    /// Site prefixes; matched before the built-in ones
    #[serde(default)]
    pub prefixes: Vec<String>,

    #[serde(default)]
    pub prefix_hsm_subroles: BTreeMap<String, String>,

    /// Node xname to aliases
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl ApplicationNodeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Lower-case prefixes and subrole keys and normalize alias xnames.
    ///
    /// Either everything is normalized or, on a collision, nothing changes.
    pub fn normalize(&mut self) -> Result<(), SlsError> {
        let mut prefixes = Vec::with_capacity(self.prefixes.len());
        for prefix in &self.prefixes {
            let prefix = prefix.to_lowercase();
            if prefixes.contains(&prefix) {
                return Err(SlsError::DuplicatePrefix(prefix));
            }
            prefixes.push(prefix);
        }

        let mut subroles = BTreeMap::new();
        for (prefix, subrole) in &self.prefix_hsm_subroles {
            let key = prefix.to_lowercase();
            if subroles.insert(key.clone(), subrole.clone()).is_some() {
                return Err(SlsError::NormalizationCollision {
                    field: "prefix_hsm_subroles",
                    key,
                });
            }
        }

        let mut aliases = BTreeMap::new();
        for (node, names) in &self.aliases {
            let key = xname::normalize(node);
            if aliases.insert(key.clone(), names.clone()).is_some() {
                return Err(SlsError::NormalizationCollision {
                    field: "aliases",
                    key,
                });
            }
        }

        self.prefixes = prefixes;
        self.prefix_hsm_subroles = subroles;
        self.aliases = aliases;
        Ok(())
    }

    /// Check alias keys are node xnames, aliases are unique and every prefix
    /// has a real subrole.
    pub fn validate(&self) -> Result<(), SlsError> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for (node, names) in &self.aliases {
            match xname::get_type(node) {
                XnameType::Node => {}
                XnameType::Invalid => {
                    return Err(SlsError::InvalidAliasXname {
                        xname: node.clone(),
                    });
                }
                actual => {
                    return Err(SlsError::AliasXnameNotNode {
                        xname: node.clone(),
                        actual,
                    });
                }
            }
            for alias in names {
                if let Some(first) = owners.insert(alias.as_str(), node.as_str())
                    && first != node.as_str()
                {
                    return Err(SlsError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.to_string(),
                        second: node.clone(),
                    });
                }
            }
        }

        let mut placeholders: Vec<String> = self
            .prefix_hsm_subroles
            .iter()
            .filter(|(_, subrole)| subrole.as_str() == SUBROLE_PLACEHOLDER)
            .map(|(prefix, _)| prefix.clone())
            .collect();
        if !placeholders.is_empty() {
            placeholders.sort();
            return Err(SlsError::PlaceholderSubrole(placeholders));
        }

        for prefix in &self.prefixes {
            if self.subrole_for_prefix(prefix).is_none() {
                return Err(SlsError::MissingSubrole(prefix.clone()));
            }
        }
        Ok(())
    }

    /// All prefixes in match order: site prefixes first, then built-ins.
    pub fn all_prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_PREFIXES)
    }

    /// First prefix the (case-insensitive) source name starts with.
    pub fn match_prefix(&self, source: &str) -> Option<&str> {
        let source = source.to_lowercase();
        self.all_prefixes().find(|prefix| source.starts_with(prefix))
    }

    /// Subrole for a prefix, site mapping first.
    pub fn subrole_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefix_hsm_subroles
            .get(prefix)
            .map(String::as_str)
            .or_else(|| default_subrole(prefix))
    }

    /// Subrole for an HMN source name, if it is an application node.
    pub fn resolve_subrole(&self, source: &str) -> Option<&str> {
        let prefix = self.match_prefix(source)?;
        let subrole = self.subrole_for_prefix(prefix);
        debug!("Application node {} matched prefix {} -> {:?}", source, prefix, subrole);
        subrole
    }

    /// Aliases configured for a node xname.
    pub fn aliases_for(&self, xname: &str) -> &[String] {
        self.aliases.get(xname).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "application_node_test.rs"]
mod application_node_test;
