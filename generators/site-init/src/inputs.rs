//! Site input loading
//!
//! Every input is parsed and validated here, before any generation starts,
//! so that a bad file is reported with its path and nothing is written.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sls::{
    assign_switch_aliases, ApplicationNodeConfig, CabinetDetailFile, HmnRow, ManagementSwitch,
    ManagementSwitchBrand, ManagementSwitchType,
};
use tracing::{debug, info};

/// First column of the switch metadata header row.
const SWITCH_METADATA_HEADER: &str = "switch xname";

#[derive(Debug, Clone, Copy)]
pub struct InputPaths<'a> {
    pub cabinets: &'a Path,
    pub hmn_connections: &'a Path,
    pub switch_metadata: &'a Path,
    pub application_node_config: Option<&'a Path>,
}

/// Parsed and validated site inputs.
#[derive(Debug, Clone)]
pub struct SiteInputs {
    pub cabinets: CabinetDetailFile,
    pub hmn_rows: Vec<HmnRow>,
    pub switches: Vec<ManagementSwitch>,
    pub application_nodes: ApplicationNodeConfig,
}

impl SiteInputs {
    pub fn load(paths: InputPaths<'_>) -> Result<Self> {
        let cabinets = load_cabinets(paths.cabinets)?;
        let hmn_rows = load_hmn_connections(paths.hmn_connections)?;
        let switches = load_switch_metadata(paths.switch_metadata)?;
        let application_nodes = match paths.application_node_config {
            Some(path) => load_application_node_config(path)?,
            None => {
                info!("No application node config given, using built-in prefixes");
                ApplicationNodeConfig::default()
            }
        };

        Ok(Self {
            cabinets,
            hmn_rows,
            switches,
            application_nodes,
        })
    }
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} from {}", what, path.display()))
}

pub fn load_cabinets(path: &Path) -> Result<CabinetDetailFile> {
    let raw = read(path, "cabinets")?;
    let mut cabinets = CabinetDetailFile::from_yaml(&raw)
        .with_context(|| format!("Failed to parse cabinets file {}", path.display()))?;
    cabinets.populate_ids();
    cabinets
        .validate()
        .with_context(|| format!("Invalid cabinets file {}", path.display()))?;
    debug!("Loaded {} cabinet groups from {}", cabinets.cabinets.len(), path.display());
    Ok(cabinets)
}

pub fn load_hmn_connections(path: &Path) -> Result<Vec<HmnRow>> {
    let raw = read(path, "HMN connections")?;
    let rows: Vec<HmnRow> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse HMN connections file {}", path.display()))?;
    debug!("Loaded {} HMN rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_switch_metadata(path: &Path) -> Result<Vec<ManagementSwitch>> {
    let raw = read(path, "switch metadata")?;
    parse_switch_metadata(&raw).with_context(|| format!("Invalid switch metadata file {}", path.display()))
}

pub fn load_application_node_config(path: &Path) -> Result<ApplicationNodeConfig> {
    let raw = read(path, "application node config")?;
    let mut config = ApplicationNodeConfig::from_yaml(&raw)
        .with_context(|| format!("Failed to parse application node config {}", path.display()))?;
    config
        .normalize()
        .and_then(|()| config.validate())
        .with_context(|| format!("Invalid application node config {}", path.display()))?;
    Ok(config)
}

/// Parse switch metadata CSV.
///
/// Columns are `Switch Xname,Type,Brand[,Model[,IP]]`. The header row and
/// blank lines are skipped, fields are trimmed and xnames normalized. Every
/// switch is validated and given its `sw-<kind>-NNN` alias.
pub fn parse_switch_metadata(csv: &str) -> Result<Vec<ManagementSwitch>> {
    let mut switches = Vec::new();

    for (index, line) in csv.lines().enumerate() {
        let line_number = index + 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.iter().all(|field| field.is_empty()) {
            continue;
        }
        if fields[0].eq_ignore_ascii_case(SWITCH_METADATA_HEADER) {
            continue;
        }
        if !(3..=5).contains(&fields.len()) {
            bail!(
                "Line {}: expected 3 to 5 columns (Switch Xname,Type,Brand,Model,IP), found {}",
                line_number,
                fields.len()
            );
        }

        let xname = xname::normalize(&fields[0].to_lowercase());
        let switch_type: ManagementSwitchType = fields[1]
            .parse()
            .with_context(|| format!("Line {}", line_number))?;
        let brand: ManagementSwitchBrand = fields[2]
            .parse()
            .with_context(|| format!("Line {}", line_number))?;
        let model = fields.get(3).copied().unwrap_or_default();

        let mut switch = ManagementSwitch::new(xname, switch_type, brand, model);
        if let Some(ip) = fields.get(4).filter(|ip| !ip.is_empty()) {
            let ip: Ipv4Addr = ip
                .parse()
                .with_context(|| format!("Line {}: invalid management IP {:?}", line_number, ip))?;
            switch.management_interface = Some(ip);
        }
        switch.validate().with_context(|| format!("Line {}", line_number))?;
        switches.push(switch);
    }

    assign_switch_aliases(&mut switches);
    Ok(switches)
}
