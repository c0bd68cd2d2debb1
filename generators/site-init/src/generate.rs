//! Generation pipeline and output files

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ipam::{build_networks, csm_layouts, LayoutOptions, Ncn, NetworkInputs};
use topology::{cabinet_hardware, SlsState, TopologyEngine, TopologyInputs, TopologyOptions};
use tracing::{debug, info};

use crate::inputs::SiteInputs;

pub const SLS_INPUT_FILE: &str = "sls_input_file.json";
pub const NETWORKS_DIR: &str = "networks";

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub topology: TopologyOptions,
    pub layout: LayoutOptions,
}

/// Build the full SLS state from validated site inputs.
///
/// Hardware comes first: the NCN reservations in the networks are taken from
/// the management nodes found in the HMN rows, and the cabinet records carry
/// the cabinet subnets the networks allocate.
pub fn generate(site: &SiteInputs, options: GenerateOptions) -> Result<SlsState> {
    let mut engine = TopologyEngine::new(
        TopologyInputs {
            cabinets: &site.cabinets.cabinets,
            switches: &site.switches,
            application_nodes: &site.application_nodes,
        },
        options.topology,
    );
    let hardware = engine
        .build_inventory(&site.hmn_rows)
        .context("Failed to build hardware inventory")?;

    let ncns = Ncn::from_inventory(&hardware);
    info!("Found {} management nodes", ncns.len());

    let layouts = csm_layouts(options.layout).context("Failed to prepare network layouts")?;
    let networks = build_networks(
        &layouts,
        NetworkInputs {
            cabinets: &site.cabinets.cabinets,
            switches: &site.switches,
            ncns: &ncns,
        },
    )
    .context("Failed to allocate networks")?;

    let cabinets = cabinet_hardware(&site.cabinets.cabinets, &networks).context("Failed to build cabinet records")?;
    let mut state = SlsState::new(hardware, networks);
    state.add_hardware(cabinets).context("Cabinet records collide with existing hardware")?;

    debug!("Cabinets: {}", state.cabinet_xnames().join(", "));
    Ok(state)
}

/// Write `sls_input_file.json` and one `networks/<NAME>.yaml` per network.
pub fn write_outputs(state: &SlsState, output_dir: &Path) -> Result<()> {
    let networks_dir = output_dir.join(NETWORKS_DIR);
    fs::create_dir_all(&networks_dir)
        .with_context(|| format!("Failed to create {}", networks_dir.display()))?;

    let sls_path = output_dir.join(SLS_INPUT_FILE);
    let json = serde_json::to_string_pretty(state).context("Failed to serialize SLS state")?;
    fs::write(&sls_path, json).with_context(|| format!("Failed to write {}", sls_path.display()))?;
    info!("Wrote {}", sls_path.display());

    for (name, network) in &state.networks {
        let path = networks_dir.join(format!("{}.yaml", name));
        let yaml = serde_yaml::to_string(network).with_context(|| format!("Failed to serialize network {}", name))?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
    }
    Ok(())
}
