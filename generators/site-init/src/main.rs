//! Cray Site Init
//!
//! Turns the site inputs (cabinet layout, HMN cabling, switch metadata and
//! application node configuration) into the SLS input file and the CSM
//! network plans.

mod generate;
mod inputs;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::generate::{generate, write_outputs, GenerateOptions};
use crate::inputs::{InputPaths, SiteInputs};

#[derive(Parser)]
#[command(name = "csi")]
#[command(about = "Generate SLS hardware and network plans for a Shasta site")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sls_input_file.json and per-network plans
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Starting NID for liquid-cooled compute nodes
        #[arg(long, env = "CSI_MOUNTAIN_STARTING_NID", default_value_t = topology::DEFAULT_MOUNTAIN_STARTING_NID)]
        mountain_starting_nid: u64,

        /// Widen the HMN/NMN/CAN bootstrap subnets to the whole network
        #[arg(long, env = "CSI_SUPERNET_HACK")]
        supernet_hack: bool,

        /// Extra addresses reserved for network hardware in each switch subnet
        #[arg(long, env = "CSI_MANAGEMENT_NET_IPS", default_value_t = 0)]
        management_net_ips: usize,

        /// Prefix length of per-cabinet subnets
        #[arg(long, env = "CSI_CABINET_PREFIX", default_value_t = ipam::DEFAULT_CABINET_PREFIX)]
        cabinet_prefix: u8,

        /// Directory the generated files are written to
        #[arg(long, short, env = "CSI_OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,
    },

    /// Load and validate the site inputs without writing anything
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Cabinet layout (YAML)
    #[arg(long, env = "CSI_CABINETS", default_value = "cabinets.yaml")]
    cabinets: PathBuf,

    /// HMN connection rows (JSON)
    #[arg(long, env = "CSI_HMN_CONNECTIONS", default_value = "hmn_connections.json")]
    hmn_connections: PathBuf,

    /// Management switch metadata (CSV)
    #[arg(long, env = "CSI_SWITCH_METADATA", default_value = "switch_metadata.csv")]
    switch_metadata: PathBuf,

    /// Application node prefixes, subroles and aliases (YAML)
    #[arg(long, env = "CSI_APPLICATION_NODE_CONFIG")]
    application_node_config: Option<PathBuf>,
}

impl InputArgs {
    fn paths(&self) -> InputPaths<'_> {
        InputPaths {
            cabinets: &self.cabinets,
            hmn_connections: &self.hmn_connections,
            switch_metadata: &self.switch_metadata,
            application_node_config: self.application_node_config.as_deref(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Cray Site Init");

    match cli.command {
        Commands::Generate {
            inputs,
            mountain_starting_nid,
            supernet_hack,
            management_net_ips,
            cabinet_prefix,
            output_dir,
        } => {
            info!("Configuration:");
            info!("  Cabinets: {}", inputs.cabinets.display());
            info!("  HMN connections: {}", inputs.hmn_connections.display());
            info!("  Switch metadata: {}", inputs.switch_metadata.display());
            info!("  Mountain starting NID: {}", mountain_starting_nid);
            info!("  Supernet hack: {}", supernet_hack);
            info!("  Output directory: {}", output_dir.display());

            let site = SiteInputs::load(inputs.paths())?;
            let options = GenerateOptions {
                topology: topology::TopologyOptions { mountain_starting_nid },
                layout: ipam::LayoutOptions {
                    supernet_hack,
                    cabinet_prefix,
                    additional_networking_space: management_net_ips,
                },
            };
            let state = generate(&site, options)?;
            write_outputs(&state, &output_dir)?;
            info!(
                "Wrote {} hardware records and {} networks to {}",
                state.hardware.len(),
                state.networks.len(),
                output_dir.display()
            );
        }
        Commands::Validate { inputs } => {
            let site = SiteInputs::load(inputs.paths())?;
            info!(
                "Inputs are valid: {} cabinet groups, {} HMN rows, {} switches",
                site.cabinets.cabinets.len(),
                site.hmn_rows.len(),
                site.switches.len()
            );
        }
    }

    Ok(())
}
