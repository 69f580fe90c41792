use std::path::PathBuf;

use clap::Parser;
use hblock_deploy::SETTINGS_FILENAME;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "hblock")]
#[command(author, version, about = "Deploy the HBLOCK token and record it in the network manifest")]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "HBLOCK_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The network to deploy to: `hardhat`, `localhost`, `testnet`, `mainnet`,
    /// or any other name for a local node.
    ///
    /// The manifest is written to `<network>_deployed.json`. Overrides the
    /// settings file; falls back to `hardhat` when neither names one.
    #[arg(short, long)]
    pub network: Option<String>,

    /// Path to the settings file. Missing files are ignored.
    #[arg(long, alias = "conf", env = "HBLOCK_CONFIG", default_value = SETTINGS_FILENAME)]
    pub config: PathBuf,
}
