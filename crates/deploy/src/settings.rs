//! Host settings for a deployment run.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{credential::AccountsConfig, error::ConfigurationError, network::DEFAULT_NETWORK};

/// The default name of the settings file.
pub const SETTINGS_FILENAME: &str = "hblock.toml";

/// Unprefixed environment variables read as settings.
const RAW_ENV_KEYS: &[&str] = &[
    "RPC_TOKEN",
    "WALLET_SECRET",
    "MAINNETPROVIDER",
    "MAINNET_ETHERSCAN_KEY",
    "TESTNET_ETHERSCAN_KEY",
    "LOCAL_RPC_URL",
];

/// Everything a run needs from its host: network selection, secrets and paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target network name.
    pub network: String,
    /// Chain id override for the target network.
    pub chain_id: Option<u64>,
    /// Explicit accounts for the network. Takes precedence over `wallet_secret`.
    pub accounts: Option<AccountsConfig>,
    /// Raw private key or mnemonic phrase.
    pub wallet_secret: Option<String>,
    /// Shared RPC access token, used as the testnet RPC URL.
    pub rpc_token: Option<String>,
    /// Mainnet RPC provider URL.
    pub mainnet_provider: Option<String>,
    /// RPC URL of the local node.
    pub local_rpc_url: String,
    pub mainnet_etherscan_key: Option<String>,
    pub testnet_etherscan_key: Option<String>,
    /// Path to the compiled contract artifact.
    pub artifact: PathBuf,
    /// Manifest key under which the deployment is recorded.
    pub contract_name: String,
    /// Constructor arguments. Defaults to the deployer address when empty.
    pub constructor_args: Vec<String>,
    /// Directory holding the `<network>_deployed.json` manifests.
    pub manifest_dir: PathBuf,
    /// Verification program and leading arguments.
    pub verify_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            chain_id: None,
            accounts: None,
            wallet_secret: None,
            rpc_token: None,
            mainnet_provider: None,
            local_rpc_url: "http://localhost:8545".to_string(),
            mainnet_etherscan_key: None,
            testnet_etherscan_key: None,
            artifact: PathBuf::from("artifacts/contracts/HBLOCK.sol/HBLOCK.json"),
            contract_name: "hblock".to_string(),
            constructor_args: Vec::new(),
            manifest_dir: PathBuf::from("."),
            verify_command: vec!["npx".into(), "hardhat".into(), "verify".into()],
        }
    }
}

impl Settings {
    /// Load settings from the given TOML file (if it exists), then the
    /// `HBLOCK_` prefixed environment, then the raw secret variables.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path))
                .merge(Env::prefixed("HBLOCK_"))
                .merge(Env::raw().only(RAW_ENV_KEYS).map(|key| {
                    if key.as_str().eq_ignore_ascii_case("mainnetprovider") {
                        "mainnet_provider".into()
                    } else {
                        key.into()
                    }
                })),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigurationError> {
        let settings: Self = figment.extract()?;

        if settings.rpc_token.is_none() {
            tracing::warn!("RPC_TOKEN is not set");
        }
        if settings.accounts.is_none() && settings.wallet_secret.is_none() {
            tracing::warn!("WALLET_SECRET is not set");
        }

        Ok(settings)
    }

    /// Whether any explorer API key is configured, which enables verification.
    pub fn has_explorer_key(&self) -> bool {
        [&self.mainnet_etherscan_key, &self.testnet_etherscan_key]
            .into_iter()
            .flatten()
            .any(|key| !key.is_empty())
    }
}
