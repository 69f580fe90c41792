//! Network resolution: chain ids, explorer links and RPC endpoint selection.

use std::{fmt, str::FromStr};

use alloy_core::primitives::Address;
use url::Url;

use crate::{error::ConfigurationError, settings::Settings};

/// The network used when none is selected.
pub const DEFAULT_NETWORK: &str = "hardhat";

/// Target network of a deployment run.
///
/// Any name that is not one of the known networks parses as [`Network::Custom`],
/// which is treated like a local node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Hardhat,
    Localhost,
    Testnet,
    Mainnet,
    #[strum(default)]
    Custom(String),
}

/// Where the RPC endpoint of a network comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcSource {
    /// The local node (`local_rpc_url`).
    Local,
    /// The shared RPC access token (`RPC_TOKEN`).
    AccessToken,
    /// The dedicated mainnet provider (`MAINNETPROVIDER`).
    MainnetProvider,
}

impl Network {
    /// Parse a network name. Never fails: unknown names become [`Network::Custom`].
    pub fn from_name(name: &str) -> Self {
        match Self::from_str(name) {
            Ok(network) => network,
            Err(_) => Self::Custom(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Hardhat => "hardhat",
            Network::Localhost => "localhost",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Custom(name) => name,
        }
    }

    /// Chain id from the static network table.
    pub fn default_chain_id(&self) -> Option<u64> {
        match self {
            Network::Hardhat => Some(31337),
            Network::Localhost => Some(1),
            Network::Testnet => Some(80001),
            Network::Mainnet => Some(1),
            Network::Custom(_) => None,
        }
    }

    /// Block explorer base URL, empty when the network has no explorer.
    pub fn explorer_base_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://mumbai.polygonscan.com/",
            Network::Hardhat | Network::Localhost | Network::Mainnet | Network::Custom(_) => "",
        }
    }

    pub fn rpc_source(&self) -> RpcSource {
        match self {
            Network::Hardhat | Network::Localhost | Network::Custom(_) => RpcSource::Local,
            Network::Testnet => RpcSource::AccessToken,
            Network::Mainnet => RpcSource::MainnetProvider,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RpcSource {
    /// Name of the setting (environment variable) that feeds this source.
    pub fn variable(&self) -> &'static str {
        match self {
            RpcSource::Local => "LOCAL_RPC_URL",
            RpcSource::AccessToken => "RPC_TOKEN",
            RpcSource::MainnetProvider => "MAINNETPROVIDER",
        }
    }

    /// Resolve the endpoint URL for `network` from the settings.
    pub fn resolve(&self, network: &Network, settings: &Settings) -> Result<Url, ConfigurationError> {
        let raw = match self {
            RpcSource::Local => Some(settings.local_rpc_url.as_str()),
            RpcSource::AccessToken => settings.rpc_token.as_deref(),
            RpcSource::MainnetProvider => settings.mainnet_provider.as_deref(),
        }
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigurationError::MissingEndpoint {
            network: network.to_string(),
            variable: self.variable(),
        })?;

        Url::parse(raw.trim()).map_err(|e| ConfigurationError::InvalidEndpoint {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Network parameters resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub chain_id: Option<u64>,
    pub network_name: String,
    pub explorer_base_url: String,
}

impl NetworkConfig {
    /// Pure lookup of a network name. A configured chain id wins over the table.
    pub fn resolve(name: &str, chain_id: Option<u64>) -> Self {
        let network = Network::from_name(name);

        Self {
            chain_id: chain_id.or_else(|| network.default_chain_id()),
            network_name: network.to_string(),
            explorer_base_url: network.explorer_base_url().to_string(),
            network,
        }
    }

    /// Explorer link for a deployed address. Without an explorer base this is
    /// the bare `address/<address>` path.
    pub fn explorer_address_url(&self, address: &Address) -> String {
        format!("{}address/{}", self.explorer_base_url, address)
    }

    pub fn has_explorer(&self) -> bool {
        !self.explorer_base_url.is_empty()
    }
}
