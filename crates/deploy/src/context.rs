//! Per-run context handed to every deployment step.

use crate::{
    credential::{Credential, WalletSecret},
    error::ConfigurationError,
    manifest::ManifestStore,
    network::NetworkConfig,
    settings::Settings,
};

/// Everything resolved once at the start of a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub settings: Settings,
    pub network: NetworkConfig,
    pub credential: Credential,
    /// Constructor arguments, defaulting to the deployer address.
    pub constructor_args: Vec<String>,
}

impl RunContext {
    /// Resolve the network and bind the credential. Makes no network call.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigurationError> {
        let network = NetworkConfig::resolve(&settings.network, settings.chain_id);
        let secret = WalletSecret::from_settings(&settings)?;
        let credential = Credential::new(&secret, &network.network, &settings)?;

        let constructor_args = if settings.constructor_args.is_empty() {
            vec![credential.address().to_string()]
        } else {
            settings.constructor_args.clone()
        };

        tracing::info!(
            network = %network.network_name,
            chain_id = ?network.chain_id,
            deployer = %credential.address(),
            "Run context resolved"
        );

        Ok(Self {
            settings,
            network,
            credential,
            constructor_args,
        })
    }

    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(&self.settings.manifest_dir, &self.network.network_name)
    }

    pub fn verification_enabled(&self) -> bool {
        self.settings.has_explorer_key()
    }
}
