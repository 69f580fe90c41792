//! hblock-deploy - Deployment library for the HBLOCK token.
//!
//! This crate resolves the target network, binds the deployer's signing key to
//! the network's RPC endpoint, deploys the contract, records it in the
//! per-network manifest and optionally verifies its source on the explorer.

mod artifact;
mod context;
mod credential;
mod deployer;
mod error;
mod manifest;
mod network;
mod pipeline;
mod settings;
mod verify;

pub use artifact::ContractArtifact;
pub use context::RunContext;
pub use credential::{AccountsConfig, Credential, WalletSecret};
pub use deployer::{
    CONFIRMATION_TIMEOUT, ContractDeployer, DeploymentReceipt, REQUIRED_CONFIRMATIONS,
    RpcDeployer, deploy_contract,
};
pub use error::{
    ArtifactError, ConfigurationError, DeployError, ManifestError, NetworkError, Result,
    VerificationError,
};
pub use manifest::{ContractRecord, DeploymentManifest, ManifestStore, SKELETON_CONTRACTS};
pub use network::{DEFAULT_NETWORK, Network, NetworkConfig, RpcSource};
pub use pipeline::{DeploymentSummary, run};
pub use settings::{SETTINGS_FILENAME, Settings};
pub use verify::{
    ALREADY_VERIFIED_MARKER, ExternalCommand, VERIFICATION_TIMEOUT, VerificationCommand,
    VerificationOutcome, VerificationRequest, VerificationRunner, classify,
};
