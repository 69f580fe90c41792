//! Error taxonomy for a deployment run.
//!
//! None of these are recovered locally: every error bubbles up to the binary,
//! which prints it and exits with a non-zero status.

use std::path::PathBuf;

use thiserror::Error;

/// The host configuration cannot produce a usable network, credential or input.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("only 1 private key expected, got {0}")]
    MultipleKeys(usize),

    #[error("wallet secret is neither a 64-character hex key nor a mnemonic phrase")]
    UnrecognizedSecret,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("no wallet secret configured (set WALLET_SECRET)")]
    MissingSecret,

    #[error("no RPC endpoint configured for network '{network}' (set {variable})")]
    MissingEndpoint {
        network: String,
        variable: &'static str,
    },

    #[error("invalid RPC endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("verification command is empty")]
    EmptyVerifyCommand,

    #[error("invalid constructor arguments: {0}")]
    ConstructorArgs(String),

    #[error("invalid settings: {0}")]
    Settings(Box<figment::Error>),
}

impl From<figment::Error> for ConfigurationError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

/// Failure reported by the RPC provider while deploying.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("deployment transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("receipt for {tx_hash} carries no {field}")]
    IncompleteReceipt {
        tx_hash: String,
        field: &'static str,
    },

    #[error("timed out waiting for confirmation of {tx_hash}")]
    ConfirmationTimeout { tx_hash: String },
}

/// The external verification command did not report success.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("{0}")]
    Failed(String),

    #[error("verification command timed out after {0} seconds")]
    Timeout(u64),

    #[error("failed to run verification command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// The per-network manifest file could not be read or written.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The compiled contract artifact could not be loaded.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact has empty bytecode")]
    EmptyBytecode,
}

/// Any error that terminates a deployment run.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

pub type Result<T, E = DeployError> = std::result::Result<T, E>;
