//! Contract-creation transactions and the records they produce.

use std::{future::Future, time::Duration};

use alloy_core::primitives::{Address, B256, Bytes};
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_provider::{
    DynProvider, PendingTransactionBuilder, PendingTransactionConfig, PendingTransactionError,
    Provider, ProviderBuilder, WatchTxError,
};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};

use crate::{
    artifact::ContractArtifact,
    credential::Credential,
    error::{DeployError, NetworkError},
    manifest::ContractRecord,
    network::NetworkConfig,
};

/// Blocks that must include the deployment before it counts as confirmed.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

/// How long to wait for the confirmation before giving up.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of a confirmed contract-creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub tx_hash: B256,
    pub address: Address,
    pub block_number: u64,
}

/// Submits a contract-creation transaction and waits for its confirmation.
pub trait ContractDeployer {
    fn deploy(
        &self,
        creation_code: Bytes,
    ) -> impl Future<Output = Result<DeploymentReceipt, NetworkError>> + Send;
}

/// [`ContractDeployer`] backed by a JSON-RPC provider that signs with the run's credential.
#[derive(Clone)]
pub struct RpcDeployer {
    provider: DynProvider,
    confirmation_timeout: Duration,
}

impl RpcDeployer {
    /// Connect to the credential's endpoint. No request is made until deployment.
    pub fn connect(credential: &Credential) -> Self {
        let wallet = EthereumWallet::from(credential.signer().clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(credential.rpc_url().clone())
            .erased();

        Self {
            provider,
            confirmation_timeout: CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    fn watch_config(&self, tx_hash: B256) -> PendingTransactionConfig {
        PendingTransactionConfig::new(tx_hash)
            .with_required_confirmations(REQUIRED_CONFIRMATIONS)
            .with_timeout(Some(self.confirmation_timeout))
    }
}

/// Map a failed confirmation wait onto the run's error taxonomy.
fn confirmation_error(tx_hash: B256, err: PendingTransactionError) -> NetworkError {
    match err {
        PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
            NetworkError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
            }
        }
        other => NetworkError::Rpc(other.to_string()),
    }
}

/// Check a confirmed receipt: it must succeed and name the created contract and its block.
fn confirmed_receipt(
    tx_hash: B256,
    receipt: &TransactionReceipt,
) -> Result<DeploymentReceipt, NetworkError> {
    if !receipt.status() {
        return Err(NetworkError::Reverted {
            tx_hash: tx_hash.to_string(),
        });
    }

    let address = receipt
        .contract_address()
        .ok_or_else(|| NetworkError::IncompleteReceipt {
            tx_hash: tx_hash.to_string(),
            field: "contract address",
        })?;
    let block_number = receipt
        .block_number()
        .ok_or_else(|| NetworkError::IncompleteReceipt {
            tx_hash: tx_hash.to_string(),
            field: "block number",
        })?;

    Ok(DeploymentReceipt {
        tx_hash,
        address,
        block_number,
    })
}

impl ContractDeployer for RpcDeployer {
    async fn deploy(&self, creation_code: Bytes) -> Result<DeploymentReceipt, NetworkError> {
        let tx = TransactionRequest::default().with_deploy_code(creation_code);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| NetworkError::Rpc(e.to_string()))?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(tx_hash = %tx_hash, "Deployment transaction sent");

        let receipt =
            PendingTransactionBuilder::from_config(pending.provider().clone(), self.watch_config(tx_hash))
                .get_receipt()
                .await
                .map_err(|e| confirmation_error(tx_hash, e))?;

        confirmed_receipt(tx_hash, &receipt)
    }
}

/// Deploy the artifact and build its manifest record from the confirmed receipt.
///
/// Failures are returned as-is: a deployment is never retried.
pub async fn deploy_contract<D: ContractDeployer>(
    deployer: &D,
    network: &NetworkConfig,
    artifact: &ContractArtifact,
    constructor_args: &[String],
) -> Result<(DeploymentReceipt, ContractRecord), DeployError> {
    let creation_code = artifact.creation_code(constructor_args)?;

    tracing::info!(
        network = %network.network_name,
        contract = artifact.contract_name.as_deref().unwrap_or("<unnamed>"),
        args = ?constructor_args,
        "Deploying contract..."
    );

    let receipt = deployer.deploy(creation_code).await?;

    tracing::info!(
        address = %receipt.address,
        block = receipt.block_number,
        tx_hash = %receipt.tx_hash,
        "Contract deployed"
    );

    let explorer_url = network.explorer_address_url(&receipt.address);

    let record = ContractRecord {
        abi: Some(artifact.abi.clone()),
        bytecode: Some(artifact.bytecode.clone()),
        address: Some(receipt.address),
        block_number: Some(receipt.block_number),
        explorer_url: Some(explorer_url),
        extra: Default::default(),
    };

    Ok((receipt, record))
}
