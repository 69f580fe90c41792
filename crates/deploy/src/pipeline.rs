//! The sequential deployment run: deploy, record, verify.

use std::path::PathBuf;

use crate::{
    artifact::ContractArtifact,
    context::RunContext,
    deployer::{ContractDeployer, DeploymentReceipt, deploy_contract},
    error::DeployError,
    manifest::ContractRecord,
    verify::{VerificationCommand, VerificationOutcome, VerificationRequest, VerificationRunner},
};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    pub contract_name: String,
    pub receipt: DeploymentReceipt,
    pub record: ContractRecord,
    pub manifest_path: PathBuf,
    /// `None` when verification was not enabled.
    pub verification: Option<VerificationOutcome>,
}

/// Run one deployment end to end.
///
/// Steps run strictly in order and the first error ends the run. A failure
/// after the deployment leaves the contract deployed; nothing is rolled back.
pub async fn run<D, V>(
    ctx: &RunContext,
    artifact: &ContractArtifact,
    deployer: &D,
    verifier: &VerificationRunner<V>,
) -> Result<DeploymentSummary, DeployError>
where
    D: ContractDeployer,
    V: VerificationCommand,
{
    let contract_name = ctx.settings.contract_name.clone();

    // Read before spending anything so a broken manifest is reported up front.
    let store = ctx.manifest_store();
    let mut manifest = store.load_or_skeleton(ctx.network.chain_id);

    let (receipt, record) =
        deploy_contract(deployer, &ctx.network, artifact, &ctx.constructor_args).await?;

    manifest.merge_record(&contract_name, record.clone());
    store.persist(&manifest)?;

    let verification = if ctx.verification_enabled() {
        let request = VerificationRequest {
            address: receipt.address,
            constructor_args: ctx.constructor_args.clone(),
            network_name: ctx.network.network_name.clone(),
        };
        Some(verifier.verify(&request).await?)
    } else {
        tracing::debug!("No explorer API key configured, skipping verification");
        None
    };

    Ok(DeploymentSummary {
        contract_name,
        receipt,
        record,
        manifest_path: store.path().to_path_buf(),
        verification,
    })
}
