//! hblock deploys the HBLOCK token to the selected network, records it in
//! `<network>_deployed.json` and verifies its source when an explorer key is set.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use hblock_deploy::{
    ContractArtifact, ExternalCommand, RpcDeployer, RunContext, Settings, VerificationRunner,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Secrets may live in a .env file next to the settings.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    if let Some(network) = cli.network {
        settings.network = network;
    }

    let ctx = RunContext::from_settings(settings).context("Failed to resolve run context")?;

    let artifact = ContractArtifact::load_from_file(&ctx.settings.artifact)
        .context("Failed to load contract artifact")?;

    let deployer = RpcDeployer::connect(&ctx.credential);
    let verifier = VerificationRunner::new(
        ExternalCommand::new(&ctx.settings.verify_command)
            .context("Invalid verification command")?,
    );

    let summary = hblock_deploy::run(&ctx, &artifact, &deployer, &verifier)
        .await
        .context("Deployment failed")?;

    tracing::info!(
        contract = %summary.contract_name,
        address = %summary.receipt.address,
        block = summary.receipt.block_number,
        tx_hash = %summary.receipt.tx_hash,
        manifest = %summary.manifest_path.display(),
        verification = ?summary.verification,
        "✓ Deployment complete!"
    );
    if let Some(url) = summary
        .record
        .explorer_url
        .as_deref()
        .filter(|_| ctx.network.has_explorer())
    {
        tracing::info!("Explorer: {}", url);
    }

    Ok(())
}
