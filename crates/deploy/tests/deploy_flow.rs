//! End-to-end deployment runs against in-process collaborators.
//!
//! The RPC provider and the verification tool are replaced by test doubles so
//! that the full run (context, deploy, manifest, verification) executes without
//! a node or network access.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use alloy_core::primitives::{Address, B256, Bytes};
use hblock_deploy::{
    ContractArtifact, ContractDeployer, DeployError, DeploymentReceipt, ManifestStore,
    NetworkError, RunContext, Settings, VerificationCommand, VerificationError,
    VerificationOutcome, VerificationRequest, VerificationRunner, run,
};
use serde_json::Value;
use tempdir::TempDir;

const WALLET_SECRET: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const DEPLOYER_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const RECEIPT_BLOCK: u64 = 41_887_002;

/// Answers every deployment with the same confirmed receipt.
struct StubDeployer {
    result: Result<DeploymentReceipt, String>,
    calls: AtomicUsize,
}

impl StubDeployer {
    fn confirmed() -> Self {
        Self {
            result: Ok(DeploymentReceipt {
                tx_hash: B256::repeat_byte(0x11),
                address: CONTRACT_ADDRESS.parse().unwrap(),
                block_number: RECEIPT_BLOCK,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ContractDeployer for StubDeployer {
    async fn deploy(&self, creation_code: Bytes) -> Result<DeploymentReceipt, NetworkError> {
        assert!(creation_code.starts_with(&[0x60, 0x80, 0x60, 0x40]));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(NetworkError::Rpc)
    }
}

/// Rewrites the manifest file while the deployment is in flight.
struct ManifestRewritingDeployer {
    manifest: PathBuf,
    inner: StubDeployer,
}

impl ContractDeployer for ManifestRewritingDeployer {
    async fn deploy(&self, creation_code: Bytes) -> Result<DeploymentReceipt, NetworkError> {
        let late = serde_json::json!({
            "chainId": 80001,
            "contracts": { "staking": { "block": 999 } }
        });
        std::fs::write(&self.manifest, late.to_string()).unwrap();
        self.inner.deploy(creation_code).await
    }
}

/// Returns canned stderr and remembers the requests it saw.
struct StubVerifier {
    stderr: &'static str,
    calls: AtomicUsize,
}

impl StubVerifier {
    fn new(stderr: &'static str) -> Self {
        Self {
            stderr,
            calls: AtomicUsize::new(0),
        }
    }
}

impl VerificationCommand for &StubVerifier {
    async fn run(&self, request: &VerificationRequest) -> Result<String, VerificationError> {
        assert_eq!(request.address, contract_address());
        assert_eq!(request.constructor_args, vec![DEPLOYER_ADDRESS.to_string()]);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stderr.to_string())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write_artifact(dir: &Path) -> ContractArtifact {
    let path = dir.join("HBLOCK.json");
    let artifact = serde_json::json!({
        "_format": "hh-sol-artifact-1",
        "contractName": "HBLOCK",
        "sourceName": "contracts/HBLOCK.sol",
        "abi": [
            {
                "type": "constructor",
                "inputs": [{ "name": "admin", "type": "address", "internalType": "address" }],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": "0x608060405234801561001057600080fd5b50",
        "deployedBytecode": "0x6080604052"
    });
    std::fs::write(&path, serde_json::to_string_pretty(&artifact).unwrap()).unwrap();
    ContractArtifact::load_from_file(&path).unwrap()
}

fn testnet_settings(manifest_dir: &Path) -> Settings {
    Settings {
        network: "testnet".into(),
        wallet_secret: Some(WALLET_SECRET.into()),
        rpc_token: Some("https://polygon-mumbai.example.io/v3/0123456789abcdef".into()),
        manifest_dir: manifest_dir.to_path_buf(),
        ..Settings::default()
    }
}

fn read_manifest(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn address_of(entry: &Value) -> Address {
    entry["address"].as_str().unwrap().parse().unwrap()
}

fn contract_address() -> Address {
    CONTRACT_ADDRESS.parse().unwrap()
}

#[tokio::test]
async fn test_first_deployment_to_testnet() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let ctx = RunContext::from_settings(testnet_settings(dir.path())).unwrap();
    let deployer = StubDeployer::confirmed();
    let verifier = StubVerifier::new("");

    let summary = run(&ctx, &artifact, &deployer, &VerificationRunner::new(&verifier))
        .await
        .unwrap();

    assert_eq!(summary.manifest_path, dir.path().join("testnet_deployed.json"));
    assert_eq!(summary.verification, None);
    assert_eq!(deployer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest["chainId"], 80001);
    assert_eq!(address_of(&manifest["contracts"]["hblock"]), contract_address());
    assert_eq!(manifest["contracts"]["hblock"]["block"], RECEIPT_BLOCK);
    assert_eq!(
        manifest["contracts"]["hblock"]["url"],
        format!("https://mumbai.polygonscan.com/address/{CONTRACT_ADDRESS}")
    );
    assert_eq!(
        manifest["contracts"]["hblock"]["bytecode"],
        "0x608060405234801561001057600080fd5b50"
    );
    assert_eq!(manifest["contracts"]["hblock"]["abi"], artifact.abi);
    assert_eq!(manifest["contracts"]["staking"], serde_json::json!({}));
}

#[tokio::test]
async fn test_redeploy_keeps_sibling_entries() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());

    let staking = serde_json::json!({
        "abi": [],
        "bytecode": "0x6001",
        "address": "0x0000000000000000000000000000000000000123",
        "block": 100,
        "url": "https://mumbai.polygonscan.com/address/0x0000000000000000000000000000000000000123"
    });
    std::fs::write(
        dir.path().join("testnet_deployed.json"),
        serde_json::to_string(&serde_json::json!({
            "chainId": 80001,
            "contracts": {
                "hblock": { "address": "0x0000000000000000000000000000000000000001", "block": 1 },
                "staking": staking
            }
        }))
        .unwrap(),
    )
    .unwrap();

    let ctx = RunContext::from_settings(testnet_settings(dir.path())).unwrap();
    let verifier = StubVerifier::new("");
    run(&ctx, &artifact, &StubDeployer::confirmed(), &VerificationRunner::new(&verifier))
        .await
        .unwrap();

    let manifest = read_manifest(&dir.path().join("testnet_deployed.json"));
    assert_eq!(manifest["contracts"]["staking"], staking);
    assert_eq!(address_of(&manifest["contracts"]["hblock"]), contract_address());
    assert_eq!(manifest["contracts"]["hblock"]["block"], RECEIPT_BLOCK);
}

#[tokio::test]
async fn test_manifest_is_read_before_deploying() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let manifest_path = dir.path().join("testnet_deployed.json");
    std::fs::write(&manifest_path, "{ \"chainId\": 80001, \"contracts\": ").unwrap();

    let ctx = RunContext::from_settings(testnet_settings(dir.path())).unwrap();
    let deployer = ManifestRewritingDeployer {
        manifest: manifest_path.clone(),
        inner: StubDeployer::confirmed(),
    };
    let verifier = StubVerifier::new("");
    run(&ctx, &artifact, &deployer, &VerificationRunner::new(&verifier))
        .await
        .unwrap();

    // The corrupt file was replaced by the skeleton before the deployment, so
    // the write made during the deployment does not leak into the result.
    let manifest = read_manifest(&manifest_path);
    assert_eq!(manifest["chainId"], 80001);
    assert_eq!(manifest["contracts"]["staking"], serde_json::json!({}));
    assert_eq!(address_of(&manifest["contracts"]["hblock"]), contract_address());
}

#[tokio::test]
async fn test_verification_runs_with_explorer_key() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let settings = Settings {
        testnet_etherscan_key: Some("EXPLORER-KEY".into()),
        ..testnet_settings(dir.path())
    };
    let ctx = RunContext::from_settings(settings).unwrap();
    let verifier = StubVerifier::new("Error in plugin: Contract source code Already Verified");

    let summary = run(&ctx, &artifact, &StubDeployer::confirmed(), &VerificationRunner::new(&verifier))
        .await
        .unwrap();

    assert_eq!(summary.verification, Some(VerificationOutcome::AlreadyVerified));
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_verification_failure_keeps_manifest() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let settings = Settings {
        mainnet_etherscan_key: Some("EXPLORER-KEY".into()),
        ..testnet_settings(dir.path())
    };
    let ctx = RunContext::from_settings(settings).unwrap();
    let verifier = StubVerifier::new("revert: bad arg");

    let err = run(&ctx, &artifact, &StubDeployer::confirmed(), &VerificationRunner::new(&verifier))
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Verification(VerificationError::Failed(_))));
    assert!(err.to_string().contains("revert: bad arg"));

    let manifest = read_manifest(ManifestStore::new(dir.path(), "testnet").path());
    assert_eq!(address_of(&manifest["contracts"]["hblock"]), contract_address());
}

#[tokio::test]
async fn test_failed_deployment_writes_nothing() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let ctx = RunContext::from_settings(testnet_settings(dir.path())).unwrap();
    let deployer = StubDeployer::failing("insufficient funds for gas * price + value");
    let verifier = StubVerifier::new("");

    let err = run(&ctx, &artifact, &deployer, &VerificationRunner::new(&verifier))
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Network(NetworkError::Rpc(_))));
    assert!(!dir.path().join("testnet_deployed.json").exists());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_local_network_stores_bare_address_path() {
    init_tracing();
    let dir = TempDir::new("hblock-deploy").unwrap();
    let artifact = write_artifact(dir.path());
    let settings = Settings {
        network: "localhost".into(),
        ..testnet_settings(dir.path())
    };
    let ctx = RunContext::from_settings(settings).unwrap();
    let verifier = StubVerifier::new("");

    run(&ctx, &artifact, &StubDeployer::confirmed(), &VerificationRunner::new(&verifier))
        .await
        .unwrap();

    let manifest = read_manifest(&dir.path().join("localhost_deployed.json"));
    assert_eq!(manifest["chainId"], 1);
    assert_eq!(
        manifest["contracts"]["hblock"]["url"],
        format!("address/{CONTRACT_ADDRESS}")
    );
}
