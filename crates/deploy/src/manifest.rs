//! Per-network deployment manifest (`<network>_deployed.json`).

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use alloy_core::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ManifestError;

/// Contracts every fresh manifest starts with.
pub const SKELETON_CONTRACTS: [&str; 2] = ["hblock", "staking"];

/// Deployment metadata of one contract. Every field is absent until the
/// contract has been deployed, so a placeholder serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(rename = "block", default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// Fields written by other tools, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContractRecord {
    pub fn is_deployed(&self) -> bool {
        self.address.is_some()
    }
}

/// Every deployment recorded for one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    #[serde(rename = "chainId", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentManifest {
    /// An empty manifest with placeholder entries for the known contracts.
    pub fn skeleton(chain_id: Option<u64>) -> Self {
        Self {
            chain_id,
            contracts: SKELETON_CONTRACTS
                .iter()
                .map(|name| (name.to_string(), ContractRecord::default()))
                .collect(),
            extra: Map::new(),
        }
    }

    /// Overwrite the deployment fields of `name`, leaving any other field of
    /// that entry and every other entry untouched.
    pub fn merge_record(&mut self, name: &str, record: ContractRecord) {
        let entry = self.contracts.entry(name.to_string()).or_default();
        entry.abi = record.abi;
        entry.bytecode = record.bytecode;
        entry.address = record.address;
        entry.block_number = record.block_number;
        entry.explorer_url = record.explorer_url;
        entry.extra.extend(record.extra);
    }

    pub fn contract(&self, name: &str) -> Option<&ContractRecord> {
        self.contracts.get(name)
    }
}

/// Reads and writes the manifest file of one network.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl AsRef<Path>, network_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(Self::file_name(network_name)),
        }
    }

    pub fn file_name(network_name: &str) -> String {
        format!("{network_name}_deployed.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest. `Ok(None)` means no manifest exists yet.
    pub fn load(&self) -> Result<Option<DeploymentManifest>, ManifestError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ManifestError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ManifestError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Load the manifest, falling back to the skeleton when it is missing or
    /// unreadable.
    pub fn load_or_skeleton(&self, chain_id: Option<u64>) -> DeploymentManifest {
        match self.load() {
            Ok(Some(manifest)) => {
                tracing::debug!(path = %self.path.display(), "Existing manifest loaded");
                manifest
            }
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "No manifest found, starting a new one");
                DeploymentManifest::skeleton(chain_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Manifest unreadable, starting a new one");
                DeploymentManifest::skeleton(chain_id)
            }
        }
    }

    /// Write the full manifest as tab-indented JSON, replacing the previous file.
    ///
    /// The content goes to a sibling temporary file first and is renamed over the
    /// target. There is no locking: the last writer wins.
    pub fn persist(&self, manifest: &DeploymentManifest) -> Result<(), ManifestError> {
        let mut content = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
        manifest
            .serialize(&mut serializer)
            .map_err(ManifestError::Serialize)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content).map_err(|source| ManifestError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), "Manifest saved");
        Ok(())
    }
}
