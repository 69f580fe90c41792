//! Compiled contract artifacts and constructor argument encoding.

use std::path::Path;

use alloy_core::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ArtifactError, ConfigurationError};

/// ABI and creation bytecode of a contract, as emitted by the compiler.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    /// Kept verbatim so the manifest stores exactly what the compiler produced.
    pub abi: Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load_from_file(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: Self = serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if artifact.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode);
        }

        tracing::debug!(
            path = %path.display(),
            contract = ?artifact.contract_name,
            bytecode_len = artifact.bytecode.len(),
            "Artifact loaded"
        );
        Ok(artifact)
    }

    /// ABI-encode string arguments against the constructor's parameter types.
    pub fn encode_constructor_args(&self, args: &[String]) -> Result<Bytes, ConfigurationError> {
        let abi: JsonAbi = serde_json::from_value(self.abi.clone())
            .map_err(|e| ConfigurationError::ConstructorArgs(format!("unreadable ABI: {e}")))?;

        let Some(constructor) = abi.constructor() else {
            if args.is_empty() {
                return Ok(Bytes::new());
            }
            return Err(ConfigurationError::ConstructorArgs(format!(
                "contract has no constructor but {} argument(s) were given",
                args.len()
            )));
        };

        if constructor.inputs.len() != args.len() {
            return Err(ConfigurationError::ConstructorArgs(format!(
                "constructor expects {} argument(s), got {}",
                constructor.inputs.len(),
                args.len()
            )));
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ConfigurationError::ConstructorArgs(e.to_string()))?;
                ty.coerce_str(arg).map_err(|e| {
                    ConfigurationError::ConstructorArgs(format!("argument '{}': {e}", param.name))
                })
            })
            .collect::<Result<Vec<DynSolValue>, _>>()?;

        constructor
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ConfigurationError::ConstructorArgs(e.to_string()))
    }

    /// Creation code: bytecode followed by the encoded constructor arguments.
    pub fn creation_code(&self, args: &[String]) -> Result<Bytes, ConfigurationError> {
        let encoded = self.encode_constructor_args(args)?;
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded);
        Ok(code.into())
    }
}
