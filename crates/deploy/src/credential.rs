//! Signing credential of the deployer.

use std::fmt;

use alloy_core::primitives::Address;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::ConfigurationError, network::Network, settings::Settings};

/// Word counts accepted for a BIP-39 phrase.
const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Accounts as written in the host settings: a list of raw keys or a mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountsConfig {
    Keys(Vec<String>),
    Mnemonic { mnemonic: String },
}

/// The shape of the configured wallet secret, decided once when parsing.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSecret {
    RawKey([u8; 32]),
    Mnemonic(String),
}

impl fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletSecret::RawKey(_) => f.write_str("RawKey(<redacted>)"),
            WalletSecret::Mnemonic(_) => f.write_str("Mnemonic(<redacted>)"),
        }
    }
}

impl WalletSecret {
    /// Classify a secret string: 64 hex characters is a raw key, a phrase of
    /// 12 to 24 words is a mnemonic, anything else is rejected.
    pub fn parse(secret: &str) -> Result<Self, ConfigurationError> {
        let secret = secret.trim();
        let hex_part = secret.strip_prefix("0x").unwrap_or(secret);

        if hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            let bytes: [u8; 32] = hex::decode(hex_part)
                .map_err(|e| ConfigurationError::InvalidKey(e.to_string()))?
                .try_into()
                .map_err(|_| ConfigurationError::InvalidKey("private key must be 32 bytes".into()))?;
            return Ok(Self::RawKey(bytes));
        }

        let words: Vec<&str> = secret.split_whitespace().collect();
        if MNEMONIC_WORD_COUNTS.contains(&words.len()) {
            return Ok(Self::Mnemonic(words.join(" ")));
        }

        Err(ConfigurationError::UnrecognizedSecret)
    }

    /// Classify the accounts entry of a network. Exactly one raw key is allowed.
    pub fn from_accounts(accounts: &AccountsConfig) -> Result<Self, ConfigurationError> {
        match accounts {
            AccountsConfig::Keys(keys) if keys.len() > 1 => {
                Err(ConfigurationError::MultipleKeys(keys.len()))
            }
            AccountsConfig::Keys(keys) => match keys.first() {
                Some(key) => match Self::parse(key)? {
                    raw @ Self::RawKey(_) => Ok(raw),
                    Self::Mnemonic(_) => Err(ConfigurationError::UnrecognizedSecret),
                },
                None => Err(ConfigurationError::UnrecognizedSecret),
            },
            AccountsConfig::Mnemonic { mnemonic } => Ok(Self::Mnemonic(mnemonic.trim().to_string())),
        }
    }

    /// Take the secret from the settings, preferring explicit accounts.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        if let Some(accounts) = &settings.accounts {
            return Self::from_accounts(accounts);
        }
        match settings.wallet_secret.as_deref() {
            Some(secret) => Self::parse(secret),
            None => Err(ConfigurationError::MissingSecret),
        }
    }

    /// Derive the signing key. Mnemonics use the first account of the default
    /// Ethereum derivation path.
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigurationError> {
        match self {
            WalletSecret::RawKey(bytes) => {
                let signing_key = SigningKey::from_bytes(&(*bytes).into())
                    .map_err(|e| ConfigurationError::InvalidKey(format!("invalid secp256k1 private key: {e}")))?;
                Ok(PrivateKeySigner::from_signing_key(signing_key))
            }
            WalletSecret::Mnemonic(phrase) => MnemonicBuilder::<English>::default()
                .phrase(phrase.as_str())
                .build()
                .map_err(|e| ConfigurationError::InvalidKey(format!("invalid mnemonic: {e}"))),
        }
    }
}

/// A signing key bound to the RPC endpoint of the target network.
#[derive(Debug, Clone)]
pub struct Credential {
    signer: PrivateKeySigner,
    rpc_url: Url,
}

impl Credential {
    /// Derive the signer and bind it to the endpoint the network maps to.
    pub fn new(
        secret: &WalletSecret,
        network: &Network,
        settings: &Settings,
    ) -> Result<Self, ConfigurationError> {
        let signer = secret.signer()?;
        let rpc_url = network.rpc_source().resolve(network, settings)?;

        tracing::debug!(
            address = %signer.address(),
            network = %network,
            source = ?network.rpc_source(),
            "Credential bound to RPC endpoint"
        );

        Ok(Self { signer, rpc_url })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}
