//! Source verification through an external block-explorer tool.

use std::{future::Future, process::Stdio, time::Duration};

use alloy_core::primitives::Address;
use tokio::process::Command;

use crate::error::{ConfigurationError, VerificationError};

/// Wall-clock bound on one verification command.
pub const VERIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Text the verification tool prints when the source is already registered.
pub const ALREADY_VERIFIED_MARKER: &str = "Already Verified";

/// What to verify and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    pub constructor_args: Vec<String>,
    pub network_name: String,
}

/// Successful verification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    AlreadyVerified,
    Verified,
}

/// Runs the verification tool and returns everything it wrote to stderr.
pub trait VerificationCommand {
    fn run(
        &self,
        request: &VerificationRequest,
    ) -> impl Future<Output = Result<String, VerificationError>> + Send;
}

/// Classify the captured stderr of a verification run.
pub fn classify(stderr: &str) -> Result<VerificationOutcome, VerificationError> {
    if stderr.contains(ALREADY_VERIFIED_MARKER) {
        Ok(VerificationOutcome::AlreadyVerified)
    } else if stderr.is_empty() {
        Ok(VerificationOutcome::Verified)
    } else {
        Err(VerificationError::Failed(stderr.to_string()))
    }
}

/// A subprocess invocation: `<program> <args..> <address> <constructor args..> --network <name>`.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalCommand {
    /// Build from a command line whose first element is the program.
    pub fn new(command: &[String]) -> Result<Self, ConfigurationError> {
        let (program, args) = command
            .split_first()
            .ok_or(ConfigurationError::EmptyVerifyCommand)?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: VERIFICATION_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn arguments(&self, request: &VerificationRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(request.address.to_string());
        args.extend(request.constructor_args.iter().cloned());
        args.push("--network".into());
        args.push(request.network_name.clone());
        args
    }
}

impl VerificationCommand for ExternalCommand {
    async fn run(&self, request: &VerificationRequest) -> Result<String, VerificationError> {
        let args = self.arguments(request);
        tracing::debug!(program = %self.program, args = ?args, "Running verification command");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| VerificationError::Timeout(self.timeout.as_secs()))?
            .map_err(|source| VerificationError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

/// Runs a [`VerificationCommand`] and turns its stderr into an outcome.
#[derive(Debug, Clone)]
pub struct VerificationRunner<C> {
    command: C,
}

impl<C: VerificationCommand> VerificationRunner<C> {
    pub fn new(command: C) -> Self {
        Self { command }
    }

    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        tracing::info!(address = %request.address, network = %request.network_name, "Verifying...");

        let stderr = self.command.run(request).await?;
        let outcome = classify(&stderr)?;

        match outcome {
            VerificationOutcome::AlreadyVerified => tracing::info!("Contract already verified"),
            VerificationOutcome::Verified => tracing::info!("Contract verified successfully"),
        }

        Ok(outcome)
    }
}
