//! Windows Credential Manager backend

use secrecy::SecretString;

use super::{CredentialRequest, CredentialVault, target_name};
use crate::error::{PlatformError, VaultError, VaultResult};
use crate::platform::{Script, ScriptOutput, run_script};

/// `ERROR_NOT_FOUND`, reported by `CredDelete` for a missing target
const ERROR_NOT_FOUND: i32 = 1168;

/// Writes domain-password entries persisted for the local machine
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialManagerVault;

impl CredentialManagerVault {
    /// Creates the backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn unavailable(err: PlatformError) -> VaultError {
    VaultError::Unavailable {
        code: None,
        message: err.to_string(),
    }
}

fn failed(operation: &str, output: &ScriptOutput) -> VaultError {
    VaultError::Unavailable {
        code: output.code,
        message: format!("{operation} failed: {}", output.error_message()),
    }
}

impl CredentialVault for CredentialManagerVault {
    fn store(&self, address: &str, username: &str, secret: &SecretString) -> VaultResult<()> {
        let request = CredentialRequest::new(address, username, secret)?;
        let output = run_script(
            Script::CredentialManager,
            "store",
            &[
                request.target.as_bytes(),
                request.username.as_bytes(),
                request.secret_blob(),
            ],
        )
        .map_err(unavailable)?;

        if !output.success() {
            return Err(failed("CredWrite", &output));
        }
        tracing::debug!(target_name = %request.target, "Credential stored");
        Ok(())
    }

    fn delete(&self, address: &str) -> VaultResult<()> {
        if address.is_empty() {
            return Err(VaultError::InvalidInput("address"));
        }
        let target = target_name(address);
        let output = run_script(Script::CredentialManager, "delete", &[target.as_bytes()])
            .map_err(unavailable)?;

        match output.code {
            Some(0) => {
                tracing::debug!(target_name = %target, "Credential deleted");
                Ok(())
            }
            Some(ERROR_NOT_FOUND) => Err(VaultError::NotFound(target)),
            _ => Err(failed("CredDelete", &output)),
        }
    }
}
