//! Launching sessions and generating profiles

use std::path::PathBuf;

use super::LaunchService;
use crate::error::{LaunchRdpError, LaunchRdpResult};
use crate::models::{Host, User};
use crate::session::LaunchOutcome;
use crate::tracing::span_names;

impl LaunchService {
    /// Activates an open session for the host or starts a new one
    ///
    /// `user_id` overrides the host's assigned user. The secret is not read:
    /// the client takes it from the vault entry written when the user or
    /// host was saved.
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound`, `NoUserAssigned`, `UserNotFound`, a store
    /// error, or a launch error.
    pub fn launch(&self, host_id: &str, user_id: Option<&str>) -> LaunchRdpResult<LaunchOutcome> {
        let (host, user) = self.resolve_target(host_id, user_id)?;
        Ok(self.launcher.launch(&host, &user)?)
    }

    /// Writes the host's connection profile without launching anything
    ///
    /// # Errors
    ///
    /// As for [`LaunchService::launch`].
    pub fn generate_profile(
        &self,
        host_id: &str,
        user_id: Option<&str>,
    ) -> LaunchRdpResult<PathBuf> {
        let _span =
            crate::trace_operation!(span_names::PROFILE_GENERATE, host_id = %host_id).entered();
        let (host, user) = self.resolve_target(host_id, user_id)?;
        Ok(self.launcher.write_profile(&host, &user)?)
    }

    /// Removes generated profiles, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns a launch error if the profile directory cannot be listed.
    pub fn cleanup_profiles(&self) -> LaunchRdpResult<usize> {
        Ok(self.launcher.cleanup_profiles()?)
    }

    fn resolve_target(&self, host_id: &str, user_id: Option<&str>) -> LaunchRdpResult<(Host, User)> {
        let host = self.host(host_id)?;
        let user_id = match user_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => host
                .user_id
                .clone()
                .ok_or_else(|| LaunchRdpError::NoUserAssigned(host.name.clone()))?,
        };
        let user = self.user(&user_id)?;
        Ok((host, user))
    }
}
