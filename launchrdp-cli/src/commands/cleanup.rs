//! Profile cleanup command.

use std::path::Path;

use crate::error::CliError;
use crate::util::create_service;

/// Cleanup command handler
pub fn cmd_cleanup(config_path: Option<&Path>) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let removed = service.cleanup_profiles()?;
    println!("Removed {removed} profile(s)");
    Ok(())
}
