//! Launch command.

use std::path::Path;

use launchrdp_core::session::LaunchOutcome;

use crate::error::CliError;
use crate::util::{create_service, find_host, find_user};

/// Launch command handler
pub fn cmd_launch(config_path: Option<&Path>, host: &str, user: Option<&str>) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let host = find_host(&hosts, host)?;
    let user_id = match user {
        Some(user) => Some(find_user(&service.users()?, user)?.id.clone()),
        None => None,
    };

    match service.launch(&host.id, user_id.as_deref())? {
        LaunchOutcome::Reused { title, .. } => {
            println!("Activated open session '{title}'");
        }
        LaunchOutcome::Launched { pid, profile_path } => {
            println!(
                "Started session to {} (PID: {pid}, profile: {})",
                host.address,
                profile_path.display()
            );
        }
    }
    Ok(())
}
