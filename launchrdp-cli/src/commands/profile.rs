//! Profile generation command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{create_service, find_host, find_user};

/// Profile command handler; prints the path of the written profile
pub fn cmd_profile(config_path: Option<&Path>, host: &str, user: Option<&str>) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let host = find_host(&hosts, host)?;
    let user_id = match user {
        Some(user) => Some(find_user(&service.users()?, user)?.id.clone()),
        None => None,
    };

    let path = service.generate_profile(&host.id, user_id.as_deref())?;
    println!("{}", path.display());
    Ok(())
}
