//! User management commands.

use std::fmt::Write as _;
use std::path::Path;

use launchrdp_core::models::User;
use launchrdp_core::service::{NewUser, SecretUpdate, UserUpdate};

use crate::cli::{OutputFormat, UserCommands};
use crate::error::CliError;
use crate::util::{create_service, find_user, read_password, report_sync};

/// User command handler
pub fn cmd_user(config_path: Option<&Path>, subcmd: UserCommands) -> Result<(), CliError> {
    match subcmd {
        UserCommands::List { format } => cmd_user_list(config_path, format),
        UserCommands::Add {
            username,
            login,
            domain,
            password,
        } => {
            let password = read_password(password, &username)?;
            let mut new_user = NewUser::new(username);
            new_user.login = login;
            new_user.domain = domain;
            if let Some(password) = password {
                new_user = new_user.with_password(password);
            }
            cmd_user_add(config_path, new_user)
        }
        UserCommands::Update {
            user,
            username,
            login,
            domain,
            password,
            clear_password,
        } => {
            let secret = if clear_password {
                SecretUpdate::Clear
            } else {
                read_password(password, &user)?.map_or(SecretUpdate::Unchanged, SecretUpdate::Set)
            };
            cmd_user_update(
                config_path,
                &user,
                UserEdits {
                    username,
                    login,
                    domain,
                    secret,
                },
            )
        }
        UserCommands::Delete { user } => cmd_user_delete(config_path, &user),
    }
}

/// Fields changed by `user update`; `None` keeps the stored value
struct UserEdits {
    username: Option<String>,
    login: Option<String>,
    domain: Option<String>,
    secret: SecretUpdate,
}

fn cmd_user_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let users = service.users()?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&users)),
        OutputFormat::Json => {
            let output: Vec<UserOutput> = users.iter().map(UserOutput::from).collect();
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn cmd_user_add(config_path: Option<&Path>, new_user: NewUser) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let user = service.create_user(new_user)?;
    println!("Created user '{}' (ID: {})", user.username, user.id);
    Ok(())
}

fn cmd_user_update(config_path: Option<&Path>, name: &str, edits: UserEdits) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let users = service.users()?;
    let user = find_user(&users, name)?;

    let mut update = UserUpdate::from_user(user).with_password(edits.secret);
    if let Some(username) = edits.username {
        update.username = username;
    }
    if let Some(login) = edits.login {
        update.login = login;
    }
    if let Some(domain) = edits.domain {
        update.domain = domain;
    }

    let outcome = service.update_user(&user.id, update)?;
    report_sync(&outcome.sync);
    println!(
        "Updated user '{}' ({} host credential(s) synced)",
        outcome.user.username, outcome.sync.success_count
    );
    Ok(())
}

fn cmd_user_delete(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let users = service.users()?;
    let user = find_user(&users, name)?;

    let report = service.delete_user(&user.id)?;
    report_sync(&report);
    println!("Deleted user '{}' (ID: {})", user.username, user.id);
    Ok(())
}

/// Format users as a table string
#[must_use]
pub fn format_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let name_width = users
        .iter()
        .map(|u| u.username.len())
        .max()
        .unwrap_or(8)
        .max(8);
    let domain_width = users
        .iter()
        .map(|u| u.domain.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<name_width$}  {:<domain_width$}  {:<8}  ID",
        "USERNAME", "DOMAIN", "PASSWORD"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<domain_width$}  {:-<8}  {:-<36}",
        "", "", "", ""
    );
    for user in users {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<domain_width$}  {:<8}  {}",
            user.username,
            user.domain,
            if user.has_secret() { "stored" } else { "-" },
            user.id
        );
    }

    output.trim_end().to_string()
}

/// User fields shown by the CLI; the password token is left out
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserOutput {
    pub id: String,
    pub username: String,
    pub login: String,
    pub domain: String,
    pub has_password: bool,
}

impl From<&User> for UserOutput {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            login: user.login.clone(),
            domain: user.domain.clone(),
            has_password: user.has_secret(),
        }
    }
}
