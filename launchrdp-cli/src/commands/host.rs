//! Host management commands.

use std::fmt::Write as _;
use std::path::Path;

use launchrdp_core::models::{DisplayMode, Host, HostSettings, User};

use crate::cli::{DisplayArgs, DisplayModeArg, HostCommands, OutputFormat};
use crate::error::CliError;
use crate::util::{create_service, find_host, find_user, report_sync};

/// Host command handler
pub fn cmd_host(config_path: Option<&Path>, subcmd: HostCommands) -> Result<(), CliError> {
    match subcmd {
        HostCommands::List { format } => cmd_host_list(config_path, format),
        HostCommands::Show { host } => cmd_host_show(config_path, &host),
        HostCommands::Add {
            name,
            address,
            user,
            display,
        } => cmd_host_add(config_path, name, address, user.as_deref(), &display),
        HostCommands::Update {
            host,
            name,
            address,
            user,
            no_user,
            display,
        } => cmd_host_update(
            config_path,
            &host,
            HostEdits {
                name,
                address,
                user,
                no_user,
                display,
            },
        ),
        HostCommands::Delete { host } => cmd_host_delete(config_path, &host),
    }
}

/// Fields changed by `host update`; `None` keeps the stored value
struct HostEdits {
    name: Option<String>,
    address: Option<String>,
    user: Option<String>,
    no_user: bool,
    display: DisplayArgs,
}

impl From<DisplayModeArg> for DisplayMode {
    fn from(mode: DisplayModeArg) -> Self {
        match mode {
            DisplayModeArg::Window => Self::Window,
            DisplayModeArg::Fullscreen => Self::Fullscreen,
        }
    }
}

/// Overlays the given display options on `settings`
fn apply_display(settings: &mut HostSettings, display: &DisplayArgs) {
    if let Some(port) = display.port {
        settings.port = port;
    }
    if let Some(mode) = display.mode {
        settings.display_mode = mode.into();
    }
    if let Some(width) = display.width {
        settings.window_width = width;
    }
    if let Some(height) = display.height {
        settings.window_height = height;
    }
    if let Some(x) = display.x {
        settings.position_x = x;
    }
    if let Some(y) = display.y {
        settings.position_y = y;
    }
    if let Some(clipboard) = display.clipboard {
        settings.redirect_clipboard = clipboard;
    }
    if let Some(drives) = display.drives {
        settings.redirect_drives = drives;
    }
}

fn cmd_host_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let users = service.users()?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&hosts, &users)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&hosts)
                .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn cmd_host_show(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let host = find_host(&hosts, name)?;
    let users = service.users()?;

    println!("Host Details:");
    println!("  ID:        {}", host.id);
    println!("  Name:      {}", host.name);
    println!("  Address:   {}", host.address);
    println!("  Port:      {}", host.port);
    println!("  User:      {}", assigned_username(host, &users));
    println!("  Display:   {}", host.display_mode);
    println!(
        "  Window:    {}x{} at ({}, {})",
        host.window_width, host.window_height, host.position_x, host.position_y
    );
    println!(
        "  Desktop:   {}x{}",
        host.desktop_width, host.desktop_height
    );
    println!("  Clipboard: {}", yes_no(host.redirect_clipboard));
    println!("  Drives:    {}", yes_no(host.redirect_drives));
    println!("  Created:   {}", host.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Modified:  {}", host.modified_at.format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}

fn cmd_host_add(
    config_path: Option<&Path>,
    name: String,
    address: String,
    user: Option<&str>,
    display: &DisplayArgs,
) -> Result<(), CliError> {
    let service = create_service(config_path)?;

    let mut settings = HostSettings::new(name, address);
    if let Some(user) = user {
        let users = service.users()?;
        settings = settings.with_user(find_user(&users, user)?.id.clone());
    }
    apply_display(&mut settings, display);

    let outcome = service.create_host(settings)?;
    report_sync(&outcome.sync);
    println!(
        "Created host '{}' (ID: {})",
        outcome.host.name, outcome.host.id
    );
    Ok(())
}

fn cmd_host_update(config_path: Option<&Path>, name: &str, edits: HostEdits) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let host = find_host(&hosts, name)?;

    let mut settings = HostSettings::from_host(host);
    if let Some(name) = edits.name {
        settings.name = name;
    }
    if let Some(address) = edits.address {
        settings.address = address;
    }
    if edits.no_user {
        settings.user_id = None;
    } else if let Some(user) = edits.user {
        let users = service.users()?;
        settings.user_id = Some(find_user(&users, &user)?.id.clone());
    }
    apply_display(&mut settings, &edits.display);

    let outcome = service.update_host(&host.id, settings)?;
    report_sync(&outcome.sync);
    println!(
        "Updated host '{}' (ID: {})",
        outcome.host.name, outcome.host.id
    );
    Ok(())
}

fn cmd_host_delete(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let service = create_service(config_path)?;
    let hosts = service.hosts()?;
    let host = find_host(&hosts, name)?;

    let report = service.delete_host(&host.id)?;
    report_sync(&report);
    println!("Deleted host '{}' (ID: {})", host.name, host.id);
    Ok(())
}

fn assigned_username<'a>(host: &Host, users: &'a [User]) -> &'a str {
    host.user_id
        .as_deref()
        .and_then(|id| users.iter().find(|u| u.id == id))
        .map_or("-", |u| u.username.as_str())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Format hosts as a table string
#[must_use]
pub fn format_table(hosts: &[Host], users: &[User]) -> String {
    if hosts.is_empty() {
        return "No hosts found.".to_string();
    }

    let name_width = hosts
        .iter()
        .map(|h| h.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let address_width = hosts
        .iter()
        .map(|h| h.address.len())
        .max()
        .unwrap_or(7)
        .max(7);
    let user_width = hosts
        .iter()
        .map(|h| assigned_username(h, users).len())
        .max()
        .unwrap_or(4)
        .max(4);
    let port_width = 5;

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<name_width$}  {:<address_width$}  {:<port_width$}  {:<user_width$}  DISPLAY",
        "NAME", "ADDRESS", "PORT", "USER"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<address_width$}  {:-<port_width$}  {:-<user_width$}  {:-<10}",
        "", "", "", "", ""
    );
    for host in hosts {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<address_width$}  {:<port_width$}  {:<user_width$}  {}",
            host.name,
            host.address,
            host.port,
            assigned_username(host, users),
            host.display_mode
        );
    }

    output.trim_end().to_string()
}
