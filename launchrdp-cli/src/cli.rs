//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// `LaunchRDP` command-line interface for Remote Desktop hosts and logins
#[derive(Parser)]
#[command(name = "launchrdp")]
#[command(author, version, about = "LaunchRDP command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "LAUNCHRDP_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage stored users
    #[command(subcommand, about = "Manage stored users and their passwords")]
    User(UserCommands),

    /// Manage stored hosts
    #[command(subcommand, about = "Manage Remote Desktop hosts")]
    Host(HostCommands),

    /// Open a session, reusing an open window for the same host
    #[command(about = "Open or re-activate a Remote Desktop session")]
    Launch {
        /// Host name or ID
        host: String,

        /// Connect as this user instead of the assigned one
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Write the connection profile for a host without launching
    #[command(about = "Generate the .rdp profile for a host")]
    Profile {
        /// Host name or ID
        host: String,

        /// Build the profile for this user instead of the assigned one
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Remove generated connection profiles
    #[command(about = "Delete generated .rdp profiles")]
    Cleanup,

    /// Manage settings and directories
    #[command(subcommand, about = "Create or show the settings file")]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users
    #[command(about = "List stored users")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add a user
    #[command(about = "Add a user")]
    Add {
        /// Logon name (`user`, `DOMAIN\user` or `user@domain`)
        username: String,

        /// Informational login name
        #[arg(long, default_value = "")]
        login: String,

        /// Informational domain name
        #[arg(long, default_value = "")]
        domain: String,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Update a user
    #[command(about = "Update a user and resync its hosts' credentials")]
    Update {
        /// User name or ID
        user: String,

        /// New logon name
        #[arg(long)]
        username: Option<String>,

        /// New login name
        #[arg(long)]
        login: Option<String>,

        /// New domain name
        #[arg(long)]
        domain: Option<String>,

        #[command(flatten)]
        password: PasswordArgs,

        /// Remove the stored password
        #[arg(long, conflicts_with_all = ["ask_password", "password_stdin"])]
        clear_password: bool,
    },

    /// Delete a user
    #[command(about = "Delete a user and unassign its hosts")]
    Delete {
        /// User name or ID
        user: String,
    },
}

/// How a new password is supplied; it is never taken from argv
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct PasswordArgs {
    /// Prompt for the password without echo
    #[arg(short = 'p', long = "ask-password")]
    pub ask_password: bool,

    /// Read the password from standard input
    #[arg(long, conflicts_with = "ask_password")]
    pub password_stdin: bool,
}

/// Host subcommands
#[derive(Subcommand)]
pub enum HostCommands {
    /// List all hosts
    #[command(about = "List stored hosts")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show host details
    #[command(about = "Show host details")]
    Show {
        /// Host name or ID
        host: String,
    },

    /// Add a host
    #[command(about = "Add a host")]
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Host name or IP address
        #[arg(short = 'H', long)]
        address: String,

        /// Assigned user name or ID
        #[arg(short, long)]
        user: Option<String>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Update a host
    #[command(about = "Update a host and move its stored credential")]
    Update {
        /// Host name or ID
        host: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New host name or IP address
        #[arg(short = 'H', long)]
        address: Option<String>,

        /// New assigned user name or ID
        #[arg(short, long, conflicts_with = "no_user")]
        user: Option<String>,

        /// Remove the assigned user
        #[arg(long)]
        no_user: bool,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Delete a host
    #[command(about = "Delete a host and its stored credential")]
    Delete {
        /// Host name or ID
        host: String,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create the directories and a default settings file
    #[command(about = "Write a default settings.toml")]
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Show directories and effective settings
    #[command(about = "Show directories and effective settings as JSON")]
    Show,
}

/// Port and presentation options shared by `host add` and `host update`
#[derive(Args, Clone, Debug, Default)]
pub struct DisplayArgs {
    /// RDP port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Display mode
    #[arg(long, value_enum)]
    pub mode: Option<DisplayModeArg>,

    /// Outer window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Outer window height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Window left edge
    #[arg(long = "pos-x", allow_hyphen_values = true)]
    pub x: Option<i32>,

    /// Window top edge
    #[arg(long = "pos-y", allow_hyphen_values = true)]
    pub y: Option<i32>,

    /// Share the clipboard with the session
    #[arg(long)]
    pub clipboard: Option<bool>,

    /// Share all local drives with the session
    #[arg(long)]
    pub drives: Option<bool>,
}

/// Display mode argument
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DisplayModeArg {
    /// Fixed-size window
    Window,
    /// Full screen across all monitors
    Fullscreen,
}
