use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;
mod tui;

use crate::commands::CommandContext;
use crate::config::RolegateConfig;
use crate::tui::run_tui;
use anyhow::Result;

/// CLI for the rolegate RBAC administration console
#[derive(Parser, Debug)]
#[command(name = "rolegate", about = "Role-based access control administration")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory location (overrides $ROLEGATE_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Backend base URL (overrides $ROLEGATE_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level or filter directive; $RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for permission management
#[derive(Subcommand, Debug)]
#[command(about = "Manage permissions")]
pub enum PermissionCommands {
    /// List permissions, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a permission
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit a permission's name or description
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a permission
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Subcommands for role management
#[derive(Subcommand, Debug)]
#[command(about = "Manage roles and their permissions")]
pub enum RoleCommands {
    /// List roles with their permissions
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a role with a set of permission ids
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Permission id to grant (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
        /// Grant every permission whose name matches this search
        #[arg(long)]
        all_matching: Option<String>,
    },
    /// Edit a role; the resulting permission set replaces the old one
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Permission id to add (repeatable)
        #[arg(long = "grant")]
        grant: Vec<String>,
        /// Permission id to remove (repeatable)
        #[arg(long = "revoke")]
        revoke: Vec<String>,
        /// Drop every permission before applying grants
        #[arg(long)]
        clear: bool,
    },
    /// Delete a role
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Subcommands for employee role assignment
#[derive(Subcommand, Debug)]
#[command(about = "Inspect employees and assign roles")]
pub enum EmployeeCommands {
    /// List employees
    List {
        /// Match against name, email or employee code
        #[arg(long)]
        search: Option<String>,
        /// Role id to filter by, or `no-role` (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Assign a single role to an employee
    Assign {
        employee_id: String,
        /// Role id; omit to clear the assignment
        #[arg(long)]
        role: Option<String>,
    },
    /// Remove the employee's current role
    RemoveRole {
        employee_id: String,
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
}

/// Subcommands for the audit log
#[derive(Subcommand, Debug)]
#[command(about = "Review the audit log")]
pub enum AuditCommands {
    /// List audit records, newest first
    List {
        /// Action kind (CREATE, EDIT, DELETE, BULK_IMPORT, ...)
        #[arg(long)]
        action: Option<String>,
        /// Page or feature name
        #[arg(long)]
        page_name: Option<String>,
        /// Earliest timestamp (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Latest timestamp (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: Option<String>,
        /// Local page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show action counts
    Stats,
    /// List page names that appear in the log
    Pages,
}

/// Subcommands for configuration inspection and update
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or update CLI configuration")]
pub enum ConfigCommands {
    /// Show current effective configuration
    Show,
    /// Update a configuration key to a new value
    Set { key: String, value: String },
}

/// Top-level commands for rolegate
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive dashboard
    Run,

    /// Sign in and store the service credential
    Login {
        /// Federated identity token (JWT) to exchange
        #[arg(long, conflicts_with_all = ["email", "password"])]
        federated_token: Option<String>,
        #[arg(long, requires = "password")]
        email: Option<String>,
        #[arg(long, requires = "email")]
        password: Option<String>,
    },

    /// Store an admin session token
    AdminLogin {
        #[arg(long)]
        token: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out and forget every stored credential
    Logout,

    /// Show the stored identities and permissions
    Whoami,

    /// Manage permissions
    Permissions {
        #[command(subcommand)]
        command: PermissionCommands,
    },

    /// Manage roles
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Manage employee role assignments
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },

    /// Review the audit log
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },

    /// Inspect or update configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = RolegateConfig::resolve_config(cli.config.clone(), cli.data_dir, cli.base_url)?;

    // The dashboard owns the terminal, so its logs go to a file
    match cli.command {
        Commands::Run => logging::init_file(&cli.log_level, &config.data_dir.join(logging::LOG_FILE))?,
        _ => logging::init_stderr(&cli.log_level),
    }

    // Create command context
    let ctx = CommandContext::new(config, cli.config)?;

    // Dispatch commands
    match cli.command {
        Commands::Run => {
            run_tui(ctx)?;
        }
        Commands::Login {
            federated_token,
            email,
            password,
        } => {
            commands::session::login(&ctx, federated_token, email, password)?;
        }
        Commands::AdminLogin { token, id, name, email } => {
            commands::session::admin_login(&ctx, token, id, name, email)?;
        }
        Commands::Logout => {
            commands::session::logout(&ctx)?;
        }
        Commands::Whoami => {
            commands::session::whoami(&ctx)?;
        }
        Commands::Permissions { command } => {
            commands::permissions::handle_permission_command(&ctx, command)?;
        }
        Commands::Roles { command } => {
            commands::roles::handle_role_command(&ctx, command)?;
        }
        Commands::Employees { command } => {
            commands::employees::handle_employee_command(&ctx, command)?;
        }
        Commands::Audit { command } => {
            commands::audit::handle_audit_command(&ctx, command)?;
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(&ctx, command)?;
        }
    }

    Ok(())
}
