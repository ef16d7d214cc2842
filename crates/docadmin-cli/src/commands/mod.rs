//! Console command definitions and dispatch.

pub mod audit;
pub mod documents;
pub mod health;
pub mod library;
pub mod news;
pub mod session;
pub mod users;

use clap::{Parser, Subcommand, ValueEnum};

use docadmin_core::config::AppConfig;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::types::SortDirection;
use docadmin_view::{DatePreset, ViewModel, ViewRecord};

use crate::context::{CONSOLE_PATH, Console};
use crate::output::{self, OutputFormat};

/// DocAdmin: document platform administration console
#[derive(Debug, Parser)]
#[command(name = "docadmin", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml` overlay)
    #[arg(short, long, env = "DOCADMIN_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login(session::LoginArgs),
    /// Create an account and sign in
    Signup(session::SignupArgs),
    /// Sign out and clear local session state
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update the signed-in account's profile
    Profile(session::ProfileArgs),
    /// Stored documents
    Documents(documents::DocumentsArgs),
    /// User administration
    Users(users::UsersArgs),
    /// Public library
    Library(library::LibraryArgs),
    /// Audit trail
    Audit(audit::AuditArgs),
    /// News items
    News(news::NewsArgs),
    /// Probe the API
    Health,
}

impl Cli {
    /// Execute the command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        if let Commands::News(args) = &self.command {
            return news::execute(args, self.format);
        }

        let start_path = self.start_path(&config);
        let console = Console::open(config, &start_path).await?;
        let result = match &self.command {
            Commands::Login(args) => session::login(args, &console).await,
            Commands::Signup(args) => session::signup(args, &console).await,
            Commands::Logout => session::logout(&console).await,
            Commands::Whoami => session::whoami(&console, self.format).await,
            Commands::Profile(args) => session::profile(args, &console, self.format).await,
            Commands::Documents(args) => documents::execute(args, &console, self.format).await,
            Commands::Users(args) => users::execute(args, &console, self.format).await,
            Commands::Library(args) => library::execute(args, &console, self.format).await,
            Commands::Audit(args) => audit::execute(args, &console, self.format).await,
            Commands::Health => health::execute(&console).await,
            Commands::News(_) => Ok(()),
        };
        console.close().await;
        result
    }
}

impl Cli {
    /// Where the console is while the command runs: sign-in commands are
    /// already at the sign-in entry point.
    fn start_path(&self, config: &AppConfig) -> String {
        match self.command {
            Commands::Login(_) | Commands::Signup(_) | Commands::Logout => {
                config.api.sign_in_path.clone()
            }
            _ => CONSOLE_PATH.to_string(),
        }
    }
}

/// Load configuration for `env`.
pub fn load_config(env: &str) -> AppResult<AppConfig> {
    AppConfig::load(env)
}

/// Relative date window accepted by list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Since {
    #[value(name = "1h")]
    LastHour,
    #[value(name = "24h")]
    LastDay,
    #[value(name = "7d")]
    LastWeek,
    #[value(name = "30d")]
    LastMonth,
    All,
}

impl From<Since> for DatePreset {
    fn from(since: Since) -> Self {
        match since {
            Since::LastHour => DatePreset::LastHour,
            Since::LastDay => DatePreset::LastDay,
            Since::LastWeek => DatePreset::LastWeek,
            Since::LastMonth => DatePreset::LastMonth,
            Since::All => DatePreset::All,
        }
    }
}

/// Ask for confirmation unless `yes` was passed.
pub fn confirm(prompt: &str, yes: bool) -> AppResult<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))
}

/// Read a password from the terminal without echo.
pub fn prompt_password(prompt: &str) -> AppResult<String> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))
}

/// Sort direction flag shared by list commands.
pub fn direction(descending: bool) -> SortDirection {
    if descending {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

/// Print and clear the view's pending notice.
pub fn show_notice<R: ViewRecord>(view: &mut ViewModel<R>) {
    if let Some(notice) = view.take_notice() {
        output::print_warning(&notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_export_arguments() {
        let cli = Cli::try_parse_from([
            "docadmin", "audit", "export", "--type", "SECURITY_EVENT", "--severity", "critical",
            "--since", "24h",
        ])
        .unwrap();
        let Commands::Audit(args) = cli.command else {
            panic!("expected audit command");
        };
        let audit::AuditCommand::Export { filter, output } = args.command else {
            panic!("expected export");
        };
        assert_eq!(filter.event_type, "SECURITY_EVENT");
        assert_eq!(filter.severity, "critical");
        assert_eq!(DatePreset::from(filter.since), DatePreset::LastDay);
        assert!(output.is_none());
    }

    #[test]
    fn test_sign_in_commands_start_at_sign_in_path() {
        let config = AppConfig::default();
        let login = Cli::try_parse_from(["docadmin", "login", "ana@muni.gob"]).unwrap();
        assert_eq!(login.start_path(&config), config.api.sign_in_path);

        let logout = Cli::try_parse_from(["docadmin", "logout"]).unwrap();
        assert_eq!(logout.start_path(&config), config.api.sign_in_path);

        let users = Cli::try_parse_from(["docadmin", "users", "list"]).unwrap();
        assert_eq!(users.start_path(&config), CONSOLE_PATH);
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::try_parse_from(["docadmin", "users", "list", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_library_delete_requires_a_target() {
        assert!(Cli::try_parse_from(["docadmin", "library", "delete"]).is_err());
        assert!(Cli::try_parse_from(["docadmin", "library", "delete", "--id", "d1"]).is_ok());
    }
}
