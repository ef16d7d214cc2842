//! User administration commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use docadmin_client::UsersApi;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::types::SortSpec;
use docadmin_entity::user::{ChangePassword, User, UserForm, UserRole, UserStatus};
use docadmin_view::ViewModel;
use docadmin_view::domain::{UserFacet, UserSortKey, user_stats};

use crate::context::Console;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        /// Free-text filter on name, email and role
        #[arg(short, long)]
        query: Option<String>,
        /// Role filter
        #[arg(short, long, default_value = "all")]
        role: String,
        /// Status filter
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Sort field
        #[arg(long, value_enum)]
        sort: Option<UserSort>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Create a user
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// admin, secretaria or supervisor
        #[arg(long, default_value = "secretaria")]
        role: String,
        /// active or inactive
        #[arg(long, default_value = "active")]
        status: String,
        /// Initial password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Edit a user
    Update {
        /// User record id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a user
    Delete {
        /// User record id
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Set a new password for an account
    Passwd {
        /// Account email
        email: String,
        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UserSort {
    Name,
    Email,
    Role,
    Status,
}

impl From<UserSort> for UserSortKey {
    fn from(sort: UserSort) -> Self {
        match sort {
            UserSort::Name => Self::DisplayName,
            UserSort::Email => Self::Email,
            UserSort::Role => Self::Role,
            UserSort::Status => Self::Status,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    status: &'static str,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            status: user.status.as_str(),
        }
    }
}

pub async fn execute(args: &UsersArgs, console: &Console, format: OutputFormat) -> AppResult<()> {
    console.require_admin().await?;
    let api = UsersApi::new(console.client.clone());

    match &args.command {
        UsersCommand::List {
            query,
            role,
            status,
            sort,
            desc,
        } => {
            let mut view = ViewModel::<User>::new("users");
            view.apply_fetch(api.list().await);
            super::show_notice(&mut view);

            let filter = view.filter_mut();
            filter.set_query(query.clone().unwrap_or_default());
            filter.select(UserFacet::Role, role.as_str());
            filter.select(UserFacet::Status, status.as_str());
            if let Some(sort) = sort {
                filter.set_sort(SortSpec::new((*sort).into(), super::direction(*desc)));
            }

            let derived = view.derived();
            let rows: Vec<UserRow> = derived.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);

            if format == OutputFormat::Table {
                let stats = user_stats(&derived);
                println!(
                    "{} users, {} active, {} administrators",
                    stats.total, stats.active, stats.admins
                );
            }
        }
        UsersCommand::Create {
            name,
            email,
            role,
            status,
            password,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => super::prompt_password("Initial password")?,
            };
            let form = UserForm {
                display_name: name.clone(),
                email: email.clone(),
                role: role.parse()?,
                status: status.parse()?,
                password: Some(password),
            };
            api.create(&form).await?;
            output::print_success(&format!("User '{email}' created"));
        }
        UsersCommand::Update {
            id,
            name,
            email,
            role,
            status,
        } => {
            let users = api.list().await?;
            let user = users
                .iter()
                .find(|u| u.id == *id)
                .ok_or_else(|| AppError::not_found(format!("User '{id}' not found")))?;

            let mut form = UserForm::from_user(user);
            if let Some(name) = name {
                form.display_name = name.clone();
            }
            if let Some(email) = email {
                form.email = email.clone();
            }
            if let Some(role) = role {
                form.role = role.parse::<UserRole>()?;
            }
            if let Some(status) = status {
                form.status = status.parse::<UserStatus>()?;
            }
            api.update(id, &form).await?;
            output::print_success(&format!("User '{id}' updated"));
        }
        UsersCommand::Delete { id, yes } => {
            if !super::confirm(&format!("Delete user '{id}'?"), *yes)? {
                output::print_warning("Cancelled");
                return Ok(());
            }
            api.delete(id).await?;
            output::print_success(&format!("User '{id}' deleted"));
        }
        UsersCommand::Passwd { email, password } => {
            let new_password = match password {
                Some(p) => p.clone(),
                None => super::prompt_password("New password")?,
            };
            api.change_password(&ChangePassword {
                email: email.clone(),
                new_password,
            })
            .await?;
            output::print_success(&format!("Password changed for '{email}'"));
        }
    }

    Ok(())
}
