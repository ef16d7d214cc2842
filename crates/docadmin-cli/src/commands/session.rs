//! Sign-in, sign-out and account commands.

use chrono::Utc;
use clap::Args;
use serde::Serialize;

use docadmin_auth::{ProfileUpdate, SignupProfile};
use docadmin_client::AuthApi;
use docadmin_core::result::AppResult;
use docadmin_view::format_display_date;

use crate::context::Console;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,
    /// Password (prompted when omitted)
    #[arg(long, env = "DOCADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Account email
    pub email: String,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Password (prompted when omitted)
    #[arg(long, env = "DOCADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New avatar URL
    #[arg(long)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct WhoAmI {
    uid: String,
    email: Option<String>,
    role: &'static str,
    token_expires_at: String,
    token_expiring: bool,
    server_role: Option<String>,
}

fn password_or_prompt(password: &Option<String>) -> AppResult<String> {
    match password {
        Some(password) => Ok(password.clone()),
        None => super::prompt_password("Password"),
    }
}

pub async fn login(args: &LoginArgs, console: &Console) -> AppResult<()> {
    let password = password_or_prompt(&args.password)?;
    let session = console.session.login(&args.email, &password).await?;
    output::print_success(&format!(
        "Signed in as {} ({})",
        session.email().unwrap_or(session.uid()),
        if session.is_admin() { "admin" } else { "user" }
    ));
    Ok(())
}

pub async fn signup(args: &SignupArgs, console: &Console) -> AppResult<()> {
    let password = password_or_prompt(&args.password)?;
    let profile = SignupProfile {
        display_name: args.name.clone(),
    };
    let session = console.session.signup(&args.email, &password, profile).await?;
    output::print_success(&format!("Account created for {}", session.email().unwrap_or(session.uid())));
    Ok(())
}

pub async fn logout(console: &Console) -> AppResult<()> {
    if !console.session.is_authenticated().await {
        output::print_warning("Not signed in");
        return Ok(());
    }
    console.session.logout().await?;
    output::print_success("Signed out");
    Ok(())
}

pub async fn whoami(console: &Console, format: OutputFormat) -> AppResult<()> {
    let session = console.require_session().await?;

    // The server's view of the account is informative only.
    let server_role = match AuthApi::new(console.client.clone()).me().await {
        Ok(me) => me.role.map(|r| r.as_str().to_string()),
        Err(e) => {
            tracing::debug!(error = %e, "GET /auth/me failed");
            None
        }
    };

    let info = WhoAmI {
        uid: session.uid().to_string(),
        email: session.email().map(str::to_string),
        role: console.session.user_role().await,
        token_expires_at: format_display_date(Some(session.credential.expires_at)),
        token_expiring: console.session.token_expiring().await,
        server_role,
    };

    match format {
        OutputFormat::Json => output::print_json(&info),
        OutputFormat::Table => {
            output::print_kv("User ID", &info.uid);
            output::print_kv("Email", info.email.as_deref().unwrap_or("-"));
            output::print_kv("Role", info.role);
            output::print_kv("Server role", info.server_role.as_deref().unwrap_or("-"));
            output::print_kv("Token expires", &info.token_expires_at);
            let remaining = session.credential.remaining(Utc::now()).num_minutes();
            output::print_kv("Minutes remaining", &remaining.to_string());
            if info.token_expiring {
                output::print_warning("Session is about to expire");
            }
        }
    }
    Ok(())
}

pub async fn profile(args: &ProfileArgs, console: &Console, format: OutputFormat) -> AppResult<()> {
    console.require_session().await?;
    let update = ProfileUpdate {
        display_name: args.name.clone(),
        photo_url: args.photo_url.clone(),
    };
    let profile = console.session.update_profile(update).await?;
    match format {
        OutputFormat::Json => output::print_json(&profile),
        OutputFormat::Table => {
            for (key, value) in &profile {
                output::print_kv(key, &value.to_string());
            }
            output::print_success("Profile updated");
        }
    }
    Ok(())
}
