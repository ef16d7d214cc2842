//! Audit trail commands.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use docadmin_client::AuditApi;
use docadmin_core::result::AppResult;
use docadmin_core::types::SortSpec;
use docadmin_entity::audit::{AuditEventType, AuditLogEntry, AuditLogQuery, Severity};
use docadmin_view::domain::{AuditFacet, AuditSortKey, audit_stats};
use docadmin_view::{ViewModel, audit_csv, audit_csv_filename, format_display_date};

use super::Since;
use crate::context::Console;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List audit entries
    List(AuditFilterArgs),
    /// Export the filtered entries as CSV
    Export {
        #[command(flatten)]
        filter: AuditFilterArgs,
        /// Output file (defaults to `audit-logs-YYYY-MM-DD.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the event type and severity catalog
    Types,
}

#[derive(Debug, Args)]
pub struct AuditFilterArgs {
    /// Free-text filter on event type, user and details
    #[arg(short, long)]
    pub query: Option<String>,
    /// Event type (e.g. SECURITY_EVENT)
    #[arg(short = 't', long = "type", default_value = "all")]
    pub event_type: String,
    /// Severity (INFO, WARNING, ERROR, CRITICAL)
    #[arg(short, long, default_value = "all")]
    pub severity: String,
    /// Acting user id
    #[arg(short, long, default_value = "all")]
    pub user: String,
    /// Only entries within this window
    #[arg(long, value_enum, default_value = "all")]
    pub since: Since,
    /// Entries fetched from the server
    #[arg(long)]
    pub limit: Option<u32>,
    /// Sort field
    #[arg(long, value_enum)]
    pub sort: Option<AuditSort>,
    /// Sort ascending instead of newest first
    #[arg(long)]
    pub asc: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AuditSort {
    Time,
    Type,
    User,
    Severity,
}

impl From<AuditSort> for AuditSortKey {
    fn from(sort: AuditSort) -> Self {
        match sort {
            AuditSort::Time => Self::Timestamp,
            AuditSort::Type => Self::EventType,
            AuditSort::User => Self::User,
            AuditSort::Severity => Self::Severity,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    time: String,
    user: String,
    event: String,
    severity: &'static str,
    details: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(entry: &AuditLogEntry) -> Self {
        let mut details = entry.details_json();
        if details.chars().count() > 60 {
            details = details.chars().take(57).collect::<String>() + "...";
        }
        Self {
            time: format_display_date(entry.occurred_at()),
            user: entry.user_id.clone().unwrap_or_else(|| "-".to_string()),
            event: entry.event_type.label().to_string(),
            severity: entry.severity.map_or("-", |s| s.label()),
            details,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct CatalogRow {
    kind: &'static str,
    value: String,
    label: String,
}

async fn filtered(
    filter_args: &AuditFilterArgs,
    console: &Console,
) -> AppResult<std::sync::Arc<Vec<AuditLogEntry>>> {
    let api = AuditApi::new(console.client.clone());
    let query = AuditLogQuery {
        limit: filter_args
            .limit
            .unwrap_or(console.config.search.audit_log_limit),
        ..AuditLogQuery::default()
    };

    let mut view = ViewModel::<AuditLogEntry>::new("audit");
    view.apply_fetch(api.get_logs(&query).await.map(|page| page.logs));
    super::show_notice(&mut view);

    let filter = view.filter_mut();
    filter.set_query(filter_args.query.clone().unwrap_or_default());
    filter.select(AuditFacet::EventType, filter_args.event_type.as_str());
    filter.select(AuditFacet::Severity, filter_args.severity.to_uppercase().as_str());
    filter.select(AuditFacet::User, filter_args.user.as_str());
    filter.apply_preset(filter_args.since.into(), Utc::now());
    if let Some(sort) = filter_args.sort {
        filter.set_sort(SortSpec::new(sort.into(), super::direction(!filter_args.asc)));
    } else if filter_args.asc {
        filter.set_sort(SortSpec::asc(AuditSortKey::Timestamp));
    }

    Ok(view.derived())
}

pub async fn execute(args: &AuditArgs, console: &Console, format: OutputFormat) -> AppResult<()> {
    console.require_admin().await?;

    match &args.command {
        AuditCommand::List(filter_args) => {
            let derived = filtered(filter_args, console).await?;
            let rows: Vec<AuditRow> = derived.iter().map(AuditRow::from).collect();
            match format {
                OutputFormat::Json => output::print_json(&*derived),
                OutputFormat::Table => {
                    output::print_list(&rows, format);
                    let stats = audit_stats(&derived);
                    let by_severity: Vec<String> = Severity::ALL
                        .iter()
                        .map(|s| format!("{} {}", stats.severity(*s), s.as_str()))
                        .collect();
                    println!("{} entries: {}", stats.total, by_severity.join(", "));
                }
            }
        }
        AuditCommand::Export {
            filter,
            output: dest,
        } => {
            let derived = filtered(filter, console).await?;
            let dest = dest
                .clone()
                .unwrap_or_else(|| PathBuf::from(audit_csv_filename(Utc::now().date_naive())));
            tokio::fs::write(&dest, audit_csv(&derived)).await?;
            output::print_success(&format!(
                "Exported {} audit entries to '{}'",
                derived.len(),
                dest.display()
            ));
        }
        AuditCommand::Types => {
            let mut rows: Vec<CatalogRow> = AuditEventType::CATALOG
                .iter()
                .map(|t| CatalogRow {
                    kind: "event",
                    value: t.as_str().to_string(),
                    label: t.label().to_string(),
                })
                .collect();
            rows.extend(Severity::ALL.iter().map(|s| CatalogRow {
                kind: "severity",
                value: s.as_str().to_string(),
                label: s.label().to_string(),
            }));
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
