//! Public library commands.

use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use docadmin_client::LibraryApi;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::types::{PageRequest, SortSpec};
use docadmin_entity::library::LibraryEntry;
use docadmin_view::domain::{LibraryFacet, LibrarySortKey, library_stats};
use docadmin_view::{DebouncedSearch, SearchState, ViewModel, format_display_date, format_size};

use crate::context::Console;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LibraryArgs {
    #[command(subcommand)]
    pub command: LibraryCommand,
}

#[derive(Debug, Subcommand)]
pub enum LibraryCommand {
    /// List or search public documents
    List {
        /// Search text; runs against the server's search index
        #[arg(short, long)]
        query: Option<String>,
        /// File type filter (`pdf`, `docx`, ...)
        #[arg(short = 't', long = "type", default_value = "all")]
        file_type: String,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Entries to skip
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Sort field
        #[arg(long, value_enum)]
        sort: Option<LibrarySort>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Delete a library document
    Delete {
        /// Document id
        #[arg(long, conflicts_with = "path", required_unless_present = "path")]
        id: Option<String>,
        /// Storage path
        #[arg(long)]
        path: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LibrarySort {
    Name,
    Title,
    Size,
    Type,
    Uploaded,
}

impl From<LibrarySort> for LibrarySortKey {
    fn from(sort: LibrarySort) -> Self {
        match sort {
            LibrarySort::Name => Self::Name,
            LibrarySort::Title => Self::Title,
            LibrarySort::Size => Self::Size,
            LibrarySort::Type => Self::Type,
            LibrarySort::Uploaded => Self::Uploaded,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct LibraryRow {
    title: String,
    #[tabled(rename = "type")]
    file_type: String,
    size: String,
    uploaded: String,
    id: String,
}

impl From<&LibraryEntry> for LibraryRow {
    fn from(entry: &LibraryEntry) -> Self {
        Self {
            title: entry.display_title().to_string(),
            file_type: entry.type_key().unwrap_or_default(),
            size: format_size(entry.size),
            uploaded: format_display_date(entry.uploaded_at()),
            id: entry.id.clone().unwrap_or_default(),
        }
    }
}

/// Run one query through the debounced search and wait for its outcome.
async fn remote_search(api: LibraryApi, query: &str, console: &Console) -> AppResult<Arc<Vec<LibraryEntry>>> {
    let search = DebouncedSearch::new(Arc::new(api), console.config.search.debounce());
    let mut updates = search.subscribe();
    search.input(query);

    loop {
        updates
            .changed()
            .await
            .map_err(|_| AppError::internal("Search stopped before answering"))?;
        match &*updates.borrow_and_update() {
            SearchState::Ready { results, .. } => return Ok(Arc::clone(results)),
            SearchState::Failed { message, .. } => return Err(AppError::external(message.clone())),
            SearchState::Idle | SearchState::Pending { .. } => {}
        }
    }
}

pub async fn execute(args: &LibraryArgs, console: &Console, format: OutputFormat) -> AppResult<()> {
    console.require_session().await?;
    let page_size = console.config.search.library_page_size;
    let api = LibraryApi::new(console.client.clone(), page_size);

    match &args.command {
        LibraryCommand::List {
            query,
            file_type,
            limit,
            offset,
            sort,
            desc,
        } => {
            let mut view = ViewModel::<LibraryEntry>::new("library");
            let query = query.as_deref().map(str::trim).unwrap_or_default();
            if query.is_empty() {
                let page = PageRequest::new(limit.unwrap_or(page_size), *offset);
                view.apply_fetch(api.list(page).await);
            } else {
                view.set_remote_results(Some(remote_search(api.clone(), query, console).await?));
            }
            super::show_notice(&mut view);

            let filter = view.filter_mut();
            filter.set_query(query);
            filter.select(LibraryFacet::Type, file_type.as_str());
            if let Some(sort) = sort {
                filter.set_sort(SortSpec::new((*sort).into(), super::direction(*desc)));
            }

            let derived = view.derived();
            let rows: Vec<LibraryRow> = derived.iter().map(LibraryRow::from).collect();
            output::print_list(&rows, format);

            if format == OutputFormat::Table {
                let stats = library_stats(&derived);
                println!(
                    "{} documents, {:.2} MB, {} file types",
                    stats.total, stats.total_size_mb, stats.unique_types
                );
            }
        }
        LibraryCommand::Delete { id, path, yes } => {
            let target = id.as_deref().or(path.as_deref()).unwrap_or_default();
            if !super::confirm(&format!("Delete '{target}' from the library?"), *yes)? {
                output::print_warning("Cancelled");
                return Ok(());
            }
            match (id, path) {
                (Some(id), _) => api.delete_document(id).await?,
                (None, Some(path)) => api.delete_by_path(path).await?,
                (None, None) => return Err(AppError::validation("Pass --id or --path")),
            };
            output::print_success(&format!("Deleted '{target}'"));
        }
    }

    Ok(())
}
