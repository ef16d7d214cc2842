//! Stored document commands.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use docadmin_client::DocumentsApi;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::types::SortSpec;
use docadmin_entity::document::{StoredDocument, UploadDocument};
use docadmin_view::domain::{DocumentFacet, DocumentSortKey, document_stats};
use docadmin_view::domain::documents::DEFAULT_STAT_EXTENSION;
use docadmin_view::{ViewModel, format_display_date, format_size};

use super::Since;
use crate::context::Console;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List stored documents
    List {
        /// Storage prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Free-text filter on the file name
        #[arg(short, long)]
        query: Option<String>,
        /// File extension (`pdf` matches `*.PDF`)
        #[arg(short = 't', long = "type", default_value = "all")]
        extension: String,
        /// Content category (PDF, Word, Excel, PowerPoint, Documento)
        #[arg(long, default_value = "all")]
        category: String,
        /// `public` or `private`
        #[arg(long, default_value = "all")]
        visibility: String,
        /// Only documents updated within this window
        #[arg(long, value_enum, default_value = "all")]
        since: Since,
        /// Sort field
        #[arg(long, value_enum)]
        sort: Option<DocumentSort>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Search processed documents on the server
    Search {
        /// Search text
        query: String,
    },
    /// Upload a file
    Upload {
        /// Local file
        file: PathBuf,
        /// Section to file the document under
        #[arg(long)]
        apartado: String,
        /// Publish to the public library
        #[arg(long)]
        public: bool,
        /// MIME type sent with the file
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download a stored document by path
    Download {
        /// Storage path
        path: String,
        /// Destination file (defaults to the server's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a stored document by path
    Delete {
        /// Storage path
        path: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DocumentSort {
    Name,
    Updated,
    Size,
    Category,
}

impl From<DocumentSort> for DocumentSortKey {
    fn from(sort: DocumentSort) -> Self {
        match sort {
            DocumentSort::Name => Self::Filename,
            DocumentSort::Updated => Self::Updated,
            DocumentSort::Size => Self::Size,
            DocumentSort::Category => Self::Category,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    filename: String,
    category: String,
    size: String,
    updated: String,
    visibility: &'static str,
    path: String,
}

impl From<&StoredDocument> for DocumentRow {
    fn from(doc: &StoredDocument) -> Self {
        Self {
            filename: doc.filename.clone(),
            category: doc.category().as_str().to_string(),
            size: format_size(doc.size),
            updated: format_display_date(doc.updated_at()),
            visibility: if doc.is_public() { "public" } else { "private" },
            path: doc.path.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct SearchRow {
    id: String,
    filename: String,
    title: String,
    size: String,
    public: bool,
}

pub async fn execute(args: &DocumentsArgs, console: &Console, format: OutputFormat) -> AppResult<()> {
    console.require_session().await?;
    let api = DocumentsApi::new(console.client.clone());

    match &args.command {
        DocumentsCommand::List {
            prefix,
            query,
            extension,
            category,
            visibility,
            since,
            sort,
            desc,
        } => {
            let mut view = ViewModel::<StoredDocument>::new("documents");
            view.apply_fetch(api.list_storage(prefix.as_deref()).await);
            super::show_notice(&mut view);

            let filter = view.filter_mut();
            filter.set_query(query.clone().unwrap_or_default());
            filter.select(DocumentFacet::Extension, extension.as_str());
            filter.select(DocumentFacet::Category, category.as_str());
            filter.select(DocumentFacet::Visibility, visibility.as_str());
            filter.apply_preset((*since).into(), Utc::now());
            if let Some(sort) = sort {
                filter.set_sort(SortSpec::new((*sort).into(), super::direction(*desc)));
            }

            let derived = view.derived();
            let rows: Vec<DocumentRow> = derived.iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format);

            if format == OutputFormat::Table {
                let stat_ext = match extension.as_str() {
                    "all" | "" => DEFAULT_STAT_EXTENSION,
                    ext => ext,
                };
                let stats = document_stats(&derived, stat_ext);
                println!(
                    "{} documents, {} total, {} {}",
                    stats.total,
                    format_size(stats.total_size),
                    stats.extension_count,
                    stat_ext.to_uppercase()
                );
            }
        }
        DocumentsCommand::Search { query } => {
            let hits = api.search(query).await?;
            let rows: Vec<SearchRow> = hits
                .iter()
                .map(|d| SearchRow {
                    id: d.id.clone(),
                    filename: d.filename.clone(),
                    title: d.title.clone().unwrap_or_default(),
                    size: format_size(d.file_size_bytes),
                    public: d.public,
                })
                .collect();
            output::print_list(&rows, format);
        }
        DocumentsCommand::Upload {
            file,
            apartado,
            public,
            content_type,
        } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| AppError::validation("The upload path has no file name"))?
                .to_string();
            let data = tokio::fs::read(file).await?;
            let form = UploadDocument {
                filename: filename.clone(),
                apartado: apartado.clone(),
                is_public: *public,
            };
            api.upload(&form, Bytes::from(data), content_type.as_deref())
                .await?;
            output::print_success(&format!("Uploaded '{filename}'"));
        }
        DocumentsCommand::Download { path, output: dest } => {
            let download = api.download_by_path(path).await?;
            let dest = match dest {
                Some(dest) => dest.clone(),
                None => PathBuf::from(
                    download
                        .filename
                        .clone()
                        .or_else(|| path.rsplit('/').next().map(str::to_string))
                        .unwrap_or_else(|| "download".to_string()),
                ),
            };
            tokio::fs::write(&dest, &download.data).await?;
            output::print_success(&format!(
                "Saved {} to '{}'",
                format_size(download.len() as u64),
                dest.display()
            ));
        }
        DocumentsCommand::Delete { path, yes } => {
            if !super::confirm(&format!("Delete '{path}'?"), *yes)? {
                output::print_warning("Cancelled");
                return Ok(());
            }
            api.delete_by_path(path).await?;
            output::print_success(&format!("Deleted '{path}'"));
        }
    }

    Ok(())
}
