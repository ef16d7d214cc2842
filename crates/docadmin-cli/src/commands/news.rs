//! News items shipped with the console.

use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use docadmin_core::result::AppResult;
use docadmin_core::types::SortSpec;
use docadmin_entity::news::NewsItem;
use docadmin_view::ViewModel;
use docadmin_view::domain::{NewsFacet, NewsSortKey};

use crate::output::{self, OutputFormat};

const NEWS_JSON: &str = include_str!("../../data/news.json");

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Free-text filter on title, summary and category
    #[arg(short, long)]
    pub query: Option<String>,
    /// Category filter
    #[arg(short, long, default_value = "all")]
    pub category: String,
    /// Only featured items
    #[arg(long)]
    pub featured: bool,
    /// Sort field
    #[arg(long, value_enum)]
    pub sort: Option<NewsSort>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NewsSort {
    Date,
    Title,
    Category,
}

impl From<NewsSort> for NewsSortKey {
    fn from(sort: NewsSort) -> Self {
        match sort {
            NewsSort::Date => Self::Date,
            NewsSort::Title => Self::Title,
            NewsSort::Category => Self::Category,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct NewsRow {
    date: String,
    title: String,
    category: String,
    #[tabled(rename = "read")]
    read_time: String,
    #[tabled(rename = "★")]
    featured: &'static str,
}

impl From<&NewsItem> for NewsRow {
    fn from(item: &NewsItem) -> Self {
        Self {
            date: item.date.clone(),
            title: item.title.clone(),
            category: item.category.clone(),
            read_time: item.read_time.clone().unwrap_or_default(),
            featured: if item.featured { "★" } else { "" },
        }
    }
}

pub fn execute(args: &NewsArgs, format: OutputFormat) -> AppResult<()> {
    let mut view = ViewModel::<NewsItem>::new("news");
    view.apply_fetch(NewsItem::parse_list(NEWS_JSON));
    super::show_notice(&mut view);

    let filter = view.filter_mut();
    filter.set_query(args.query.clone().unwrap_or_default());
    filter.select(NewsFacet::Category, args.category.as_str());
    if args.featured {
        filter.select(NewsFacet::Featured, "true");
    }
    if let Some(sort) = args.sort {
        filter.set_sort(SortSpec::new(sort.into(), super::direction(args.desc)));
    }

    let rows: Vec<NewsRow> = view.derived().iter().map(NewsRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_news_parses() {
        let items = NewsItem::parse_list(NEWS_JSON).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items.iter().filter(|i| i.featured).count(), 2);
    }
}
