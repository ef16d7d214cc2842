//! News items.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use docadmin_core::types::SortSpec;
use docadmin_entity::news::NewsItem;

use crate::filter::MatchMode;
use crate::record::{SortValue, ViewRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsFacet {
    Category,
    /// `true` or `false`.
    Featured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsSortKey {
    Date,
    Title,
    Category,
}

impl ViewRecord for NewsItem {
    type Facet = NewsFacet;
    type SortKey = NewsSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.summary.as_str()),
            Cow::Borrowed(self.category.as_str()),
        ]
    }

    fn facet(&self, facet: NewsFacet) -> Option<Cow<'_, str>> {
        Some(match facet {
            NewsFacet::Category => Cow::Borrowed(self.category.as_str()),
            NewsFacet::Featured => Cow::Borrowed(if self.featured { "true" } else { "false" }),
        })
    }

    fn match_mode(facet: NewsFacet) -> MatchMode {
        match facet {
            NewsFacet::Category => MatchMode::CaseInsensitive,
            NewsFacet::Featured => MatchMode::Exact,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at()
    }

    fn sort_value(&self, key: NewsSortKey) -> SortValue<'_> {
        match key {
            NewsSortKey::Date => SortValue::Date(self.published_at()),
            NewsSortKey::Title => SortValue::Text(Cow::Borrowed(self.title.as_str())),
            NewsSortKey::Category => SortValue::Text(Cow::Borrowed(self.category.as_str())),
        }
    }

    fn default_sort() -> SortSpec<NewsSortKey> {
        SortSpec::desc(NewsSortKey::Date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::filter::FilterState;

    fn news() -> Vec<NewsItem> {
        NewsItem::parse_list(
            r#"[
                {"id": 1, "title": "Firma de convenio", "date": "2025-01-15",
                 "summary": "Acuerdo con la universidad", "category": "Acuerdos", "featured": true},
                {"id": 2, "title": "Nueva sede", "date": "2025-02-03",
                 "summary": "Inauguración de oficinas", "category": "Proyectos", "featured": false},
                {"id": 3, "title": "Comunicado oficial", "date": "2024-12-01",
                 "summary": "Cambios de horario", "category": "Comunicados", "featured": false}
            ]"#,
        )
        .unwrap()
    }

    fn ids(items: &[NewsItem]) -> Vec<u64> {
        items.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_newest_first_and_category_search() {
        let mut filter = FilterState::<NewsItem>::new();
        assert_eq!(ids(&derive(&news(), &filter)), vec![2, 1, 3]);

        filter.set_query("proyectos");
        assert_eq!(ids(&derive(&news(), &filter)), vec![2]);
    }

    #[test]
    fn test_featured_and_category_selectors() {
        let mut filter = FilterState::<NewsItem>::new();
        filter.select(NewsFacet::Featured, "true");
        assert_eq!(ids(&derive(&news(), &filter)), vec![1]);

        filter.clear_all();
        filter.select(NewsFacet::Category, "comunicados");
        assert_eq!(ids(&derive(&news(), &filter)), vec![3]);
    }
}
