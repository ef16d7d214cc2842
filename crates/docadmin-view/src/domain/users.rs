//! Console users.

use std::borrow::Cow;

use serde::Serialize;

use docadmin_core::types::SortSpec;
use docadmin_entity::user::User;

use crate::filter::MatchMode;
use crate::record::{SortValue, ViewRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserFacet {
    Role,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSortKey {
    DisplayName,
    Email,
    Role,
    Status,
}

impl ViewRecord for User {
    type Facet = UserFacet;
    type SortKey = UserSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.display_name.as_str()),
            Cow::Borrowed(self.email.as_str()),
            Cow::Borrowed(self.role.as_str()),
        ]
    }

    fn facet(&self, facet: UserFacet) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(match facet {
            UserFacet::Role => self.role.as_str(),
            UserFacet::Status => self.status.as_str(),
        }))
    }

    fn match_mode(_: UserFacet) -> MatchMode {
        MatchMode::CaseInsensitive
    }

    fn sort_value(&self, key: UserSortKey) -> SortValue<'_> {
        SortValue::Text(Cow::Borrowed(match key {
            UserSortKey::DisplayName => self.display_name.as_str(),
            UserSortKey::Email => self.email.as_str(),
            UserSortKey::Role => self.role.as_str(),
            UserSortKey::Status => self.status.as_str(),
        }))
    }

    fn default_sort() -> SortSpec<UserSortKey> {
        SortSpec::asc(UserSortKey::DisplayName)
    }
}

/// Summary cards for the user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub admins: usize,
}

pub fn user_stats(users: &[User]) -> UserStats {
    UserStats {
        total: users.len(),
        active: users.iter().filter(|u| u.is_active()).count(),
        admins: users.iter().filter(|u| u.is_admin()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{aggregate, derive};
    use crate::filter::FilterState;

    fn users() -> Vec<User> {
        serde_json::from_value(serde_json::json!([
            {"id": "1", "display_name": "Lucía Pérez", "email": "lucia@muni.gob", "role": "admin", "status": "active"},
            {"id": "2", "display_name": "andrés Soto", "email": "asoto@muni.gob", "role": "secretaria", "status": "inactive"},
            {"id": "3", "display_name": "Beatriz Ruiz", "email": "bruiz@muni.gob", "role": "supervisor", "status": "active"},
            {"id": "4", "display_name": "Carlos Díaz", "email": "cdiaz@muni.gob", "role": "Admin", "status": "active"}
        ]))
        .unwrap()
    }

    fn ids(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_query_covers_name_email_and_role() {
        let mut filter = FilterState::<User>::new();
        filter.set_query("SUPERVISOR");
        assert_eq!(ids(&derive(&users(), &filter)), vec!["3"]);

        filter.set_query("asoto@");
        assert_eq!(ids(&derive(&users(), &filter)), vec!["2"]);

        filter.set_query("díaz");
        assert_eq!(ids(&derive(&users(), &filter)), vec!["4"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let derived = derive(&users(), &FilterState::new());
        assert_eq!(ids(&derived), vec!["2", "3", "4", "1"]);
    }

    #[test]
    fn test_role_and_status_selectors() {
        let mut filter = FilterState::<User>::new();
        filter.select(UserFacet::Role, "admin");
        filter.select(UserFacet::Status, "active");
        assert_eq!(ids(&derive(&users(), &filter)), vec!["4", "1"]);

        filter.select(UserFacet::Status, "inactive");
        assert!(derive(&users(), &filter).is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = user_stats(&users());
        assert_eq!(
            stats,
            UserStats {
                total: 4,
                active: 3,
                admins: 2
            }
        );

        let agg = aggregate(&users(), &[UserFacet::Status]);
        assert_eq!(agg.count(UserFacet::Status, "active"), 3);
        assert_eq!(agg.count(UserFacet::Status, "inactive"), 1);
    }
}
