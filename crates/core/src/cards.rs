//! Card listing filters, sort keys and visibility rules.
//!
//! A [`CardFilter`] is built from the fixed set of recognized query
//! parameters in [`CardListParams`]; each parameter has one explicit effect
//! and is bound as a SQL parameter by the repository layer.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::CoreError;
use crate::roles::Role;
use crate::search::{
    clamp_limit, clamp_offset, escape_like, normalize_search_term, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
use crate::types::DbId;

/// Raw query parameters accepted by card list endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CardListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub owner_id: Option<DbId>,
    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Ordering of card listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardSort {
    #[default]
    Newest,
    Oldest,
    Popular,
    MostViewed,
    Title,
}

impl CardSort {
    /// Fixed `ORDER BY` clause for this sort key.
    ///
    /// Assumes the card table is aliased `c` and the likes count is exposed
    /// as `likes_count`.
    pub fn order_by(self) -> &'static str {
        match self {
            CardSort::Newest => "c.created_at DESC, c.id DESC",
            CardSort::Oldest => "c.created_at ASC, c.id ASC",
            CardSort::Popular => "likes_count DESC, c.created_at DESC",
            CardSort::MostViewed => "c.views DESC, c.created_at DESC",
            CardSort::Title => "lower(c.title) ASC, c.id ASC",
        }
    }
}

impl FromStr for CardSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "" => Ok(CardSort::Newest),
            "oldest" => Ok(CardSort::Oldest),
            "popular" | "likes" => Ok(CardSort::Popular),
            "most_viewed" | "views" => Ok(CardSort::MostViewed),
            "title" => Ok(CardSort::Title),
            other => Err(CoreError::Validation(format!(
                "Unknown sort '{other}'. Expected one of: newest, oldest, popular, most_viewed, title"
            ))),
        }
    }
}

/// Who is asking for the listing; decides which visibility filters apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Anonymous or regular viewers: active public cards only.
    Public,
    /// A user listing their own cards: any visibility, owner forced.
    Owner(DbId),
    /// Moderators: every card, visibility flags honored as given.
    Admin,
}

/// Structured, validated filter consumed by `CardRepo::list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFilter {
    pub category: Option<String>,
    /// Already escaped for use inside `ILIKE '%' || $n || '%'`.
    pub search_pattern: Option<String>,
    pub tag: Option<String>,
    pub owner_id: Option<DbId>,
    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
    pub sort: CardSort,
    pub limit: i64,
    pub offset: i64,
}

impl CardFilter {
    /// Build a filter from raw parameters for the given scope.
    pub fn build(params: &CardListParams, scope: ListScope) -> Result<Self, CoreError> {
        let sort = match params.sort.as_deref() {
            Some(s) => s.parse()?,
            None => CardSort::default(),
        };

        let category = params
            .category
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let tag = params
            .tag
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        let search_pattern = normalize_search_term(params.search.as_deref()).map(|t| escape_like(&t));

        let (owner_id, is_public, is_active) = match scope {
            ListScope::Public => (params.owner_id, Some(true), Some(true)),
            ListScope::Owner(id) => (Some(id), params.is_public, params.is_active),
            ListScope::Admin => (params.owner_id, params.is_public, params.is_active),
        };

        Ok(Self {
            category,
            search_pattern,
            tag,
            owner_id,
            is_public,
            is_active,
            sort,
            limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: clamp_offset(params.offset),
        })
    }
}

/// Whether a viewer may see a card.
///
/// Active public cards are visible to everyone; anything else only to its
/// owner and to admins.
pub fn can_view_card(
    is_public: bool,
    is_active: bool,
    owner_id: DbId,
    viewer: Option<(DbId, Role)>,
) -> bool {
    if is_public && is_active {
        return true;
    }
    match viewer {
        Some((id, role)) => id == owner_id || role.is_admin(),
        None => false,
    }
}

/// Whether a viewer may modify or delete a card.
pub fn can_modify_card(owner_id: DbId, viewer_id: DbId, viewer_role: Role) -> bool {
    viewer_id == owner_id || viewer_role.is_admin()
}

/// Whether a read should bump the view counter (owners do not count).
pub fn counts_as_view(owner_id: DbId, viewer_id: Option<DbId>) -> bool {
    viewer_id != Some(owner_id)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn public_scope_forces_visibility() {
        let params = CardListParams {
            is_public: Some(false),
            is_active: Some(false),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Public).unwrap();
        assert_eq!(filter.is_public, Some(true));
        assert_eq!(filter.is_active, Some(true));
    }

    #[test]
    fn owner_scope_forces_owner() {
        let params = CardListParams {
            owner_id: Some(99),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Owner(7)).unwrap();
        assert_eq!(filter.owner_id, Some(7));
        assert_eq!(filter.is_public, None);
    }

    #[test]
    fn admin_scope_honors_flags() {
        let params = CardListParams {
            is_public: Some(false),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Admin).unwrap();
        assert_eq!(filter.is_public, Some(false));
        assert_eq!(filter.is_active, None);
    }

    #[test]
    fn search_is_trimmed_and_escaped() {
        let params = CardListParams {
            search: Some("  100%  ".into()),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Public).unwrap();
        assert_eq!(filter.search_pattern.as_deref(), Some("100\\%"));
    }

    #[test]
    fn blank_category_is_ignored() {
        let params = CardListParams {
            category: Some("   ".into()),
            tag: Some(" Tech ".into()),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Public).unwrap();
        assert_eq!(filter.category, None);
        assert_eq!(filter.tag.as_deref(), Some("tech"));
    }

    #[test]
    fn pagination_is_clamped() {
        let params = CardListParams {
            limit: Some(1000),
            offset: Some(-5),
            ..Default::default()
        };
        let filter = CardFilter::build(&params, ListScope::Public).unwrap();
        assert_eq!(filter.limit, MAX_PAGE_LIMIT);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let params = CardListParams {
            sort: Some("random".into()),
            ..Default::default()
        };
        assert_matches!(
            CardFilter::build(&params, ListScope::Public),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn sort_aliases_parse() {
        assert_eq!("likes".parse::<CardSort>().unwrap(), CardSort::Popular);
        assert_eq!("views".parse::<CardSort>().unwrap(), CardSort::MostViewed);
        assert_eq!(CardSort::default().order_by(), "c.created_at DESC, c.id DESC");
    }

    #[test]
    fn private_card_visible_only_to_owner_and_admin() {
        assert!(!can_view_card(false, true, 1, None));
        assert!(!can_view_card(false, true, 1, Some((2, Role::Business))));
        assert!(can_view_card(false, true, 1, Some((1, Role::Business))));
        assert!(can_view_card(false, true, 1, Some((3, Role::Admin))));
    }

    #[test]
    fn inactive_card_hidden_from_public() {
        assert!(!can_view_card(true, false, 1, None));
        assert!(can_view_card(true, true, 1, None));
    }

    #[test]
    fn only_owner_or_admin_may_modify() {
        assert!(can_modify_card(1, 1, Role::Business));
        assert!(can_modify_card(1, 2, Role::Admin));
        assert!(!can_modify_card(1, 2, Role::Business));
        assert!(!can_modify_card(1, 2, Role::User));
    }

    #[test]
    fn owner_reads_do_not_count_as_views() {
        assert!(!counts_as_view(1, Some(1)));
        assert!(counts_as_view(1, Some(2)));
        assert!(counts_as_view(1, None));
    }
}
