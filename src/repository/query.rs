use std::cmp::Ordering;

use uuid::Uuid;

use crate::domain::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    Any,
    TopLevel,
    RepliesTo(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Pinned,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// PostgREST `order` term. Null pin flags sort as unpinned.
    pub fn to_postgrest(&self) -> String {
        match (self.field, self.direction) {
            (SortField::Pinned, SortDirection::Desc) => "is_pinned.desc.nullslast".to_string(),
            (SortField::Pinned, SortDirection::Asc) => "is_pinned.asc.nullsfirst".to_string(),
            (SortField::CreatedAt, SortDirection::Desc) => "created_at.desc".to_string(),
            (SortField::CreatedAt, SortDirection::Asc) => "created_at.asc".to_string(),
        }
    }

    fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        let ordering = match self.field {
            SortField::Pinned => a.pinned.cmp(&b.pinned),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A filter/order/limit query over the `comments` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub post_id: Option<Uuid>,
    pub parent: ParentFilter,
    pub sort: Vec<Sort>,
    pub limit: Option<usize>,
}

impl CommentQuery {
    /// Top-level comments of a post: pinned first, then newest first.
    pub fn top_level(post_id: Uuid) -> Self {
        Self {
            post_id: Some(post_id),
            parent: ParentFilter::TopLevel,
            sort: vec![Sort::desc(SortField::Pinned), Sort::desc(SortField::CreatedAt)],
            limit: None,
        }
    }

    /// Direct replies of a comment, oldest first.
    pub fn replies_to(parent_id: Uuid) -> Self {
        Self {
            post_id: None,
            parent: ParentFilter::RepliesTo(parent_id),
            sort: vec![Sort::asc(SortField::CreatedAt)],
            limit: None,
        }
    }

    /// Every comment across all posts, newest first.
    pub fn recent(limit: Option<usize>) -> Self {
        Self {
            post_id: None,
            parent: ParentFilter::Any,
            sort: vec![Sort::desc(SortField::CreatedAt)],
            limit,
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        let post_matches = self.post_id.is_none_or(|id| comment.post_id == id);
        let parent_matches = match self.parent {
            ParentFilter::Any => true,
            ParentFilter::TopLevel => comment.parent_id.is_none(),
            ParentFilter::RepliesTo(parent) => comment.parent_id == Some(parent),
        };
        post_matches && parent_matches
    }

    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        self.sort
            .iter()
            .map(|sort| sort.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Query-string pairs in PostgREST's filter syntax.
    pub fn to_postgrest(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("select", "*".to_string())];

        if let Some(post_id) = self.post_id {
            pairs.push(("post_id", format!("eq.{post_id}")));
        }

        match self.parent {
            ParentFilter::Any => {}
            ParentFilter::TopLevel => pairs.push(("parent_id", "is.null".to_string())),
            ParentFilter::RepliesTo(parent) => pairs.push(("parent_id", format!("eq.{parent}"))),
        }

        if !self.sort.is_empty() {
            let order = self
                .sort
                .iter()
                .map(Sort::to_postgrest)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order", order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
    }
}
