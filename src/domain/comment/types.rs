use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ActorId;

/// A comment row as stored by the backend's `comments` table.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default)]
    pub pinned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: ActorId,
    pub parent_id: Option<Uuid>,
    pub text: String,
    pub pinned: bool,
    pub pinned_by: Option<ActorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_authored_by(&self, actor: ActorId) -> bool {
        self.author_id == actor
    }
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            post_id: record.post_id,
            author_id: ActorId::from(record.user_id),
            parent_id: record.parent_id,
            text: record.content,
            pinned: record.is_pinned.unwrap_or(false),
            pinned_by: record.pinned_by.map(ActorId::from),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: *comment.author_id,
            parent_id: comment.parent_id,
            content: comment.text.clone(),
            is_pinned: Some(comment.pinned),
            pinned_by: comment.pinned_by.map(|a| *a),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// The pin state written by a pin/unpin; both columns always change together.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinUpdate {
    pub is_pinned: bool,
    pub pinned_by: Option<Uuid>,
}

impl PinUpdate {
    pub fn pin(by: ActorId) -> Self {
        Self {
            is_pinned: true,
            pinned_by: Some(*by),
        }
    }

    pub fn unpin() -> Self {
        Self {
            is_pinned: false,
            pinned_by: None,
        }
    }

    pub fn for_state(pinned: bool, actor: ActorId) -> Self {
        if pinned { Self::pin(actor) } else { Self::unpin() }
    }
}
