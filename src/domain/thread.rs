use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{AuthorProfile, Comment};

/// Rendering-ready comments of one post: pinned first, then newest first,
/// each with its replies oldest first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    pub post_id: Uuid,
    pub comments: Vec<ThreadedComment>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ThreadedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorProfile,
    pub replies: Vec<ThreadedReply>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ThreadedReply {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorProfile,
}

impl CommentThread {
    pub fn empty(post_id: Uuid) -> Self {
        Self {
            post_id,
            comments: Vec::new(),
        }
    }

    /// Number of top-level comments.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Number of comments including replies.
    pub fn total_len(&self) -> usize {
        self.comments.iter().map(|c| 1 + c.replies.len()).sum()
    }

    pub fn find(&self, id: Uuid) -> Option<&Comment> {
        self.comments.iter().find_map(|top| {
            if top.comment.id == id {
                return Some(&top.comment);
            }
            top.replies
                .iter()
                .find(|reply| reply.comment.id == id)
                .map(|reply| &reply.comment)
        })
    }

    pub fn pinned(&self) -> impl Iterator<Item = &ThreadedComment> {
        self.comments.iter().filter(|c| c.comment.pinned)
    }
}

/// Pinned before unpinned, then newest first.
pub fn top_level_order(a: &Comment, b: &Comment) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Oldest first.
pub fn reply_order(a: &Comment, b: &Comment) -> Ordering {
    a.created_at.cmp(&b.created_at)
}
