use serde::Serialize;

use crate::{
    domain::{ActorId, AuthorProfile, Comment},
    repository::{CommentBackend, CommentQuery},
    threads::{CommentError, CommentService, error::require_actor},
};

/// A comment in the admin dashboard's cross-post feed.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorProfile,
}

impl<B> CommentService<B>
where
    B: CommentBackend + ?Sized,
{
    /// Every comment across all posts, newest first. Admins only.
    #[tracing::instrument(name = "Load admin comment feed", skip(self))]
    pub async fn recent_comments(
        &self,
        actor: Option<ActorId>,
        limit: Option<usize>,
    ) -> Result<Vec<FeedEntry>, CommentError> {
        let actor = require_actor(actor)?;

        if !self.backend().actor_role(actor).await?.is_admin() {
            return Err(CommentError::Forbidden);
        }

        let mut comments = self
            .backend()
            .query_comments(&CommentQuery::recent(limit))
            .await?;
        // the feed ignores pins: newest first only
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let profiles = self
            .builder()
            .profiles_of(comments.iter().map(|c| c.author_id).collect())
            .await;

        Ok(comments
            .into_iter()
            .map(|comment| FeedEntry {
                author: profiles.get(&comment.author_id).cloned().unwrap_or_default(),
                comment,
            })
            .collect())
    }
}
