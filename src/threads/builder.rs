use std::collections::{HashMap, HashSet};

use futures::{StreamExt, stream};
use tracing::Span;
use uuid::Uuid;

use crate::{
    configuration::ThreadSettings,
    domain::{
        ActorId, AuthorProfile, Comment, CommentThread, ThreadedComment, ThreadedReply,
        reply_order, top_level_order,
    },
    repository::{CommentBackend, CommentQuery},
    threads::CommentError,
};

/// Rebuilds a post's two-level comment thread from the backend.
///
/// Only the top-level fetch is allowed to fail the build. A reply set or a
/// profile that cannot be fetched is logged and rendered empty / anonymous.
pub struct ThreadBuilder<'a, B: ?Sized> {
    backend: &'a B,
    max_concurrent_fetches: usize,
}

impl<'a, B> ThreadBuilder<'a, B>
where
    B: CommentBackend + ?Sized,
{
    pub fn new(backend: &'a B, settings: &ThreadSettings) -> Self {
        Self {
            backend,
            max_concurrent_fetches: settings.max_concurrent_fetches.max(1),
        }
    }

    #[tracing::instrument(
        name = "Build comment thread",
        skip(self),
        fields(top_level = tracing::field::Empty, replies = tracing::field::Empty)
    )]
    pub async fn build(&self, post_id: Uuid) -> Result<CommentThread, CommentError> {
        let mut top_level = self
            .backend
            .query_comments(&CommentQuery::top_level(post_id))
            .await?;

        top_level.retain(|comment| {
            let belongs = comment.is_top_level() && comment.post_id == post_id;
            if !belongs {
                tracing::warn!(comment_id = %comment.id, "Dropping row outside the requested top level");
            }
            belongs
        });
        top_level.sort_by(top_level_order);

        // `buffered` yields in input order, whatever order the fetches finish in.
        let replies: Vec<Vec<Comment>> = stream::iter(top_level.iter().map(|c| self.replies_of(c)))
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let authors: HashSet<ActorId> = top_level
            .iter()
            .chain(replies.iter().flatten())
            .map(|c| c.author_id)
            .collect();
        let profiles = self.profiles_of(authors).await;

        let span = Span::current();
        span.record("top_level", top_level.len());
        span.record("replies", replies.iter().map(Vec::len).sum::<usize>());

        let comments = top_level
            .into_iter()
            .zip(replies)
            .map(|(comment, replies)| ThreadedComment {
                author: author_of(&profiles, comment.author_id),
                replies: replies
                    .into_iter()
                    .map(|reply| ThreadedReply {
                        author: author_of(&profiles, reply.author_id),
                        comment: reply,
                    })
                    .collect(),
                comment,
            })
            .collect();

        Ok(CommentThread { post_id, comments })
    }

    async fn replies_of(&self, parent: &Comment) -> Vec<Comment> {
        match self
            .backend
            .query_comments(&CommentQuery::replies_to(parent.id))
            .await
        {
            Ok(mut replies) => {
                replies.retain(|reply| reply.parent_id == Some(parent.id));
                replies.sort_by(reply_order);
                replies
            }
            Err(e) => {
                tracing::warn!(
                    comment_id = %parent.id,
                    error.cause_chain = ?e,
                    "Failed to fetch replies, rendering the comment without them"
                );
                Vec::new()
            }
        }
    }

    /// One lookup per distinct author.
    pub(crate) async fn profiles_of(
        &self,
        authors: HashSet<ActorId>,
    ) -> HashMap<ActorId, AuthorProfile> {
        stream::iter(authors)
            .map(|author| async move { (author, self.profile_of(author).await) })
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await
    }

    async fn profile_of(&self, author: ActorId) -> AuthorProfile {
        match self.backend.query_profile(author).await {
            Ok(Some(profile)) => profile,
            Ok(None) => AuthorProfile::anonymous(),
            Err(e) => {
                tracing::warn!(
                    author_id = %author,
                    error.cause_chain = ?e,
                    "Failed to fetch author profile, rendering as anonymous"
                );
                AuthorProfile::anonymous()
            }
        }
    }
}

fn author_of(profiles: &HashMap<ActorId, AuthorProfile>, author: ActorId) -> AuthorProfile {
    profiles.get(&author).cloned().unwrap_or_default()
}
