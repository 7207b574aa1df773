use std::sync::Arc;

use uuid::Uuid;

use crate::{
    configuration::ThreadSettings,
    domain::{ActorId, Comment, CommentThread, NewComment, PinUpdate},
    moderation,
    repository::{CommentBackend, CommentQuery},
    threads::{CommentError, ThreadBuilder, error::require_actor},
};

/// Comment mutations for a blog post. Every mutation writes first and then
/// rebuilds the whole thread from the backend; nothing is patched locally.
pub struct CommentService<B: ?Sized> {
    backend: Arc<B>,
    settings: ThreadSettings,
}

impl<B: ?Sized> Clone for CommentService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            settings: self.settings.clone(),
        }
    }
}

impl<B> CommentService<B>
where
    B: CommentBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, settings: ThreadSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn builder(&self) -> ThreadBuilder<'_, B> {
        ThreadBuilder::new(&*self.backend, &self.settings)
    }

    pub async fn thread(&self, post_id: Uuid) -> Result<CommentThread, CommentError> {
        self.builder().build(post_id).await
    }

    #[tracing::instrument(name = "Add a comment", skip(self, text))]
    pub async fn add_comment(
        &self,
        actor: Option<ActorId>,
        post_id: Uuid,
        text: String,
        parent_id: Option<Uuid>,
    ) -> Result<CommentThread, CommentError> {
        let actor = require_actor(actor)?;
        let comment = NewComment::new(post_id, actor, text, parent_id)
            .map_err(CommentError::ValidationFailed)?;

        if let Some(parent_id) = comment.parent_id {
            self.check_parent(post_id, parent_id).await?;
        }

        let created = self.backend.insert_comment(&comment).await?;
        tracing::info!(comment_id = %created.id, "Comment added");

        self.thread(post_id).await
    }

    /// Replies attach to a top-level comment of the same post.
    async fn check_parent(&self, post_id: Uuid, parent_id: Uuid) -> Result<(), CommentError> {
        let parent = self
            .backend
            .get_comment(parent_id)
            .await?
            .ok_or(CommentError::NotFound)?;

        if parent.post_id != post_id {
            return Err(CommentError::ValidationFailed(
                "Invalid reply: parent comment belongs to another post.".to_string(),
            ));
        }

        if !parent.is_top_level() {
            return Err(CommentError::ValidationFailed(
                "Invalid reply: replies cannot be nested.".to_string(),
            ));
        }

        Ok(())
    }

    /// Deleting a top-level comment deletes its replies first. Replies by
    /// other authors go with it only when the actor moderates the post.
    #[tracing::instrument(name = "Delete a comment", skip(self))]
    pub async fn delete_comment(
        &self,
        actor: Option<ActorId>,
        comment_id: Uuid,
    ) -> Result<CommentThread, CommentError> {
        let actor = require_actor(actor)?;
        let comment = self.load(comment_id).await?;

        if !moderation::can_delete(&*self.backend, actor, &comment).await? {
            tracing::info!("Delete refused by moderation gate");
            return Err(CommentError::Forbidden);
        }

        if comment.is_top_level() {
            self.delete_replies(actor, &comment).await?;
        }

        if !self.backend.delete_comment(comment_id).await? {
            return Err(CommentError::NotFound);
        }
        tracing::info!("Comment deleted");

        self.thread(comment.post_id).await
    }

    async fn delete_replies(&self, actor: ActorId, parent: &Comment) -> Result<(), CommentError> {
        let replies = self
            .backend
            .query_comments(&CommentQuery::replies_to(parent.id))
            .await?;

        let foreign = replies.iter().any(|reply| !reply.is_authored_by(actor));
        if foreign && !moderation::can_moderate(&*self.backend, actor, parent.post_id).await? {
            tracing::info!("Delete refused: the comment has replies by other authors");
            return Err(CommentError::Forbidden);
        }

        for reply in replies {
            // row-level policies filter a refused delete to zero rows; the
            // parent must stay so no reply is left without it
            if !self.backend.delete_comment(reply.id).await? {
                tracing::warn!(reply_id = %reply.id, "Backend did not delete reply, keeping its parent");
                return Err(CommentError::Forbidden);
            }
        }

        Ok(())
    }

    /// Moderation only: authorship of the comment is not enough to pin it.
    #[tracing::instrument(name = "Pin a comment", skip(self))]
    pub async fn pin_comment(
        &self,
        actor: Option<ActorId>,
        comment_id: Uuid,
        pinned: bool,
    ) -> Result<CommentThread, CommentError> {
        let actor = require_actor(actor)?;
        let comment = self.load(comment_id).await?;

        if !moderation::can_moderate(&*self.backend, actor, comment.post_id).await? {
            tracing::info!("Pin refused by moderation gate");
            return Err(CommentError::Forbidden);
        }

        self.backend
            .update_pin(comment_id, PinUpdate::for_state(pinned, actor))
            .await?
            .ok_or(CommentError::NotFound)?;
        tracing::info!("Comment pin state updated");

        self.thread(comment.post_id).await
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment, CommentError> {
        self.backend
            .get_comment(comment_id)
            .await?
            .ok_or(CommentError::NotFound)
    }
}
