//! Who may pin or delete a comment.
//!
//! Moderating a post's comments (pin, unpin, delete anyone's comment) needs the
//! global admin role or authorship of the post. Authoring a comment only lets
//! the author delete that comment. Nothing is cached: every check re-reads the
//! actor's role and the post's author from the backend.
//!
//! These checks decide what the caller is offered; the backend's row-level
//! policies still enforce the same rule on every write.

use uuid::Uuid;

use crate::domain::{ActorId, Comment, Role};
use crate::repository::{BackendError, CommentBackend};

pub fn may_moderate(actor: ActorId, role: Role, post_author: Option<ActorId>) -> bool {
    role.is_admin() || post_author == Some(actor)
}

pub fn may_delete(actor: ActorId, comment: &Comment, can_moderate: bool) -> bool {
    can_moderate || comment.is_authored_by(actor)
}

#[tracing::instrument(name = "Check moderation rights", skip(backend))]
pub async fn can_moderate<B>(backend: &B, actor: ActorId, post_id: Uuid) -> Result<bool, BackendError>
where
    B: CommentBackend + ?Sized,
{
    let role = backend.actor_role(actor).await?;
    if role.is_admin() {
        return Ok(true);
    }

    let post_author = backend.post_author(post_id).await?;
    Ok(may_moderate(actor, role, post_author))
}

#[tracing::instrument(name = "Check delete rights", skip(backend, comment), fields(comment_id = %comment.id))]
pub async fn can_delete<B>(backend: &B, actor: ActorId, comment: &Comment) -> Result<bool, BackendError>
where
    B: CommentBackend + ?Sized,
{
    if comment.is_authored_by(actor) {
        return Ok(true);
    }

    can_moderate(backend, actor, comment.post_id).await
}

/// What one actor may do in one post's thread, resolved once for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub actor: ActorId,
    pub can_moderate: bool,
}

impl Permissions {
    pub async fn resolve<B>(backend: &B, actor: ActorId, post_id: Uuid) -> Result<Self, BackendError>
    where
        B: CommentBackend + ?Sized,
    {
        Ok(Self {
            actor,
            can_moderate: can_moderate(backend, actor, post_id).await?,
        })
    }

    pub fn may_pin(&self) -> bool {
        self.can_moderate
    }

    pub fn may_delete(&self, comment: &Comment) -> bool {
        may_delete(self.actor, comment, self.can_moderate)
    }
}
