mod postgrest;
mod query;

pub use postgrest::SupabaseClient;
pub use query::*;

use std::fmt::{self, Debug, Formatter};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    authentication::AccessToken,
    domain::{ActorId, AuthorProfile, Comment, NewComment, PinUpdate, Role},
    utils,
};

#[derive(thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        utils::error_chain_fmt(self, f)
    }
}

/// Everything the comment subsystem needs from the hosted backend.
///
/// Implementations own consistency of the stored rows; callers never hold
/// locks or transactions across these calls.
#[async_trait]
pub trait CommentBackend: Send + Sync {
    async fn query_comments(&self, query: &CommentQuery) -> Result<Vec<Comment>, BackendError>;

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, BackendError>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError>;

    /// `Ok(None)` when no row has that id.
    async fn update_pin(
        &self,
        id: Uuid,
        update: PinUpdate,
    ) -> Result<Option<Comment>, BackendError>;

    /// `Ok(false)` when no row has that id.
    async fn delete_comment(&self, id: Uuid) -> Result<bool, BackendError>;

    async fn query_profile(&self, author: ActorId) -> Result<Option<AuthorProfile>, BackendError>;

    /// Actors without a role row are plain users.
    async fn actor_role(&self, actor: ActorId) -> Result<Role, BackendError>;

    async fn post_author(&self, post_id: Uuid) -> Result<Option<ActorId>, BackendError>;

    /// `Ok(None)` when the token does not belong to a live session.
    async fn current_actor(&self, token: &AccessToken) -> Result<Option<ActorId>, BackendError>;
}
