use std::fmt::{self, Debug, Formatter};

use crate::domain::ActorId;
use crate::repository::BackendError;
use crate::utils;

#[derive(thiserror::Error)]
pub enum CommentError {
    #[error("{0}")]
    ValidationFailed(String),

    #[error("sign in to take part in the conversation")]
    NotAuthenticated,

    #[error("not authorized to perform this action")]
    Forbidden,

    #[error("comment not found")]
    NotFound,

    #[error("comment backend is unavailable")]
    BackendUnavailable(#[from] BackendError),
}

impl Debug for CommentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        utils::error_chain_fmt(self, f)
    }
}

pub(crate) fn require_actor(actor: Option<ActorId>) -> Result<ActorId, CommentError> {
    actor.ok_or(CommentError::NotAuthenticated)
}
