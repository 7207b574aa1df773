use secrecy::{ExposeSecret, Secret};

use crate::domain::ActorId;
use crate::repository::{BackendError, CommentBackend};

/// Bearer token of a signed-in session, as issued by the hosted auth service.
#[derive(Clone, Debug)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: Secret<String>) -> Self {
        Self(token)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(Secret::new(token))
    }
}

/// Resolves the acting user once, at the session boundary.
///
/// Operations take the returned actor as an explicit argument instead of
/// asking the auth service again mid-flow.
#[tracing::instrument(name = "Resolve session actor", skip_all)]
pub async fn resolve_actor<B>(
    backend: &B,
    token: Option<&AccessToken>,
) -> Result<Option<ActorId>, BackendError>
where
    B: CommentBackend + ?Sized,
{
    let Some(token) = token else {
        return Ok(None);
    };

    let actor = backend.current_actor(token).await?;
    if actor.is_none() {
        tracing::info!("Access token does not belong to a live session");
    }
    Ok(actor)
}
