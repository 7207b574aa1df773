use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    authentication::AccessToken,
    domain::{ActorId, AuthorProfile, Comment, CommentRecord, NewComment, PinUpdate, Role},
    repository::{BackendError, CommentBackend, CommentQuery},
};

/// Client for the hosted backend's REST (PostgREST) and auth endpoints.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http_client: Client,
    base_url: Url,
    api_key: Secret<String>,
    access_token: Option<AccessToken>,
}

#[derive(Serialize)]
struct InsertCommentBody<'a> {
    post_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: &'a str,
    is_pinned: bool,
}

#[derive(Deserialize)]
struct RoleRow {
    role: Role,
}

#[derive(Deserialize)]
struct PostOwnerRow {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct RejectionBody {
    message: Option<String>,
}

impl SupabaseClient {
    pub fn new(
        base_url: Url,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
            access_token: None,
        })
    }

    /// A client whose requests run under the given session, so the backend's
    /// row-level policies see the signed-in user.
    pub fn for_session(&self, token: AccessToken) -> Self {
        Self {
            access_token: Some(token),
            ..self.clone()
        }
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(&format!("/rest/v1/{table}"))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self
            .access_token
            .as_ref()
            .map(AccessToken::expose)
            .unwrap_or_else(|| self.api_key.expose_secret().as_str());

        self.http_client
            .request(method, url)
            .header("apikey", self.api_key.expose_secret().as_str())
            .bearer_auth(bearer)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, &body));
        }

        Ok(response.json::<Vec<T>>().await?)
    }

    async fn fetch_first<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, BackendError> {
        Ok(self.fetch_rows(request).await?.into_iter().next())
    }
}

fn rejection(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<RejectionBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    BackendError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl CommentBackend for SupabaseClient {
    #[tracing::instrument(skip(self), fields(post_id = ?query.post_id, parent = ?query.parent))]
    async fn query_comments(&self, query: &CommentQuery) -> Result<Vec<Comment>, BackendError> {
        let request = self
            .request(Method::GET, self.table_url("comments")?)
            .query(&query.to_postgrest());

        let rows: Vec<CommentRecord> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    #[tracing::instrument(skip(self), fields(comment_id = %id))]
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, BackendError> {
        let request = self
            .request(Method::GET, self.table_url("comments")?)
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ]);

        let row: Option<CommentRecord> = self.fetch_first(request).await?;
        Ok(row.map(Comment::from))
    }

    #[tracing::instrument(skip_all, fields(post_id = %comment.post_id, parent_id = ?comment.parent_id))]
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError> {
        let body = InsertCommentBody {
            post_id: comment.post_id,
            user_id: *comment.author_id,
            parent_id: comment.parent_id,
            content: comment.text.as_ref(),
            is_pinned: false,
        };

        let request = self
            .request(Method::POST, self.table_url("comments")?)
            .header("Prefer", "return=representation")
            .json(&body);

        let row: Option<CommentRecord> = self.fetch_first(request).await?;
        row.map(Comment::from)
            .ok_or_else(|| anyhow!("Insert returned no comment row").into())
    }

    #[tracing::instrument(skip(self), fields(comment_id = %id))]
    async fn update_pin(
        &self,
        id: Uuid,
        update: PinUpdate,
    ) -> Result<Option<Comment>, BackendError> {
        let request = self
            .request(Method::PATCH, self.table_url("comments")?)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&update);

        let row: Option<CommentRecord> = self.fetch_first(request).await?;
        Ok(row.map(Comment::from))
    }

    #[tracing::instrument(skip(self), fields(comment_id = %id))]
    async fn delete_comment(&self, id: Uuid) -> Result<bool, BackendError> {
        let request = self
            .request(Method::DELETE, self.table_url("comments")?)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");

        let rows: Vec<CommentRecord> = self.fetch_rows(request).await?;
        Ok(!rows.is_empty())
    }

    #[tracing::instrument(skip(self), fields(author_id = %author))]
    async fn query_profile(&self, author: ActorId) -> Result<Option<AuthorProfile>, BackendError> {
        let request = self
            .request(Method::GET, self.table_url("profiles")?)
            .query(&[
                ("select", "display_name,avatar_url,username".to_string()),
                ("user_id", format!("eq.{author}")),
                ("limit", "1".to_string()),
            ]);

        self.fetch_first(request).await
    }

    #[tracing::instrument(skip(self), fields(actor_id = %actor))]
    async fn actor_role(&self, actor: ActorId) -> Result<Role, BackendError> {
        let request = self
            .request(Method::GET, self.table_url("user_roles")?)
            .query(&[
                ("select", "role".to_string()),
                ("user_id", format!("eq.{actor}")),
                ("limit", "1".to_string()),
            ]);

        let row: Option<RoleRow> = self.fetch_first(request).await?;
        Ok(row.map(|r| r.role).unwrap_or_default())
    }

    #[tracing::instrument(skip(self), fields(post_id = %post_id))]
    async fn post_author(&self, post_id: Uuid) -> Result<Option<ActorId>, BackendError> {
        let request = self
            .request(Method::GET, self.table_url("blog_posts")?)
            .query(&[
                ("select", "user_id".to_string()),
                ("id", format!("eq.{post_id}")),
                ("limit", "1".to_string()),
            ]);

        let row: Option<PostOwnerRow> = self.fetch_first(request).await?;
        Ok(row.map(|r| ActorId::from(r.user_id)))
    }

    #[tracing::instrument(skip_all)]
    async fn current_actor(&self, token: &AccessToken) -> Result<Option<ActorId>, BackendError> {
        let url = self.base_url.join("/auth/v1/user")?;
        let response = self
            .http_client
            .get(url)
            .header("apikey", self.api_key.expose_secret().as_str())
            .bearer_auth(token.expose())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, &body));
        }

        let user: AuthUser = response.json().await?;
        Ok(Some(ActorId::from(user.id)))
    }
}
