use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use commentary::authentication::AccessToken;
use commentary::domain::{ActorId, AuthorProfile, Comment, NewComment, PinUpdate, Role};
use commentary::repository::{BackendError, CommentBackend, CommentQuery, ParentFilter};
use uuid::Uuid;

/// A `CommentBackend` kept in memory, with call counters and failure switches.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    comments: Vec<Comment>,
    profiles: HashMap<ActorId, AuthorProfile>,
    roles: HashMap<ActorId, Role>,
    posts: HashMap<Uuid, ActorId>,
    sessions: HashMap<String, ActorId>,
    clock: i64,
    fail_top_level: bool,
    reverse_results: bool,
    failing_replies: HashSet<Uuid>,
    failing_profiles: HashSet<ActorId>,
    refused_deletes: HashSet<Uuid>,
    calls: Calls,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub queries: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    pub profile_lookups: usize,
}

fn unavailable() -> BackendError {
    BackendError::Unexpected(anyhow!("connection refused"))
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

impl InMemoryBackend {
    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_post(&self, post_id: Uuid, author: ActorId) {
        self.with_state(|s| s.posts.insert(post_id, author));
    }

    pub fn set_role(&self, actor: ActorId, role: Role) {
        self.with_state(|s| s.roles.insert(actor, role));
    }

    pub fn set_profile(&self, actor: ActorId, profile: AuthorProfile) {
        self.with_state(|s| s.profiles.insert(actor, profile));
    }

    pub fn add_session(&self, token: &str, actor: ActorId) {
        self.with_state(|s| s.sessions.insert(token.to_string(), actor));
    }

    /// Stores a comment created `minutes` after a fixed epoch.
    pub fn seed(
        &self,
        post_id: Uuid,
        author: ActorId,
        parent_id: Option<Uuid>,
        text: &str,
        minutes: i64,
    ) -> Comment {
        let created_at = epoch() + Duration::minutes(minutes);
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id: author,
            parent_id,
            text: text.to_string(),
            pinned: false,
            pinned_by: None,
            created_at,
            updated_at: created_at,
        };
        self.with_state(|s| {
            s.clock = s.clock.max(minutes * 60 + 1);
            s.comments.push(comment.clone());
        });
        comment
    }

    pub fn seed_pinned(&self, post_id: Uuid, author: ActorId, text: &str, minutes: i64) -> Comment {
        let comment = self.seed(post_id, author, None, text, minutes);
        self.with_state(|s| {
            let stored = s.comments.iter_mut().find(|c| c.id == comment.id).unwrap();
            stored.pinned = true;
            stored.pinned_by = Some(author);
            stored.clone()
        })
    }

    pub fn stored(&self, id: Uuid) -> Option<Comment> {
        self.with_state(|s| s.comments.iter().find(|c| c.id == id).cloned())
    }

    pub fn stored_count(&self) -> usize {
        self.with_state(|s| s.comments.len())
    }

    pub fn calls(&self) -> Calls {
        self.with_state(|s| s.calls)
    }

    pub fn fail_top_level(&self, fail: bool) {
        self.with_state(|s| s.fail_top_level = fail);
    }

    pub fn reverse_results(&self, reverse: bool) {
        self.with_state(|s| s.reverse_results = reverse);
    }

    pub fn fail_replies_of(&self, parent_id: Uuid) {
        self.with_state(|s| s.failing_replies.insert(parent_id));
    }

    pub fn fail_profile_of(&self, actor: ActorId) {
        self.with_state(|s| s.failing_profiles.insert(actor));
    }

    /// Deletes of this row match nothing, like a row-level policy refusing it.
    pub fn refuse_delete_of(&self, id: Uuid) {
        self.with_state(|s| s.refused_deletes.insert(id));
    }
}

#[async_trait]
impl CommentBackend for InMemoryBackend {
    async fn query_comments(&self, query: &CommentQuery) -> Result<Vec<Comment>, BackendError> {
        self.with_state(|s| {
            s.calls.queries += 1;

            match query.parent {
                ParentFilter::TopLevel if s.fail_top_level => return Err(unavailable()),
                ParentFilter::RepliesTo(parent) if s.failing_replies.contains(&parent) => {
                    return Err(unavailable());
                }
                _ => {}
            }

            let mut rows: Vec<Comment> = s
                .comments
                .iter()
                .filter(|c| query.matches(c))
                .cloned()
                .collect();
            rows.sort_by(|a, b| query.compare(a, b));
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }
            if s.reverse_results {
                rows.reverse();
            }
            Ok(rows)
        })
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, BackendError> {
        self.with_state(|s| {
            s.calls.queries += 1;
            Ok(s.comments.iter().find(|c| c.id == id).cloned())
        })
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError> {
        self.with_state(|s| {
            s.calls.inserts += 1;
            s.clock += 60;
            let created_at = epoch() + Duration::seconds(s.clock);
            let created = Comment {
                id: Uuid::new_v4(),
                post_id: comment.post_id,
                author_id: comment.author_id,
                parent_id: comment.parent_id,
                text: comment.text.as_ref().to_string(),
                pinned: false,
                pinned_by: None,
                created_at,
                updated_at: created_at,
            };
            s.comments.push(created.clone());
            Ok(created)
        })
    }

    async fn update_pin(
        &self,
        id: Uuid,
        update: PinUpdate,
    ) -> Result<Option<Comment>, BackendError> {
        self.with_state(|s| {
            s.calls.updates += 1;
            Ok(s.comments.iter_mut().find(|c| c.id == id).map(|c| {
                c.pinned = update.is_pinned;
                c.pinned_by = update.pinned_by.map(ActorId::from);
                c.clone()
            }))
        })
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, BackendError> {
        self.with_state(|s| {
            s.calls.deletes += 1;
            if s.refused_deletes.contains(&id) {
                return Ok(false);
            }
            let before = s.comments.len();
            s.comments.retain(|c| c.id != id);
            Ok(s.comments.len() < before)
        })
    }

    async fn query_profile(&self, author: ActorId) -> Result<Option<AuthorProfile>, BackendError> {
        self.with_state(|s| {
            s.calls.profile_lookups += 1;
            if s.failing_profiles.contains(&author) {
                return Err(unavailable());
            }
            Ok(s.profiles.get(&author).cloned())
        })
    }

    async fn actor_role(&self, actor: ActorId) -> Result<Role, BackendError> {
        self.with_state(|s| Ok(s.roles.get(&actor).copied().unwrap_or_default()))
    }

    async fn post_author(&self, post_id: Uuid) -> Result<Option<ActorId>, BackendError> {
        self.with_state(|s| Ok(s.posts.get(&post_id).copied()))
    }

    async fn current_actor(&self, token: &AccessToken) -> Result<Option<ActorId>, BackendError> {
        self.with_state(|s| Ok(s.sessions.get(token.expose()).copied()))
    }
}
