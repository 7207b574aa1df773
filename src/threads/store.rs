use uuid::Uuid;

use crate::{
    domain::{ActorId, CommentThread, ThreadedComment},
    moderation::Permissions,
    repository::CommentBackend,
    threads::{CommentError, CommentService},
};

/// Identifies one thread rebuild so its result can be matched against the
/// store it was issued by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    epoch: u64,
    post_id: Uuid,
}

impl RefreshTicket {
    pub fn post_id(&self) -> Uuid {
        self.post_id
    }
}

/// The comment view model of one UI session.
///
/// The store is pointed at a single post at a time. Opening another post or
/// closing the store invalidates every ticket issued before, so a rebuild that
/// finishes late is dropped instead of overwriting the newer post's thread.
/// Among tickets of the current post, the last one applied wins.
pub struct CommentStore<B: ?Sized> {
    service: CommentService<B>,
    post_id: Uuid,
    epoch: u64,
    thread: Option<CommentThread>,
    loading: bool,
    error: Option<String>,
}

impl<B> CommentStore<B>
where
    B: CommentBackend + ?Sized,
{
    pub fn new(service: CommentService<B>, post_id: Uuid) -> Self {
        Self {
            service,
            post_id,
            epoch: 0,
            thread: None,
            loading: false,
            error: None,
        }
    }

    pub fn service(&self) -> &CommentService<B> {
        &self.service
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }

    pub fn thread(&self) -> Option<&CommentThread> {
        self.thread.as_ref()
    }

    pub fn comments(&self) -> &[ThreadedComment] {
        self.thread
            .as_ref()
            .map(|t| t.comments.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Points the store at another post. Rebuilds still in flight for the
    /// previous post are dropped when they finish.
    pub fn open(&mut self, post_id: Uuid) {
        self.close();
        self.post_id = post_id;
    }

    /// Forgets the current thread and invalidates every outstanding ticket.
    pub fn close(&mut self) {
        self.epoch += 1;
        self.thread = None;
        self.loading = false;
        self.error = None;
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.loading = true;
        RefreshTicket {
            epoch: self.epoch,
            post_id: self.post_id,
        }
    }

    /// Applies a finished rebuild. Returns `Ok(false)` when the result was
    /// discarded because the store moved on to another post.
    pub fn apply(
        &mut self,
        ticket: RefreshTicket,
        result: Result<CommentThread, CommentError>,
    ) -> Result<bool, CommentError> {
        if ticket.epoch != self.epoch {
            tracing::debug!(post_id = %ticket.post_id, "Discarding rebuild for a post no longer shown");
            return Ok(false);
        }

        self.loading = false;
        match result {
            Ok(thread) if thread.post_id != ticket.post_id => {
                tracing::debug!(post_id = %thread.post_id, "Discarding rebuild of another post");
                Ok(false)
            }
            Ok(thread) => {
                self.thread = Some(thread);
                self.error = None;
                Ok(true)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    #[tracing::instrument(name = "Refresh comment store", skip(self), fields(post_id = %self.post_id))]
    pub async fn refresh(&mut self) -> Result<(), CommentError> {
        let ticket = self.begin_refresh();
        let result = self.service.thread(ticket.post_id).await;
        self.apply(ticket, result).map(|_| ())
    }

    pub async fn permissions(&self, actor: ActorId) -> Result<Permissions, CommentError> {
        Ok(Permissions::resolve(self.service.backend(), actor, self.post_id).await?)
    }

    pub async fn add_comment(
        &mut self,
        actor: Option<ActorId>,
        text: String,
        parent_id: Option<Uuid>,
    ) -> Result<(), CommentError> {
        let ticket = self.begin_refresh();
        let result = self
            .service
            .add_comment(actor, ticket.post_id, text, parent_id)
            .await;
        self.settle(ticket, result)
    }

    pub async fn delete_comment(
        &mut self,
        actor: Option<ActorId>,
        comment_id: Uuid,
    ) -> Result<(), CommentError> {
        let ticket = self.begin_refresh();
        let result = self.service.delete_comment(actor, comment_id).await;
        self.settle(ticket, result)
    }

    pub async fn pin_comment(
        &mut self,
        actor: Option<ActorId>,
        comment_id: Uuid,
        pinned: bool,
    ) -> Result<(), CommentError> {
        let ticket = self.begin_refresh();
        let result = self.service.pin_comment(actor, comment_id, pinned).await;
        self.settle(ticket, result)
    }

    /// A failed mutation leaves the last good thread in place and goes back to
    /// the caller; it is not recorded as a load error.
    fn settle(
        &mut self,
        ticket: RefreshTicket,
        result: Result<CommentThread, CommentError>,
    ) -> Result<(), CommentError> {
        match result {
            Ok(thread) => self.apply(ticket, Ok(thread)).map(|_| ()),
            Err(e) => {
                if ticket.epoch == self.epoch {
                    self.loading = false;
                }
                Err(e)
            }
        }
    }
}
