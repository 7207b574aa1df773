use uuid::Uuid;

use crate::domain::{ActorId, CommentText};

/// A validated comment ready to be written to the backend.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: ActorId,
    pub parent_id: Option<Uuid>,
    pub text: CommentText,
}

impl NewComment {
    pub fn new(
        post_id: Uuid,
        author_id: ActorId,
        text: String,
        parent_id: Option<Uuid>,
    ) -> Result<Self, String> {
        Ok(Self {
            post_id,
            author_id,
            parent_id,
            text: CommentText::parse(text)?,
        })
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}
