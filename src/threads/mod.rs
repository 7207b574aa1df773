mod builder;
mod error;
mod feed;
mod operations;
mod store;

pub use builder::ThreadBuilder;
pub use error::CommentError;
pub use feed::FeedEntry;
pub use operations::CommentService;
pub use store::{CommentStore, RefreshTicket};
