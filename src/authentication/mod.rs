mod session;

pub use session::{AccessToken, resolve_actor};
