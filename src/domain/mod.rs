mod actor;
mod comment;
mod profile;
mod thread;

pub use actor::*;
pub use comment::*;
pub use profile::*;
pub use thread::*;
