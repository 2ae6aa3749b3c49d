//! Domain types, independent of any infrastructure concerns.

mod stream;
mod user;

pub use stream::{NewStream, Stream, StreamStatus, StreamUpdate};
pub use user::{NewUser, User};
