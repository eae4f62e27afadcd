//! ユーザーリソース

mod store;
mod types;

pub use store::{InMemoryUserStore, UserStore};
pub use types::{NewUser, User, UserPatch};
