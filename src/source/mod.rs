//! User data sources.
//!
//! A [`UserDataSource`] turns a user id into the raw record served by the
//! users API. Sources are passed explicitly to whatever needs them; nothing
//! here holds process-wide state.

mod http;
mod memory;
mod record;

use thiserror::Error;

pub use http::{DEFAULT_API_ROOT, DEFAULT_TIMEOUT_SECS, HttpUserSource};
pub use memory::InMemoryUserSource;
pub use record::{RawUserRecord, UserAssumptions, UserInfo, age_on};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("user {user_id} not found")]
    NotFound { user_id: u64 },

    #[error("user data source failed: {0}")]
    Transport(String),
}

pub trait UserDataSource: Send + Sync + 'static {
    /// Fetch the raw record for `user_id`. Implementations do not retry or
    /// cache; an unknown id is [`FetchError::NotFound`], anything else that
    /// goes wrong is [`FetchError::Transport`].
    fn fetch_user(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<RawUserRecord, FetchError>> + Send;
}
