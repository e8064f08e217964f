use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};

use super::{FetchError, RawUserRecord, UserDataSource};

pub const DEFAULT_API_ROOT: &str = "https://pgf7hywzb5.execute-api.us-east-1.amazonaws.com/users";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches user records from the users API at `{api_root}/{user_id}`.
#[derive(Debug, Clone)]
pub struct HttpUserSource {
    client: Client,
    api_root: String,
}

impl HttpUserSource {
    pub fn new(api_root: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_root: api_root.into(),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn user_url(&self, user_id: u64) -> String {
        format!("{}/{user_id}", self.api_root.trim_end_matches('/'))
    }
}

impl UserDataSource for HttpUserSource {
    async fn fetch_user(&self, user_id: u64) -> Result<RawUserRecord, FetchError> {
        let url = self.user_url(user_id);
        debug!("fetching user record from {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("request to {url} failed: {e}");
            FetchError::Transport(format!("request to {url} failed: {e}"))
        })?;
        check_status(user_id, response.status())?;

        response
            .json::<RawUserRecord>()
            .await
            .map_err(|e| FetchError::Transport(format!("invalid user record from {url}: {e}")))
    }
}

fn check_status(user_id: u64, status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound { user_id });
    }
    if !status.is_success() {
        return Err(FetchError::Transport(format!(
            "users API responded with {status}"
        )));
    }
    Ok(())
}
