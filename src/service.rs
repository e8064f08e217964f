use chrono::NaiveDate;
use log::debug;
use thiserror::Error;

use crate::core::{ProjectionResult, ScenarioParameters, UserProfile, ValidationError, project};
use crate::source::{FetchError, UserDataSource};

/// Either the lookup failed or the data it returned was unusable. The two are
/// kept apart so callers can tell a bad identifier from bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub async fn load_profile<S: UserDataSource>(
    source: &S,
    user_id: u64,
    as_of: NaiveDate,
) -> Result<UserProfile, ProjectionError> {
    let record = source.fetch_user(user_id).await?;
    let profile = record.to_profile(as_of)?;
    debug!(
        "user {user_id}: {} years to retirement, {} years in retirement",
        profile.years_to_retirement(),
        profile.retirement_years()
    );
    Ok(profile)
}

pub async fn project_user<S: UserDataSource>(
    source: &S,
    user_id: u64,
    scenario: &ScenarioParameters,
    as_of: NaiveDate,
) -> Result<(UserProfile, ProjectionResult), ProjectionError> {
    let profile = load_profile(source, user_id, as_of).await?;
    let result = project(&profile, scenario)?;
    Ok((profile, result))
}
