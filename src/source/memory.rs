use std::collections::HashMap;

use super::{FetchError, RawUserRecord, UserDataSource};

/// Records held in memory, keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserSource {
    records: HashMap<u64, RawUserRecord>,
}

impl InMemoryUserSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: u64, record: RawUserRecord) -> Self {
        self.insert(user_id, record);
        self
    }

    pub fn insert(&mut self, user_id: u64, record: RawUserRecord) {
        self.records.insert(user_id, record);
    }
}

impl UserDataSource for InMemoryUserSource {
    async fn fetch_user(&self, user_id: u64) -> Result<RawUserRecord, FetchError> {
        self.records
            .get(&user_id)
            .cloned()
            .ok_or(FetchError::NotFound { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{UserAssumptions, UserInfo};
    use chrono::NaiveDate;

    fn record() -> RawUserRecord {
        RawUserRecord {
            user_info: UserInfo {
                full_name: "Test User".to_string(),
                address: String::new(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
                household_income: 70_000.0,
                current_savings_rate: 12.0,
                current_retirement_savings: 25_000.0,
            },
            assumptions: UserAssumptions {
                pre_retirement_income_percent: 70.0,
                life_expectancy: 88,
                expected_rate_of_return: 6.0,
                retirement_age: 65,
            },
        }
    }

    #[tokio::test]
    async fn returns_stored_record() {
        let source = InMemoryUserSource::new().with_user(7, record());
        let fetched = source.fetch_user(7).await.expect("known user");
        assert_eq!(fetched, record());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let source = InMemoryUserSource::new().with_user(7, record());
        let err = source.fetch_user(8).await.expect_err("unknown user");
        assert_eq!(err, FetchError::NotFound { user_id: 8 });
        assert_eq!(err.to_string(), "user 8 not found");
    }
}
