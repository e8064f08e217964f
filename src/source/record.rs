use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{UserProfile, UserProfileInput, ValidationError};

const DAYS_PER_YEAR: f64 = 365.25;

/// A user as returned by the users API. Percentages are written as whole
/// numbers (`9` means 9%).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawUserRecord {
    pub user_info: UserInfo,
    pub assumptions: UserAssumptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub household_income: f64,
    pub current_savings_rate: f64,
    pub current_retirement_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserAssumptions {
    pub pre_retirement_income_percent: f64,
    pub life_expectancy: u32,
    pub expected_rate_of_return: f64,
    pub retirement_age: u32,
}

impl RawUserRecord {
    /// Profile fields as of `as_of`, before validation.
    pub fn profile_input(&self, as_of: NaiveDate) -> Result<UserProfileInput, ValidationError> {
        let info = &self.user_info;
        let assumptions = &self.assumptions;
        let income_replacement = percent_to_fraction(assumptions.pre_retirement_income_percent);

        Ok(UserProfileInput {
            current_age: age_on(info.date_of_birth, as_of)?,
            retirement_age: assumptions.retirement_age,
            life_expectancy: assumptions.life_expectancy,
            current_savings: info.current_retirement_savings,
            annual_salary: info.household_income,
            savings_rate: percent_to_fraction(info.current_savings_rate),
            expected_annual_return: percent_to_fraction(assumptions.expected_rate_of_return),
            desired_annual_retirement_income: info.household_income * income_replacement,
        })
    }

    pub fn to_profile(&self, as_of: NaiveDate) -> Result<UserProfile, ValidationError> {
        UserProfile::new(self.profile_input(as_of)?)
    }
}

/// Whole years between `date_of_birth` and `as_of`, rounded down.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> Result<u32, ValidationError> {
    let days = (as_of - date_of_birth).num_days();
    if days < 0 {
        return Err(ValidationError::BirthDateInFuture {
            date_of_birth,
            as_of,
        });
    }
    Ok((days as f64 / DAYS_PER_YEAR).floor() as u32)
}

fn percent_to_fraction(written: f64) -> f64 {
    written / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date")
    }

    fn api_json(date_of_birth: NaiveDate) -> String {
        format!(
            r#"{{
              "user_info": {{
                "date_of_birth": "{date_of_birth}",
                "household_income": 60000,
                "current_savings_rate": 10,
                "current_retirement_savings": 10000,
                "full_name": "John Keats",
                "address": "26 Piazza di Spagna\nRome, Italy 00187"
              }},
              "assumptions": {{
                "pre_retirement_income_percent": 67,
                "life_expectancy": 90,
                "expected_rate_of_return": 10,
                "retirement_age": 60
              }}
            }}"#
        )
    }

    fn thirty_year_old() -> RawUserRecord {
        let dob = as_of() - Duration::days(365 * 30 + 10);
        serde_json::from_str(&api_json(dob)).expect("api json should parse")
    }

    #[test]
    fn parses_api_shape() {
        let record = thirty_year_old();
        assert_eq!(record.user_info.full_name, "John Keats");
        assert_eq!(record.assumptions.retirement_age, 60);
        assert_approx(record.user_info.household_income, 60_000.0);
    }

    #[test]
    fn written_percentages_become_fractions() {
        let input = thirty_year_old().profile_input(as_of()).expect("valid");
        assert_approx(input.savings_rate, 0.10);
        assert_approx(input.expected_annual_return, 0.10);
        assert_approx(input.desired_annual_retirement_income, 60_000.0 * 0.67);
        assert_approx(input.current_savings, 10_000.0);
        assert_approx(input.annual_salary, 60_000.0);
    }

    #[test]
    fn current_age_rounds_down_from_birth_date() {
        let input = thirty_year_old().profile_input(as_of()).expect("valid");
        assert_eq!(input.current_age, 30);

        let dob = NaiveDate::from_ymd_opt(1976, 10, 16).expect("valid date");
        assert_eq!(age_on(dob, as_of()).expect("past date"), 49);
        assert_eq!(age_on(as_of(), as_of()).expect("same day"), 0);
    }

    #[test]
    fn birth_date_after_as_of_is_rejected() {
        let tomorrow = as_of() + Duration::days(1);
        assert!(matches!(
            age_on(tomorrow, as_of()),
            Err(ValidationError::BirthDateInFuture { .. })
        ));
    }

    #[test]
    fn to_profile_applies_profile_validation() {
        let profile = thirty_year_old().to_profile(as_of()).expect("valid");
        assert_eq!(profile.years_to_retirement(), 30);
        assert_eq!(profile.retirement_years(), 30);

        let mut record = thirty_year_old();
        record.assumptions.retirement_age = 30;
        assert!(matches!(
            record.to_profile(as_of()),
            Err(ValidationError::RetirementNotAfterCurrentAge { .. })
        ));

        let mut record = thirty_year_old();
        record.assumptions.life_expectancy = 59;
        assert!(matches!(
            record.to_profile(as_of()),
            Err(ValidationError::LifeExpectancyBeforeRetirement { .. })
        ));
    }

    #[test]
    fn missing_assumptions_fail_to_parse() {
        let json = r#"{"user_info": {"date_of_birth": "1990-01-01"}}"#;
        assert!(serde_json::from_str::<RawUserRecord>(json).is_err());
    }
}
