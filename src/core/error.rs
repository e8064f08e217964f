use chrono::NaiveDate;
use thiserror::Error;

/// A profile or scenario invariant that does not hold.
///
/// Values are reported as supplied; nothing is clamped or coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("retirement age ({retirement_age}) must be greater than current age ({current_age})")]
    RetirementNotAfterCurrentAge {
        current_age: u32,
        retirement_age: u32,
    },

    #[error(
        "life expectancy ({life_expectancy}) must be >= retirement age ({retirement_age})"
    )]
    LifeExpectancyBeforeRetirement {
        retirement_age: u32,
        life_expectancy: u32,
    },

    #[error("{field} must be a finite amount >= 0, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("savings rate must be between 0 and 1, got {value}")]
    SavingsRateOutOfRange { value: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteRate { field: &'static str, value: f64 },

    #[error("{field} must be a fraction between -1 and 1 (e.g. 0.02 for 2%), got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("date of birth {date_of_birth} is after {as_of}")]
    BirthDateInFuture {
        date_of_birth: NaiveDate,
        as_of: NaiveDate,
    },
}
