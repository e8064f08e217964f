mod engine;
mod error;
mod types;

pub use engine::{
    accumulation_schedule, drawdown_schedule, future_annual_income, project, projected_savings,
    required_savings,
};
pub use error::ValidationError;
pub use types::{
    AccumulationYear, DEFAULT_ANNUAL_SALARY_INCREASE, DEFAULT_INFLATION_RATE, DrawdownYear,
    ProjectionResult, ScenarioParameters, UserProfile, UserProfileInput,
};
