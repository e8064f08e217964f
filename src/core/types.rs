use serde::{Deserialize, Serialize};

use super::error::ValidationError;

pub const DEFAULT_INFLATION_RATE: f64 = 0.03;
pub const DEFAULT_ANNUAL_SALARY_INCREASE: f64 = 0.02;

/// Unvalidated profile fields, as supplied by a caller or a data source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub annual_salary: f64,
    pub savings_rate: f64,
    pub expected_annual_return: f64,
    pub desired_annual_retirement_income: f64,
}

/// A validated, immutable snapshot of one person's projection inputs.
///
/// Construct with [`UserProfile::new`]; every instance satisfies
/// `retirement_age > current_age` and `life_expectancy >= retirement_age`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    current_age: u32,
    retirement_age: u32,
    life_expectancy: u32,
    current_savings: f64,
    annual_salary: f64,
    savings_rate: f64,
    expected_annual_return: f64,
    desired_annual_retirement_income: f64,
}

impl UserProfile {
    pub fn new(input: UserProfileInput) -> Result<Self, ValidationError> {
        if input.retirement_age <= input.current_age {
            return Err(ValidationError::RetirementNotAfterCurrentAge {
                current_age: input.current_age,
                retirement_age: input.retirement_age,
            });
        }

        if input.life_expectancy < input.retirement_age {
            return Err(ValidationError::LifeExpectancyBeforeRetirement {
                retirement_age: input.retirement_age,
                life_expectancy: input.life_expectancy,
            });
        }

        for (field, value) in [
            ("current savings", input.current_savings),
            ("annual salary", input.annual_salary),
            (
                "desired annual retirement income",
                input.desired_annual_retirement_income,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidAmount { field, value });
            }
        }

        if !(0.0..=1.0).contains(&input.savings_rate) {
            return Err(ValidationError::SavingsRateOutOfRange {
                value: input.savings_rate,
            });
        }

        if !input.expected_annual_return.is_finite() {
            return Err(ValidationError::NonFiniteRate {
                field: "expected annual return",
                value: input.expected_annual_return,
            });
        }

        Ok(Self {
            current_age: input.current_age,
            retirement_age: input.retirement_age,
            life_expectancy: input.life_expectancy,
            current_savings: input.current_savings,
            annual_salary: input.annual_salary,
            savings_rate: input.savings_rate,
            expected_annual_return: input.expected_annual_return,
            desired_annual_retirement_income: input.desired_annual_retirement_income,
        })
    }

    pub fn current_age(&self) -> u32 {
        self.current_age
    }

    pub fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    pub fn life_expectancy(&self) -> u32 {
        self.life_expectancy
    }

    pub fn current_savings(&self) -> f64 {
        self.current_savings
    }

    pub fn annual_salary(&self) -> f64 {
        self.annual_salary
    }

    pub fn savings_rate(&self) -> f64 {
        self.savings_rate
    }

    pub fn expected_annual_return(&self) -> f64 {
        self.expected_annual_return
    }

    pub fn desired_annual_retirement_income(&self) -> f64 {
        self.desired_annual_retirement_income
    }

    /// Accumulation horizon; always > 0.
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age - self.current_age
    }

    /// Spend-down horizon; may be 0.
    pub fn retirement_years(&self) -> u32 {
        self.life_expectancy - self.retirement_age
    }
}

impl TryFrom<UserProfileInput> for UserProfile {
    type Error = ValidationError;

    fn try_from(input: UserProfileInput) -> Result<Self, Self::Error> {
        Self::new(input)
    }
}

/// Caller-supplied economic assumptions, independent of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioParameters {
    pub inflation_rate: f64,
    pub annual_salary_increase: f64,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            inflation_rate: DEFAULT_INFLATION_RATE,
            annual_salary_increase: DEFAULT_ANNUAL_SALARY_INCREASE,
        }
    }
}

impl ScenarioParameters {
    pub fn new(inflation_rate: f64, annual_salary_increase: f64) -> Self {
        Self {
            inflation_rate,
            annual_salary_increase,
        }
    }

    fn named_rates(&self) -> [(&'static str, f64); 2] {
        [
            ("inflation rate", self.inflation_rate),
            ("annual salary increase", self.annual_salary_increase),
        ]
    }

    /// The only check `project` applies: both rates must be finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.named_rates() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteRate { field, value });
            }
        }
        Ok(())
    }

    /// Opt-in range check. Rejects rates outside (-1, 1), which usually means
    /// a whole-number percentage (`2`) was passed where a fraction (`0.02`)
    /// was expected.
    pub fn check_ranges(&self) -> Result<(), ValidationError> {
        self.validate()?;
        for (field, value) in self.named_rates() {
            if value <= -1.0 || value >= 1.0 {
                return Err(ValidationError::RateOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub retirement_age: u32,
    pub years_to_retirement: u32,
    pub retirement_years: u32,
    /// Nominal dollars needed at retirement age.
    pub required_savings: f64,
    /// Nominal dollars accumulated by retirement age.
    pub projected_savings: f64,
}

impl ProjectionResult {
    /// Projected minus required savings; negative is a shortfall.
    pub fn surplus(&self) -> f64 {
        self.projected_savings - self.required_savings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationYear {
    pub age: u32,
    pub salary: f64,
    pub contribution: f64,
    pub growth: f64,
    pub end_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownYear {
    pub age: u32,
    pub income_needed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> UserProfileInput {
        UserProfileInput {
            current_age: 30,
            retirement_age: 63,
            life_expectancy: 90,
            current_savings: 50_000.0,
            annual_salary: 80_000.0,
            savings_rate: 0.15,
            expected_annual_return: 0.07,
            desired_annual_retirement_income: 60_000.0,
        }
    }

    #[test]
    fn valid_input_builds_profile_with_positive_horizon() {
        let profile = UserProfile::new(sample_input()).expect("valid profile");
        assert_eq!(profile.years_to_retirement(), 33);
        assert_eq!(profile.retirement_years(), 27);
        assert_eq!(profile.current_savings(), 50_000.0);
    }

    #[test]
    fn rejects_retirement_age_equal_to_current_age() {
        let mut input = sample_input();
        input.retirement_age = input.current_age;
        let err = UserProfile::new(input).expect_err("must reject");
        assert_eq!(
            err,
            ValidationError::RetirementNotAfterCurrentAge {
                current_age: 30,
                retirement_age: 30,
            }
        );
        assert!(err.to_string().contains("retirement age"));
    }

    #[test]
    fn rejects_retirement_age_before_current_age() {
        let mut input = sample_input();
        input.current_age = 70;
        assert!(matches!(
            UserProfile::new(input),
            Err(ValidationError::RetirementNotAfterCurrentAge { .. })
        ));
    }

    #[test]
    fn accepts_life_expectancy_equal_to_retirement_age() {
        let mut input = sample_input();
        input.life_expectancy = input.retirement_age;
        let profile = UserProfile::new(input).expect("boundary is valid");
        assert_eq!(profile.retirement_years(), 0);
    }

    #[test]
    fn rejects_life_expectancy_before_retirement_age() {
        let mut input = sample_input();
        input.life_expectancy = 62;
        assert!(matches!(
            UserProfile::new(input),
            Err(ValidationError::LifeExpectancyBeforeRetirement { .. })
        ));
    }

    #[test]
    fn rejects_negative_or_non_finite_amounts() {
        let mut input = sample_input();
        input.current_savings = -1.0;
        let err = UserProfile::new(input).expect_err("must reject negative savings");
        assert!(err.to_string().contains("current savings"));

        let mut input = sample_input();
        input.annual_salary = f64::NAN;
        assert!(matches!(
            UserProfile::new(input),
            Err(ValidationError::InvalidAmount {
                field: "annual salary",
                ..
            })
        ));

        let mut input = sample_input();
        input.desired_annual_retirement_income = f64::INFINITY;
        assert!(matches!(
            UserProfile::new(input),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn rejects_savings_rate_outside_unit_interval() {
        for rate in [-0.01, 1.01, f64::NAN] {
            let mut input = sample_input();
            input.savings_rate = rate;
            assert!(matches!(
                UserProfile::new(input),
                Err(ValidationError::SavingsRateOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_finite_expected_return_but_allows_negative() {
        let mut input = sample_input();
        input.expected_annual_return = f64::NEG_INFINITY;
        assert!(matches!(
            UserProfile::new(input),
            Err(ValidationError::NonFiniteRate { .. })
        ));

        let mut input = sample_input();
        input.expected_annual_return = -0.2;
        assert!(UserProfile::try_from(input).is_ok());
    }

    #[test]
    fn scenario_defaults_match_documented_values() {
        let scenario = ScenarioParameters::default();
        assert_eq!(scenario.inflation_rate, 0.03);
        assert_eq!(scenario.annual_salary_increase, 0.02);

        let parsed: ScenarioParameters =
            serde_json::from_str(r#"{"inflationRate": 0.05}"#).expect("partial json");
        assert_eq!(parsed.inflation_rate, 0.05);
        assert_eq!(parsed.annual_salary_increase, DEFAULT_ANNUAL_SALARY_INCREASE);
    }

    #[test]
    fn scenario_validate_only_checks_finiteness() {
        assert!(ScenarioParameters::new(2.0, -3.0).validate().is_ok());
        assert!(matches!(
            ScenarioParameters::new(f64::NAN, 0.02).validate(),
            Err(ValidationError::NonFiniteRate {
                field: "inflation rate",
                ..
            })
        ));
    }

    #[test]
    fn scenario_range_check_rejects_whole_number_percentages() {
        assert!(ScenarioParameters::default().check_ranges().is_ok());
        assert!(ScenarioParameters::new(-0.01, 0.0).check_ranges().is_ok());

        let err = ScenarioParameters::new(0.03, 2.0)
            .check_ranges()
            .expect_err("2 means 200%");
        assert_eq!(
            err,
            ValidationError::RateOutOfRange {
                field: "annual salary increase",
                value: 2.0,
            }
        );
    }

    #[test]
    fn surplus_is_negative_on_shortfall() {
        let result = ProjectionResult {
            retirement_age: 63,
            years_to_retirement: 33,
            retirement_years: 27,
            required_savings: 100.0,
            projected_savings: 40.0,
        };
        assert_eq!(result.surplus(), -60.0);
    }
}
