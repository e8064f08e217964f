use super::error::ValidationError;
use super::types::{
    AccumulationYear, DrawdownYear, ProjectionResult, ScenarioParameters, UserProfile,
};

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    balance: f64,
    salary: f64,
}

#[derive(Debug, Clone, Copy)]
struct AccumulationStep {
    salary: f64,
    growth: f64,
    contribution: f64,
}

impl Accumulator {
    fn new(balance: f64, salary: f64) -> Self {
        Self { balance, salary }
    }

    /// One year: grow the existing balance, then add this year's contribution,
    /// then apply the raise for next year. New money earns nothing in the year
    /// it is contributed.
    fn step(
        &mut self,
        savings_rate: f64,
        annual_return: f64,
        salary_increase: f64,
    ) -> AccumulationStep {
        let opening = self.balance;
        self.balance *= 1.0 + annual_return;
        let growth = self.balance - opening;

        let salary = self.salary;
        let contribution = salary * savings_rate;
        self.balance += contribution;

        self.salary *= 1.0 + salary_increase;

        AccumulationStep {
            salary,
            growth,
            contribution,
        }
    }
}

/// Validates the scenario and computes both retirement figures.
pub fn project(
    profile: &UserProfile,
    scenario: &ScenarioParameters,
) -> Result<ProjectionResult, ValidationError> {
    scenario.validate()?;

    Ok(ProjectionResult {
        retirement_age: profile.retirement_age(),
        years_to_retirement: profile.years_to_retirement(),
        retirement_years: profile.retirement_years(),
        required_savings: required_savings(profile, scenario),
        projected_savings: projected_savings(profile, scenario),
    })
}

/// Desired income in retirement-age dollars, i.e. today's target inflated over
/// the accumulation horizon.
pub fn future_annual_income(profile: &UserProfile, scenario: &ScenarioParameters) -> f64 {
    let desired = profile.desired_annual_retirement_income();
    // Zero stays zero for any rate, even one whose compound factor overflows.
    if desired == 0.0 {
        return 0.0;
    }
    let mut income = desired;
    for _ in 0..profile.years_to_retirement() {
        income *= 1.0 + scenario.inflation_rate;
    }
    income
}

/// Nominal nest egg needed at retirement age to fund every retirement year,
/// with each year's need inflated from the previous one.
pub fn required_savings(profile: &UserProfile, scenario: &ScenarioParameters) -> f64 {
    growing_payment_total(
        future_annual_income(profile, scenario),
        scenario.inflation_rate,
        profile.retirement_years(),
    )
}

/// Nominal balance accumulated by retirement age.
pub fn projected_savings(profile: &UserProfile, scenario: &ScenarioParameters) -> f64 {
    accumulate(
        profile.current_savings(),
        profile.annual_salary(),
        profile.savings_rate(),
        profile.expected_annual_return(),
        scenario.annual_salary_increase,
        profile.years_to_retirement(),
    )
}

/// Year-by-year view of [`projected_savings`]. The final `end_balance` is the
/// projected figure exactly.
pub fn accumulation_schedule(
    profile: &UserProfile,
    scenario: &ScenarioParameters,
) -> Vec<AccumulationYear> {
    let years = profile.years_to_retirement();
    let mut acc = Accumulator::new(profile.current_savings(), profile.annual_salary());
    let mut rows = Vec::with_capacity(years as usize);
    for year in 0..years {
        let step = acc.step(
            profile.savings_rate(),
            profile.expected_annual_return(),
            scenario.annual_salary_increase,
        );
        rows.push(AccumulationYear {
            age: profile.current_age() + year + 1,
            salary: step.salary,
            contribution: step.contribution,
            growth: step.growth,
            end_balance: acc.balance,
        });
    }
    rows
}

/// Nominal income needed in each retirement year, starting at retirement age.
pub fn drawdown_schedule(
    profile: &UserProfile,
    scenario: &ScenarioParameters,
) -> Vec<DrawdownYear> {
    let first_year = future_annual_income(profile, scenario);
    (profile.retirement_age()..profile.life_expectancy())
        .zip(GrowingPayments::new(first_year, scenario.inflation_rate))
        .map(|(age, income_needed)| DrawdownYear { age, income_needed })
        .collect()
}

fn accumulate(
    start_balance: f64,
    start_salary: f64,
    savings_rate: f64,
    annual_return: f64,
    salary_increase: f64,
    years: u32,
) -> f64 {
    let mut acc = Accumulator::new(start_balance, start_salary);
    for _ in 0..years {
        acc.step(savings_rate, annual_return, salary_increase);
    }
    acc.balance
}

/// `first_payment, first_payment * (1 + growth_rate), ...`, one term per year.
///
/// Each term is the previous one times the rounded factor `1 + growth_rate`,
/// so for a non-negative payment and `1 + growth_rate >= 0` every term (and
/// any running total of them) is non-decreasing in the rate.
#[derive(Debug, Clone, Copy)]
struct GrowingPayments {
    payment: f64,
    factor: f64,
}

impl GrowingPayments {
    fn new(first_payment: f64, growth_rate: f64) -> Self {
        Self {
            payment: first_payment,
            factor: 1.0 + growth_rate,
        }
    }
}

impl Iterator for GrowingPayments {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let payment = self.payment;
        self.payment *= self.factor;
        Some(payment)
    }
}

/// `sum_{k=0}^{years-1} first_payment * (1 + growth_rate)^k`, summed in order.
fn growing_payment_total(first_payment: f64, growth_rate: f64, years: u32) -> f64 {
    GrowingPayments::new(first_payment, growth_rate)
        .take(years as usize)
        .fold(0.0, |total, payment| total + payment)
}
