use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    AccumulationYear, DEFAULT_ANNUAL_SALARY_INCREASE, DEFAULT_INFLATION_RATE, DrawdownYear,
    ProjectionResult, ScenarioParameters, UserProfile, UserProfileInput, ValidationError,
    accumulation_schedule, drawdown_schedule, project,
};
use crate::service::{ProjectionError, project_user};
use crate::source::{
    DEFAULT_API_ROOT, DEFAULT_TIMEOUT_SECS, FetchError, HttpUserSource, UserDataSource,
};

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Retirement savings projector: the nest egg you need vs. the one you are on track for"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project required and expected retirement savings for one user
    Project(ProjectArgs),
    /// Serve projections over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    #[arg(
        long,
        env = "NESTEGG_API_ROOT",
        default_value = DEFAULT_API_ROOT,
        help = "Base URL of the users API; records are fetched from <root>/<user-id>"
    )]
    api_root: String,
    #[arg(
        long,
        env = "NESTEGG_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout for each users API request in seconds"
    )]
    timeout_secs: u64,
}

impl SourceArgs {
    fn http_source(&self) -> Result<HttpUserSource, FetchError> {
        HttpUserSource::new(&self.api_root, Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Args, Debug, Clone)]
struct ProjectArgs {
    /// The ID of the target user
    user_id: u64,
    #[arg(
        short = 'r',
        long,
        allow_negative_numbers = true,
        default_value_t = DEFAULT_ANNUAL_SALARY_INCREASE,
        help = "The annual expected salary increase for the target user, as a fraction"
    )]
    annual_salary_increase: f64,
    #[arg(
        short = 'i',
        long,
        allow_negative_numbers = true,
        default_value_t = DEFAULT_INFLATION_RATE,
        help = "The inflation rate used to calculate the purchasing power of future savings, as a fraction"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        help = "Reject rates outside (-1, 1) instead of warning about them"
    )]
    strict_rates: bool,
    #[arg(long, help = "Print the projection as JSON, including yearly schedules")]
    json: bool,
    #[command(flatten)]
    source: SourceArgs,
}

impl ProjectArgs {
    fn scenario(&self) -> ScenarioParameters {
        ScenarioParameters::new(self.inflation_rate, self.annual_salary_increase)
    }
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionQuery {
    inflation_rate: Option<f64>,
    annual_salary_increase: Option<f64>,
    strict_rates: bool,
    include_schedule: bool,
}

impl ProjectionQuery {
    fn scenario(&self) -> ScenarioParameters {
        let defaults = ScenarioParameters::default();
        ScenarioParameters::new(
            self.inflation_rate.unwrap_or(defaults.inflation_rate),
            self.annual_salary_increase
                .unwrap_or(defaults.annual_salary_increase),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionRequest {
    profile: UserProfileInput,
    #[serde(default)]
    scenario: ScenarioParameters,
    #[serde(default)]
    strict_rates: bool,
    #[serde(default)]
    include_schedule: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse {
    accumulation: Vec<AccumulationYear>,
    drawdown: Vec<DrawdownYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<u64>,
    scenario: ScenarioParameters,
    #[serde(flatten)]
    result: ProjectionResult,
    surplus: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<ScheduleResponse>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

struct AppState<S> {
    source: S,
}

/// Parses the command line, runs the chosen command and reports how it ended.
pub async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Project(args) => run_project(args).await,
        Command::Serve(args) => {
            let source = match args.source.http_source() {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::from(exit_code_for(&ProjectionError::Fetch(e)));
                }
            };
            if let Err(e) = run_http_server(args.port, source).await {
                eprintln!("Server error: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
    }
}

async fn run_project(args: ProjectArgs) -> ExitCode {
    let outcome = match args.source.http_source() {
        Ok(source) => project_output(&source, &args, today()).await,
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn project_output<S: UserDataSource>(
    source: &S,
    args: &ProjectArgs,
    as_of: NaiveDate,
) -> Result<String, ProjectionError> {
    let scenario = resolve_scenario(args.scenario(), args.strict_rates)?;
    let (profile, result) = project_user(source, args.user_id, &scenario, as_of).await?;

    if args.json {
        let response =
            build_projection_response(Some(args.user_id), &profile, scenario, result, true);
        return Ok(serde_json::to_string_pretty(&response)
            .unwrap_or_else(|e| format!("{{\"error\":\"failed to serialize projection: {e}\"}}")));
    }

    Ok(render_summary(&result))
}

/// Applies the optional range check. Without `strict`, out-of-range rates
/// are logged and used as given.
fn resolve_scenario(
    scenario: ScenarioParameters,
    strict: bool,
) -> Result<ScenarioParameters, ValidationError> {
    scenario.validate()?;
    if let Err(e) = scenario.check_ranges() {
        if strict {
            return Err(e);
        }
        warn!("{e}; continuing without range validation");
    }
    Ok(scenario)
}

fn exit_code_for(err: &ProjectionError) -> u8 {
    match err {
        ProjectionError::Validation(_) => 2,
        ProjectionError::Fetch(FetchError::NotFound { .. }) => 3,
        ProjectionError::Fetch(FetchError::Transport(_)) => 4,
    }
}

fn status_for(err: &ProjectionError) -> StatusCode {
    match err {
        ProjectionError::Validation(_) => StatusCode::BAD_REQUEST,
        ProjectionError::Fetch(FetchError::NotFound { .. }) => StatusCode::NOT_FOUND,
        ProjectionError::Fetch(FetchError::Transport(_)) => StatusCode::BAD_GATEWAY,
    }
}

fn render_summary(result: &ProjectionResult) -> String {
    format!(
        "\nTo retire at age {}\nYou will need:       ${:>10}\nYou will have saved: ${:>10}\n",
        result.retirement_age,
        format_whole_dollars(result.required_savings),
        format_whole_dollars(result.projected_savings),
    )
}

/// Rounds to whole dollars and groups digits in thousands: `1234567.5` is
/// `"1,234,568"`.
pub fn format_whole_dollars(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn build_projection_response(
    user_id: Option<u64>,
    profile: &UserProfile,
    scenario: ScenarioParameters,
    result: ProjectionResult,
    include_schedule: bool,
) -> ProjectionResponse {
    ProjectionResponse {
        user_id,
        scenario,
        result,
        surplus: result.surplus(),
        schedule: include_schedule.then(|| ScheduleResponse {
            accumulation: accumulation_schedule(profile, &scenario),
            drawdown: drawdown_schedule(profile, &scenario),
        }),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn router<S: UserDataSource>(source: S) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/users/:user_id/projection",
            get(user_projection_handler::<S>),
        )
        .route("/api/projection", post(projection_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(AppState { source }))
}

pub async fn run_http_server<S: UserDataSource>(port: u16, source: S) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("nestegg HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, router(source)).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn user_projection_handler<S: UserDataSource>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<u64>, PathRejection>,
    query: Result<Query<ProjectionQuery>, QueryRejection>,
) -> Response {
    // Extractor failures go out in the same JSON error shape as everything else.
    let Path(user_id) = match path {
        Ok(path) => path,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    };
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    };

    let scenario = match resolve_scenario(query.scenario(), query.strict_rates) {
        Ok(scenario) => scenario,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match project_user(&state.source, user_id, &scenario, today()).await {
        Ok((profile, result)) => {
            info!(
                "projected user {user_id}: required {:.0}, projected {:.0}",
                result.required_savings, result.projected_savings
            );
            let response = build_projection_response(
                Some(user_id),
                &profile,
                scenario,
                result,
                query.include_schedule,
            );
            json_response(StatusCode::OK, response)
        }
        Err(e) => {
            warn!("projection for user {user_id} failed: {e}");
            error_response(status_for(&e), &e.to_string())
        }
    }
}

async fn projection_handler(body: Result<Json<ProjectionRequest>, JsonRejection>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    };

    match projection_from_request(request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn projection_from_request(
    request: ProjectionRequest,
) -> Result<ProjectionResponse, ValidationError> {
    let scenario = resolve_scenario(request.scenario, request.strict_rates)?;
    let profile = UserProfile::new(request.profile)?;
    let result = project(&profile, &scenario)?;
    Ok(build_projection_response(
        None,
        &profile,
        scenario,
        result,
        request.include_schedule,
    ))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
