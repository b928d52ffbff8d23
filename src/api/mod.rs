use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ComparisonRow, GrowthPoint, PlanInputs, comparison_table, estimate_tax_benefit, format_inr,
    project_plan, project_retirement_income, simulate_sip, yearly_series,
};
use crate::export::workbook_bytes;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLSX_FILENAME: &str = "retirement_summary.xlsx";

#[derive(Parser, Debug)]
#[command(
    name = "sipsim",
    about = "Retirement planner & SIP simulator (closed-form annuity model, Sec 80C tax estimate, XLSX export)"
)]
struct Cli {
    #[arg(long, default_value_t = 30, help = "Current age in years (18-60)")]
    current_age: u32,
    #[arg(long, default_value_t = 60, help = "Planned retirement age in years (50-70)")]
    retirement_age: u32,
    #[arg(
        long,
        default_value_t = 5000.0,
        help = "Monthly investment towards retirement, 500 minimum"
    )]
    monthly_investment: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected equity return in percent p.a. (5-15)"
    )]
    equity_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected traditional return in percent p.a. (4-9)"
    )]
    traditional_rate: f64,
    #[arg(
        long,
        default_value_t = 5000.0,
        help = "SIP monthly contribution (1000-100000)"
    )]
    sip_monthly: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "SIP expected annual return in percent (1-20)"
    )]
    sip_rate: f64,
    #[arg(long, default_value_t = 20, help = "SIP duration in years (1-40)")]
    sip_years: u32,
    #[arg(
        long,
        default_value_t = 100000.0,
        help = "Annual investment counted towards Sec 80C tax saving (0-500000)"
    )]
    annual_investment: f64,
    #[arg(
        long,
        default_value_t = 1000000.0,
        help = "Total corpus at retirement (100000-100000000)"
    )]
    corpus: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Annuity payout rate in percent of corpus per year (1-10)"
    )]
    annuity_rate: f64,
    #[arg(
        long,
        default_value_t = 10000.0,
        help = "SWP monthly withdrawal amount (1000-100000)"
    )]
    swp_monthly: f64,
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 30,
        retirement_age: 60,
        monthly_investment: 5_000.0,
        equity_rate: 12.0,
        traditional_rate: 7.0,
        sip_monthly: 5_000.0,
        sip_rate: 12.0,
        sip_years: 20,
        annual_investment: 100_000.0,
        corpus: 1_000_000.0,
        annuity_rate: 6.0,
        swp_monthly: 10_000.0,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    monthly_investment: Option<f64>,
    equity_rate: Option<f64>,
    traditional_rate: Option<f64>,
    include_growth: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly: Option<f64>,
    rate: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    annual_investment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IncomePayload {
    corpus: Option<f64>,
    annuity_rate: Option<f64>,
    swp_monthly: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    total_investment: f64,
    future_value_equity: f64,
    future_value_traditional: f64,
    total_investment_display: String,
    future_value_equity_display: String,
    future_value_traditional_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    growth: Option<Vec<GrowthPoint>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SipResponse {
    total_invested: f64,
    future_value: f64,
    total_invested_display: String,
    future_value_display: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    eligible_amount: f64,
    tax_saved: f64,
    eligible_amount_display: String,
    tax_saved_display: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncomeResponse {
    annual_annuity: f64,
    withdrawal_horizon_years: f64,
    annual_annuity_display: String,
    withdrawal_horizon_display: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    options: &'static [ComparisonRow],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// Out-of-range values are clamped here, at the input boundary; the core
// never sees them. The one thing clamping cannot repair is an inverted
// age pair, which is rejected instead.
fn plan_request_from_payload(payload: PlanPayload) -> Result<(PlanInputs, bool), String> {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.current_age {
        cli.current_age = v.clamp(18, 60);
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v.clamp(50, 70);
    }
    if let Some(v) = payload.monthly_investment {
        cli.monthly_investment = v.max(500.0);
    }
    if let Some(v) = payload.equity_rate {
        cli.equity_rate = v.clamp(5.0, 15.0);
    }
    if let Some(v) = payload.traditional_rate {
        cli.traditional_rate = v.clamp(4.0, 9.0);
    }
    let include_growth = payload.include_growth.unwrap_or(false);
    Ok((build_plan_inputs(&cli)?, include_growth))
}

fn build_plan_inputs(cli: &Cli) -> Result<PlanInputs, String> {
    if cli.retirement_age < cli.current_age {
        return Err("retirementAge must be >= currentAge".to_string());
    }
    Ok(PlanInputs {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        monthly_investment: cli.monthly_investment,
        equity_rate: cli.equity_rate,
        traditional_rate: cli.traditional_rate,
    })
}

fn sip_request_from_payload(payload: SipPayload) -> (f64, f64, u32) {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.monthly {
        cli.sip_monthly = v.clamp(1_000.0, 100_000.0);
    }
    if let Some(v) = payload.rate {
        cli.sip_rate = v.clamp(1.0, 20.0);
    }
    if let Some(v) = payload.years {
        cli.sip_years = v.clamp(1, 40);
    }
    (cli.sip_monthly, cli.sip_rate, cli.sip_years)
}

fn tax_request_from_payload(payload: TaxPayload) -> f64 {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.annual_investment {
        cli.annual_investment = v.clamp(0.0, 500_000.0);
    }
    cli.annual_investment
}

fn income_request_from_payload(payload: IncomePayload) -> (f64, f64, f64) {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.corpus {
        cli.corpus = v.clamp(100_000.0, 100_000_000.0);
    }
    if let Some(v) = payload.annuity_rate {
        cli.annuity_rate = v.clamp(1.0, 10.0);
    }
    if let Some(v) = payload.swp_monthly {
        cli.swp_monthly = v.clamp(1_000.0, 100_000.0);
    }
    (cli.corpus, cli.annuity_rate, cli.swp_monthly)
}

fn build_plan_response(inputs: &PlanInputs, include_growth: bool) -> PlanResponse {
    let summary = project_plan(inputs);
    let growth: Option<Vec<GrowthPoint>> =
        include_growth.then(|| yearly_series(inputs).collect());
    PlanResponse {
        total_investment: summary.total_investment,
        future_value_equity: summary.future_value_equity,
        future_value_traditional: summary.future_value_traditional,
        total_investment_display: format_inr(summary.total_investment),
        future_value_equity_display: format_inr(summary.future_value_equity),
        future_value_traditional_display: format_inr(summary.future_value_traditional),
        growth,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route("/api/sip", get(sip_get_handler).post(sip_post_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route(
            "/api/income",
            get(income_get_handler).post(income_post_handler),
        )
        .route("/api/options", get(options_handler))
        .route(
            "/api/export",
            get(export_get_handler).post(export_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("sipsim HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

fn plan_handler_impl(payload: PlanPayload) -> Response {
    let (inputs, include_growth) = match plan_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, build_plan_response(&inputs, include_growth))
}

async fn sip_get_handler(Query(payload): Query<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

async fn sip_post_handler(Json(payload): Json<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

fn sip_handler_impl(payload: SipPayload) -> Response {
    let (monthly, rate, years) = sip_request_from_payload(payload);
    let result = simulate_sip(monthly, rate, years);
    json_response(
        StatusCode::OK,
        SipResponse {
            total_invested: result.total_invested,
            future_value: result.future_value,
            total_invested_display: format_inr(result.total_invested),
            future_value_display: format_inr(result.future_value),
        },
    )
}

async fn tax_get_handler(Query(payload): Query<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

async fn tax_post_handler(Json(payload): Json<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

fn tax_handler_impl(payload: TaxPayload) -> Response {
    let annual_investment = tax_request_from_payload(payload);
    let estimate = estimate_tax_benefit(annual_investment);
    json_response(
        StatusCode::OK,
        TaxResponse {
            eligible_amount: estimate.eligible_amount,
            tax_saved: estimate.tax_saved,
            eligible_amount_display: format_inr(estimate.eligible_amount),
            tax_saved_display: format_inr(estimate.tax_saved),
        },
    )
}

async fn income_get_handler(Query(payload): Query<IncomePayload>) -> Response {
    income_handler_impl(payload)
}

async fn income_post_handler(Json(payload): Json<IncomePayload>) -> Response {
    income_handler_impl(payload)
}

fn income_handler_impl(payload: IncomePayload) -> Response {
    let (corpus, annuity_rate, swp_monthly) = income_request_from_payload(payload);
    let income = match project_retirement_income(corpus, annuity_rate, swp_monthly) {
        Ok(income) => income,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    json_response(
        StatusCode::OK,
        IncomeResponse {
            annual_annuity: income.annual_annuity,
            withdrawal_horizon_years: income.withdrawal_horizon_years,
            annual_annuity_display: format_inr(income.annual_annuity),
            withdrawal_horizon_display: format!("{:.1} years", income.withdrawal_horizon_years),
        },
    )
}

async fn options_handler() -> Response {
    json_response(
        StatusCode::OK,
        OptionsResponse {
            options: comparison_table(),
        },
    )
}

async fn export_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    export_handler_impl(payload)
}

async fn export_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    export_handler_impl(payload)
}

fn export_handler_impl(payload: PlanPayload) -> Response {
    let (inputs, include_growth) = match plan_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let summary = project_plan(&inputs);
    let growth: Vec<GrowthPoint> = if include_growth {
        yearly_series(&inputs).collect()
    } else {
        Vec::new()
    };

    match workbook_bytes(&summary, &growth, comparison_table()) {
        Ok(bytes) => {
            let mut response = (StatusCode::OK, bytes).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                XLSX_CONTENT_TYPE.parse().expect("valid header"),
            );
            response.headers_mut().insert(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{XLSX_FILENAME}\"")
                    .parse()
                    .expect("valid header"),
            );
            with_cache_control(response)
        }
        Err(e) => {
            error!("workbook build failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build workbook",
            )
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
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

#[cfg(test)]
fn plan_request_from_json(json: &str) -> Result<(PlanInputs, bool), String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    plan_request_from_payload(payload)
}
