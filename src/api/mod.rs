use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    AssetPortfolio, ConversionOutcome, ConversionPlan, PlanInputs, SearchGrid, StrategyOutcome,
    WithdrawalSchedule, YearRecord, YearWindow, consolidated_schedule, search_strategies,
    simulate_conversion_plan, simulate_post_schedule_phase, simulate_schedule_phase,
    sweep_conversion_spreads,
};
use crate::tax::{
    BASE_YEAR, DEFAULT_INFLATION_RATE, FilingStatus, IncomeBreakdown, TaxResult, TaxYearConfig,
    calculate_tax, config_for_year, hand_authored_years,
};

const DEFAULT_TAX_YEAR: i32 = 2024;
const DEFAULT_CURRENT_YEAR: i32 = 2025;
const DEFAULT_HORIZON_YEAR: i32 = 2040;
const DEFAULT_GROWTH_RATE: f64 = 0.06;
const DEFAULT_INCOME_NEED: f64 = 200_000.0;
const DEFAULT_BASE_DIVIDEND: f64 = 50_000.0;
const DEFAULT_CAPITAL_GAINS_RATE: f64 = 0.20;
// RSU positions concentrate in one stock and are assumed to lag the market.
const DEFAULT_RSU_GROWTH_DISCOUNT: f64 = 0.8;
const DEFAULT_MAX_SEARCH_RESULTS: usize = 20;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(alias = "marriedJointly", alias = "married_jointly")]
    MarriedJointly,
    #[serde(alias = "marriedSeparately", alias = "married_separately")]
    MarriedSeparately,
    #[serde(alias = "headOfHousehold", alias = "head_of_household")]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for FilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => FilingStatus::Single,
            ApiFilingStatus::MarriedJointly => FilingStatus::MarriedJointly,
            ApiFilingStatus::MarriedSeparately => FilingStatus::MarriedSeparately,
            ApiFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    year: Option<i32>,
    inflation_rate: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    salary: Option<f64>,
    rental_net_income: Option<f64>,
    ordinary_dividend: Option<f64>,
    qualified_dividend: Option<f64>,
    short_term_gain: Option<f64>,
    long_term_gain: Option<f64>,
    deferred_distribution: Option<f64>,
    social_security: Option<f64>,
    deferred_compensation: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    year: i32,
    filing_status: ApiFilingStatus,
    result: TaxResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    filing_status: Option<ApiFilingStatus>,
    tax_year: Option<i32>,
    tax_inflation_rate: Option<f64>,
    current_year: Option<i32>,
    growth_rate: Option<f64>,
    inflation_rate: Option<f64>,
    annual_income_need: Option<f64>,
    base_ordinary_dividend: Option<f64>,
    capital_gains_rate: Option<f64>,
    deferred_growth_rate: Option<f64>,
    roth_growth_rate: Option<f64>,
    rsu_growth_rate: Option<f64>,
    brokerage_growth_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssetsPayload {
    deferred: Option<f64>,
    roth: Option<f64>,
    rsu: Option<f64>,
    rsu_basis: Option<f64>,
    brokerage: Option<f64>,
    brokerage_basis: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    plan: PlanPayload,
    assets: AssetsPayload,
    deferred_start_year: Option<i32>,
    deferred_end_year: Option<i32>,
    rsu_start_year: Option<i32>,
    rsu_end_year: Option<i32>,
    horizon_year: Option<i32>,
    include_trace: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    schedule: WithdrawalSchedule,
    end_year: i32,
    last_adjusted_need: f64,
    final_assets: AssetPortfolio,
    tax_free_wealth: f64,
    income_gaps: BTreeMap<i32, f64>,
    gap_growth_penalty: f64,
    net_wealth_impact: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    years: Option<Vec<YearRecord>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchPayload {
    plan: PlanPayload,
    assets: AssetsPayload,
    deferred_start_min: Option<i32>,
    deferred_start_max: Option<i32>,
    deferred_span: Option<i32>,
    rsu_start_year: Option<i32>,
    rsu_span: Option<i32>,
    horizon_year: Option<i32>,
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    outcomes: Vec<StrategyOutcome>,
    evaluated: usize,
    skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConversionPayload {
    plan: PlanPayload,
    deferred_balance: Option<f64>,
    start_year: Option<i32>,
    end_year: Option<i32>,
    spread_min: Option<u32>,
    spread_max: Option<u32>,
    social_security_start_year: Option<i32>,
    social_security_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionResponse {
    outcomes: Vec<ConversionOutcome>,
    best: Option<ConversionOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxYearsResponse {
    base_year: i32,
    default_inflation_rate: f64,
    hand_authored_years: Vec<i32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn checked_amount(name: &str, value: Option<f64>, default: f64) -> Result<f64, String> {
    let value = value.unwrap_or(default);
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be a finite amount >= 0"));
    }
    Ok(value)
}

fn checked_rate(name: &str, value: Option<f64>, default: f64) -> Result<f64, String> {
    let value = value.unwrap_or(default);
    if !value.is_finite() || !(-0.99..=1.0).contains(&value) {
        return Err(format!("{name} must be between -0.99 and 1.0"));
    }
    Ok(value)
}

fn resolve_tax_config(year: i32, inflation_rate: Option<f64>) -> Result<TaxYearConfig, String> {
    if let Some(rate) = inflation_rate {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err("taxInflationRate must be between 0.0 and 1.0".to_string());
        }
    }
    Ok(config_for_year(year, inflation_rate))
}

fn build_income(payload: &TaxPayload) -> Result<IncomeBreakdown, String> {
    let income = IncomeBreakdown {
        salary: checked_amount("salary", payload.salary, 0.0)?,
        rental_net_income: checked_amount("rentalNetIncome", payload.rental_net_income, 0.0)?,
        ordinary_dividend: checked_amount("ordinaryDividend", payload.ordinary_dividend, 0.0)?,
        qualified_dividend: checked_amount("qualifiedDividend", payload.qualified_dividend, 0.0)?,
        short_term_gain: checked_amount("shortTermGain", payload.short_term_gain, 0.0)?,
        long_term_gain: checked_amount("longTermGain", payload.long_term_gain, 0.0)?,
        deferred_distribution: checked_amount(
            "deferredDistribution",
            payload.deferred_distribution,
            0.0,
        )?,
        social_security: checked_amount("socialSecurity", payload.social_security, 0.0)?,
        deferred_compensation: checked_amount(
            "deferredCompensation",
            payload.deferred_compensation,
            0.0,
        )?,
    };

    if income.qualified_dividend > income.ordinary_dividend {
        return Err("qualifiedDividend cannot exceed ordinaryDividend".to_string());
    }
    Ok(income)
}

fn build_plan_inputs(payload: &PlanPayload) -> Result<PlanInputs, String> {
    let tax_year = payload.tax_year.unwrap_or(DEFAULT_TAX_YEAR);
    let tax_config = resolve_tax_config(tax_year, payload.tax_inflation_rate)?;

    let growth_rate = checked_rate("growthRate", payload.growth_rate, DEFAULT_GROWTH_RATE)?;
    let inflation_rate = checked_rate(
        "inflationRate",
        payload.inflation_rate,
        DEFAULT_INFLATION_RATE,
    )?;
    let capital_gains_rate = payload
        .capital_gains_rate
        .unwrap_or(DEFAULT_CAPITAL_GAINS_RATE);
    if !capital_gains_rate.is_finite() || !(0.0..1.0).contains(&capital_gains_rate) {
        return Err("capitalGainsRate must be between 0.0 and 1.0 (exclusive)".to_string());
    }

    Ok(PlanInputs {
        filing_status: payload
            .filing_status
            .unwrap_or(ApiFilingStatus::MarriedJointly)
            .into(),
        tax_config,
        current_year: payload.current_year.unwrap_or(DEFAULT_CURRENT_YEAR),
        growth_rate,
        inflation_rate,
        annual_income_need: checked_amount(
            "annualIncomeNeed",
            payload.annual_income_need,
            DEFAULT_INCOME_NEED,
        )?,
        base_ordinary_dividend: checked_amount(
            "baseOrdinaryDividend",
            payload.base_ordinary_dividend,
            DEFAULT_BASE_DIVIDEND,
        )?,
        capital_gains_rate,
        deferred_growth_rate: checked_rate(
            "deferredGrowthRate",
            payload.deferred_growth_rate,
            growth_rate,
        )?,
        roth_growth_rate: checked_rate("rothGrowthRate", payload.roth_growth_rate, growth_rate)?,
        rsu_growth_rate: checked_rate(
            "rsuGrowthRate",
            payload.rsu_growth_rate,
            growth_rate * DEFAULT_RSU_GROWTH_DISCOUNT,
        )?,
        brokerage_growth_rate: checked_rate(
            "brokerageGrowthRate",
            payload.brokerage_growth_rate,
            growth_rate,
        )?,
    })
}

fn build_assets(payload: &AssetsPayload) -> Result<AssetPortfolio, String> {
    let assets = AssetPortfolio {
        deferred: checked_amount("assets.deferred", payload.deferred, 0.0)?,
        roth: checked_amount("assets.roth", payload.roth, 0.0)?,
        rsu: checked_amount("assets.rsu", payload.rsu, 0.0)?,
        rsu_basis: checked_amount("assets.rsuBasis", payload.rsu_basis, 0.0)?,
        brokerage: checked_amount("assets.brokerage", payload.brokerage, 0.0)?,
        brokerage_basis: checked_amount("assets.brokerageBasis", payload.brokerage_basis, 0.0)?,
    };

    if assets.rsu_basis > assets.rsu {
        return Err("assets.rsuBasis cannot exceed assets.rsu".to_string());
    }
    if assets.brokerage_basis > assets.brokerage {
        return Err("assets.brokerageBasis cannot exceed assets.brokerage".to_string());
    }
    Ok(assets)
}

#[derive(Debug)]
struct SimulateRequest {
    inputs: PlanInputs,
    assets: AssetPortfolio,
    deferred_window: YearWindow,
    rsu_window: YearWindow,
    horizon_year: i32,
    include_trace: bool,
}

fn build_simulate_request(payload: SimulatePayload) -> Result<SimulateRequest, String> {
    let inputs = build_plan_inputs(&payload.plan)?;
    let assets = build_assets(&payload.assets)?;

    let deferred_start = payload.deferred_start_year.unwrap_or(inputs.current_year + 1);
    let deferred_end = payload.deferred_end_year.unwrap_or(deferred_start + 9);
    let rsu_start = payload.rsu_start_year.unwrap_or(inputs.current_year + 1);
    let rsu_end = payload.rsu_end_year.unwrap_or(rsu_start + 2);

    let horizon_year = payload.horizon_year.unwrap_or(DEFAULT_HORIZON_YEAR);
    if horizon_year < inputs.current_year {
        return Err("horizonYear must be >= currentYear".to_string());
    }

    Ok(SimulateRequest {
        inputs,
        assets,
        deferred_window: YearWindow::new(deferred_start, deferred_end),
        rsu_window: YearWindow::new(rsu_start, rsu_end),
        horizon_year,
        include_trace: payload.include_trace.unwrap_or(false),
    })
}

fn build_search_grid(payload: &SearchPayload, inputs: &PlanInputs) -> Result<SearchGrid, String> {
    let deferred_start_min = payload.deferred_start_min.unwrap_or(inputs.current_year + 1);
    let deferred_start_max = payload.deferred_start_max.unwrap_or(deferred_start_min + 4);
    if deferred_start_max < deferred_start_min {
        return Err("deferredStartMax must be >= deferredStartMin".to_string());
    }

    let deferred_span = payload.deferred_span.unwrap_or(10);
    let rsu_span = payload.rsu_span.unwrap_or(10);
    if deferred_span < 1 || rsu_span < 1 {
        return Err("deferredSpan and rsuSpan must be >= 1".to_string());
    }

    let horizon_year = payload.horizon_year.unwrap_or(DEFAULT_HORIZON_YEAR);
    if horizon_year < inputs.current_year {
        return Err("horizonYear must be >= currentYear".to_string());
    }

    Ok(SearchGrid {
        deferred_start_min,
        deferred_start_max,
        deferred_span,
        rsu_start: payload.rsu_start_year.unwrap_or(inputs.current_year + 1),
        rsu_span,
        horizon_year,
    })
}

fn build_conversion_request(
    payload: &ConversionPayload,
    inputs: &PlanInputs,
) -> Result<(ConversionPlan, u32, u32), String> {
    let start_year = payload.start_year.unwrap_or(inputs.current_year + 1);
    let end_year = payload.end_year.unwrap_or(start_year + 24);
    if end_year < start_year {
        return Err("endYear must be >= startYear".to_string());
    }

    let spread_min = payload.spread_min.unwrap_or(5);
    let spread_max = payload.spread_max.unwrap_or(25);
    if spread_min < 1 {
        return Err("spreadMin must be >= 1".to_string());
    }
    if spread_max < spread_min {
        return Err("spreadMax must be >= spreadMin".to_string());
    }

    let plan = ConversionPlan {
        deferred_balance: checked_amount("deferredBalance", payload.deferred_balance, 0.0)?,
        start_year,
        end_year,
        spread_years: spread_min,
        social_security_start_year: payload
            .social_security_start_year
            .unwrap_or(i32::MAX),
        social_security_amount: checked_amount(
            "socialSecurityAmount",
            payload.social_security_amount,
            0.0,
        )?,
    };
    Ok((plan, spread_min, spread_max))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/tax-years", get(tax_years_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route("/api/simulate", axum::routing::post(simulate_handler))
        .route("/api/search", axum::routing::post(search_handler))
        .route("/api/conversion", axum::routing::post(conversion_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("glidepath HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn tax_years_handler() -> Response {
    json_response(
        StatusCode::OK,
        TaxYearsResponse {
            base_year: BASE_YEAR,
            default_inflation_rate: DEFAULT_INFLATION_RATE,
            hand_authored_years: hand_authored_years(),
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
    let income = match build_income(&payload) {
        Ok(income) => income,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let year = payload.year.unwrap_or(DEFAULT_TAX_YEAR);
    let config = match resolve_tax_config(year, payload.inflation_rate) {
        Ok(config) => config,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let filing_status = payload
        .filing_status
        .unwrap_or(ApiFilingStatus::MarriedJointly);
    let result = calculate_tax(&income, filing_status.into(), &config);

    json_response(
        StatusCode::OK,
        TaxResponse {
            year: config.year,
            filing_status,
            result,
        },
    )
}

async fn simulate_handler(Json(payload): Json<SimulatePayload>) -> Response {
    let request = match build_simulate_request(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let schedule = match consolidated_schedule(
        &request.inputs,
        &request.assets,
        request.deferred_window,
        request.rsu_window,
    ) {
        Ok(schedule) => schedule,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let mut trace = request.include_trace.then(Vec::new);
    let phase =
        simulate_schedule_phase(&request.inputs, request.assets, &schedule, trace.as_mut());
    let outcome = match simulate_post_schedule_phase(
        &request.inputs,
        &phase,
        request.horizon_year,
        trace.as_mut(),
    ) {
        Ok(outcome) => outcome,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    };

    json_response(
        StatusCode::OK,
        SimulateResponse {
            schedule,
            end_year: phase.end_year,
            last_adjusted_need: phase.last_adjusted_need,
            final_assets: outcome.final_assets,
            tax_free_wealth: outcome.tax_free_wealth,
            income_gaps: outcome.income_gaps,
            gap_growth_penalty: outcome.gap_growth_penalty,
            net_wealth_impact: outcome.net_wealth_impact,
            years: trace,
        },
    )
}

async fn search_handler(Json(payload): Json<SearchPayload>) -> Response {
    let inputs = match build_plan_inputs(&payload.plan) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let assets = match build_assets(&payload.assets) {
        Ok(assets) => assets,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let grid = match build_search_grid(&payload, &inputs) {
        Ok(grid) => grid,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let report = match search_strategies(&inputs, &assets, &grid) {
        Ok(report) => report,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let evaluated = report.outcomes.len();
    let mut outcomes = report.outcomes;
    outcomes.truncate(payload.max_results.unwrap_or(DEFAULT_MAX_SEARCH_RESULTS));

    json_response(
        StatusCode::OK,
        SearchResponse {
            outcomes,
            evaluated,
            skipped: report.skipped,
        },
    )
}

async fn conversion_handler(Json(payload): Json<ConversionPayload>) -> Response {
    let inputs = match build_plan_inputs(&payload.plan) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let (plan, spread_min, spread_max) = match build_conversion_request(&payload, &inputs) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let outcomes = if spread_min == spread_max {
        vec![simulate_conversion_plan(&inputs, &plan)]
    } else {
        sweep_conversion_spreads(&inputs, &plan, spread_min..=spread_max)
    };
    let best = outcomes
        .iter()
        .copied()
        .max_by(|a, b| a.net_wealth.total_cmp(&b.net_wealth));

    json_response(StatusCode::OK, ConversionResponse { outcomes, best })
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
mod tests {
    use super::*;

    fn tax_payload_from_json(json: &str) -> TaxPayload {
        serde_json::from_str(json).expect("valid JSON payload")
    }

    #[test]
    fn filing_status_accepts_kebab_and_aliases() {
        for raw in ["\"married-jointly\"", "\"marriedJointly\"", "\"married_jointly\""] {
            let status: ApiFilingStatus = serde_json::from_str(raw).expect("parses");
            assert_eq!(status, ApiFilingStatus::MarriedJointly);
        }
        assert_eq!(
            FilingStatus::from(ApiFilingStatus::HeadOfHousehold),
            FilingStatus::HeadOfHousehold
        );
    }

    #[test]
    fn build_income_rejects_negative_amounts() {
        let payload = tax_payload_from_json(r#"{"salary": -1}"#);
        assert!(build_income(&payload).is_err());
    }

    #[test]
    fn build_income_rejects_qualified_above_ordinary_dividends() {
        let payload =
            tax_payload_from_json(r#"{"ordinaryDividend": 1000, "qualifiedDividend": 2000}"#);
        let err = build_income(&payload).unwrap_err();
        assert!(err.contains("qualifiedDividend"));
    }

    #[test]
    fn build_income_defaults_to_zero_amounts() {
        let income = build_income(&TaxPayload::default()).expect("defaults are valid");
        assert_eq!(income, IncomeBreakdown::default());
    }

    #[test]
    fn build_plan_inputs_applies_rate_defaults() {
        let inputs = build_plan_inputs(&PlanPayload::default()).expect("defaults are valid");
        assert_eq!(inputs.current_year, DEFAULT_CURRENT_YEAR);
        assert_eq!(inputs.tax_config.year, DEFAULT_TAX_YEAR);
        assert_eq!(inputs.growth_rate, DEFAULT_GROWTH_RATE);
        assert_eq!(inputs.deferred_growth_rate, DEFAULT_GROWTH_RATE);
        assert_eq!(
            inputs.rsu_growth_rate,
            DEFAULT_GROWTH_RATE * DEFAULT_RSU_GROWTH_DISCOUNT
        );
        assert_eq!(inputs.filing_status, FilingStatus::MarriedJointly);
    }

    #[test]
    fn build_plan_inputs_rejects_out_of_range_rates() {
        let payload: PlanPayload =
            serde_json::from_str(r#"{"growthRate": 2.5}"#).expect("valid JSON");
        assert!(build_plan_inputs(&payload).is_err());

        let payload: PlanPayload =
            serde_json::from_str(r#"{"capitalGainsRate": 1.0}"#).expect("valid JSON");
        assert!(build_plan_inputs(&payload).is_err());
    }

    #[test]
    fn build_assets_rejects_basis_above_balance() {
        let payload: AssetsPayload =
            serde_json::from_str(r#"{"rsu": 1000, "rsuBasis": 2000}"#).expect("valid JSON");
        let err = build_assets(&payload).unwrap_err();
        assert!(err.contains("rsuBasis"));
    }

    #[test]
    fn build_simulate_request_rejects_horizon_before_current_year() {
        let payload: SimulatePayload =
            serde_json::from_str(r#"{"horizonYear": 2000}"#).expect("valid JSON");
        let err = build_simulate_request(payload).unwrap_err();
        assert!(err.contains("horizonYear"));
    }

    #[test]
    fn build_search_grid_rejects_inverted_bounds_and_zero_spans() {
        let inputs = build_plan_inputs(&PlanPayload::default()).expect("defaults are valid");

        let payload: SearchPayload =
            serde_json::from_str(r#"{"deferredStartMin": 2030, "deferredStartMax": 2026}"#)
                .expect("valid JSON");
        assert!(build_search_grid(&payload, &inputs).is_err());

        let payload: SearchPayload =
            serde_json::from_str(r#"{"deferredSpan": 0}"#).expect("valid JSON");
        assert!(build_search_grid(&payload, &inputs).is_err());
    }

    #[test]
    fn build_conversion_request_rejects_zero_spread() {
        let inputs = build_plan_inputs(&PlanPayload::default()).expect("defaults are valid");
        let payload: ConversionPayload =
            serde_json::from_str(r#"{"spreadMin": 0}"#).expect("valid JSON");
        assert!(build_conversion_request(&payload, &inputs).is_err());
    }

    #[test]
    fn resolve_tax_config_synthesizes_future_years() {
        let config = resolve_tax_config(2030, None).expect("valid year");
        assert_eq!(config.year, 2030);
        assert!(resolve_tax_config(2030, Some(2.0)).is_err());
    }
}
