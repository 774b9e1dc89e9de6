use crate::errors::{SiteError, SiteResult};
use crate::market::feed::{self, RefreshOutcome};
use crate::market::types::DateRange;
use crate::pipeline::{compute_display, DisplayData};
use crate::pricing::{fees, investment};
use crate::series::window::Period;
use crate::state::AppState;
use crate::strategies::{self, StrategyInfo};
use axum::extract::{Query, State};
use axum::response::Json;
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct PerformanceQuery {
    pub strategy: Option<String>,
    pub period: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct FeeQuery {
    pub amount: Option<String>,
    pub billing: Option<String>,
}

#[derive(serde::Serialize)]
pub struct PerformanceResponse {
    pub generation: u64,
    /// The amount as the input box should show it.
    pub amount_input: String,
    #[serde(flatten)]
    pub data: DisplayData,
}

fn range_from(state: &AppState, q: &RangeQuery) -> SiteResult<DateRange> {
    DateRange::from_query(
        q.start.as_deref(),
        q.end.as_deref(),
        &state.config.benchmark_start,
        chrono::Utc::now().date_naive(),
    )
}

/// GET /api/spy -- proxy to the market-data provider, reshaped to {time, value}
pub async fn get_spy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
) -> SiteResult<Json<serde_json::Value>> {
    let range = range_from(&state, &params)?;
    let bars = state.alpaca.fetch_weekly_bars(&range).await?;
    Ok(Json(serde_json::json!({ "bars": bars })))
}

/// GET /api/performance -- chart series + metrics for one selection
pub async fn get_performance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PerformanceQuery>,
) -> SiteResult<Json<PerformanceResponse>> {
    let strategy: &'static StrategyInfo = match params.strategy.as_deref() {
        Some(key) => strategies::find(key)
            .ok_or_else(|| SiteError::BadRequest(format!("unknown strategy '{key}'")))?,
        None => strategies::default_strategy(),
    };
    let period = match params.period.as_deref() {
        Some(p) => Period::parse(p).ok_or_else(|| SiteError::BadRequest(format!("unknown period '{p}'")))?,
        None => Period::default(),
    };
    let raw_amount = params.amount.as_deref().unwrap_or("");
    let amount = investment::pipeline_amount(raw_amount);

    let benchmark = state.benchmark();
    let data = compute_display(
        &benchmark.series,
        period,
        strategy,
        amount,
        chrono::Utc::now(),
        state.config.cumulative_display_cap,
    );
    state.counters.displays_computed.fetch_add(1, Relaxed);

    Ok(Json(PerformanceResponse {
        generation: benchmark.generation,
        amount_input: investment::format_input(raw_amount),
        data,
    }))
}

/// GET /api/strategies -- the showcased strategy catalog
pub async fn get_strategies() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "strategies": strategies::STRATEGIES }))
}

/// GET /api/fees -- blended fee for an investment amount
pub async fn get_fees(Query(params): Query<FeeQuery>) -> SiteResult<Json<fees::FeeQuote>> {
    let billing = match params.billing.as_deref() {
        Some(b) => fees::Billing::parse(b)
            .ok_or_else(|| SiteError::BadRequest(format!("unknown billing '{b}'")))?,
        None => fees::Billing::default(),
    };
    let amount = match params.amount.as_deref() {
        Some(raw) => investment::sanitize(raw) as f64,
        None => fees::DEFAULT_FEE_AMOUNT,
    };
    Ok(Json(fees::quote(amount, billing)))
}

/// POST /api/benchmark/refresh -- sequenced refetch of the shared benchmark.
/// Always the configured range; callers cannot narrow what every chart shares.
pub async fn post_refresh(State(state): State<Arc<AppState>>) -> SiteResult<Json<RefreshOutcome>> {
    let range = feed::configured_range(&state.config, chrono::Utc::now().date_naive())?;
    let outcome = feed::refresh_benchmark(&state, range).await?;
    Ok(Json(outcome))
}

/// GET /api/health -- liveness plus benchmark freshness
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snap = state.benchmark();
    Json(serde_json::json!({
        "status": "ok",
        "alpaca_configured": state.alpaca.is_configured(),
        "benchmark_generation": snap.generation,
        "benchmark_points": snap.series.len(),
        "benchmark_range": snap.range,
        "fetched_at": snap.fetched_at,
        "last_error": snap.last_error,
    }))
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let c = &state.counters;
    Json(serde_json::json!({
        "fetches_started": c.fetches_started.load(Relaxed),
        "fetches_committed": c.fetches_committed.load(Relaxed),
        "fetches_discarded": c.fetches_discarded.load(Relaxed),
        "fetch_errors": c.fetch_errors.load(Relaxed),
        "displays_computed": c.displays_computed.load(Relaxed),
        "ws_sessions": c.ws_sessions.load(Relaxed),
        "ws_messages_sent": c.ws_messages_sent.load(Relaxed),
    }))
}
