use super::types::DateRange;
use crate::config::AppConfig;
use crate::errors::SiteResult;
use crate::state::AppState;
use chrono::NaiveDate;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter for benchmark fetches. Only the newest fetch begun may
/// commit; anything that completes after a newer one started is discarded.
pub struct FetchSequencer {
    issued: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self { issued: AtomicU64::new(0) }
    }

    /// Issue the next generation (starts at 1).
    #[inline]
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[inline]
    pub fn is_current(&self, generation: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == generation
    }

    #[inline]
    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RefreshOutcome {
    pub generation: u64,
    pub points: usize,
    pub committed: bool,
}

/// One sequenced fetch of the benchmark followed by a guarded commit.
pub async fn refresh_benchmark(state: &AppState, range: DateRange) -> SiteResult<RefreshOutcome> {
    let generation = state.sequencer.begin();
    state.counters.fetches_started.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(generation, %range, "benchmark fetch started");

    match state.alpaca.fetch_weekly_bars(&range).await {
        Ok(series) => {
            let points = series.len();
            let committed = state.commit_benchmark(generation, series, range);
            if committed {
                tracing::info!(generation, points, %range, "benchmark committed");
            } else {
                tracing::info!(
                    generation,
                    latest = state.sequencer.latest(),
                    "newer fetch in flight, discarding stale benchmark"
                );
            }
            Ok(RefreshOutcome { generation, points, committed })
        }
        Err(e) => {
            state.record_fetch_error(generation, &e.to_string());
            Err(e)
        }
    }
}

/// The range the shared benchmark always covers: `BENCHMARK_START` through today.
pub fn configured_range(config: &AppConfig, today: NaiveDate) -> SiteResult<DateRange> {
    DateRange::from_query(None, None, &config.benchmark_start, today)
}

/// Keeps the shared benchmark fresh. Failures leave the previous series in
/// place and retry with exponential backoff (capped at the refresh interval).
pub async fn run_benchmark_refresher(state: Arc<AppState>) {
    if !state.alpaca.is_configured() {
        tracing::warn!("Alpaca credentials missing, benchmark refresher disabled");
        return;
    }

    let refresh = std::time::Duration::from_secs(state.config.benchmark_refresh_secs);
    tracing::info!(
        symbol = state.alpaca.symbol(),
        every_secs = refresh.as_secs(),
        "benchmark refresher started"
    );

    let mut consecutive_errors: u32 = 0;

    loop {
        let today = chrono::Utc::now().date_naive();
        let wait = match configured_range(&state.config, today) {
            Ok(range) => match refresh_benchmark(&state, range).await {
                Ok(_) => {
                    consecutive_errors = 0;
                    refresh
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        error = %e,
                        consecutive = consecutive_errors,
                        "benchmark fetch failed"
                    );
                    backoff(consecutive_errors).min(refresh)
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "benchmark range invalid, refresher stopping");
                return;
            }
        };

        tokio::time::sleep(wait).await;
    }
}

/// 30s, 60s, 120s, ... up to 32 minutes.
fn backoff(consecutive_errors: u32) -> std::time::Duration {
    let exp = consecutive_errors.saturating_sub(1).min(6);
    std::time::Duration::from_secs(30 * (1u64 << exp))
}
