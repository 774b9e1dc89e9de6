use crate::config::AppConfig;
use crate::market::client::AlpacaClient;
use crate::market::feed::FetchSequencer;
use crate::market::types::DateRange;
use crate::pipeline::DisplayData;
use crate::series::Series;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

// ── Shared benchmark (written once per committed fetch, read by everyone) ──

#[derive(Debug, Clone, Default)]
pub struct BenchmarkSnapshot {
    /// Generation of the fetch that produced `series`; 0 = nothing fetched yet.
    pub generation: u64,
    pub series: Arc<Series>,
    pub range: Option<DateRange>,
    pub fetched_at: Option<String>,
    /// Most recent failure of the newest fetch, cleared by the next commit.
    pub last_error: Option<String>,
}

// ── Messages OUT to chart sessions ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "display")]
    Display(Box<DisplayData>),

    #[serde(rename = "benchmark_updated")]
    BenchmarkUpdated { generation: u64, points: usize },

    #[serde(rename = "fetch_failed")]
    FetchFailed { generation: u64, error: String },

    #[serde(rename = "error")]
    Error { message: String },
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub fetches_started: AtomicU64,
    pub fetches_committed: AtomicU64,
    pub fetches_discarded: AtomicU64,
    pub fetch_errors: AtomicU64,
    pub displays_computed: AtomicU64,
    pub ws_sessions: AtomicU64,
    /// Messages written to sockets, counted once per delivery.
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            fetches_started: AtomicU64::new(0),
            fetches_committed: AtomicU64::new(0),
            fetches_discarded: AtomicU64::new(0),
            fetch_errors: AtomicU64::new(0),
            displays_computed: AtomicU64::new(0),
            ws_sessions: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,
    pub alpaca: AlpacaClient,
    pub sequencer: FetchSequencer,

    // Fetcher -> consumers: latest committed benchmark (watch = single producer, multi consumer)
    pub benchmark_tx: watch::Sender<BenchmarkSnapshot>,
    pub benchmark_rx: watch::Receiver<BenchmarkSnapshot>,

    // Fetcher -> chart sessions: notices
    pub ws_tx: broadcast::Sender<WsMessage>,

    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);
        let (benchmark_tx, benchmark_rx) = watch::channel(BenchmarkSnapshot::default());
        let alpaca = AlpacaClient::new(&config);

        Arc::new(Self {
            config,
            alpaca,
            sequencer: FetchSequencer::new(),
            benchmark_tx,
            benchmark_rx,
            ws_tx,
            counters: PerfCounters::new(),
        })
    }

    /// Fan a notice out to every socket; delivery is counted per socket.
    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        let _ = self.ws_tx.send(msg);
    }

    /// Cheap clone of the latest committed benchmark.
    pub fn benchmark(&self) -> BenchmarkSnapshot {
        self.benchmark_rx.borrow().clone()
    }

    /// Publish `series` if `generation` is still the newest fetch begun.
    /// Returns false (and leaves the shared series untouched) for stale results.
    pub fn commit_benchmark(&self, generation: u64, series: Series, range: DateRange) -> bool {
        let points = series.len();
        let committed = self.benchmark_tx.send_if_modified(|snap| {
            if !self.sequencer.is_current(generation) || generation <= snap.generation {
                return false;
            }
            snap.generation = generation;
            snap.series = Arc::new(series);
            snap.range = Some(range);
            snap.fetched_at = Some(chrono::Utc::now().to_rfc3339());
            snap.last_error = None;
            true
        });

        if committed {
            self.counters.fetches_committed.fetch_add(1, Ordering::Relaxed);
            self.broadcast(WsMessage::BenchmarkUpdated { generation, points });
        } else {
            self.counters.fetches_discarded.fetch_add(1, Ordering::Relaxed);
        }
        committed
    }

    /// Record a failure of the newest fetch without touching the series.
    pub fn record_fetch_error(&self, generation: u64, error: &str) {
        self.counters.fetch_errors.fetch_add(1, Ordering::Relaxed);
        if !self.sequencer.is_current(generation) {
            return;
        }
        self.benchmark_tx.send_if_modified(|snap| {
            snap.last_error = Some(error.to_string());
            false
        });
        self.broadcast(WsMessage::FetchFailed {
            generation,
            error: error.to_string(),
        });
    }
}
