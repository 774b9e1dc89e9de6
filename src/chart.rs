use crate::pipeline::{compute_display, DisplayData};
use crate::pricing::investment;
use crate::series::window::Period;
use crate::series::Series;
use crate::state::BenchmarkSnapshot;
use crate::strategies::{self, StrategyInfo};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Selection changes a client can send over its chart socket.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartCommand {
    SetPeriod { period: String },
    SetStrategy { strategy: String },
    /// Raw text of the investment box; sanitized here.
    SetAmount { amount: String },
}

/// One connected chart. Owned exclusively by its socket task: created on
/// connect, fed new selections or benchmark data, dropped on disconnect.
pub struct ChartSession {
    id: Uuid,
    period: Period,
    strategy: &'static StrategyInfo,
    amount: f64,
    cumulative_cap: f64,
    generation: u64,
    benchmark: Arc<Series>,
}

impl ChartSession {
    pub fn create(benchmark: &BenchmarkSnapshot, cumulative_cap: f64) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            period: Period::default(),
            strategy: strategies::default_strategy(),
            amount: investment::DEFAULT_INVESTMENT as f64,
            cumulative_cap,
            generation: benchmark.generation,
            benchmark: Arc::clone(&benchmark.series),
        };
        tracing::debug!(session = %session.id, generation = session.generation, "chart session created");
        session
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in a newly committed benchmark. Older generations are ignored.
    pub fn set_data(&mut self, benchmark: &BenchmarkSnapshot) -> bool {
        if benchmark.generation <= self.generation {
            return false;
        }
        self.generation = benchmark.generation;
        self.benchmark = Arc::clone(&benchmark.series);
        true
    }

    /// Apply a selection change. Unknown period or strategy names are rejected
    /// and leave the session as it was.
    pub fn apply(&mut self, cmd: ChartCommand) -> Result<(), String> {
        match cmd {
            ChartCommand::SetPeriod { period } => {
                self.period = Period::parse(&period).ok_or_else(|| format!("unknown period '{period}'"))?;
            }
            ChartCommand::SetStrategy { strategy } => {
                self.strategy = strategies::find(&strategy).ok_or_else(|| format!("unknown strategy '{strategy}'"))?;
            }
            ChartCommand::SetAmount { amount } => {
                self.amount = investment::pipeline_amount(&amount);
            }
        }
        Ok(())
    }

    /// Full recompute for the current selection.
    pub fn render(&self, now: DateTime<Utc>) -> DisplayData {
        compute_display(
            &self.benchmark,
            self.period,
            self.strategy,
            self.amount,
            now,
            self.cumulative_cap,
        )
    }
}

impl Drop for ChartSession {
    fn drop(&mut self) {
        tracing::debug!(session = %self.id, "chart session disposed");
    }
}
