use crate::series::synth::ScaleSynthesizer;

/// A showcased strategy. The chart curve is the benchmark scaled by `multiplier`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub full_title: &'static str,
    pub description: &'static str,
    pub multiplier: f64,
}

impl StrategyInfo {
    pub fn synthesizer(&self) -> ScaleSynthesizer {
        ScaleSynthesizer::new(self.multiplier)
    }
}

pub const STRATEGIES: [StrategyInfo; 4] = [
    StrategyInfo {
        id: "luthor",
        name: "Luthor",
        full_title: "Luthor - Flagship (US Stocks)",
        description: "Flagship equity strategy combining congressional trading disclosures, \
                      13F filings and social sentiment into one market view.",
        multiplier: 1.20,
    },
    StrategyInfo {
        id: "lex",
        name: "Lex",
        full_title: "Lex - Defensive Strategy",
        description: "Risk-first equity strategy aimed at capital preservation and steady growth.",
        multiplier: 1.05,
    },
    StrategyInfo {
        id: "clark",
        name: "Clark",
        full_title: "Clark - Growth Strategy",
        description: "Innovation-focused strategy targeting disruptive companies and emerging technologies.",
        multiplier: 1.35,
    },
    StrategyInfo {
        id: "diana",
        name: "Diana",
        full_title: "Diana - International Strategy",
        description: "Geographically diversified strategy across developed and emerging markets.",
        multiplier: 1.10,
    },
];

pub fn default_strategy() -> &'static StrategyInfo {
    &STRATEGIES[0]
}

/// Match by id, short name or full title, ignoring case.
pub fn find(key: &str) -> Option<&'static StrategyInfo> {
    let key = key.trim();
    STRATEGIES.iter().find(|s| {
        s.id.eq_ignore_ascii_case(key)
            || s.name.eq_ignore_ascii_case(key)
            || s.full_title.eq_ignore_ascii_case(key)
    })
}
