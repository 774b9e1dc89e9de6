/// Annual management fee on assets under management (0.12%).
pub const MANAGEMENT_FEE_RATE: f64 = 0.0012;

pub const MIN_FEE_AMOUNT: f64 = 1_000.0;
pub const MAX_FEE_AMOUNT: f64 = 1_000_000.0;

/// Where the calculator slider starts.
pub const DEFAULT_FEE_AMOUNT: f64 = 900_000.0;

/// Client fee billing cadence. Monthly billing costs $25/month, annual $250/year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Billing {
    #[default]
    Annual,
    Monthly,
}

impl Billing {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "annually" | "yearly" => Some(Self::Annual),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Client fee as charged per billing period.
    pub fn client_fee(&self) -> f64 {
        match self {
            Self::Annual => 250.0,
            Self::Monthly => 25.0,
        }
    }

    pub fn period_label(&self) -> &'static str {
        match self {
            Self::Annual => "/year",
            Self::Monthly => "/month",
        }
    }

    /// Client fee over a full year.
    pub fn annual_client_fee(&self) -> f64 {
        match self {
            Self::Annual => 250.0,
            Self::Monthly => 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FeeQuote {
    pub amount: f64,
    pub billing: Billing,
    pub client_fee: f64,
    pub client_fee_period: &'static str,
    pub management_fee_percent: f64,
    pub annual_cost: f64,
    pub blended_fee_percent: f64,
    /// Position of `amount` on the calculator slider, 0..=100.
    pub slider_percent: f64,
}

/// blended = (amount * 0.12% + annual client fee) / amount * 100,
/// with `amount` clamped to the calculator's range first.
pub fn quote(amount: f64, billing: Billing) -> FeeQuote {
    let amount = if amount.is_finite() {
        amount.clamp(MIN_FEE_AMOUNT, MAX_FEE_AMOUNT)
    } else {
        MIN_FEE_AMOUNT
    };
    let annual_cost = amount * MANAGEMENT_FEE_RATE + billing.annual_client_fee();

    FeeQuote {
        amount,
        billing,
        client_fee: billing.client_fee(),
        client_fee_period: billing.period_label(),
        management_fee_percent: MANAGEMENT_FEE_RATE * 100.0,
        annual_cost,
        blended_fee_percent: annual_cost / amount * 100.0,
        slider_percent: (amount - MIN_FEE_AMOUNT) / (MAX_FEE_AMOUNT - MIN_FEE_AMOUNT) * 100.0,
    }
}
