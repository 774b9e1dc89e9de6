use crate::errors::{SiteError, SiteResult};
use crate::series::TimePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Bars ──

/// One OHLC bar as returned by the Alpaca v2 stock bars endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: String,
    #[serde(rename = "o")]
    pub open: Option<f64>,
    #[serde(rename = "h")]
    pub high: Option<f64>,
    #[serde(rename = "l")]
    pub low: Option<f64>,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: Option<f64>,
}

impl AlpacaBar {
    /// RFC 3339 `t` -> unix seconds, close -> value.
    pub fn to_time_point(&self) -> SiteResult<TimePoint> {
        let time = chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| SiteError::Parse(format!("bar timestamp '{}': {e}", self.timestamp)))?
            .timestamp();
        Ok(TimePoint::new(time, self.close))
    }
}

// ── Responses ──

/// `bars` is `null` when the range holds no bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarsResponse {
    pub bars: Option<Vec<AlpacaBar>>,
    pub symbol: Option<String>,
    pub next_page_token: Option<String>,
}

// ── Date range ──

/// Inclusive calendar range sent upstream as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Missing or blank `start` uses `default_start`; missing `end` is `today`.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        default_start: &str,
        today: NaiveDate,
    ) -> SiteResult<Self> {
        let start = parse_date(
            start.filter(|s| !s.trim().is_empty()).unwrap_or(default_start),
            "start",
        )?;
        let end = match end.filter(|s| !s.trim().is_empty()) {
            Some(e) => parse_date(e, "end")?,
            None => today,
        };
        if start > end {
            return Err(SiteError::BadRequest(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    #[inline]
    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start_param(), self.end_param())
    }
}

fn parse_date(s: &str, field: &str) -> SiteResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        SiteError::BadRequest(format!("invalid {field} date '{s}', expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_defaults() {
        let r = DateRange::from_query(None, None, "2020-01-01", today()).unwrap();
        assert_eq!(r.start_param(), "2020-01-01");
        assert_eq!(r.end_param(), "2025-06-30");
        let r = DateRange::from_query(Some(""), Some(" "), "2020-01-01", today()).unwrap();
        assert_eq!(r.start_param(), "2020-01-01");
    }

    #[test]
    fn test_rejects_bad_dates() {
        assert!(matches!(
            DateRange::from_query(Some("2020-13-01"), None, "2020-01-01", today()),
            Err(SiteError::BadRequest(_))
        ));
        assert!(matches!(
            DateRange::from_query(Some("2024-01-01"), Some("2023-01-01"), "2020-01-01", today()),
            Err(SiteError::BadRequest(_))
        ));
    }

    #[test]
    fn test_bar_conversion() {
        let json = r#"{"bars":[{"t":"2024-01-08T05:00:00Z","o":474.2,"h":480.1,"l":471.9,"c":476.68,"v":1.0e8}],"symbol":"SPY","next_page_token":null}"#;
        let resp: BarsResponse = serde_json::from_str(json).unwrap();
        let bars = resp.bars.unwrap();
        let p = bars[0].to_time_point().unwrap();
        assert_eq!(p.time, 1_704_690_000);
        assert_eq!(p.value, 476.68);
    }

    #[test]
    fn test_null_bars() {
        let resp: BarsResponse =
            serde_json::from_str(r#"{"bars":null,"symbol":"SPY","next_page_token":null}"#).unwrap();
        assert!(resp.bars.is_none());
    }

    #[test]
    fn test_bad_timestamp_is_parse_error() {
        let bar = AlpacaBar {
            timestamp: "last tuesday".into(),
            open: None,
            high: None,
            low: None,
            close: 1.0,
            volume: None,
        };
        assert!(matches!(bar.to_time_point(), Err(SiteError::Parse(_))));
    }
}
