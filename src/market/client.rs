use super::types::{BarsResponse, DateRange};
use crate::config::{AlpacaCredentials, AppConfig};
use crate::errors::{SiteError, SiteResult};
use crate::series::{self, Series};
use reqwest::Client;
use smallvec::SmallVec;

/// Pages followed per fetch. Weekly bars at limit=1000 rarely need a second.
const MAX_PAGES: usize = 20;

/// Alpaca market-data REST client for the benchmark's weekly bars.
/// All methods return Result, never panic.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    base_url: String,
    symbol: String,
    feed: String,
    credentials: Option<AlpacaCredentials>,
}

impl AlpacaClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            base_url: config.alpaca_data_url.trim_end_matches('/').to_string(),
            symbol: config.benchmark_symbol.clone(),
            feed: config.alpaca_feed.clone(),
            credentials: config.alpaca.clone(),
        }
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Weekly closes for the benchmark between `range.start` and `range.end`,
    /// ascending and de-duplicated.
    pub async fn fetch_weekly_bars(&self, range: &DateRange) -> SiteResult<Series> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SiteError::Config("Alpaca API keys are not set in environment variables".into())
        })?;

        let mut points = Series::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let resp = self.get_bars_page(credentials, range, page_token.as_deref()).await?;
            for bar in resp.bars.unwrap_or_default() {
                points.push(bar.to_time_point()?);
            }

            page_token = resp.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
            if page + 1 == MAX_PAGES {
                tracing::warn!(symbol = %self.symbol, %range, "page limit reached, series truncated");
            }
        }

        tracing::debug!(symbol = %self.symbol, %range, bars = points.len(), "weekly bars fetched");
        Ok(series::normalize(points))
    }

    async fn get_bars_page(
        &self,
        credentials: &AlpacaCredentials,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> SiteResult<BarsResponse> {
        let url = format!("{}/v2/stocks/{}/bars", self.base_url, self.symbol);

        let mut params: SmallVec<[(&str, String); 7]> = SmallVec::new();
        params.push(("feed", self.feed.clone()));
        params.push(("timeframe", "1Week".into()));
        params.push(("start", range.start_param()));
        params.push(("end", range.end_param()));
        params.push(("adjustment", "all".into()));
        params.push(("limit", "1000".into()));
        if let Some(token) = page_token {
            params.push(("page_token", token.to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&params[..])
            .header("APCA-API-KEY-ID", &credentials.key_id)
            .header("APCA-API-SECRET-KEY", &credentials.secret_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SiteError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<BarsResponse>()
            .await
            .map_err(|e| SiteError::Parse(format!("GET {url}: {e}")))
    }
}
