//! Yahoo Finance Provider.
//!
//! - 가격 이력: `yahoo_finance_api::YahooConnector::get_quote_range` (일봉)
//! - 펀더멘털: quoteSummary API (`summaryDetail`, `defaultKeyStatistics`, `financialData`)
//!
//! quoteSummary는 cookie + crumb 인증이 필요합니다. 발급받은 crumb은
//! Provider 인스턴스에 캐시되어 모든 종목 수집이 공유하며, HTTP 401 응답을
//! 받으면 폐기 후 한 번 재발급합니다.

mod models;

pub use models::QUOTE_SUMMARY_MODULES;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use yahoo_finance_api as yahoo;

use self::models::QuoteSummaryResponse;
use super::{FinancialDataProvider, FundamentalSnapshot, LookbackWindow, PriceSample};
use crate::error::{FetchError, Result};
use screener_core::TickerSymbol;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Yahoo 인증/조회 엔드포인트.
#[derive(Debug, Clone)]
pub struct YahooEndpoints {
    /// 인증 cookie 발급 URL
    pub cookie_url: String,
    /// crumb 발급 URL
    pub crumb_url: String,
    /// quoteSummary 기본 URL (뒤에 `/{symbol}`이 붙음)
    pub quote_summary_url: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            cookie_url: "https://fc.yahoo.com".to_string(),
            crumb_url: "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string(),
            quote_summary_url: "https://query1.finance.yahoo.com/v10/finance/quoteSummary"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

/// Yahoo Finance 기반 재무 데이터 Provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: Client,
    endpoints: YahooEndpoints,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// 기본 엔드포인트로 생성.
    ///
    /// `http_timeout`은 quoteSummary 관련 모든 HTTP 요청에 적용됩니다.
    pub fn new(http_timeout: Duration) -> Result<Self> {
        Self::with_endpoints(http_timeout, YahooEndpoints::default())
    }

    /// 엔드포인트를 지정하여 생성.
    pub fn with_endpoints(http_timeout: Duration, endpoints: YahooEndpoints) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()?;
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            connector,
            client,
            endpoints,
            crumb: RwLock::new(None),
        })
    }

    /// 캐시된 crumb을 반환하거나 새로 발급합니다.
    async fn ensure_crumb(&self) -> Result<CrumbData> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let fresh = self.fetch_crumb().await?;
        *self.crumb.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    async fn fetch_crumb(&self) -> Result<CrumbData> {
        // fc.yahoo.com은 404와 함께 cookie를 내려준다
        let response = self.client.get(&self.endpoints.cookie_url).send().await?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(value, _)| value.to_string()))
            .ok_or_else(|| FetchError::Provider("Yahoo auth cookie missing".to_string()))?;

        let crumb = self
            .client
            .get(&self.endpoints.crumb_url)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let crumb = crumb.trim().to_string();
        if crumb.is_empty() {
            return Err(FetchError::Provider("Yahoo crumb is empty".to_string()));
        }

        debug!("Yahoo crumb 발급 완료");
        Ok(CrumbData { cookie, crumb })
    }

    async fn clear_crumb(&self) {
        self.crumb.write().await.take();
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<FundamentalSnapshot> {
        let url = format!("{}/{}", self.endpoints.quote_summary_url, symbol);

        for attempt in 0..2 {
            let crumb = self.ensure_crumb().await?;

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("modules", QUOTE_SUMMARY_MODULES),
                    ("crumb", crumb.crumb.as_str()),
                ])
                .header(header::COOKIE, &crumb.cookie)
                .send()
                .await?;

            match response.status() {
                StatusCode::UNAUTHORIZED => {
                    self.clear_crumb().await;
                    if attempt == 0 {
                        debug!(symbol, "crumb 거부됨, 재발급");
                        continue;
                    }
                    break;
                }
                StatusCode::NOT_FOUND => {
                    return Err(FetchError::NoData(format!("quoteSummary {}", symbol)));
                }
                _ => {}
            }

            let body: QuoteSummaryResponse = response.error_for_status()?.json().await?;
            let summary = body.quote_summary;

            return match summary.result.as_ref().and_then(|r| r.first()) {
                Some(result) => Ok(FundamentalSnapshot::from(result)),
                None => {
                    let reason = summary
                        .error
                        .and_then(|e| e.description.or(e.code))
                        .unwrap_or_else(|| "empty result".to_string());
                    Err(FetchError::NoData(format!("quoteSummary {}: {}", symbol, reason)))
                }
            };
        }

        Err(FetchError::Provider(format!(
            "Yahoo rejected credentials for {}",
            symbol
        )))
    }
}

/// Yahoo 조회용 심볼로 변환합니다.
///
/// 주식 클래스 구분 점(`BRK.B`)은 대시(`BRK-B`)로 바꾸고,
/// 거래소 접미사(`PETR4.SA`)가 붙은 심볼은 그대로 둡니다.
pub fn yahoo_symbol(ticker: &TickerSymbol) -> String {
    let symbol = ticker.as_str();
    match symbol.rsplit_once('.') {
        Some((base, class)) if !base.is_empty() && is_share_class(class) => {
            format!("{}-{}", base, class)
        }
        _ => symbol.to_string(),
    }
}

fn is_share_class(suffix: &str) -> bool {
    suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_alphabetic())
}

#[async_trait]
impl FinancialDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fundamentals(&self, ticker: &TickerSymbol) -> Result<FundamentalSnapshot> {
        let symbol = yahoo_symbol(ticker);
        self.fetch_quote_summary(&symbol).await
    }

    async fn price_history(
        &self,
        ticker: &TickerSymbol,
        window: LookbackWindow,
    ) -> Result<Vec<PriceSample>> {
        let symbol = yahoo_symbol(ticker);

        let response = match self
            .connector
            .get_quote_range(&symbol, "1d", window.range())
            .await
        {
            Ok(response) => response,
            Err(yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e.into()),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(FetchError::Parse(format!("{} {}: {}", symbol, window, e))),
        };

        let samples = quotes
            .iter()
            .filter_map(|q| {
                let timestamp = Utc.timestamp_opt(q.timestamp as i64, 0).single()?;
                Some(PriceSample::new(timestamp, q.close, q.volume as f64))
            })
            .collect();

        Ok(samples)
    }
}
