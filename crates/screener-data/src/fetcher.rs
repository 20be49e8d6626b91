//! 종목별 지표 수집기.
//!
//! 각 종목마다 펀더멘털 스냅샷과 두 구간(3개월, 1년)의 가격 이력을 조회하여
//! `RawQuote`를 만듭니다. 종목 간에는 공유 상태가 없으므로 제한된 동시성으로
//! 병렬 수집하며, 한 종목의 실패나 타임아웃은 다른 종목에 영향을 주지 않습니다.
//! 실패한 종목은 결과에서 제외되고 `debug` 레벨로만 기록됩니다.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Instrument};

use crate::cache::MemoCache;
use crate::error::{FetchError, Result};
use crate::provider::{FinancialDataProvider, LookbackWindow, PriceSample};
use screener_core::{FetchConfig, RawQuote, TickerSymbol};

/// 수집기 옵션.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherOptions {
    /// 동시 수집 종목 수 (최소 1)
    pub concurrency: usize,
    /// 종목당 전체 수집 타임아웃
    pub ticker_timeout: Duration,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            ticker_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&FetchConfig> for FetcherOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            ticker_timeout: Duration::from_secs(config.ticker_timeout_secs),
        }
    }
}

/// 티커 시퀀스로 `RawQuote` 목록을 수집하는 수집기.
pub struct MetricFetcher<P: ?Sized> {
    provider: Arc<P>,
    cache: MemoCache<Vec<TickerSymbol>, Vec<RawQuote>>,
    options: FetcherOptions,
}

impl<P: FinancialDataProvider + ?Sized> MetricFetcher<P> {
    pub fn new(provider: Arc<P>, options: FetcherOptions) -> Self {
        Self::with_cache(provider, options, MemoCache::new())
    }

    /// 캐시를 주입하여 생성.
    pub fn with_cache(
        provider: Arc<P>,
        options: FetcherOptions,
        cache: MemoCache<Vec<TickerSymbol>, Vec<RawQuote>>,
    ) -> Self {
        Self {
            provider,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &MemoCache<Vec<TickerSymbol>, Vec<RawQuote>> {
        &self.cache
    }

    pub fn options(&self) -> &FetcherOptions {
        &self.options
    }

    /// 티커 목록의 지표를 수집합니다.
    ///
    /// 성공한 종목만 입력 순서대로 반환합니다. 같은 시퀀스(순서 포함)에 대한
    /// 반복 호출은 캐시된 결과를 반환합니다.
    pub async fn fetch(&self, tickers: &[TickerSymbol]) -> Vec<RawQuote> {
        let key = tickers.to_vec();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(count = cached.len(), "캐시된 지표 사용");
            return cached;
        }

        let quotes = self.fetch_all(tickers).await;
        self.cache.insert(key, quotes.clone()).await;
        quotes
    }

    async fn fetch_all(&self, tickers: &[TickerSymbol]) -> Vec<RawQuote> {
        let concurrency = self.options.concurrency.max(1);

        let mut collected: Vec<(usize, RawQuote)> = stream::iter(tickers.iter().enumerate())
            .map(|(index, ticker)| async move { (index, ticker, self.fetch_one(ticker).await) })
            .buffer_unordered(concurrency)
            .filter_map(|(index, ticker, result)| async move {
                match result {
                    Ok(quote) => Some((index, quote)),
                    Err(e) => {
                        debug!(ticker = %ticker, error = %e, "종목 수집 실패, 제외");
                        None
                    }
                }
            })
            .collect()
            .await;

        collected.sort_by_key(|(index, _)| *index);

        debug!(provider = self.provider.name(), "지표 수집 완료");

        collected.into_iter().map(|(_, quote)| quote).collect()
    }

    /// 단일 종목 수집. 타임아웃은 다른 실패와 동일하게 취급됩니다.
    pub async fn fetch_one(&self, ticker: &TickerSymbol) -> Result<RawQuote> {
        let timeout = self.options.ticker_timeout;
        let span = screener_core::ticker_span!("fetch_quote", ticker);

        tokio::time::timeout(timeout, build_quote(self.provider.as_ref(), ticker).instrument(span))
            .await
            .map_err(|_| FetchError::Timeout {
                ticker: ticker.to_string(),
                secs: timeout.as_secs(),
            })?
    }
}

/// Provider 응답으로 `RawQuote`를 구성합니다.
///
/// 세 요청은 동시에 진행되며 하나라도 실패하면 종목 전체가 실패합니다.
pub async fn build_quote<P>(provider: &P, ticker: &TickerSymbol) -> Result<RawQuote>
where
    P: FinancialDataProvider + ?Sized,
{
    let (fundamentals, short_window, long_window) = tokio::try_join!(
        provider.fundamentals(ticker),
        provider.price_history(ticker, LookbackWindow::ThreeMonths),
        provider.price_history(ticker, LookbackWindow::OneYear),
    )?;

    Ok(RawQuote {
        ticker: ticker.clone(),
        liquidity: compute_liquidity(&short_window),
        // EBIT 컬럼은 Provider의 EBITDA 값을 사용
        ebit: fundamentals.ebitda,
        pe_ratio: fundamentals.trailing_pe,
        ev_ebitda: fundamentals.enterprise_to_ebitda,
        price_to_sales: fundamentals.price_to_sales_trailing_12_months,
        gross_margin_pct: scale_percent(fundamentals.gross_margins),
        roa_pct: scale_percent(fundamentals.return_on_assets),
        trailing_return_pct: compute_trailing_return(&long_window),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// 유동성 = 평균 거래량 × 평균 종가. 샘플이 없으면 0.
///
/// NaN 값은 평균에서 제외되며, 모든 값이 NaN이면 NaN을 반환합니다.
pub fn compute_liquidity(samples: &[PriceSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let avg_volume = mean(samples.iter().map(|s| s.volume));
    let avg_close = mean(samples.iter().map(|s| s.close));
    avg_volume * avg_close
}

/// 구간 수익률 (%) = (마지막 종가 - 첫 종가) / 첫 종가 × 100. 샘플이 없으면 0.
pub fn compute_trailing_return(samples: &[PriceSample]) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (last.close - first.close) / first.close * 100.0,
        _ => 0.0,
    }
}

/// 분수를 퍼센트로 변환합니다. 값이 없으면 0.
pub fn scale_percent(fraction: Option<f64>) -> f64 {
    fraction.map(|f| f * 100.0).unwrap_or(0.0)
}
