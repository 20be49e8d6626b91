//! 기술적 분석 실행기.
//!
//! 종목마다 1년 일봉을 조회하여 `TechnicalSnapshot`을 계산하고 종합 순위를 매깁니다.
//! 데이터가 없거나 조회에 실패한 종목은 건너뜁니다.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Instrument};

use crate::error::{FetchError, Result};
use crate::fetcher::FetcherOptions;
use crate::provider::{FinancialDataProvider, LookbackWindow, YahooProvider};
use screener_core::{
    rank_composite, AnalysisReport, FetchConfig, ScreenerError, ScreenerResult, TechnicalSnapshot,
    TickerSymbol,
};

pub struct TechnicalAnalyzer<P: ?Sized> {
    provider: Arc<P>,
    options: FetcherOptions,
}

impl TechnicalAnalyzer<YahooProvider> {
    pub fn yahoo(config: &FetchConfig) -> ScreenerResult<Self> {
        let provider = YahooProvider::new(Duration::from_secs(config.http_timeout_secs))
            .map_err(|e| ScreenerError::Config(format!("Yahoo Provider 생성 실패: {}", e)))?;
        Ok(Self::new(Arc::new(provider), FetcherOptions::from(config)))
    }
}

impl<P: FinancialDataProvider + ?Sized> TechnicalAnalyzer<P> {
    pub fn new(provider: Arc<P>, options: FetcherOptions) -> Self {
        Self { provider, options }
    }

    /// 종목별 스냅샷을 입력 순서대로 계산합니다.
    pub async fn analyze(&self, tickers: &[TickerSymbol]) -> Vec<TechnicalSnapshot> {
        let concurrency = self.options.concurrency.max(1);

        let mut snapshots: Vec<(usize, TechnicalSnapshot)> =
            stream::iter(tickers.iter().enumerate())
                .map(|(index, ticker)| async move { (index, ticker, self.snapshot(ticker).await) })
                .buffer_unordered(concurrency)
                .filter_map(|(index, ticker, result)| async move {
                    match result {
                        Ok(snapshot) => Some((index, snapshot)),
                        Err(e) => {
                            debug!(ticker = %ticker, error = %e, "종목 분석 실패, 건너뜀");
                            None
                        }
                    }
                })
                .collect()
                .await;

        snapshots.sort_by_key(|(index, _)| *index);
        snapshots.into_iter().map(|(_, snapshot)| snapshot).collect()
    }

    /// 스냅샷을 계산하고 종합 점수 순위표를 만듭니다.
    pub async fn run(&self, tickers: &[TickerSymbol]) -> AnalysisReport {
        let report = rank_composite(self.analyze(tickers).await);
        info!(
            requested = tickers.len(),
            ranked = report.rows.len(),
            standouts = report.standouts().count(),
            "기술적 분석 완료"
        );
        report
    }

    /// 단일 종목 스냅샷. 가격 이력이 비어 있으면 `NoData`.
    pub async fn snapshot(&self, ticker: &TickerSymbol) -> Result<TechnicalSnapshot> {
        let timeout = self.options.ticker_timeout;
        let span = screener_core::ticker_span!("analyze_ticker", ticker);

        let history = tokio::time::timeout(
            timeout,
            self.provider
                .price_history(ticker, LookbackWindow::OneYear)
                .instrument(span),
        )
        .await
        .map_err(|_| FetchError::Timeout {
            ticker: ticker.to_string(),
            secs: timeout.as_secs(),
        })??;

        if history.is_empty() {
            return Err(FetchError::NoData(ticker.to_string()));
        }

        let closes: Vec<f64> = history.iter().map(|sample| sample.close).collect();
        Ok(TechnicalSnapshot::from_closes(ticker.clone(), &closes))
    }
}
