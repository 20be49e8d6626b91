//! 스크리닝 파이프라인.
//!
//! 유니버스 해석 → 지표 수집 → 스크리닝을 순서대로 실행합니다.
//! 표시 계층과 독립적으로 호출할 수 있습니다.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::fetcher::{FetcherOptions, MetricFetcher};
use crate::provider::{FinancialDataProvider, YahooProvider};
use crate::universe::UniverseProvider;
use screener_core::{
    screen, FetchConfig, FilterConfig, RawQuote, ScreenerError, ScreenerResult, ScreeningResult,
    UniverseSource,
};

/// 한 번의 스크리닝 실행 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenOutcome {
    /// PSR 오름차순 결과
    pub result: ScreeningResult,
    /// 복구 가능한 소스 오류 메시지
    pub notices: Vec<String>,
    /// 해석된 유니버스 크기
    pub universe_size: usize,
}

/// 수집 단계 결과. 필터 적용 전의 스냅샷입니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedQuotes {
    pub quotes: Vec<RawQuote>,
    pub notices: Vec<String>,
    pub universe_size: usize,
}

/// 유니버스 Provider, 지표 수집기, 스크리닝 엔진을 묶은 파이프라인.
pub struct ScreeningPipeline<P: ?Sized> {
    universe: UniverseProvider,
    fetcher: MetricFetcher<P>,
}

impl ScreeningPipeline<YahooProvider> {
    /// 수집 설정으로 Yahoo Finance 기반 파이프라인을 생성합니다.
    pub fn yahoo(config: &FetchConfig) -> ScreenerResult<Self> {
        let http_timeout = Duration::from_secs(config.http_timeout_secs);
        let provider = YahooProvider::new(http_timeout)
            .map_err(|e| ScreenerError::Config(format!("Yahoo Provider 생성 실패: {}", e)))?;

        Ok(Self::new(
            UniverseProvider::new(http_timeout)?,
            MetricFetcher::new(Arc::new(provider), FetcherOptions::from(config)),
        ))
    }
}

impl<P: FinancialDataProvider + ?Sized> ScreeningPipeline<P> {
    pub fn new(universe: UniverseProvider, fetcher: MetricFetcher<P>) -> Self {
        Self { universe, fetcher }
    }

    pub fn universe_provider(&self) -> &UniverseProvider {
        &self.universe
    }

    pub fn fetcher(&self) -> &MetricFetcher<P> {
        &self.fetcher
    }

    /// 유니버스를 해석하고 지표를 수집합니다.
    ///
    /// 원격 유니버스 실패만 에러로 반환되며, 로컬 파일 실패는 `notices`에
    /// 담긴 채 빈 수집 결과로 완료됩니다.
    pub async fn collect(&self, source: &UniverseSource) -> ScreenerResult<CollectedQuotes> {
        let universe = self.universe.resolve(source).await?;
        let mut notices = Vec::new();
        if let Some(notice) = &universe.notice {
            warn!(source = %source, notice = %notice, "유니버스 소스 오류");
            notices.push(notice.clone());
        }

        let quotes = self.fetcher.fetch(&universe.tickers).await;

        Ok(CollectedQuotes {
            quotes,
            notices,
            universe_size: universe.len(),
        })
    }

    /// 소스의 유니버스에 대해 스크리닝을 실행합니다.
    ///
    /// 잘못된 필터 설정과 원격 유니버스 실패만 에러로 반환됩니다.
    pub async fn run_screen(
        &self,
        source: &UniverseSource,
        config: &FilterConfig,
    ) -> ScreenerResult<ScreenOutcome> {
        config.validate()?;

        let collected = self.collect(source).await?;
        let result = screen(&collected.quotes, config);

        info!(
            source = %source,
            universe = collected.universe_size,
            kept = result.len(),
            "스크리닝 완료"
        );

        Ok(ScreenOutcome {
            result,
            notices: collected.notices,
            universe_size: collected.universe_size,
        })
    }
}
