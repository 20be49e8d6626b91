//! 데이터 수집 및 스크리닝 파이프라인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 재무 데이터 Provider 트레잇 및 Yahoo Finance 구현
//! - 원격 목록 페이지/로컬 파일 기반 유니버스 Provider
//! - 종목별 지표 수집기 (동시 수집, 종목별 실패 격리)
//! - 인자 기반 메모 캐시
//! - `run_screen` 파이프라인
//! - 1년 일봉 기반 기술적 분석 실행기

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod provider;
pub mod universe;

pub use analyzer::TechnicalAnalyzer;
pub use cache::MemoCache;
pub use error::{FetchError, Result};
pub use fetcher::{FetcherOptions, MetricFetcher};
pub use pipeline::{CollectedQuotes, ScreenOutcome, ScreeningPipeline};
pub use provider::{
    FinancialDataProvider, FundamentalSnapshot, LookbackWindow, PriceSample, YahooProvider,
};
pub use universe::{Universe, UniverseProvider};
