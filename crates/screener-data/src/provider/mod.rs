//! 재무 데이터 Provider 모듈.
//!
//! 종목별 펀더멘털 스냅샷과 가격 이력을 제공하는 외부 협력자를 정의합니다.
//!
//! ## Yahoo Finance
//! - `YahooProvider`: 가격 이력은 `yahoo_finance_api`, 펀더멘털은 quoteSummary API

pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use screener_core::TickerSymbol;

pub use yahoo::YahooProvider;

/// 가격 이력 조회 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackWindow {
    /// 약 3개월 (유동성 계산)
    ThreeMonths,
    /// 약 1년 (장기 수익률 계산)
    OneYear,
}

impl LookbackWindow {
    /// Yahoo Finance range 문자열.
    pub fn range(&self) -> &'static str {
        match self {
            Self::ThreeMonths => "3mo",
            Self::OneYear => "1y",
        }
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.range())
    }
}

/// 일봉 가격 샘플.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }
}

/// 펀더멘털 스냅샷.
///
/// 값은 Provider가 보고한 그대로이며 비율 필드는 분수(0.42)입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub ebitda: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
    pub price_to_sales_trailing_12_months: Option<f64>,
    pub gross_margins: Option<f64>,
    pub return_on_assets: Option<f64>,
}

/// 재무 데이터 Provider 트레잇.
///
/// 티커를 키로 펀더멘털과 가격 이력을 조회합니다.
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    /// Provider 이름 (로그용).
    fn name(&self) -> &str;

    /// 펀더멘털 스냅샷 조회.
    async fn fundamentals(&self, ticker: &TickerSymbol) -> Result<FundamentalSnapshot>;

    /// 가격 이력 조회. 데이터가 없으면 빈 시계열을 반환합니다.
    async fn price_history(
        &self,
        ticker: &TickerSymbol,
        window: LookbackWindow,
    ) -> Result<Vec<PriceSample>>;
}

#[async_trait]
impl<P: FinancialDataProvider + ?Sized> FinancialDataProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fundamentals(&self, ticker: &TickerSymbol) -> Result<FundamentalSnapshot> {
        (**self).fundamentals(ticker).await
    }

    async fn price_history(
        &self,
        ticker: &TickerSymbol,
        window: LookbackWindow,
    ) -> Result<Vec<PriceSample>> {
        (**self).price_history(ticker, window).await
    }
}
