//! 기술적 분석 모듈
//!
//! 일봉 종가로 이동평균, RSI, MACD, 볼린저 밴드를 계산하고
//! 종목별 점수와 기간 수익률을 하나의 종합 점수로 순위를 매깁니다.

pub mod indicators;
pub mod ranking;
pub mod scoring;

pub use indicators::{
    bollinger_bands, ema, macd, rsi, sma, BollingerPoint, IndicatorError, IndicatorResult,
    MacdParams, MacdPoint,
};
pub use ranking::{rank_composite, AnalysisReport, AnalysisRow};
pub use scoring::{
    bollinger_score, period_return, rsi_score, TechnicalSnapshot, ONE_MONTH_SESSIONS,
    SIX_MONTH_SESSIONS, THREE_MONTH_SESSIONS,
};
