//! 지표 점수와 종목별 기술적 스냅샷.
//!
//! 점수는 0~1 범위이며 높을수록 매수 관점에서 유리한 상태입니다.
//! - SMA: 20일선이 50일선 위에 있으면 1
//! - RSI: 과매도일수록 높은 점수
//! - MACD: MACD가 시그널 위에 있으면 1
//! - 볼린저: 하단 밴드에 가까울수록 높은 점수

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::indicators::{bollinger_bands, macd, rsi, sma, MacdParams};
use crate::types::TickerSymbol;

pub const SHORT_SMA_PERIOD: usize = 20;
pub const LONG_SMA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

/// 1개월/3개월/6개월에 해당하는 거래일 수.
pub const ONE_MONTH_SESSIONS: usize = 21;
pub const THREE_MONTH_SESSIONS: usize = 63;
pub const SIX_MONTH_SESSIONS: usize = 126;

/// RSI 구간 점수. [-inf,30) 1, [30,40) 0.75, [40,60) 0.5, [60,70) 0.25, [70,inf) 0.
pub fn rsi_score(rsi: f64) -> Option<f64> {
    step_score(rsi, [30.0, 40.0, 60.0, 70.0])
}

/// 볼린저 위치 구간 점수. [-inf,0) 1, [0,0.25) 0.75, [0.25,0.5) 0.5, [0.5,0.75) 0.25, [0.75,inf) 0.
pub fn bollinger_score(position: f64) -> Option<f64> {
    step_score(position, [0.0, 0.25, 0.5, 0.75])
}

/// 왼쪽 닫힌 구간으로 나눈 계단 점수. NaN과 +inf는 어느 구간에도 속하지 않습니다.
fn step_score(value: f64, edges: [f64; 4]) -> Option<f64> {
    const SCORES: [f64; 5] = [1.0, 0.75, 0.5, 0.25, 0.0];

    if value.is_nan() || value == f64::INFINITY {
        return None;
    }
    let bin = edges.iter().take_while(|edge| value >= **edge).count();
    Some(SCORES[bin])
}

/// 마지막 종가 기준 `sessions` 거래일 전 대비 수익률 (%).
pub fn period_return(closes: &[f64], sessions: usize) -> Option<f64> {
    let last = *closes.last()?;
    let base = *closes.iter().rev().nth(sessions)?;
    Some((last / base - 1.0) * 100.0)
}

/// 한 종목의 최신 기술적 점수와 기간 수익률.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub ticker: TickerSymbol,
    /// 이동평균 교차 점수 (0 또는 1)
    pub sma_score: f64,
    /// RSI 점수 (데이터 부족 시 없음)
    pub rsi_score: Option<f64>,
    /// MACD 점수 (0 또는 1)
    pub macd_score: f64,
    /// 볼린저 점수 (데이터 부족 또는 밴드 폭 0이면 없음)
    pub bollinger_score: Option<f64>,
    pub return_1m_pct: Option<f64>,
    pub return_3m_pct: Option<f64>,
    pub return_6m_pct: Option<f64>,
}

impl TechnicalSnapshot {
    /// 일봉 종가 시퀀스로 스냅샷을 계산합니다.
    ///
    /// NaN 종가는 제외하고 계산합니다. 데이터가 부족한 지표는 교차 점수는 0,
    /// 구간 점수와 수익률은 없음으로 남습니다.
    pub fn from_closes(ticker: impl Into<TickerSymbol>, closes: &[f64]) -> Self {
        let ticker = ticker.into();
        let closes: Vec<f64> = closes.iter().copied().filter(|c| !c.is_nan()).collect();

        let last_of =
            |series: Option<Vec<Option<f64>>>| series.and_then(|s| s.last().copied().flatten());

        let short = last_of(sma(&closes, SHORT_SMA_PERIOD).ok());
        let long = last_of(sma(&closes, LONG_SMA_PERIOD).ok());
        let sma_score = match (short, long) {
            (Some(short), Some(long)) if short > long => 1.0,
            _ => 0.0,
        };

        let rsi_score = last_of(rsi(&closes, RSI_PERIOD).ok()).and_then(rsi_score);

        let macd_score = match macd(&closes, MacdParams::default())
            .ok()
            .and_then(|points| points.last().copied())
        {
            Some(point) => match (point.macd, point.signal) {
                (Some(line), Some(signal)) if line > signal => 1.0,
                _ => 0.0,
            },
            None => 0.0,
        };

        let bollinger_score = bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_STD)
            .ok()
            .and_then(|bands| bands.last().copied())
            .zip(closes.last().copied())
            .and_then(|(band, close)| band.position(close))
            .and_then(bollinger_score);

        let snapshot = Self {
            ticker,
            sma_score,
            rsi_score,
            macd_score,
            bollinger_score,
            return_1m_pct: period_return(&closes, ONE_MONTH_SESSIONS),
            return_3m_pct: period_return(&closes, THREE_MONTH_SESSIONS),
            return_6m_pct: period_return(&closes, SIX_MONTH_SESSIONS),
        };
        debug!(ticker = %snapshot.ticker, sessions = closes.len(), "기술적 스냅샷 계산");
        snapshot
    }
}
