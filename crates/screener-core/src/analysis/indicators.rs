//! 추세/모멘텀/변동성 지표.
//!
//! 모든 지표는 종가 시퀀스를 받아 같은 길이의 결과를 돌려주며,
//! 계산에 필요한 기간이 차기 전의 값은 `None`입니다.
//! 지수 평활은 첫 관측값에서 시작하는 재귀식(adjust=false)을 사용합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// 데이터 부족
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12)
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26)
    pub slow_period: usize,
    /// 시그널 기간 (기본: 9)
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 한 시점의 값.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdPoint {
    /// MACD 라인 (단기 EMA - 장기 EMA)
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA)
    pub signal: Option<f64>,
}

/// 볼린저 밴드 한 시점의 값.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BollingerPoint {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

impl BollingerPoint {
    /// 밴드 안에서의 종가 위치. 하단 0, 상단 1.
    ///
    /// 밴드 폭이 0이면 NaN 또는 무한대가 될 수 있습니다.
    pub fn position(&self, close: f64) -> Option<f64> {
        match (self.upper, self.lower) {
            (Some(upper), Some(lower)) => Some((close - lower) / (upper - lower)),
            _ => None,
        }
    }
}

fn check_period(period: usize, provided: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    if provided < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided,
        });
    }
    Ok(())
}

/// 지수 가중 평균. 첫 값에서 시작하며 `min_periods`개가 모이기 전은 `None`.
fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    let mut state: Option<f64> = None;

    for (i, &value) in values.iter().enumerate() {
        let next = match state {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        state = Some(next);
        result.push(if i + 1 >= min_periods { Some(next) } else { None });
    }

    result
}

/// 단순 이동평균 (SMA).
pub fn sma(prices: &[f64], period: usize) -> IndicatorResult<Vec<Option<f64>>> {
    check_period(period, prices.len())?;

    Ok((0..prices.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &prices[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect())
}

/// 지수 이동평균 (EMA). 평활 계수는 `2 / (period + 1)`.
pub fn ema(prices: &[f64], period: usize) -> IndicatorResult<Vec<Option<f64>>> {
    check_period(period, prices.len())?;
    Ok(ewm(prices, 2.0 / (period as f64 + 1.0), period))
}

/// RSI (Relative Strength Index).
///
/// 상승폭/하락폭을 `1 / period` 계수로 평활합니다. 평균 하락폭이 0이면 100.
pub fn rsi(prices: &[f64], period: usize) -> IndicatorResult<Vec<Option<f64>>> {
    check_period(period, prices.len())?;

    let mut gains = Vec::with_capacity(prices.len());
    let mut losses = Vec::with_capacity(prices.len());
    gains.push(0.0);
    losses.push(0.0);
    for pair in prices.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let alpha = 1.0 / period as f64;
    let avg_gains = ewm(&gains, alpha, period);
    let avg_losses = ewm(&losses, alpha, period);

    Ok(avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect())
}

/// MACD. 시그널 라인은 유효한 MACD 값들만으로 계산한 뒤 원래 위치에 맞춥니다.
pub fn macd(prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdPoint>> {
    if params.fast_period >= params.slow_period {
        return Err(IndicatorError::InvalidParameter(format!(
            "단기 기간({})은 장기 기간({})보다 짧아야 합니다",
            params.fast_period, params.slow_period
        )));
    }
    if params.signal_period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "시그널 기간은 0보다 커야 합니다".to_string(),
        ));
    }

    let fast = ema(prices, params.fast_period)?;
    let slow = ema(prices, params.slow_period)?;

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let valid: Vec<f64> = line.iter().flatten().copied().collect();
    let signal = ewm(
        &valid,
        2.0 / (params.signal_period as f64 + 1.0),
        params.signal_period,
    );
    let offset = line.len() - valid.len();

    Ok(line
        .iter()
        .enumerate()
        .map(|(i, macd)| MacdPoint {
            macd: *macd,
            signal: i
                .checked_sub(offset)
                .and_then(|j| signal.get(j).copied().flatten()),
        })
        .collect())
}

/// 볼린저 밴드. 표준편차는 모집단 표준편차입니다.
pub fn bollinger_bands(
    prices: &[f64],
    period: usize,
    std_multiplier: f64,
) -> IndicatorResult<Vec<BollingerPoint>> {
    check_period(period, prices.len())?;

    Ok((0..prices.len())
        .map(|i| {
            if i + 1 < period {
                return BollingerPoint::default();
            }
            let window = &prices[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance =
                window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
            let band = std_multiplier * variance.sqrt();

            BollingerPoint {
                upper: Some(mean + band),
                middle: Some(mean),
                lower: Some(mean - band),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_sma() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(result, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_period_errors() {
        assert_eq!(
            sma(&[1.0, 2.0], 3),
            Err(IndicatorError::InsufficientData {
                required: 3,
                provided: 2
            })
        );
        assert!(matches!(
            ema(&[1.0], 0),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ema_starts_from_first_value() {
        // alpha = 2 / (3 + 1) = 0.5
        let result = ema(&[2.0, 4.0, 8.0, 0.0], 3).unwrap();
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!(approx(result[2].unwrap(), 5.5));
        assert!(approx(result[3].unwrap(), 2.75));
    }

    #[test]
    fn test_rsi_values() {
        let result = rsi(&[1.0, 2.0, 1.0, 2.0], 2).unwrap();
        assert_eq!(result[0], None);
        assert_eq!(result[1], Some(100.0));
        assert!(approx(result[2].unwrap(), 100.0 / 3.0));
        assert!(approx(result[3].unwrap(), 100.0 - 100.0 / 3.5));
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let rising: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        assert_eq!(rsi(&rising, 14).unwrap().last(), Some(&Some(100.0)));

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert!(approx(rsi(&falling, 14).unwrap()[29].unwrap(), 0.0));
    }

    #[test]
    fn test_macd_alignment() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin()).collect();
        let result = macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(result.len(), 40);
        assert!(result[24].macd.is_none());
        assert!(result[25].macd.is_some());
        assert!(result[32].signal.is_none());
        assert!(result[33].signal.is_some());
    }

    #[test]
    fn test_macd_flat_prices() {
        let prices = vec![50.0; 40];
        let last = *macd(&prices, MacdParams::default()).unwrap().last().unwrap();
        assert_eq!(last.macd, Some(0.0));
        assert_eq!(last.signal, Some(0.0));
    }

    #[test]
    fn test_macd_rejects_inverted_periods() {
        let params = MacdParams {
            fast_period: 26,
            slow_period: 12,
            signal_period: 9,
        };
        assert!(macd(&[1.0; 40], params).is_err());
    }

    #[test]
    fn test_bollinger_bands() {
        let result = bollinger_bands(&[1.0, 2.0, 3.0], 3, 2.0).unwrap();
        assert_eq!(result[1], BollingerPoint::default());

        let band = result[2];
        let std = (2.0f64 / 3.0).sqrt();
        assert!(approx(band.middle.unwrap(), 2.0));
        assert!(approx(band.upper.unwrap(), 2.0 + 2.0 * std));
        assert!(approx(band.lower.unwrap(), 2.0 - 2.0 * std));
        assert!(approx(band.position(2.0).unwrap(), 0.5));
    }

    #[test]
    fn test_bollinger_flat_band_position_is_nan() {
        let band = *bollinger_bands(&[5.0; 20], 20, 2.0).unwrap().last().unwrap();
        assert!(band.position(5.0).unwrap().is_nan());
        assert_eq!(band.position(6.0), Some(f64::INFINITY));
    }
}
