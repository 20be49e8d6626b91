//! 종목별 지표 스냅샷.

use serde::{Deserialize, Serialize};

use crate::types::TickerSymbol;

/// 수집 단계에서 만들어진 종목별 지표 스냅샷.
///
/// 수집이 성공한 종목에 대해서만 존재합니다. 판정에 쓰이는 필드 중
/// 일부는 여전히 비어 있을 수 있으며, 스크리닝 엔진의 완전성 필터가
/// 이를 걸러냅니다. `f64` 필드의 NaN도 값이 없는 것으로 취급합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// 티커 심볼
    pub ticker: TickerSymbol,
    /// 평균 거래량 × 평균 종가 (단기 구간, 0 이상)
    pub liquidity: f64,
    /// EBIT (제공자의 EBITDA 값)
    pub ebit: Option<f64>,
    /// P/L (trailing PER)
    pub pe_ratio: Option<f64>,
    /// EV/EBITDA
    pub ev_ebitda: Option<f64>,
    /// PSR (trailing 12개월 매출 대비 주가)
    pub price_to_sales: Option<f64>,
    /// 매출총이익률 (%), 제공자 값이 없으면 0
    pub gross_margin_pct: f64,
    /// ROA (%), 제공자 값이 없으면 0
    pub roa_pct: f64,
    /// 장기 구간 수익률 (%), 데이터가 없으면 0
    pub trailing_return_pct: f64,
}

impl RawQuote {
    /// 지표가 모두 비어 있는 스냅샷을 생성합니다.
    pub fn new(ticker: impl Into<TickerSymbol>) -> Self {
        Self {
            ticker: ticker.into(),
            liquidity: 0.0,
            ebit: None,
            pe_ratio: None,
            ev_ebitda: None,
            price_to_sales: None,
            gross_margin_pct: 0.0,
            roa_pct: 0.0,
            trailing_return_pct: 0.0,
        }
    }

    /// 판정에 필요한 모든 필드가 존재하는지 확인합니다.
    pub fn is_complete(&self) -> bool {
        self.to_complete().is_some()
    }

    /// 모든 필드가 존재하면 순위가 매겨지지 않은 행으로 변환합니다.
    pub fn to_complete(&self) -> Option<ScreenedQuote> {
        Some(ScreenedQuote {
            rank: 0,
            ticker: self.ticker.clone(),
            liquidity: present(Some(self.liquidity))?,
            ebit: present(self.ebit)?,
            pe_ratio: present(self.pe_ratio)?,
            ev_ebitda: present(self.ev_ebitda)?,
            price_to_sales: present(self.price_to_sales)?,
            gross_margin_pct: present(Some(self.gross_margin_pct))?,
            roa_pct: present(Some(self.roa_pct))?,
            trailing_return_pct: present(Some(self.trailing_return_pct))?,
        })
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// 스크리닝 결과의 한 행.
///
/// 완전성 필터를 통과한 스냅샷이므로 모든 지표가 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedQuote {
    /// 0부터 시작하는 순위 (PSR 오름차순)
    pub rank: usize,
    pub ticker: TickerSymbol,
    pub liquidity: f64,
    pub ebit: f64,
    pub pe_ratio: f64,
    pub ev_ebitda: f64,
    pub price_to_sales: f64,
    pub gross_margin_pct: f64,
    pub roa_pct: f64,
    pub trailing_return_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_quote() -> RawQuote {
        RawQuote {
            liquidity: 1e7,
            ebit: Some(100.0),
            pe_ratio: Some(10.0),
            ev_ebitda: Some(8.0),
            price_to_sales: Some(2.0),
            gross_margin_pct: 50.0,
            roa_pct: 10.0,
            trailing_return_pct: 5.0,
            ..RawQuote::new("AAA")
        }
    }

    #[test]
    fn test_complete_quote_converts() {
        let row = complete_quote().to_complete().unwrap();
        assert_eq!(row.ticker.as_str(), "AAA");
        assert_eq!(row.rank, 0);
        assert_eq!(row.price_to_sales, 2.0);
    }

    #[test]
    fn test_missing_field_is_incomplete() {
        let mut quote = complete_quote();
        quote.ev_ebitda = None;
        assert!(!quote.is_complete());

        let mut quote = complete_quote();
        quote.liquidity = f64::NAN;
        assert!(!quote.is_complete());

        let mut quote = complete_quote();
        quote.pe_ratio = Some(f64::NAN);
        assert!(!quote.is_complete());
    }

    #[test]
    fn test_new_quote_is_incomplete() {
        assert!(!RawQuote::new("ZZZ").is_complete());
    }
}
