//! 필터 설정 및 판정 조건.

use serde::{Deserialize, Serialize};

use super::quote::ScreenedQuote;
use crate::error::{ScreenerError, ScreenerResult};

/// 호출자가 제공하는 필터 임계값.
///
/// 실행마다 새로 전달되며 파이프라인에서 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 최소 유동성
    pub min_liquidity: f64,
    /// 최대 P/L
    pub max_pe: f64,
    /// 최대 EV/EBITDA
    pub max_ev_ebitda: f64,
    /// 최소 매출총이익률 (%)
    pub min_gross_margin_pct: f64,
    /// 최소 ROA (%)
    pub min_roa_pct: f64,
    /// 장기 수익률이 양수인 종목만
    pub require_positive_return: bool,
    /// EBIT가 양수인 종목만
    pub require_positive_ebit: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_liquidity: 0.0,
            max_pe: 15.0,
            max_ev_ebitda: 12.0,
            min_gross_margin_pct: 40.0,
            min_roa_pct: 5.0,
            require_positive_return: true,
            require_positive_ebit: true,
        }
    }
}

impl FilterConfig {
    /// 임계값의 사전조건을 검사합니다. NaN 임계값은 허용되지 않습니다.
    pub fn validate(&self) -> ScreenerResult<()> {
        let thresholds = [
            ("min_liquidity", self.min_liquidity),
            ("max_pe", self.max_pe),
            ("max_ev_ebitda", self.max_ev_ebitda),
            ("min_gross_margin_pct", self.min_gross_margin_pct),
            ("min_roa_pct", self.min_roa_pct),
        ];

        for (name, value) in thresholds {
            if value.is_nan() {
                return Err(ScreenerError::InvalidConfig(format!("{} is NaN", name)));
            }
        }

        Ok(())
    }

    /// 적용 순서대로 판정 단계를 반환합니다.
    ///
    /// 플래그가 꺼진 조건부 단계는 포함되지 않습니다.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut stages = vec![Predicate::MinLiquidity(self.min_liquidity)];
        if self.require_positive_ebit {
            stages.push(Predicate::PositiveEbit);
        }
        stages.push(Predicate::MaxPe(self.max_pe));
        stages.push(Predicate::MaxEvEbitda(self.max_ev_ebitda));
        stages.push(Predicate::MinGrossMargin(self.min_gross_margin_pct));
        stages.push(Predicate::MinRoa(self.min_roa_pct));
        if self.require_positive_return {
            stages.push(Predicate::PositiveReturn);
        }
        stages
    }
}

/// 단일 임계값 판정 조건.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// `liquidity >= min`
    MinLiquidity(f64),
    /// `ebit > 0`
    PositiveEbit,
    /// `pe_ratio <= max`
    MaxPe(f64),
    /// `ev_ebitda <= max`
    MaxEvEbitda(f64),
    /// `gross_margin_pct >= min`
    MinGrossMargin(f64),
    /// `roa_pct >= min`
    MinRoa(f64),
    /// `trailing_return_pct > 0`
    PositiveReturn,
}

impl Predicate {
    /// 로그용 단계 이름.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinLiquidity(_) => "min_liquidity",
            Self::PositiveEbit => "positive_ebit",
            Self::MaxPe(_) => "max_pe",
            Self::MaxEvEbitda(_) => "max_ev_ebitda",
            Self::MinGrossMargin(_) => "min_gross_margin",
            Self::MinRoa(_) => "min_roa",
            Self::PositiveReturn => "positive_return",
        }
    }

    /// 행이 조건을 만족하는지 확인합니다.
    pub fn matches(&self, row: &ScreenedQuote) -> bool {
        match *self {
            Self::MinLiquidity(min) => row.liquidity >= min,
            Self::PositiveEbit => row.ebit > 0.0,
            Self::MaxPe(max) => row.pe_ratio <= max,
            Self::MaxEvEbitda(max) => row.ev_ebitda <= max,
            Self::MinGrossMargin(min) => row.gross_margin_pct >= min,
            Self::MinRoa(min) => row.roa_pct >= min,
            Self::PositiveReturn => row.trailing_return_pct > 0.0,
        }
    }
}
