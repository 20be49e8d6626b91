//! 스크리닝 엔진.
//!
//! 수집된 스냅샷에 다음 순서로 필터를 적용합니다:
//! 1. 완전성 필터 (빈 값이 있는 행 제거)
//! 2. 임계값 조건 (모두 AND로 결합)
//! 3. PSR 오름차순 안정 정렬 후 순위 재부여

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use super::filter::FilterConfig;
use super::quote::{RawQuote, ScreenedQuote};
use crate::types::TickerSymbol;

/// PSR 오름차순으로 정렬된 스크리닝 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub rows: Vec<ScreenedQuote>,
}

impl ScreeningResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenedQuote> {
        self.rows.iter()
    }

    /// 결과 순서대로 티커 목록을 반환합니다.
    pub fn tickers(&self) -> Vec<TickerSymbol> {
        self.rows.iter().map(|r| r.ticker.clone()).collect()
    }
}

impl IntoIterator for ScreeningResult {
    type Item = ScreenedQuote;
    type IntoIter = std::vec::IntoIter<ScreenedQuote>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// 스냅샷 목록에 필터를 적용하고 PSR 순으로 정렬합니다.
///
/// 입력은 변경하지 않으며 새 결과를 생성합니다. 동일한 PSR을 가진 행은
/// 입력 순서를 유지합니다.
pub fn screen(quotes: &[RawQuote], config: &FilterConfig) -> ScreeningResult {
    let mut rows: Vec<ScreenedQuote> = quotes.iter().filter_map(RawQuote::to_complete).collect();
    debug!(input = quotes.len(), complete = rows.len(), "완전성 필터 적용");

    for predicate in config.predicates() {
        rows.retain(|row| predicate.matches(row));
        debug!(stage = predicate.name(), remaining = rows.len(), "필터 단계 적용");
    }

    rows.sort_by(|a, b| {
        a.price_to_sales
            .partial_cmp(&b.price_to_sales)
            .unwrap_or(Ordering::Equal)
    });

    for (rank, row) in rows.iter_mut().enumerate() {
        row.rank = rank;
    }

    ScreeningResult { rows }
}
