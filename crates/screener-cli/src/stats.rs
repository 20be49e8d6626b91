//! 스크리닝 실행 통계.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use screener_data::ScreenOutcome;

/// 스크리닝 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenStats {
    /// 유니버스 종목 수
    pub universe: usize,
    /// 필터를 통과한 종목 수
    pub kept: usize,
    /// 복구 가능한 소스 오류 수
    pub notices: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScreenStats {
    /// 실행 결과로부터 통계 생성
    pub fn from_outcome(outcome: &ScreenOutcome, elapsed: Duration) -> Self {
        Self {
            universe: outcome.universe_size,
            kept: outcome.result.len(),
            notices: outcome.notices.len(),
            elapsed,
        }
    }

    /// 통과 비율 (%)
    pub fn pass_rate(&self) -> f64 {
        if self.universe == 0 {
            0.0
        } else {
            (self.kept as f64 / self.universe as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            universe = self.universe,
            kept = self.kept,
            notices = self.notices,
            pass_rate = format!("{:.1}%", self.pass_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스크리닝 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{ScreenedQuote, ScreeningResult};

    fn row(ticker: &str) -> ScreenedQuote {
        ScreenedQuote {
            rank: 0,
            ticker: ticker.into(),
            liquidity: 1.0,
            ebit: 1.0,
            pe_ratio: 1.0,
            ev_ebitda: 1.0,
            price_to_sales: 1.0,
            gross_margin_pct: 50.0,
            roa_pct: 10.0,
            trailing_return_pct: 1.0,
        }
    }

    #[test]
    fn test_from_outcome() {
        let outcome = ScreenOutcome {
            result: ScreeningResult {
                rows: vec![row("A"), row("B")],
            },
            notices: vec!["missing file".to_string()],
            universe_size: 40,
        };

        let stats = ScreenStats::from_outcome(&outcome, Duration::from_secs(3));
        assert_eq!(stats.universe, 40);
        assert_eq!(stats.kept, 2);
        assert_eq!(stats.notices, 1);
        assert!((stats.pass_rate() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_has_no_fetch_counts() {
        let json = serde_json::to_value(ScreenStats::default()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert!(!keys.iter().any(|k| k.contains("fetch")));
        assert_eq!(ScreenStats::default().pass_rate(), 0.0);
    }
}
