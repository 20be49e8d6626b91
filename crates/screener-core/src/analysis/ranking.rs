//! 기술적 스냅샷의 종합 점수 순위.

use serde::{Deserialize, Serialize};

use super::scoring::TechnicalSnapshot;

/// 순위표의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    /// 0부터 시작하는 순위
    pub rank: usize,
    #[serde(flatten)]
    pub snapshot: TechnicalSnapshot,
    /// 정규화된 수익률 (0~1)
    pub return_1m_norm: Option<f64>,
    pub return_3m_norm: Option<f64>,
    pub return_6m_norm: Option<f64>,
    /// 지표 점수와 정규화 수익률의 합. 구성 요소가 하나라도 없으면 없음.
    pub composite: Option<f64>,
    /// 종합 점수가 평균 + 표준편차 이상인 종목
    pub standout: bool,
}

/// 종합 점수 내림차순으로 정렬된 순위표.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub rows: Vec<AnalysisRow>,
    /// 두드러진 종목 판정 기준 (종합 점수가 하나도 없으면 없음)
    pub standout_threshold: Option<f64>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn standouts(&self) -> impl Iterator<Item = &AnalysisRow> {
        self.rows.iter().filter(|row| row.standout)
    }
}

/// 스냅샷 목록을 종합 점수로 순위를 매깁니다.
///
/// 기간 수익률은 존재하는 값들의 최소/최대로 정규화합니다.
/// 모든 값이 같으면 그 열은 모든 행에서 0입니다.
/// 종합 점수가 같은 행은 입력 순서를 유지하고, 종합 점수가 없는 행은 맨 뒤로 갑니다.
pub fn rank_composite(snapshots: Vec<TechnicalSnapshot>) -> AnalysisReport {
    let norm_1m = min_max_normalize(snapshots.iter().map(|s| s.return_1m_pct));
    let norm_3m = min_max_normalize(snapshots.iter().map(|s| s.return_3m_pct));
    let norm_6m = min_max_normalize(snapshots.iter().map(|s| s.return_6m_pct));

    let mut rows: Vec<AnalysisRow> = snapshots
        .into_iter()
        .enumerate()
        .map(|(i, snapshot)| {
            let (n1, n3, n6) = (norm_1m[i], norm_3m[i], norm_6m[i]);
            let composite = composite_score(&snapshot, [n1, n3, n6]);
            AnalysisRow {
                rank: 0,
                snapshot,
                return_1m_norm: n1,
                return_3m_norm: n3,
                return_6m_norm: n6,
                composite,
                standout: false,
            }
        })
        .collect();

    // sort_by는 안정 정렬
    rows.sort_by(|a, b| match (a.composite, b.composite) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let standout_threshold = mean_plus_std(rows.iter().filter_map(|row| row.composite));
    for (rank, row) in rows.iter_mut().enumerate() {
        row.rank = rank;
        row.standout = matches!(
            (row.composite, standout_threshold),
            (Some(score), Some(threshold)) if score >= threshold
        );
    }

    AnalysisReport { rows, standout_threshold }
}

fn composite_score(snapshot: &TechnicalSnapshot, returns: [Option<f64>; 3]) -> Option<f64> {
    let [n1, n3, n6] = returns;
    Some(
        snapshot.sma_score
            + snapshot.rsi_score?
            + snapshot.macd_score
            + snapshot.bollinger_score?
            + n1?
            + n3?
            + n6?,
    )
}

fn min_max_normalize(values: impl Iterator<Item = Option<f64>>) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = values.collect();
    let min = values.iter().flatten().copied().reduce(f64::min);
    let max = values.iter().flatten().copied().reduce(f64::max);

    match (min, max) {
        (Some(min), Some(max)) if max == min => vec![Some(0.0); values.len()],
        (Some(min), Some(max)) => {
            values.into_iter().map(|v| v.map(|v| (v - min) / (max - min))).collect()
        }
        _ => vec![None; values.len()],
    }
}

/// 평균 + 모표준편차.
fn mean_plus_std(scores: impl Iterator<Item = f64>) -> Option<f64> {
    let scores: Vec<f64> = scores.collect();
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    Some(mean + variance.sqrt())
}
