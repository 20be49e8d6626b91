//! 스크리닝 실행 명령.

use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use screener_core::{screen, AppConfig, FilterConfig};
use screener_data::{FinancialDataProvider, ScreenOutcome, ScreeningPipeline};

use super::output::{render, write_output, OutputFormat};
use super::Index;
use crate::stats::ScreenStats;

/// 필터 임계값 오버라이드. 지정하지 않은 값은 설정 파일 값을 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct FilterOverrides {
    pub min_liquidity: Option<f64>,
    pub max_pe: Option<f64>,
    pub max_ev_ebitda: Option<f64>,
    pub min_gross_margin_pct: Option<f64>,
    pub min_roa_pct: Option<f64>,
    pub require_positive_return: Option<bool>,
    pub require_positive_ebit: Option<bool>,
}

impl FilterOverrides {
    /// 기본 필터 설정에 오버라이드를 적용합니다.
    pub fn apply(&self, base: &FilterConfig) -> FilterConfig {
        FilterConfig {
            min_liquidity: self.min_liquidity.unwrap_or(base.min_liquidity),
            max_pe: self.max_pe.unwrap_or(base.max_pe),
            max_ev_ebitda: self.max_ev_ebitda.unwrap_or(base.max_ev_ebitda),
            min_gross_margin_pct: self
                .min_gross_margin_pct
                .unwrap_or(base.min_gross_margin_pct),
            min_roa_pct: self.min_roa_pct.unwrap_or(base.min_roa_pct),
            require_positive_return: self
                .require_positive_return
                .unwrap_or(base.require_positive_return),
            require_positive_ebit: self
                .require_positive_ebit
                .unwrap_or(base.require_positive_ebit),
        }
    }
}

/// 스크리닝 명령 설정.
#[derive(Debug)]
pub struct ScreenCommand {
    pub index: Index,
    pub overrides: FilterOverrides,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 스크리닝을 실행하고 결과를 출력합니다.
///
/// 원격 유니버스를 가져올 수 없으면 에러로 중단합니다. 로컬 지수 파일
/// 오류는 에러 줄로 표시한 뒤 빈 결과를 출력합니다.
pub async fn run_screen<P>(
    pipeline: &ScreeningPipeline<P>,
    config: &AppConfig,
    command: ScreenCommand,
) -> Result<ScreenStats>
where
    P: FinancialDataProvider + ?Sized,
{
    let started = Instant::now();
    let filter = command.overrides.apply(&config.filter);
    filter.validate()?;
    let source = command.index.source(config);

    info!(index = %command.index, source = %source, "데이터 수집 중...");
    eprintln!("{} 데이터 수집 중...", command.index);
    let collected = pipeline
        .collect(&source)
        .await
        .with_context(|| format!("{} 데이터 수집 실패", command.index))?;

    eprintln!("필터 적용 중...");
    let outcome = ScreenOutcome {
        result: screen(&collected.quotes, &filter),
        notices: collected.notices,
        universe_size: collected.universe_size,
    };

    for notice in &outcome.notices {
        eprintln!("오류: {}", notice);
    }

    let content = render(&outcome.result, command.format)?;
    write_output(&content, command.output.as_deref())?;

    Ok(ScreenStats::from_outcome(&outcome, started.elapsed()))
}
