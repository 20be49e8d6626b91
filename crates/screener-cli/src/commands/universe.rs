//! 유니버스 조회 명령.

use anyhow::{Context, Result};
use tracing::info;

use screener_core::AppConfig;
use screener_data::UniverseProvider;

use super::Index;

/// 지수의 유니버스를 해석해 티커를 한 줄에 하나씩 출력합니다.
pub async fn list_universe(
    provider: &UniverseProvider,
    config: &AppConfig,
    index: Index,
) -> Result<usize> {
    let source = index.source(config);
    let universe = provider
        .resolve(&source)
        .await
        .with_context(|| format!("{} 유니버스 조회 실패", index))?;

    if let Some(notice) = &universe.notice {
        eprintln!("오류: {}", notice);
    }

    for ticker in &universe.tickers {
        println!("{}", ticker);
    }
    info!(index = %index, count = universe.len(), "유니버스 조회 완료");

    Ok(universe.len())
}
