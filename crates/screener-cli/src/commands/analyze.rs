//! 기술적 분석 명령.

use anyhow::{anyhow, Result};
use tracing::info;

use screener_core::{AppConfig, TickerSymbol};
use screener_data::{FinancialDataProvider, TechnicalAnalyzer};

use super::output::{render_analysis, write_output, AnalysisSection, OutputFormat};

/// 분석 대상.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTarget {
    /// 설정된 시장 이름 (`all`이면 모든 시장)
    Market(String),
    /// 직접 지정한 티커 목록
    Tickers(Vec<TickerSymbol>),
}

impl AnalysisTarget {
    /// 쉼표로 구분된 티커 목록. 빈 항목은 무시합니다.
    pub fn from_ticker_list(list: &str) -> Result<Self> {
        let tickers: Vec<TickerSymbol> = list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(TickerSymbol::from)
            .collect();
        if tickers.is_empty() {
            return Err(anyhow!("티커 목록이 비어 있습니다"));
        }
        Ok(Self::Tickers(tickers))
    }

    /// (시장 이름, 티커 목록) 묶음으로 해석합니다.
    pub fn resolve(&self, config: &AppConfig) -> Result<Vec<(String, Vec<TickerSymbol>)>> {
        let analysis = &config.analysis;
        match self {
            Self::Tickers(tickers) => Ok(vec![("custom".to_string(), tickers.clone())]),
            Self::Market(market) if market.eq_ignore_ascii_case("all") => Ok(analysis
                .markets
                .iter()
                .map(|(name, tickers)| {
                    (name.clone(), tickers.iter().map(|t| TickerSymbol::new(t.trim())).collect())
                })
                .collect()),
            Self::Market(market) => {
                let tickers = analysis.tickers(market).ok_or_else(|| {
                    let known: Vec<&str> = analysis.market_names().collect();
                    anyhow!("Invalid market: {}. Use: {}, all", market, known.join(", "))
                })?;
                Ok(vec![(market.to_lowercase(), tickers)])
            }
        }
    }
}

/// 분석 명령 설정.
#[derive(Debug)]
pub struct AnalyzeCommand {
    pub target: AnalysisTarget,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 시장별로 기술적 분석을 실행하고 순위표를 출력합니다.
///
/// 출력된 종목 수의 합을 반환합니다.
pub async fn run_analyze<P>(
    analyzer: &TechnicalAnalyzer<P>,
    config: &AppConfig,
    command: AnalyzeCommand,
) -> Result<usize>
where
    P: FinancialDataProvider + ?Sized,
{
    let markets = command.target.resolve(config)?;
    let mut sections = Vec::with_capacity(markets.len());

    for (market, tickers) in markets {
        info!(market = %market, tickers = tickers.len(), "기술적 분석 시작");
        eprintln!("{} 시장 분석 중...", market);
        let report = analyzer.run(&tickers).await;
        sections.push(AnalysisSection { market, report });
    }

    let content = render_analysis(&sections, command.format)?;
    write_output(&content, command.output.as_deref())?;

    Ok(sections.iter().map(|section| section.report.rows.len()).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_list_parsing() {
        let target = AnalysisTarget::from_ticker_list(" AAPL, ,PETR4.SA,").unwrap();
        assert_eq!(
            target,
            AnalysisTarget::Tickers(vec!["AAPL".into(), "PETR4.SA".into()])
        );
        assert!(AnalysisTarget::from_ticker_list(" , ").is_err());
    }

    #[test]
    fn test_resolve_markets() {
        let config = AppConfig::default();

        let single = AnalysisTarget::Market("EUA".to_string()).resolve(&config).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].0, "eua");
        assert_eq!(single[0].1.len(), 4);

        let all = AnalysisTarget::Market("all".to_string()).resolve(&config).unwrap();
        let names: Vec<&str> = all.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["brasil", "cripto", "eua", "indices"]);

        let err = AnalysisTarget::Market("asia".to_string()).resolve(&config).unwrap_err();
        assert!(err.to_string().contains("brasil"));
    }
}
