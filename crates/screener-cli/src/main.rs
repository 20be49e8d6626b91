//! 주식 스크리너 CLI
//!
//! 사용법:
//!   screener screen --index sp500
//!   screener screen --index ibovespa --max-pe 20 --format csv --output result.csv
//!   screener universe --index ibovespa
//!   screener analyze --market all --format csv --output analise.csv

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use screener_cli::commands::{
    list_universe, run_analyze, run_screen, AnalysisTarget, AnalyzeCommand, FilterOverrides,
    Index, OutputFormat, ScreenCommand,
};
use screener_core::{init_logging, AppConfig};
use screener_data::{ScreeningPipeline, TechnicalAnalyzer, UniverseProvider};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "펀더멘털 지표 기반 주식 스크리너", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 로그 레벨 (설정 파일 값보다 우선)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 필터를 적용해 PSR 오름차순으로 종목 출력
    Screen {
        /// 지수 (sp500, ibovespa)
        #[arg(short, long, default_value = "sp500")]
        index: String,

        /// 최소 유동성 (평균 거래량 × 평균 종가, 3개월)
        #[arg(long)]
        min_liquidity: Option<f64>,

        /// 최대 P/L
        #[arg(long)]
        max_pe: Option<f64>,

        /// 최대 EV/EBITDA
        #[arg(long)]
        max_ev_ebitda: Option<f64>,

        /// 최소 매출총이익률 (%)
        #[arg(long)]
        min_gross_margin: Option<f64>,

        /// 최소 ROA (%)
        #[arg(long)]
        min_roa: Option<f64>,

        /// 12개월 수익률 양수 조건 (true/false)
        #[arg(long)]
        require_positive_return: Option<bool>,

        /// EBIT 양수 조건 (true/false)
        #[arg(long)]
        require_positive_ebit: Option<bool>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (미지정 시 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 지수 구성 종목 출력
    Universe {
        /// 지수 (sp500, ibovespa)
        #[arg(short, long, default_value = "sp500")]
        index: String,
    },

    /// 기술적 지표 점수와 기간 수익률로 종목 순위 출력
    Analyze {
        /// 설정된 시장 이름 (brasil, eua, cripto, indices, all)
        #[arg(short, long, default_value = "brasil")]
        market: String,

        /// 쉼표로 구분한 티커 목록 (지정 시 --market 무시)
        #[arg(short, long)]
        tickers: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (미지정 시 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;

    let mut log_config = config.logging.to_log_config();
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Screen {
            index,
            min_liquidity,
            max_pe,
            max_ev_ebitda,
            min_gross_margin,
            min_roa,
            require_positive_return,
            require_positive_ebit,
            format,
            output,
        } => {
            let command = ScreenCommand {
                index: Index::parse(&index)?,
                overrides: FilterOverrides {
                    min_liquidity,
                    max_pe,
                    max_ev_ebitda,
                    min_gross_margin_pct: min_gross_margin,
                    min_roa_pct: min_roa,
                    require_positive_return,
                    require_positive_ebit,
                },
                format: OutputFormat::parse(&format)?,
                output,
            };

            let pipeline = ScreeningPipeline::yahoo(&config.fetch)?;
            let stats = run_screen(&pipeline, &config, command).await?;
            stats.log_summary("screen");
        }
        Commands::Universe { index } => {
            let index = Index::parse(&index)?;
            let provider =
                UniverseProvider::new(Duration::from_secs(config.fetch.http_timeout_secs))?;
            let count = list_universe(&provider, &config, index).await?;
            info!("총 {}개 종목", count);
        }
        Commands::Analyze {
            market,
            tickers,
            format,
            output,
        } => {
            let target = match tickers {
                Some(list) => AnalysisTarget::from_ticker_list(&list)?,
                None => AnalysisTarget::Market(market),
            };
            let command = AnalyzeCommand {
                target,
                format: OutputFormat::parse(&format)?,
                output,
            };

            let analyzer = TechnicalAnalyzer::yahoo(&config.fetch)?;
            let count = run_analyze(&analyzer, &config, command).await?;
            info!("총 {}개 종목 분석", count);
        }
    }

    Ok(())
}
