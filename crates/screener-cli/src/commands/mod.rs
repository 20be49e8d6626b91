//! CLI 명령어 모듈.

pub mod analyze;
pub mod output;
pub mod screen;
pub mod universe;

use anyhow::Result;
use screener_core::{AppConfig, UniverseSource};

pub use analyze::{run_analyze, AnalysisTarget, AnalyzeCommand};
pub use output::OutputFormat;
pub use screen::{run_screen, FilterOverrides, ScreenCommand};
pub use universe::list_universe;

/// 스크리닝 대상 지수.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    /// S&P 500 (원격 목록 페이지)
    Sp500,
    /// Ibovespa (로컬 지수 파일)
    Ibovespa,
}

impl Index {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['&', '-', ' '], "").as_str() {
            "sp500" => Ok(Self::Sp500),
            "ibovespa" | "ibov" => Ok(Self::Ibovespa),
            _ => Err(anyhow::anyhow!("Invalid index: {}. Use: sp500, ibovespa", s)),
        }
    }

    /// 설정에서 지수의 유니버스 소스를 가져옵니다.
    pub fn source(&self, config: &AppConfig) -> UniverseSource {
        match self {
            Self::Sp500 => config.universe.sp500.to_source(),
            Self::Ibovespa => config.universe.ibovespa.to_source(),
        }
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sp500 => write!(f, "S&P 500"),
            Self::Ibovespa => write!(f, "Ibovespa"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_parse() {
        assert_eq!(Index::parse("sp500").unwrap(), Index::Sp500);
        assert_eq!(Index::parse("S&P 500").unwrap(), Index::Sp500);
        assert_eq!(Index::parse("IBOVESPA").unwrap(), Index::Ibovespa);
        assert!(Index::parse("nasdaq").is_err());
    }

    #[test]
    fn test_index_source() {
        let config = AppConfig::default();
        assert!(Index::Sp500.source(&config).is_remote());
        assert!(!Index::Ibovespa.source(&config).is_remote());
    }
}
