//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::FilterConfig;
use crate::error::{ScreenerError, ScreenerResult};
use crate::logging::{LogConfig, LogFormat};
use crate::types::{
    TickerSymbol, UniverseSource, DEFAULT_LOCAL_COLUMN, DEFAULT_LOCAL_ENCODING,
    DEFAULT_SYMBOL_COLUMN, SP500_LISTING_URL,
};

/// 환경 변수 오버라이드 접두사.
pub const ENV_PREFIX: &str = "SCREENER";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 유니버스 소스 설정
    #[serde(default)]
    pub universe: UniverseConfig,
    /// 지표 수집 설정
    #[serde(default)]
    pub fetch: FetchConfig,
    /// 기본 필터 임계값
    #[serde(default)]
    pub filter: FilterConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 기술적 분석 대상 시장
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// 지수별 유니버스 소스 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UniverseConfig {
    #[serde(default)]
    pub sp500: RemoteUniverseConfig,
    #[serde(default)]
    pub ibovespa: LocalUniverseConfig,
}

/// 원격 목록 페이지 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteUniverseConfig {
    /// 목록 페이지 URL
    pub url: String,
    /// 심볼 컬럼명
    #[serde(default = "default_symbol_column")]
    pub symbol_column: String,
}

impl Default for RemoteUniverseConfig {
    fn default() -> Self {
        Self {
            url: SP500_LISTING_URL.to_string(),
            symbol_column: default_symbol_column(),
        }
    }
}

impl RemoteUniverseConfig {
    pub fn to_source(&self) -> UniverseSource {
        UniverseSource::Remote {
            url: self.url.clone(),
            symbol_column: self.symbol_column.clone(),
        }
    }
}

/// 로컬 지수 파일 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalUniverseConfig {
    /// 파일 경로
    pub path: PathBuf,
    /// 필드 구분자
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// 헤더 앞에서 건너뛸 줄 수
    #[serde(default = "default_header_skip")]
    pub header_skip: usize,
    /// 텍스트 인코딩 라벨
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// 티커 컬럼명
    #[serde(default = "default_local_column")]
    pub column_name: String,
    /// 티커 접미사 (예: ".SA")
    #[serde(default)]
    pub symbol_suffix: Option<String>,
}

impl Default for LocalUniverseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("AcoesIndices_2024-11-21.csv"),
            delimiter: default_delimiter(),
            header_skip: default_header_skip(),
            encoding: default_encoding(),
            column_name: default_local_column(),
            symbol_suffix: None,
        }
    }
}

impl LocalUniverseConfig {
    /// 빈 접미사는 접미사 없음으로 취급합니다.
    pub fn to_source(&self) -> UniverseSource {
        let source = UniverseSource::LocalFile {
            path: self.path.clone(),
            delimiter: self.delimiter,
            header_skip: self.header_skip,
            encoding: self.encoding.clone(),
            column_name: self.column_name.clone(),
            symbol_suffix: None,
        };

        match self.symbol_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => source.with_symbol_suffix(suffix),
            _ => source,
        }
    }
}

fn default_symbol_column() -> String {
    DEFAULT_SYMBOL_COLUMN.to_string()
}
fn default_delimiter() -> char {
    ';'
}
fn default_header_skip() -> usize {
    2
}
fn default_encoding() -> String {
    DEFAULT_LOCAL_ENCODING.to_string()
}
fn default_local_column() -> String {
    DEFAULT_LOCAL_COLUMN.to_string()
}

/// 지표 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// 동시 수집 종목 수
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// 종목당 전체 수집 타임아웃 (초)
    #[serde(default = "default_ticker_timeout")]
    pub ticker_timeout_secs: u64,
    /// 개별 HTTP 요청 타임아웃 (초)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            ticker_timeout_secs: default_ticker_timeout(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}
fn default_ticker_timeout() -> u64 {
    30
}
fn default_http_timeout() -> u64 {
    20
}

/// 시장별 기술적 분석 대상 티커 목록.
///
/// 설정 파일의 `[analysis.markets]` 항목이 기본 목록을 통째로 대체합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub markets: BTreeMap<String, Vec<String>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let markets = [
            ("brasil", BRAZIL_TICKERS),
            ("eua", &["AAPL", "MSFT", "GOOG", "AMZN"][..]),
            ("cripto", &["BTC-USD", "ETH-USD"][..]),
            ("indices", &["^BVSP", "^GSPC", "BTC-USD"][..]),
        ]
        .into_iter()
        .map(|(name, tickers)| {
            let tickers: Vec<String> = tickers.iter().map(|t| t.to_string()).collect();
            (name.to_string(), tickers)
        })
        .collect();
        Self { markets }
    }
}

impl AnalysisConfig {
    /// 시장 이름(대소문자 무시)으로 티커 목록을 찾습니다.
    pub fn tickers(&self, market: &str) -> Option<Vec<TickerSymbol>> {
        self.markets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(market))
            .map(|(_, tickers)| tickers.iter().map(|t| TickerSymbol::new(t.trim())).collect())
    }

    pub fn market_names(&self) -> impl Iterator<Item = &str> {
        self.markets.keys().map(String::as_str)
    }
}

const BRAZIL_TICKERS: &[&str] = &[
    "LOGN3.SA", "RAIL3.SA", "PTBL3.SA", "ALPK3.SA", "ANIM3.SA", "AURA33.SA", "AESB3.SA",
    "SIMH3.SA", "ZAMP3.SA", "CSNA3.SA", "CVCB3.SA", "VVEO3.SA", "QUAL3.SA", "LIGT3.SA",
    "COGN3.SA", "MOVI3.SA", "CBAV3.SA", "MATD3.SA", "ALPA4.SA", "AERI3.SA", "DASA3.SA",
    "NTCO3.SA", "BRKM5.SA", "PCAR3.SA", "AZUL4.SA", "GOLL4.SA", "BHIA3.SA", "SYNE3.SA",
    "VBBR3.SA", "ETER3.SA", "POSI3.SA", "EUCA4.SA", "TPIS3.SA", "BRAP3.SA", "BRAP4.SA",
    "PINE4.SA", "BBAS3.SA", "CMIG4.SA", "HBOR3.SA", "HBRE3.SA", "BRSR6.SA", "TRPL4.SA",
    "JHSF3.SA", "SAPR3.SA", "BMGB4.SA", "SAPR4.SA", "WIZC3.SA", "ALLD3.SA", "SAPR11.SA",
    "TECN3.SA", "ABCB4.SA", "MDNE3.SA", "CMIG3.SA", "ECOR3.SA", "VALE3.SA", "DEXP3.SA",
    "LAVV3.SA", "VLID3.SA", "PETR4.SA", "CAML3.SA", "BMEB4.SA", "CYRE3.SA", "SBFG3.SA",
    "PETR3.SA", "NEOE3.SA", "LEVE3.SA", "GOAU3.SA", "GOAU4.SA", "CSMG3.SA", "CPFE3.SA",
    "COCE5.SA", "SOJA3.SA", "POMO3.SA", "ROMI3.SA", "SBSP3.SA", "CSUD3.SA", "PRIO3.SA",
    "TRIS3.SA", "CMIN3.SA", "SMTO3.SA", "GRND3.SA", "KEPL3.SA", "SHUL4.SA", "EGIE3.SA",
    "SANB3.SA", "ENGI11.SA", "PLPL3.SA", "ITUB3.SA", "UGPA3.SA", "JSLG3.SA", "VULC3.SA",
    "BBSE3.SA", "PFRM3.SA", "FIQE3.SA", "ELET3.SA", "BRBI11.SA", "BBDC3.SA", "GGBR3.SA",
    "SANB11.SA", "TAEE3.SA", "TAEE4.SA", "CSED3.SA", "TAEE11.SA", "HYPE3.SA", "AGRO3.SA",
    "CPLE3.SA", "MILS3.SA", "RECV3.SA", "USIM3.SA", "GGBR4.SA", "USIM5.SA", "BOBR4.SA",
    "SANB4.SA", "TTEN3.SA", "TGMA3.SA", "ITUB4.SA", "VAMO3.SA", "MELK3.SA", "CSAN3.SA",
    "ELET6.SA", "CPLE6.SA", "BBDC4.SA", "ALUP11.SA", "DIRR3.SA", "INTB3.SA", "MTRE3.SA",
    "MDIA3.SA", "POMO4.SA", "MYPK3.SA", "TUPY3.SA", "PSSA3.SA", "LJQQ3.SA",
];

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// 로깅 초기화용 설정으로 변환합니다. 알 수 없는 형식은 pretty로 처리합니다.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig::new(self.level.clone())
            .with_format(self.format.parse::<LogFormat>().unwrap_or_default())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ScreenerResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> ScreenerResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정 값의 사전조건을 검사합니다.
    pub fn validate(&self) -> ScreenerResult<()> {
        if self.fetch.concurrency == 0 {
            return Err(ScreenerError::InvalidConfig(
                "fetch.concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch.ticker_timeout_secs == 0 || self.fetch.http_timeout_secs == 0 {
            return Err(ScreenerError::InvalidConfig(
                "fetch timeouts must be positive".to_string(),
            ));
        }
        if let Some((market, _)) = self.analysis.markets.iter().find(|(_, t)| t.is_empty()) {
            return Err(ScreenerError::InvalidConfig(format!(
                "analysis market '{market}' has no tickers"
            )));
        }
        if !self.universe.ibovespa.delimiter.is_ascii() {
            return Err(ScreenerError::InvalidConfig(format!(
                "delimiter '{}' is not ASCII",
                self.universe.ibovespa.delimiter
            )));
        }
        self.filter.validate()
    }
}
