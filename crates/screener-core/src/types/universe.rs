//! 유니버스 소스 정의.
//!
//! 지수 구성 종목을 어디서 가져올지 나타냅니다:
//! - `Remote` - 원격 목록 페이지의 첫 번째 테이블
//! - `LocalFile` - 로컬 구분자 텍스트 파일

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// S&P 500 구성 종목 목록 페이지.
pub const SP500_LISTING_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

/// 원격 목록 테이블의 기본 심볼 컬럼명.
pub const DEFAULT_SYMBOL_COLUMN: &str = "Symbol";

/// 로컬 지수 파일의 기본 티커 컬럼명.
pub const DEFAULT_LOCAL_COLUMN: &str = "Empresa";

/// 로컬 지수 파일의 기본 텍스트 인코딩.
pub const DEFAULT_LOCAL_ENCODING: &str = "ISO-8859-1";

/// 티커 유니버스 소스.
///
/// 한 번 선택되면 변경되지 않으며, 메모 캐시의 키로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UniverseSource {
    /// HTTP로 가져오는 목록 페이지
    Remote {
        /// 목록 페이지 URL
        url: String,
        /// 첫 번째 테이블에서 읽을 심볼 컬럼
        symbol_column: String,
    },
    /// 로컬 구분자 텍스트 파일
    LocalFile {
        /// 파일 경로
        path: PathBuf,
        /// 필드 구분자 (ASCII)
        delimiter: char,
        /// 헤더 이전에 건너뛸 줄 수
        header_skip: usize,
        /// 텍스트 인코딩 라벨 (예: "ISO-8859-1")
        encoding: String,
        /// 티커가 들어있는 컬럼명
        column_name: String,
        /// 모든 티커에 붙일 접미사 (예: ".SA")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol_suffix: Option<String>,
    },
}

impl UniverseSource {
    /// 기본 심볼 컬럼을 사용하는 원격 소스를 생성합니다.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            symbol_column: DEFAULT_SYMBOL_COLUMN.to_string(),
        }
    }

    /// S&P 500 원격 소스.
    pub fn sp500() -> Self {
        Self::remote(SP500_LISTING_URL)
    }

    /// 로컬 지수 파일 소스를 생성합니다.
    ///
    /// 세미콜론 구분, 헤더 앞 2줄 건너뜀, ISO-8859-1, "Empresa" 컬럼이 기본값입니다.
    pub fn local_file(path: impl Into<PathBuf>) -> Self {
        Self::LocalFile {
            path: path.into(),
            delimiter: ';',
            header_skip: 2,
            encoding: DEFAULT_LOCAL_ENCODING.to_string(),
            column_name: DEFAULT_LOCAL_COLUMN.to_string(),
            symbol_suffix: None,
        }
    }

    /// 로컬 파일 소스에 티커 접미사를 설정합니다. 원격 소스는 그대로 반환합니다.
    pub fn with_symbol_suffix(self, suffix: impl Into<String>) -> Self {
        match self {
            Self::LocalFile {
                path,
                delimiter,
                header_skip,
                encoding,
                column_name,
                ..
            } => Self::LocalFile {
                path,
                delimiter,
                header_skip,
                encoding,
                column_name,
                symbol_suffix: Some(suffix.into()),
            },
            remote => remote,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for UniverseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url, .. } => write!(f, "remote:{}", url),
            Self::LocalFile { path, .. } => write!(f, "file:{}", path.display()),
        }
    }
}
