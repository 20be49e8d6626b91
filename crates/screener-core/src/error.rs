//! 스크리너의 에러 타입.
//!
//! 컴포넌트 경계를 넘어가는 에러만 정의합니다. 종목별 수집 실패는
//! 데이터 계층에서 흡수되므로 여기에 포함되지 않습니다.

use thiserror::Error;

/// 핵심 스크리너 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenerError {
    /// 원격 지수 구성 페이지를 가져오거나 파싱할 수 없음 (실행 중단)
    #[error("업스트림 사용 불가: {0}")]
    UpstreamUnavailable(String),

    /// 로컬 지수 파일 로드 실패 (복구 가능, 빈 유니버스로 진행)
    #[error("데이터 소스 에러: {0}")]
    DataSource(String),

    /// 잘못된 필터/수집 설정 (사전조건 위반)
    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    /// 설정 파일 로드 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 스크리너 작업을 위한 Result 타입.
pub type ScreenerResult<T> = Result<T, ScreenerError>;

impl ScreenerError {
    /// 실행을 계속할 수 있는 에러인지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScreenerError::DataSource(_))
    }
}

impl From<config::ConfigError> for ScreenerError {
    fn from(err: config::ConfigError) -> Self {
        ScreenerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverable() {
        let local = ScreenerError::DataSource("file not found".to_string());
        assert!(local.is_recoverable());

        let remote = ScreenerError::UpstreamUnavailable("HTTP 503".to_string());
        assert!(!remote.is_recoverable());

        let invalid = ScreenerError::InvalidConfig("max_pe is NaN".to_string());
        assert!(!invalid.is_recoverable());
    }
}
