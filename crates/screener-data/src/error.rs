//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 종목 단위 수집 오류.
///
/// 수집기 내부에서만 사용되며, 실패한 종목은 결과에서 제외됩니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 외부 Provider 오류
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP 요청 오류
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 데이터 없음
    #[error("No data: {0}")]
    NoData(String),

    /// 종목 수집 타임아웃
    #[error("Timeout after {secs}s: {ticker}")]
    Timeout { ticker: String, secs: u64 },
}

/// 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, FetchError>;

impl From<yahoo_finance_api::YahooError> for FetchError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        FetchError::Provider(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FetchError::Timeout {
            ticker: "AAPL".to_string(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "Timeout after 30s: AAPL");

        let err = FetchError::NoData("quoteSummary result for XYZ".to_string());
        assert!(err.to_string().starts_with("No data"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(FetchError::from(json_err), FetchError::Parse(_)));
    }
}
