//! 티커 심볼 정의.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 유니버스 내에서 종목을 식별하는 티커 심볼.
///
/// 데이터 제공자에게 그대로 전달되는 불투명한 문자열입니다.
/// (예: AAPL, BRK.B, PETR4.SA)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// 새 티커 심볼을 생성합니다. 앞뒤 공백은 제거됩니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.len() == symbol.len() {
            Self(symbol)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// 문자열 슬라이스로 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 접미사를 붙인 새 심볼을 반환합니다 (예: "PETR4" + ".SA").
    pub fn with_suffix(&self, suffix: &str) -> Self {
        if suffix.is_empty() || self.0.ends_with(suffix) {
            self.clone()
        } else {
            Self(format!("{}{}", self.0, suffix))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TickerSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TickerSymbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_trims_whitespace() {
        let symbol = TickerSymbol::new("  MMM \r");
        assert_eq!(symbol.as_str(), "MMM");
        assert_eq!(symbol.to_string(), "MMM");
    }

    #[test]
    fn test_symbol_with_suffix() {
        let symbol = TickerSymbol::from("PETR4");
        assert_eq!(symbol.with_suffix(".SA").as_str(), "PETR4.SA");
        // 이미 접미사가 있으면 그대로
        assert_eq!(
            TickerSymbol::from("VALE3.SA").with_suffix(".SA").as_str(),
            "VALE3.SA"
        );
        assert_eq!(symbol.with_suffix("").as_str(), "PETR4");
    }
}
