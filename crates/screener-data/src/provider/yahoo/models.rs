//! Yahoo Finance quoteSummary 응답 모델.
//!
//! 수치 필드는 `{"raw": 123.45, "fmt": "123.45"}` 형태의 객체로 제공되며,
//! 값이 없으면 빈 객체 `{}`가 오기도 합니다.

use serde::Deserialize;

use crate::provider::FundamentalSnapshot;

/// quoteSummary에 요청할 모듈 목록.
pub const QUOTE_SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub summary_detail: Option<SummaryDetail>,
    pub default_key_statistics: Option<DefaultKeyStatistics>,
    pub financial_data: Option<FinancialData>,
}

/// `{raw, fmt}` 수치 객체.
#[derive(Debug, Default, Deserialize)]
pub struct RawNumber {
    #[serde(default)]
    pub raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawNumber>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    pub price_to_sales_trailing_12_months: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultKeyStatistics {
    pub enterprise_to_ebitda: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    pub ebitda: Option<RawNumber>,
    pub gross_margins: Option<RawNumber>,
    pub return_on_assets: Option<RawNumber>,
}

fn raw(value: &Option<RawNumber>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}

impl From<&QuoteSummaryResult> for FundamentalSnapshot {
    fn from(result: &QuoteSummaryResult) -> Self {
        let mut snapshot = FundamentalSnapshot::default();

        if let Some(detail) = &result.summary_detail {
            snapshot.trailing_pe = raw(&detail.trailing_pe);
            snapshot.price_to_sales_trailing_12_months =
                raw(&detail.price_to_sales_trailing_12_months);
        }
        if let Some(stats) = &result.default_key_statistics {
            snapshot.enterprise_to_ebitda = raw(&stats.enterprise_to_ebitda);
        }
        if let Some(financial) = &result.financial_data {
            snapshot.ebitda = raw(&financial.ebitda);
            snapshot.gross_margins = raw(&financial.gross_margins);
            snapshot.return_on_assets = raw(&financial.return_on_assets);
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "trailingPE": {"raw": 12.5, "fmt": "12.50"},
                        "priceToSalesTrailing12Months": {"raw": 1.8, "fmt": "1.80"}
                    },
                    "defaultKeyStatistics": {
                        "enterpriseToEbitda": {"raw": 7.9, "fmt": "7.90"}
                    },
                    "financialData": {
                        "ebitda": {"raw": 1500000000, "fmt": "1.5B", "longFmt": "1,500,000,000"},
                        "grossMargins": {"raw": 0.45, "fmt": "45.00%"},
                        "returnOnAssets": {"raw": 0.081, "fmt": "8.10%"}
                    }
                }],
                "error": null
            }
        }"#;

        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = &response.quote_summary.result.unwrap()[0];
        let snapshot = FundamentalSnapshot::from(result);

        assert_eq!(snapshot.trailing_pe, Some(12.5));
        assert_eq!(snapshot.price_to_sales_trailing_12_months, Some(1.8));
        assert_eq!(snapshot.enterprise_to_ebitda, Some(7.9));
        assert_eq!(snapshot.ebitda, Some(1_500_000_000.0));
        assert_eq!(snapshot.gross_margins, Some(0.45));
        assert_eq!(snapshot.return_on_assets, Some(0.081));
    }

    #[test]
    fn test_empty_objects_and_missing_modules() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {"trailingPE": {}},
                    "financialData": {"grossMargins": {"raw": null}}
                }],
                "error": null
            }
        }"#;

        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = &response.quote_summary.result.unwrap()[0];
        let snapshot = FundamentalSnapshot::from(result);

        assert_eq!(snapshot, FundamentalSnapshot::default());
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: XYZ"}
            }
        }"#;

        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        assert!(response.quote_summary.result.is_none());
        assert_eq!(
            response.quote_summary.error.unwrap().code.as_deref(),
            Some("Not Found")
        );
    }
}
