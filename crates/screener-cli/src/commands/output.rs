//! 스크리닝 결과 출력.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use tracing::info;

use serde::Serialize;

use screener_core::{AnalysisReport, AnalysisRow, ScreenedQuote, ScreeningResult};

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, csv, json", s)),
        }
    }
}

/// 결과를 형식에 맞게 렌더링합니다.
pub fn render(result: &ScreeningResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => format_table(&result.rows),
        OutputFormat::Csv => format_csv(&result.rows),
        OutputFormat::Json => format_json(&result.rows)?,
    })
}

/// 시장별 기술적 분석 순위표.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSection {
    pub market: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// 시장별 순위표를 형식에 맞게 렌더링합니다.
pub fn render_analysis(sections: &[AnalysisSection], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => sections
            .iter()
            .map(format_analysis_table)
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Csv => format_analysis_csv(sections),
        OutputFormat::Json => {
            serde_json::to_string_pretty(sections).context("Failed to serialize to JSON")?
        }
    })
}

/// 파일 또는 stdout에 출력합니다.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("결과 저장: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// 테이블 형식 출력.
fn format_table(rows: &[ScreenedQuote]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:>4} {:<12} {:>16} {:>18} {:>8} {:>10} {:>8} {:>13} {:>8} {:>17}\n",
        "",
        "Ticker",
        "Liquidez",
        "EBIT",
        "P/L",
        "EV/EBITDA",
        "PSR",
        "Margem Bruta",
        "ROA",
        "Rendimento 12M (%)"
    ));
    output.push_str(&"-".repeat(122));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:>4} {:<12} {:>16.0} {:>18.0} {:>8.2} {:>10.2} {:>8.2} {:>13.2} {:>8.2} {:>17.2}\n",
            row.rank,
            truncate(row.ticker.as_str(), 12),
            row.liquidity,
            row.ebit,
            row.pe_ratio,
            row.ev_ebitda,
            row.price_to_sales,
            row.gross_margin_pct,
            row.roa_pct,
            row.trailing_return_pct
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {}개 종목", rows.len()));

    output
}

/// CSV 형식 출력.
fn format_csv(rows: &[ScreenedQuote]) -> String {
    let mut output = String::new();

    output.push_str(
        "rank,ticker,liquidity,ebit,pe_ratio,ev_ebitda,price_to_sales,gross_margin_pct,roa_pct,trailing_return_pct\n",
    );

    for row in rows {
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            row.rank,
            escape_csv(row.ticker.as_str()),
            row.liquidity,
            row.ebit,
            row.pe_ratio,
            row.ev_ebitda,
            row.price_to_sales,
            row.gross_margin_pct,
            row.roa_pct,
            row.trailing_return_pct
        ));
    }

    output
}

/// JSON 형식 출력.
fn format_json(rows: &[ScreenedQuote]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to serialize to JSON")
}

fn format_analysis_table(section: &AnalysisSection) -> String {
    let mut output = String::new();

    output.push_str(&format!("[{}]\n", section.market));
    output.push_str(&format!(
        "{:>4} {:<12} {:>5} {:>5} {:>5} {:>9} {:>14} {:>14} {:>14} {:>7}\n",
        "",
        "Ticker",
        "SMA",
        "RSI",
        "MACD",
        "BOLLINGER",
        "Rendimento_1M",
        "Rendimento_3M",
        "Rendimento_6M",
        "SOMA"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for row in &section.report.rows {
        let snapshot = &row.snapshot;
        output.push_str(&format!(
            "{:>4} {:<12} {:>5.2} {:>5} {:>5.2} {:>9} {:>14} {:>14} {:>14} {:>7}{}\n",
            row.rank,
            truncate(snapshot.ticker.as_str(), 12),
            snapshot.sma_score,
            cell(snapshot.rsi_score),
            snapshot.macd_score,
            cell(snapshot.bollinger_score),
            cell(snapshot.return_1m_pct),
            cell(snapshot.return_3m_pct),
            cell(snapshot.return_6m_pct),
            cell(row.composite),
            if row.standout { " ★" } else { "" }
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {}개 종목", section.report.rows.len()));
    if let Some(threshold) = section.report.standout_threshold {
        output.push_str(&format!(" (★ SOMA >= {:.2})", threshold));
    }

    output
}

fn format_analysis_csv(sections: &[AnalysisSection]) -> String {
    let mut output = String::new();

    output.push_str("market,rank,ticker,sma,rsi,macd,bollinger,");
    output.push_str("return_1m_pct,return_3m_pct,return_6m_pct,");
    output.push_str("return_1m_norm,return_3m_norm,return_6m_norm,composite,standout\n");

    for section in sections {
        for row in &section.report.rows {
            output.push_str(&analysis_csv_line(&section.market, row));
        }
    }

    output
}

fn analysis_csv_line(market: &str, row: &AnalysisRow) -> String {
    let snapshot = &row.snapshot;
    let optional = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
        escape_csv(market),
        row.rank,
        escape_csv(snapshot.ticker.as_str()),
        snapshot.sma_score,
        optional(snapshot.rsi_score),
        snapshot.macd_score,
        optional(snapshot.bollinger_score),
        optional(snapshot.return_1m_pct),
        optional(snapshot.return_3m_pct),
        optional(snapshot.return_6m_pct),
        optional(row.return_1m_norm),
        optional(row.return_3m_norm),
        optional(row.return_6m_norm),
        optional(row.composite),
        row.standout
    )
}

/// 테이블 셀. 값이 없으면 "-".
fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// 문자열 자르기 (UTF-8 안전).
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{rank_composite, TechnicalSnapshot};

    fn row(rank: usize, ticker: &str, psr: f64) -> ScreenedQuote {
        ScreenedQuote {
            rank,
            ticker: ticker.into(),
            liquidity: 12_500_000.0,
            ebit: 3_000_000_000.0,
            pe_ratio: 10.5,
            ev_ebitda: 7.25,
            price_to_sales: psr,
            gross_margin_pct: 55.0,
            roa_pct: 8.0,
            trailing_return_pct: 12.34,
        }
    }

    fn sample() -> ScreeningResult {
        ScreeningResult {
            rows: vec![row(0, "PETR4.SA", 0.8), row(1, "VALE3.SA", 1.2)],
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("TABLE").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("xlsx").is_err());
    }

    #[test]
    fn test_table_has_columns_and_rows_in_order() {
        let table = render(&sample(), OutputFormat::Table).unwrap();
        let header = table.lines().next().unwrap();
        for column in ["Ticker", "Liquidez", "P/L", "EV/EBITDA", "PSR", "Margem Bruta", "ROA"] {
            assert!(header.contains(column), "missing column {}", column);
        }
        assert!(header.contains("Rendimento 12M (%)"));

        let petr = table.find("PETR4.SA").unwrap();
        let vale = table.find("VALE3.SA").unwrap();
        assert!(petr < vale);
        assert!(table.contains("12.34"));
        assert!(table.ends_with("Total: 2개 종목"));
    }

    #[test]
    fn test_empty_table() {
        let table = render(&ScreeningResult::default(), OutputFormat::Table).unwrap();
        assert!(table.ends_with("Total: 0개 종목"));
    }

    #[test]
    fn test_csv_output() {
        let csv = render(&sample(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,ticker,liquidity"));
        assert!(lines[1].starts_with("0,PETR4.SA,12500000,"));
        assert!(lines[2].starts_with("1,VALE3.SA,"));
    }

    #[test]
    fn test_json_output() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ticker"], "PETR4.SA");
        assert_eq!(rows[1]["price_to_sales"], 1.2);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let path_str = path.to_str().unwrap();

        write_output("rank,ticker\n", Some(path_str)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "rank,ticker\n");
    }

    fn analysis_sections() -> Vec<AnalysisSection> {
        let snapshot = |ticker: &str, rsi: Option<f64>, ret: f64| TechnicalSnapshot {
            ticker: ticker.into(),
            sma_score: 1.0,
            rsi_score: rsi,
            macd_score: 0.0,
            bollinger_score: Some(0.5),
            return_1m_pct: Some(ret),
            return_3m_pct: Some(ret * 2.0),
            return_6m_pct: Some(ret * 3.0),
        };
        let report = rank_composite(vec![
            snapshot("PETR4.SA", Some(0.75), 4.5),
            snapshot("VALE3.SA", None, -2.0),
            snapshot("ITUB4.SA", Some(0.25), 1.0),
        ]);
        vec![AnalysisSection {
            market: "brasil".to_string(),
            report,
        }]
    }

    #[test]
    fn test_analysis_table() {
        let table = render_analysis(&analysis_sections(), OutputFormat::Table).unwrap();
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("[brasil]"));
        let header = lines.next().unwrap();
        for column in ["Ticker", "SMA", "RSI", "MACD", "BOLLINGER", "Rendimento_1M", "SOMA"] {
            assert!(header.contains(column), "missing column {}", column);
        }

        let petr = table.find("PETR4.SA").unwrap();
        let vale = table.find("VALE3.SA").unwrap();
        assert!(petr < vale);
        assert!(table.contains("-2.00"));
        assert!(table.contains("★"));
        assert!(table.contains("Total: 3개 종목"));

        // 종합 점수가 없는 종목은 "-"로 표시되고 맨 뒤에 온다
        let last_row = table.lines().filter(|l| l.contains(".SA")).last().unwrap();
        assert!(last_row.contains("VALE3.SA"));
        assert!(last_row.trim_end().ends_with('-'));
    }

    #[test]
    fn test_analysis_csv_and_json() {
        let sections = analysis_sections();

        let csv = render_analysis(&sections, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("market,rank,ticker,sma,rsi"));
        assert!(lines[1].starts_with("brasil,0,PETR4.SA,1,0.75,0,0.5,4.5,9,13.5,1,1,1,"));
        assert!(lines[1].ends_with(",true"));
        assert!(lines[3].starts_with("brasil,2,VALE3.SA,1,,0,"));

        let json = render_analysis(&sections, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let section = &parsed.as_array().unwrap()[0];
        assert_eq!(section["market"], "brasil");
        assert_eq!(section["rows"][0]["ticker"], "PETR4.SA");
        assert_eq!(section["rows"][2]["composite"], serde_json::Value::Null);
    }

    #[test]
    fn test_truncate_and_escape() {
        assert_eq!(truncate("ABCDEFGHIJKLMNOP", 12), "ABCDEFGHI...");
        assert_eq!(truncate("BRK-B", 12), "BRK-B");
        assert_eq!(escape_csv("A,B"), "\"A,B\"");
        assert_eq!(escape_csv("PLAIN"), "PLAIN");
    }
}
