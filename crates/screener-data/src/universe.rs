//! 유니버스 Provider.
//!
//! 지수 구성 종목을 두 가지 소스에서 가져옵니다:
//! - 원격 목록 페이지: 첫 번째 테이블의 심볼 컬럼
//! - 로컬 구분자 파일: 헤더 앞 메타데이터 줄을 건너뛴 뒤 지정 컬럼
//!
//! 원격 소스 실패는 실행을 중단하는 `UpstreamUnavailable`이며 캐시되지 않습니다.
//! 로컬 파일 실패는 빈 유니버스와 알림 메시지로 대체되며, 그 결과도 캐시됩니다.

use encoding_rs::Encoding;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::MemoCache;
use screener_core::{ScreenerError, ScreenerResult, TickerSymbol, UniverseSource};

/// 해석된 티커 유니버스.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    /// 발견 순서대로 정렬된 고유 티커
    pub tickers: Vec<TickerSymbol>,
    /// 복구 가능한 소스 오류 메시지 (로컬 파일 로드 실패)
    pub notice: Option<String>,
}

impl Universe {
    pub fn new(tickers: Vec<TickerSymbol>) -> Self {
        Self {
            tickers,
            notice: None,
        }
    }

    /// 소스 오류로 인한 빈 유니버스.
    pub fn unavailable(error: &ScreenerError) -> Self {
        Self {
            tickers: Vec::new(),
            notice: Some(error.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// 유니버스 소스를 티커 목록으로 해석하는 Provider.
#[derive(Clone)]
pub struct UniverseProvider {
    client: Client,
    cache: MemoCache<UniverseSource, Universe>,
}

impl UniverseProvider {
    /// HTTP 타임아웃을 지정하여 생성.
    pub fn new(http_timeout: Duration) -> ScreenerResult<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent("Mozilla/5.0 (compatible; screener/0.1)")
            .build()
            .map_err(|e| ScreenerError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self::with_client(client, MemoCache::new()))
    }

    /// 클라이언트와 캐시를 주입하여 생성.
    pub fn with_client(client: Client, cache: MemoCache<UniverseSource, Universe>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &MemoCache<UniverseSource, Universe> {
        &self.cache
    }

    /// 소스를 티커 유니버스로 해석합니다.
    ///
    /// 같은 소스에 대한 반복 호출은 캐시된 결과를 반환합니다.
    pub async fn resolve(&self, source: &UniverseSource) -> ScreenerResult<Universe> {
        self.cache
            .get_or_try_insert_with(source.clone(), || self.load(source))
            .await
    }

    async fn load(&self, source: &UniverseSource) -> ScreenerResult<Universe> {
        let universe = match source {
            UniverseSource::Remote { url, symbol_column } => {
                let tickers = self.fetch_remote(url, symbol_column).await?;
                Universe::new(tickers)
            }
            UniverseSource::LocalFile {
                path,
                delimiter,
                header_skip,
                encoding,
                column_name,
                symbol_suffix,
            } => {
                let loaded = load_local_index(
                    path,
                    *delimiter,
                    *header_skip,
                    encoding,
                    column_name,
                    symbol_suffix.as_deref(),
                )
                .await;

                match loaded {
                    Ok(tickers) => Universe::new(tickers),
                    Err(e) if e.is_recoverable() => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "지수 파일 로드 실패, 빈 유니버스로 진행"
                        );
                        Universe::unavailable(&e)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        info!(source = %source, count = universe.len(), "유니버스 해석 완료");
        Ok(universe)
    }

    async fn fetch_remote(&self, url: &str, column: &str) -> ScreenerResult<Vec<TickerSymbol>> {
        debug!(url, "지수 목록 페이지 요청");

        let unavailable =
            |e: reqwest::Error| ScreenerError::UpstreamUnavailable(format!("{}: {}", url, e));

        let html = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .text()
            .await
            .map_err(unavailable)?;

        parse_listing_table(&html, column)
    }
}

fn selector(css: &str) -> ScreenerResult<Selector> {
    Selector::parse(css)
        .map_err(|_| ScreenerError::UpstreamUnavailable(format!("invalid selector: {}", css)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// 목록 페이지의 첫 번째 테이블에서 심볼 컬럼을 추출합니다.
pub fn parse_listing_table(html: &str, column: &str) -> ScreenerResult<Vec<TickerSymbol>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let tr_selector = selector("tr")?;
    let th_selector = selector("th")?;
    let td_selector = selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| {
            ScreenerError::UpstreamUnavailable("listing page has no table".to_string())
        })?;

    let mut column_index = None;
    let mut symbols = Vec::new();

    for row in table.select(&tr_selector) {
        match column_index {
            None => {
                let headers: Vec<String> = row.select(&th_selector).map(cell_text).collect();
                if headers.is_empty() {
                    continue;
                }
                column_index = Some(headers.iter().position(|h| h == column).ok_or_else(|| {
                    ScreenerError::UpstreamUnavailable(format!(
                        "column '{}' not found in listing table",
                        column
                    ))
                })?);
            }
            Some(index) => {
                if let Some(cell) = row.select(&td_selector).nth(index) {
                    let text = cell_text(cell);
                    if !text.is_empty() {
                        symbols.push(TickerSymbol::new(text));
                    }
                }
            }
        }
    }

    if column_index.is_none() {
        return Err(ScreenerError::UpstreamUnavailable(
            "listing table has no header row".to_string(),
        ));
    }

    Ok(dedup_preserving_order(symbols))
}

/// 로컬 지수 파일을 읽어 티커 목록을 반환합니다.
pub async fn load_local_index(
    path: &Path,
    delimiter: char,
    header_skip: usize,
    encoding: &str,
    column: &str,
    symbol_suffix: Option<&str>,
) -> ScreenerResult<Vec<TickerSymbol>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ScreenerError::DataSource(format!("{}: {}", path.display(), e)))?;

    parse_local_index(&bytes, delimiter, header_skip, encoding, column, symbol_suffix)
}

/// 구분자 텍스트를 디코딩하여 지정 컬럼의 티커를 추출합니다.
pub fn parse_local_index(
    bytes: &[u8],
    delimiter: char,
    header_skip: usize,
    encoding: &str,
    column: &str,
    symbol_suffix: Option<&str>,
) -> ScreenerResult<Vec<TickerSymbol>> {
    if !delimiter.is_ascii() {
        return Err(ScreenerError::DataSource(format!(
            "delimiter '{}' is not ASCII",
            delimiter
        )));
    }

    let encoding = Encoding::for_label(encoding.as_bytes())
        .ok_or_else(|| ScreenerError::DataSource(format!("unknown encoding: {}", encoding)))?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "디코딩 중 잘못된 바이트 대체됨");
    }

    let mut body: &str = &text;
    for _ in 0..header_skip {
        body = match body.find('\n') {
            Some(pos) => &body[pos + 1..],
            None => "",
        };
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let index = reader
        .headers()
        .map_err(|e| ScreenerError::DataSource(format!("header: {}", e)))?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ScreenerError::DataSource(format!("column '{}' not found", column)))?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ScreenerError::DataSource(format!("record: {}", e)))?;
        if let Some(value) = record.get(index).filter(|v| !v.is_empty()) {
            let symbol = TickerSymbol::new(value);
            symbols.push(match symbol_suffix {
                Some(suffix) => symbol.with_suffix(suffix),
                None => symbol,
            });
        }
    }

    Ok(dedup_preserving_order(symbols))
}

fn dedup_preserving_order(symbols: Vec<TickerSymbol>) -> Vec<TickerSymbol> {
    let mut seen = HashSet::with_capacity(symbols.len());
    symbols
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
