use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use crate::data_source::{FundamentalsSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{ClosePoint, Fundamentals, HistoryRange, PriceHistory, Symbol, UtcDateTime};

const REFERER: &str = "https://finance.yahoo.com/";
const COOKIE_ENDPOINT: &str = "https://fc.yahoo.com";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_SUMMARY_ENDPOINT: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,cashflowStatementHistory";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb handshake
// ============================================================================

/// Caches the crumb token Yahoo requires next to its session cookie.
///
/// The cookie itself lives in the transport's cookie jar:
/// 1. visiting fc.yahoo.com sets the session cookie
/// 2. /v1/test/getcrumb returns the crumb bound to that cookie
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<(String, Instant)>>,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl YahooAuthManager {
    fn cached(&self) -> Option<String> {
        let guard = self.crumb.lock().ok()?;
        guard
            .as_ref()
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(crumb, _)| crumb.clone())
    }

    fn store(&self, crumb: &str) {
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = Some((crumb.to_owned(), Instant::now()));
        }
    }

    /// Current crumb, running the handshake when none is cached.
    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached() {
            return Ok(crumb);
        }

        let cookie_request = HttpRequest::get(COOKIE_ENDPOINT)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        // fc.yahoo.com answers 404 while still setting the cookie; only a
        // transport failure matters here.
        http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch yahoo cookie: {}", e.message()))
        })?;

        for endpoint in CRUMB_ENDPOINTS {
            let request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_timeout_ms(timeout_ms);

            let response = match http_client.execute(request).await {
                Ok(response) if response.is_success() => response,
                Ok(response) => {
                    tracing::debug!(endpoint, status = response.status, "crumb endpoint refused");
                    continue;
                }
                Err(error) => {
                    tracing::debug!(endpoint, error = %error, "crumb endpoint unreachable");
                    continue;
                }
            };

            let body = response.body.trim();
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited while fetching crumb",
                ));
            }
            if body.contains("<html") || body.contains("<!DOCTYPE") {
                continue;
            }
            if !body.is_empty() && body.len() < 100 && !body.contains(char::is_whitespace) {
                self.store(body);
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance implementation of [`FundamentalsSource`].
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// One authenticated GET, with status codes mapped to source errors.
    async fn get_body(&self, base_url: String, symbol: &Symbol) -> Result<String, SourceError> {
        let crumb = self
            .auth
            .crumb(self.http_client.as_ref(), self.timeout_ms)
            .await?;
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{base_url}{separator}crumb={}",
            urlencoding::encode(&crumb)
        );

        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        match response.status {
            status if (200..300).contains(&status) => Ok(response.body),
            404 => Err(SourceError::not_found(format!(
                "yahoo has no data for symbol '{symbol}'"
            ))),
            429 => Err(SourceError::rate_limited("yahoo returned status 429")),
            status => Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            ))),
        }
    }
}

impl FundamentalsSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fundamentals<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Fundamentals> {
        Box::pin(async move {
            let url = format!(
                "{QUOTE_SUMMARY_ENDPOINT}/{}?modules={SUMMARY_MODULES}",
                urlencoding::encode(symbol.as_str())
            );
            let body = self.get_body(url, symbol).await?;
            parse_quote_summary(symbol, &body, UtcDateTime::now())
        })
    }

    fn price_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: HistoryRange,
    ) -> SourceFuture<'a, PriceHistory> {
        Box::pin(async move {
            let url = format!(
                "{CHART_ENDPOINT}/{}?range={}&interval=1d",
                urlencoding::encode(symbol.as_str()),
                range.as_str()
            );
            let body = self.get_body(url, symbol).await?;
            parse_chart(symbol, range, &body)
        })
    }
}

/// Decode a quoteSummary payload into a snapshot.
///
/// Fields are read independently; anything absent or non-numeric stays
/// unknown.
pub fn parse_quote_summary(
    symbol: &Symbol,
    body: &str,
    as_of: UtcDateTime,
) -> Result<Fundamentals, SourceError> {
    let response: YahooQuoteSummaryResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::malformed(format!("failed to parse yahoo quote summary: {e}"))
    })?;

    if let Some(error) = response.quote_summary.error {
        return Err(error.into_source_error(symbol));
    }

    let result = response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::not_found(format!("no quote summary for '{symbol}'")))?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    // Most recent statement first.
    let capital_expenditures = result
        .cashflow_statement_history
        .and_then(|history| history.cashflow_statements.into_iter().next())
        .and_then(|statement| raw(&statement.capital_expenditures));

    let name = price
        .short_name
        .or(price.long_name)
        .unwrap_or_default();

    Ok(Fundamentals::new(symbol.clone(), name, as_of)
        .with_pe_ratio(raw(&detail.trailing_pe))
        .with_price_to_book(raw(&stats.price_to_book))
        .with_return_on_equity(raw(&financial.return_on_equity))
        .with_debt_to_equity(raw(&financial.debt_to_equity))
        .with_operating_cash_flow(raw(&financial.operating_cashflow))
        .with_capital_expenditures(capital_expenditures)
        .with_dividend_rate(raw(&detail.dividend_rate))
        .with_trailing_eps(raw(&stats.trailing_eps))
        .with_book_value(raw(&stats.book_value))
        .with_market_cap(raw(&price.market_cap).or_else(|| raw(&detail.market_cap))))
}

/// Decode a chart payload into daily closes. Days without a close are skipped.
pub fn parse_chart(
    symbol: &Symbol,
    range: HistoryRange,
    body: &str,
) -> Result<PriceHistory, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(error.into_source_error(symbol));
    }

    let Some(result) = response.chart.result.unwrap_or_default().into_iter().next() else {
        return Ok(PriceHistory::new(symbol.clone(), range, Vec::new()));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else { continue };
        let ts = UtcDateTime::from_unix_timestamp(ts)
            .map_err(|e| SourceError::malformed(format!("invalid chart timestamp: {e}")))?;
        if let Ok(point) = ClosePoint::new(ts, close) {
            points.push(point);
        }
    }

    Ok(PriceHistory::new(symbol.clone(), range, points))
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw.as_ref()).and_then(Value::as_f64)
}

// ============================================================================
// Yahoo API Response Structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn into_source_error(self, symbol: &Symbol) -> SourceError {
        let code = self.code.unwrap_or_default();
        let description = self.description.unwrap_or_else(|| code.clone());
        if code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(format!("yahoo has no data for '{symbol}': {description}"))
        } else {
            SourceError::unavailable(format!("yahoo API error for '{symbol}': {description}"))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteSummaryResult {
    #[serde(default)]
    price: Option<YahooPriceData>,
    #[serde(default)]
    summary_detail: Option<YahooSummaryDetailData>,
    #[serde(default)]
    default_key_statistics: Option<YahooDefaultKeyStatisticsData>,
    #[serde(default)]
    financial_data: Option<YahooFinancialData>,
    #[serde(default)]
    cashflow_statement_history: Option<YahooCashflowHistory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooPriceData {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    market_cap: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryDetailData {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(default)]
    dividend_rate: Option<YahooRawValue>,
    #[serde(default)]
    market_cap: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooDefaultKeyStatisticsData {
    #[serde(default)]
    price_to_book: Option<YahooRawValue>,
    #[serde(default)]
    trailing_eps: Option<YahooRawValue>,
    #[serde(default)]
    book_value: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooFinancialData {
    #[serde(default)]
    return_on_equity: Option<YahooRawValue>,
    #[serde(default)]
    debt_to_equity: Option<YahooRawValue>,
    #[serde(default)]
    operating_cashflow: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooCashflowHistory {
    #[serde(default)]
    cashflow_statements: Vec<YahooCashflowStatement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooCashflowStatement {
    #[serde(default)]
    capital_expenditures: Option<YahooRawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`, sends `{}` when a
/// value is missing and occasionally a string such as `"Infinity"` in `raw`.
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{CannedHttpClient, HttpError, HttpResponse};

    fn pru() -> Symbol {
        Symbol::parse("PRU").expect("valid symbol")
    }

    fn as_of() -> UtcDateTime {
        UtcDateTime::parse("2024-06-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn quote_summary_fields_are_read_independently() {
        let body = r#"{"quoteSummary":{"result":[{
            "price":{"shortName":"Prudential Financial, Inc.","marketCap":{"raw":41000000000}},
            "summaryDetail":{"trailingPE":{"raw":"Infinity","fmt":"∞"},"dividendRate":{"raw":5.2}},
            "defaultKeyStatistics":{"priceToBook":{},"trailingEps":{"raw":9.5},"bookValue":{"raw":78.1}},
            "financialData":{"operatingCashflow":{"raw":6500000000}}
        }],"error":null}}"#;

        let fundamentals = parse_quote_summary(&pru(), body, as_of()).expect("parses");
        assert_eq!(fundamentals.name(), "Prudential Financial, Inc.");
        assert_eq!(fundamentals.pe_ratio(), None);
        assert_eq!(fundamentals.price_to_book(), None);
        assert_eq!(fundamentals.dividend_rate(), Some(5.2));
        assert_eq!(fundamentals.trailing_eps(), Some(9.5));
        assert_eq!(fundamentals.book_value(), Some(78.1));
        assert_eq!(fundamentals.market_cap(), Some(41_000_000_000.0));
        assert_eq!(fundamentals.operating_cash_flow(), Some(6_500_000_000.0));
        assert_eq!(fundamentals.capital_expenditures(), None);
        assert_eq!(fundamentals.unlevered_free_cash_flow(), None);
    }

    #[test]
    fn capex_comes_from_latest_cashflow_statement() {
        let body = r#"{"quoteSummary":{"result":[{
            "financialData":{"operatingCashflow":{"raw":1000}},
            "cashflowStatementHistory":{"cashflowStatements":[
                {"capitalExpenditures":{"raw":-200}},
                {"capitalExpenditures":{"raw":-150}}
            ]}
        }]}}"#;

        let fundamentals = parse_quote_summary(&pru(), body, as_of()).expect("parses");
        assert_eq!(fundamentals.capital_expenditures(), Some(-200.0));
        assert_eq!(fundamentals.unlevered_free_cash_flow(), Some(1200.0));
        assert_eq!(fundamentals.name(), "");
    }

    #[test]
    fn quote_summary_not_found_error_maps_to_not_found() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: ZZZZ"}}}"#;
        let error = parse_quote_summary(&pru(), body, as_of()).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(error.message().contains("Quote not found"));
    }

    #[test]
    fn malformed_body_is_reported() {
        let error = parse_quote_summary(&pru(), "<html>", as_of()).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[test]
    fn chart_skips_days_without_close() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704153600,1704240000,1704326400],
            "indicators":{"quote":[{"close":[101.5,null,102.25]}]}
        }],"error":null}}"#;

        let history = parse_chart(&pru(), HistoryRange::OneYear, body).expect("parses");
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.points[1].close, 102.25);
        assert_eq!(history.points[0].ts.format_date(), "2024-01-02");
    }

    #[tokio::test]
    async fn fundamentals_request_carries_crumb_and_modules() {
        let client = Arc::new(
            CannedHttpClient::new()
                .route("getcrumb", HttpResponse::ok("abc/def"))
                .route(
                    "quoteSummary",
                    HttpResponse::ok(r#"{"quoteSummary":{"result":[{}]}}"#),
                ),
        );
        let adapter = YahooAdapter::new(client.clone()).with_timeout_ms(2_500);

        adapter.fundamentals(&pru()).await.expect("fetch succeeds");

        let requests = client.recorded_requests();
        let summary = requests
            .iter()
            .find(|request| request.url.contains("quoteSummary"))
            .expect("summary request recorded");
        assert!(summary.url.contains("/quoteSummary/PRU?modules="));
        assert!(summary.url.contains("cashflowStatementHistory"));
        assert!(summary.url.ends_with("&crumb=abc%2Fdef"));
        assert_eq!(summary.timeout_ms, 2_500);
    }

    #[tokio::test]
    async fn crumb_is_fetched_once_per_adapter() {
        let client = Arc::new(
            CannedHttpClient::new()
                .route("getcrumb", HttpResponse::ok("abc"))
                .route("quoteSummary", HttpResponse::ok(r#"{"quoteSummary":{"result":[{}]}}"#))
                .route("chart", HttpResponse::ok(r#"{"chart":{"result":[]}}"#)),
        );
        let adapter = YahooAdapter::new(client.clone());

        adapter.fundamentals(&pru()).await.expect("fundamentals");
        adapter
            .price_history(&pru(), HistoryRange::OneYear)
            .await
            .expect("history");

        let crumb_calls = client
            .recorded_requests()
            .iter()
            .filter(|request| request.url.contains("getcrumb"))
            .count();
        assert_eq!(crumb_calls, 1);
    }

    #[tokio::test]
    async fn crumb_falls_back_to_second_endpoint() {
        let client = Arc::new(
            CannedHttpClient::new()
                .fail("query1.finance.yahoo.com/v1/test/getcrumb", HttpError::new("reset"))
                .route("query2.finance.yahoo.com/v1/test/getcrumb", HttpResponse::ok("xyz")),
        );
        let auth = YahooAuthManager::default();
        let crumb = auth
            .crumb(client.as_ref(), DEFAULT_TIMEOUT_MS)
            .await
            .expect("second endpoint answers");
        assert_eq!(crumb, "xyz");
    }

    #[tokio::test]
    async fn status_codes_map_to_error_kinds() {
        for (status, kind) in [
            (404, SourceErrorKind::NotFound),
            (429, SourceErrorKind::RateLimited),
            (500, SourceErrorKind::Unavailable),
        ] {
            let client = Arc::new(
                CannedHttpClient::new()
                    .route("getcrumb", HttpResponse::ok("abc"))
                    .route("quoteSummary", HttpResponse::new(status, "")),
            );
            let adapter = YahooAdapter::new(client);
            let error = adapter.fundamentals(&pru()).await.expect_err("must fail");
            assert_eq!(error.kind(), kind, "status {status}");
        }
    }
}
