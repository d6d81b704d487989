use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{Symbol, UtcDateTime, ValidationError};

/// Numeric fields of a [`Fundamentals`] snapshot, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    PeRatio,
    PriceToBook,
    ReturnOnEquity,
    DebtToEquity,
    OperatingCashFlow,
    CapitalExpenditures,
    UnleveredFreeCashFlow,
    DividendRate,
    TrailingEps,
    BookValue,
    MarketCap,
}

impl Metric {
    pub const ALL: [Self; 11] = [
        Self::PeRatio,
        Self::PriceToBook,
        Self::ReturnOnEquity,
        Self::DebtToEquity,
        Self::OperatingCashFlow,
        Self::CapitalExpenditures,
        Self::UnleveredFreeCashFlow,
        Self::DividendRate,
        Self::TrailingEps,
        Self::BookValue,
        Self::MarketCap,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::PeRatio => "P/E",
            Self::PriceToBook => "P/B",
            Self::ReturnOnEquity => "ROE",
            Self::DebtToEquity => "Debt/Equity",
            Self::OperatingCashFlow => "Operating Cash Flow",
            Self::CapitalExpenditures => "Capital Expenditures",
            Self::UnleveredFreeCashFlow => "Unlevered Free Cash Flow",
            Self::DividendRate => "Dividend Rate",
            Self::TrailingEps => "Trailing EPS",
            Self::BookValue => "Book Value",
            Self::MarketCap => "Market Cap",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fundamentals snapshot for one ticker.
///
/// Every numeric field is either a finite number or `None` (unknown). Setters
/// drop non-finite values so a NaN coming from the provider can never be
/// mistaken for data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fundamentals {
    symbol: Symbol,
    name: String,
    as_of: UtcDateTime,
    pe_ratio: Option<f64>,
    price_to_book: Option<f64>,
    return_on_equity: Option<f64>,
    debt_to_equity: Option<f64>,
    operating_cash_flow: Option<f64>,
    capital_expenditures: Option<f64>,
    dividend_rate: Option<f64>,
    trailing_eps: Option<f64>,
    book_value: Option<f64>,
    market_cap: Option<f64>,
}

impl Fundamentals {
    /// A snapshot with every numeric field unknown.
    pub fn new(symbol: Symbol, name: impl Into<String>, as_of: UtcDateTime) -> Self {
        Self {
            symbol,
            name: name.into(),
            as_of,
            pe_ratio: None,
            price_to_book: None,
            return_on_equity: None,
            debt_to_equity: None,
            operating_cash_flow: None,
            capital_expenditures: None,
            dividend_rate: None,
            trailing_eps: None,
            book_value: None,
            market_cap: None,
        }
    }

    pub fn with_pe_ratio(mut self, value: Option<f64>) -> Self {
        self.pe_ratio = known(value);
        self
    }

    pub fn with_price_to_book(mut self, value: Option<f64>) -> Self {
        self.price_to_book = known(value);
        self
    }

    pub fn with_return_on_equity(mut self, value: Option<f64>) -> Self {
        self.return_on_equity = known(value);
        self
    }

    pub fn with_debt_to_equity(mut self, value: Option<f64>) -> Self {
        self.debt_to_equity = known(value);
        self
    }

    pub fn with_operating_cash_flow(mut self, value: Option<f64>) -> Self {
        self.operating_cash_flow = known(value);
        self
    }

    /// Capital expenditures exactly as the provider reports them. Yahoo uses
    /// negative outflows; no sign normalization happens here.
    pub fn with_capital_expenditures(mut self, value: Option<f64>) -> Self {
        self.capital_expenditures = known(value);
        self
    }

    pub fn with_dividend_rate(mut self, value: Option<f64>) -> Self {
        self.dividend_rate = known(value);
        self
    }

    pub fn with_trailing_eps(mut self, value: Option<f64>) -> Self {
        self.trailing_eps = known(value);
        self
    }

    pub fn with_book_value(mut self, value: Option<f64>) -> Self {
        self.book_value = known(value);
        self
    }

    pub fn with_market_cap(mut self, value: Option<f64>) -> Self {
        self.market_cap = known(value);
        self
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_of(&self) -> UtcDateTime {
        self.as_of
    }

    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe_ratio
    }

    pub fn price_to_book(&self) -> Option<f64> {
        self.price_to_book
    }

    pub fn return_on_equity(&self) -> Option<f64> {
        self.return_on_equity
    }

    pub fn debt_to_equity(&self) -> Option<f64> {
        self.debt_to_equity
    }

    pub fn operating_cash_flow(&self) -> Option<f64> {
        self.operating_cash_flow
    }

    pub fn capital_expenditures(&self) -> Option<f64> {
        self.capital_expenditures
    }

    /// Operating cash flow minus capital expenditures, known only when both
    /// inputs are.
    ///
    /// The subtraction uses the provider's capex sign as-is: with Yahoo's
    /// negative outflows this adds the capex magnitude back rather than
    /// removing it.
    pub fn unlevered_free_cash_flow(&self) -> Option<f64> {
        match (self.operating_cash_flow, self.capital_expenditures) {
            (Some(ocf), Some(capex)) => Some(ocf - capex),
            _ => None,
        }
    }

    pub fn dividend_rate(&self) -> Option<f64> {
        self.dividend_rate
    }

    pub fn trailing_eps(&self) -> Option<f64> {
        self.trailing_eps
    }

    pub fn book_value(&self) -> Option<f64> {
        self.book_value
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.market_cap
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::PeRatio => self.pe_ratio,
            Metric::PriceToBook => self.price_to_book,
            Metric::ReturnOnEquity => self.return_on_equity,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::OperatingCashFlow => self.operating_cash_flow,
            Metric::CapitalExpenditures => self.capital_expenditures,
            Metric::UnleveredFreeCashFlow => self.unlevered_free_cash_flow(),
            Metric::DividendRate => self.dividend_rate,
            Metric::TrailingEps => self.trailing_eps,
            Metric::BookValue => self.book_value,
            Metric::MarketCap => self.market_cap,
        }
    }

    /// Every numeric field in presentation order, identity fields excluded.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL
            .into_iter()
            .map(move |metric| (metric, self.metric(metric)))
    }
}

fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Trailing window for the close-price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HistoryRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
}

impl HistoryRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }

    /// Human wording used in chart titles.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
            Self::OneYear => "1 Year",
            Self::TwoYears => "2 Years",
            Self::FiveYears => "5 Years",
        }
    }
}

impl Display for HistoryRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            other => Err(ValidationError::InvalidHistoryRange {
                value: other.to_owned(),
            }),
        }
    }
}

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosePoint {
    pub ts: UtcDateTime,
    pub close: f64,
}

impl ClosePoint {
    pub fn new(ts: UtcDateTime, close: f64) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        Ok(Self { ts, close })
    }
}

/// Daily close prices for a symbol over a trailing window, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub range: HistoryRange,
    pub points: Vec<ClosePoint>,
}

impl PriceHistory {
    pub fn new(symbol: Symbol, range: HistoryRange, mut points: Vec<ClosePoint>) -> Self {
        points.sort_by_key(|point| point.ts);
        Self {
            symbol,
            range,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest close, `None` when the series is empty.
    pub fn close_bounds(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |bounds, point| match bounds {
            None => Some((point.close, point.close)),
            Some((low, high)) => Some((low.min(point.close), high.max(point.close))),
        })
    }
}
