//! SVG chart rendering with plotters.
//!
//! Two charts per run, named after the symbol:
//!
//! | File | Content |
//! |------|---------|
//! | `<SYMBOL>_ddm.svg` | projected vs discounted dividend bars, dashed discounted terminal value |
//! | `<SYMBOL>_price.svg` | daily close line over the requested window |

use std::fmt::Display;
use std::path::{Path, PathBuf};

use intrinsic_core::{
    AnalysisError, DdmProjection, Fundamentals, MultipleValuation, Presenter, PriceHistory,
};
use plotters::prelude::*;
use thiserror::Error;

pub const CHART_SIZE: (u32, u32) = (1000, 600);

const DDM_CHART: &str = "DDM chart";
const PRICE_CHART: &str = "price chart";
const BAR_WIDTH: f64 = 0.35;
const DASH_COUNT: usize = 40;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot render {chart}: {message}")]
    Render { chart: &'static str, message: String },

    #[error("cannot render {chart}: no data points")]
    Empty { chart: &'static str },

    #[error("cannot create chart directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn render_error<E: Display>(chart: &'static str) -> impl Fn(E) -> ChartError {
    move |error| ChartError::Render {
        chart,
        message: error.to_string(),
    }
}

/// Grouped projected/discounted bars per forecast year with a dashed
/// horizontal line at the discounted terminal value.
pub fn render_ddm_chart(path: &Path, projection: &DdmProjection) -> Result<(), ChartError> {
    if projection.years.is_empty() {
        return Err(ChartError::Empty { chart: DDM_CHART });
    }
    let fail = render_error(DDM_CHART);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(&fail)?;

    let horizon = projection.years.len() as f64;
    let y_max = projection
        .years
        .iter()
        .map(|year| year.projected.max(year.discounted))
        .fold(projection.discounted_terminal_value, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "DDM Analysis - Projected and Discounted Dividends",
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..horizon + 0.5, 0.0..y_max)
        .map_err(&fail)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(projection.years.len().min(20))
        .x_label_formatter(&|x| format!("{x:.0}"))
        .x_desc("Forecast Year")
        .y_desc("Dividend (USD)")
        .draw()
        .map_err(&fail)?;

    let projected_style = BLUE.mix(0.6).filled();
    chart
        .draw_series(projection.years.iter().map(|year| {
            let x = f64::from(year.year);
            Rectangle::new([(x - BAR_WIDTH, 0.0), (x, year.projected)], projected_style)
        }))
        .map_err(&fail)?
        .label("Projected Dividend")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], projected_style));

    let discounted_style = GREEN.mix(0.6).filled();
    chart
        .draw_series(projection.years.iter().map(|year| {
            let x = f64::from(year.year);
            Rectangle::new([(x, 0.0), (x + BAR_WIDTH, year.discounted)], discounted_style)
        }))
        .map_err(&fail)?
        .label("Discounted Dividend")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], discounted_style));

    let terminal = projection.discounted_terminal_value;
    let dash = horizon / DASH_COUNT as f64;
    chart
        .draw_series((0..DASH_COUNT).step_by(2).map(|index| {
            let start = 0.5 + index as f64 * dash;
            PathElement::new(vec![(start, terminal), (start + dash, terminal)], RED.stroke_width(2))
        }))
        .map_err(&fail)?
        .label("Discounted Terminal Value")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(&fail)?;

    root.present().map_err(&fail)?;
    Ok(())
}

/// Close-price line; the x axis is the trading-day index labelled with dates.
pub fn render_price_chart(path: &Path, history: &PriceHistory) -> Result<(), ChartError> {
    let Some((low, high)) = history.close_bounds() else {
        return Err(ChartError::Empty { chart: PRICE_CHART });
    };
    let fail = render_error(PRICE_CHART);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(&fail)?;

    let pad = ((high - low) * 0.05).max(0.01);
    let last_index = history.points.len().saturating_sub(1).max(1) as f64;
    let date_label = |x: &f64| {
        history
            .points
            .get(x.round().max(0.0) as usize)
            .map(|point| point.ts.format_date())
            .unwrap_or_default()
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "{} Historical Stock Price ({})",
                history.symbol,
                history.range.describe()
            ),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..last_index, (low - pad)..(high + pad))
        .map_err(&fail)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&date_label)
        .x_desc("Date")
        .y_desc("Price (USD)")
        .draw()
        .map_err(&fail)?;

    chart
        .draw_series(LineSeries::new(
            history
                .points
                .iter()
                .enumerate()
                .map(|(index, point)| (index as f64, point.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(&fail)?
        .label(format!("{} Close Price", history.symbol))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(&fail)?;

    root.present().map_err(&fail)?;
    Ok(())
}

/// Presenter that turns the DDM projection and price history into SVG files
/// under one directory. Other callbacks are ignored.
#[derive(Debug)]
pub struct ChartPresenter {
    dir: PathBuf,
    written: Vec<PathBuf>,
    errors: Vec<ChartError>,
}

impl ChartPresenter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// The written paths, or the first rendering failure.
    pub fn finish(self) -> Result<Vec<PathBuf>, ChartError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.written),
        }
    }

    fn write_chart(
        &mut self,
        file_name: String,
        render: impl FnOnce(&Path) -> Result<(), ChartError>,
    ) {
        if let Err(source) = std::fs::create_dir_all(&self.dir) {
            self.errors.push(ChartError::Directory {
                path: self.dir.clone(),
                source,
            });
            return;
        }

        let path = self.dir.join(file_name);
        match render(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "chart written");
                self.written.push(path);
            }
            Err(error) => {
                tracing::warn!(error = %error, "chart rendering failed");
                self.errors.push(error);
            }
        }
    }
}

/// Symbols may carry path separators; they never leave the chart directory.
fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\' | ':') { '_' } else { ch })
        .collect()
}

impl Presenter for ChartPresenter {
    fn begin(&mut self, _ticker: &str) {}

    fn fundamentals(&mut self, _fundamentals: &Fundamentals) {}

    fn ddm(&mut self, fundamentals: &Fundamentals, projection: &DdmProjection) {
        let file_name = format!("{}_ddm.svg", file_stem(fundamentals.symbol().as_str()));
        self.write_chart(file_name, |path| render_ddm_chart(path, projection));
    }

    fn earnings_value(&mut self, _fundamentals: &Fundamentals, _valuation: &MultipleValuation) {}

    fn book_value(&mut self, _fundamentals: &Fundamentals, _valuation: &MultipleValuation) {}

    fn price_history(&mut self, history: &PriceHistory) {
        let file_name = format!("{}_price.svg", file_stem(history.symbol.as_str()));
        self.write_chart(file_name, |path| render_price_chart(path, history));
    }

    fn unavailable(&mut self, _error: &AnalysisError) {}
}
