use crate::model::UahAmount;
use rust_decimal::prelude::ToPrimitive as _;
use rust_decimal::Decimal;
use std::io::{self, Write};
use thiserror::Error;

/// Width of the longest rendered bar, in characters.
const BAR_WIDTH: usize = 40;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Chart I/O error")]
    Io(#[from] io::Error),
}

/// A renderer-agnostic two-column chart: category labels with their summed amounts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chart {
    /// Chart title.
    pub name: Option<String>,

    /// Points in render order.
    pub points: Vec<(String, UahAmount)>,
}

/// The boundary between the pipeline and chart rendering.
///
/// The pipeline emits every aggregated view through this trait and knows nothing about how or
/// where charts are drawn.
pub trait ChartSink {
    /// Render one chart.
    fn emit(&mut self, chart: &Chart) -> Result<(), SinkError>;
}

/// Renders charts as labeled text bars, scaled to the largest magnitude in the chart.
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ChartSink for TextSink<W> {
    fn emit(&mut self, chart: &Chart) -> Result<(), SinkError> {
        if let Some(name) = &chart.name {
            writeln!(self.out, "{name}")?;
            writeln!(self.out, "{}", underline(name))?;
            writeln!(self.out)?;
        }

        if chart.points.is_empty() {
            writeln!(self.out, "(no transactions)")?;
            writeln!(self.out)?;

            return Ok(());
        }

        let label_width = chart
            .points
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let max_abs = chart
            .points
            .iter()
            .map(|(_, amount)| amount.abs())
            .max()
            .unwrap_or(UahAmount::ZERO);

        for (label, amount) in &chart.points {
            let value = amount.to_string();
            let bar = bar(*amount, max_abs);

            writeln!(self.out, "{label:<label_width$}  {value:>12}  {bar}")?;
        }
        writeln!(self.out)?;

        Ok(())
    }
}

/// Per-word underline matching the title's shape, e.g. `Spending by Day` gets `======== == ===`.
fn underline(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_whitespace() { ch } else { '=' })
        .collect()
}

/// Bar length is the amount's share of the chart's largest magnitude. Spending and income get
/// distinct block styles; any non-zero amount renders at least one block.
fn bar(amount: UahAmount, max_abs: UahAmount) -> String {
    if amount == UahAmount::ZERO || max_abs == UahAmount::ZERO {
        return String::new();
    }

    let ratio = Decimal::from(amount.abs()) / Decimal::from(max_abs);
    let len = (ratio * Decimal::from(BAR_WIDTH as u64))
        .floor()
        .to_usize()
        .unwrap_or(0)
        .clamp(1, BAR_WIDTH);

    let block = if amount.is_negative() { "█" } else { "░" };

    block.repeat(len)
}
