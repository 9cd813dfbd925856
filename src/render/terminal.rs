//! Terminal rendering of projections.

use super::{ChartSeries, ChartSurface, TextSummary};
use crate::models::{Literal, NUM_LITERALS};
use crossterm::QueueableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{self, Write};

/// Chart title.
pub const CHART_TITLE: &str = "Included in Hypothesis";

const PRESENT_COLOR: Color = Color::Green;
const ABSENT_COLOR: Color = Color::Grey;

/// Width of one chart column, including padding.
const COLUMN_WIDTH: usize = 5;

/// Bar chart drawn with block characters.
///
/// Labels are fixed when the chart is created; only the data and
/// highlight colours change on update.
#[derive(Debug, Clone)]
pub struct TerminalChart {
    labels: [Literal; NUM_LITERALS],
    data: [u8; NUM_LITERALS],
    highlighted: [bool; NUM_LITERALS],
    bar_height: usize,
    color: bool,
    revision: u64,
}

impl TerminalChart {
    pub fn new(series: &ChartSeries, bar_height: usize, color: bool) -> Self {
        Self {
            labels: series.labels(),
            data: series.values(),
            highlighted: series.highlights(),
            bar_height: bar_height.max(1),
            color,
            revision: 0,
        }
    }

    pub fn data(&self) -> &[u8; NUM_LITERALS] {
        &self.data
    }

    /// Number of in-place updates since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn paint<W: Write>(&self, out: &mut W, text: &str, color: Color) -> io::Result<()> {
        if self.color {
            out.queue(SetForegroundColor(color))?
                .queue(Print(text))?
                .queue(ResetColor)?;
        } else {
            out.queue(Print(text))?;
        }
        Ok(())
    }

    /// Draw the chart.
    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{CHART_TITLE}")?;

        for row in (1..=self.bar_height).rev() {
            for (value, highlighted) in self.data.iter().zip(self.highlighted) {
                let cell = if *value > 0 {
                    "███"
                } else if row == 1 {
                    "▁▁▁"
                } else {
                    "   "
                };
                let color = if highlighted { PRESENT_COLOR } else { ABSENT_COLOR };
                self.paint(out, &format!("{cell:^width$}", width = COLUMN_WIDTH), color)?;
            }
            writeln!(out)?;
        }

        for label in self.labels {
            write!(out, "{:^width$}", label.as_str(), width = COLUMN_WIDTH)?;
        }
        writeln!(out)?;
        out.flush()
    }
}

impl ChartSurface for TerminalChart {
    fn update(&mut self, series: &ChartSeries) {
        for (i, slot) in series.slots().iter().enumerate() {
            self.data[i] = slot.value;
            self.highlighted[i] = slot.highlighted;
        }
        self.revision += 1;
    }
}

/// Write the hypothesis line followed by the log, one block per entry.
pub fn write_summary<W: Write>(out: &mut W, summary: &TextSummary) -> io::Result<()> {
    writeln!(out, "Hypothesis: {}", summary.hypothesis)?;
    if !summary.log.is_empty() {
        writeln!(out, "Log:")?;
        for entry in &summary.log {
            writeln!(out, "  {entry}")?;
        }
    }
    Ok(())
}
