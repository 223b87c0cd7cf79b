//! Burn-Rate Plot Frames
//!
//! Everything a plot primitive needs to draw one burn-rate graph: sizing,
//! per-series styles, scales, aligned data and the threshold overlay.

use burnrate::{AlignedBurnrates, AlignedPlotData, GapFiller, GapSet, PlotCanvas, ThresholdOverlay};
use objectives::display_label;
use serde::Serialize;

pub const PLOT_HEIGHT: u32 = 150;

/// Top, right, bottom, left
pub const PLOT_PADDING: [u32; 4] = [15, 0, 0, 0];

/// Series strokes, assigned in series order
pub const BURNRATE_PALETTE: [&str; 6] = ["1f77b4", "ff7f0e", "9467bd", "2ca02c", "8c564b", "e377c2"];

/// Axis range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
    /// Data outside the range must not widen it
    pub hard: bool,
}

/// Style of one value series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub label: String,
    pub stroke: String,
    pub min: f64,
    /// Spans drawn without a connecting line
    pub gaps: GapSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub padding: [u32; 4],
    /// One style per value series; empty for the placeholder
    pub series: Vec<SeriesStyle>,
    pub x: Scale,
    pub y: Scale,
}

impl PlotOptions {
    fn new(width: u32, from_ms: i64, to_ms: i64, series: Vec<SeriesStyle>, hard_y: bool) -> Self {
        Self {
            width,
            height: PLOT_HEIGHT,
            padding: PLOT_PADDING,
            series,
            x: Scale {
                min: from_ms as f64 / 1000.0,
                max: to_ms as f64 / 1000.0,
                hard: false,
            },
            y: Scale {
                min: 0.0,
                max: 1.0,
                hard: hard_y,
            },
        }
    }
}

/// One renderable graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotFrame {
    pub options: PlotOptions,
    pub data: AlignedPlotData,
    pub overlay: ThresholdOverlay,
    /// A fetch for this graph is outstanding
    pub loading: bool,
}

impl PlotFrame {
    /// Burn-rate graph over `[from_ms, to_ms]` with a threshold line
    pub fn burnrates(
        width: u32,
        from_ms: i64,
        to_ms: i64,
        burnrates: &AlignedBurnrates,
        threshold: Option<f64>,
    ) -> Self {
        let filler = GapFiller::from_millis(from_ms, to_ms);
        let timestamps = burnrates.data.timestamps();

        let series = burnrates
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| SeriesStyle {
                label: display_label(label),
                stroke: format!("#{}", BURNRATE_PALETTE[i % BURNRATE_PALETTE.len()]),
                min: 0.0,
                gaps: burnrates
                    .data
                    .series()
                    .get(i)
                    .map(|values| filler.gaps(timestamps, values))
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            options: PlotOptions::new(width, from_ms, to_ms, series, true),
            data: burnrates.data.clone(),
            overlay: ThresholdOverlay::new(threshold),
            loading: false,
        }
    }

    /// Empty chart shown while there is no data: `[[], []]`, y in `[0, 1]`
    pub fn placeholder(width: u32, from_ms: i64, to_ms: i64) -> Self {
        Self {
            options: PlotOptions::new(width, from_ms, to_ms, Vec::new(), false),
            data: AlignedPlotData::new(Vec::new(), vec![Vec::new()]),
            overlay: ThresholdOverlay::default(),
            loading: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.options.series.is_empty() && self.data.timestamps().is_empty()
    }

    /// Draw hook for renderers: the threshold line over this frame's data
    pub fn draw_overlay<C: PlotCanvas + ?Sized>(&self, canvas: &mut C) -> bool {
        self.overlay.draw(canvas, &self.data)
    }
}

/// Plot primitive that turns frames into pixels
pub trait PlotRenderer {
    type Error;

    fn render(&mut self, frame: &PlotFrame) -> Result<(), Self::Error>;
}
