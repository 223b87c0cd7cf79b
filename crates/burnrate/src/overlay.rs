//! Threshold Overlay
//!
//! Draws the alert threshold as a dashed line on top of a rendered burn-rate
//! plot. Runs from the renderer's draw hook, once per draw pass.

use crate::AlignedPlotData;
use serde::Serialize;

pub const THRESHOLD_COLOR: &str = "#FF1744";
pub const THRESHOLD_DASH: [f64; 2] = [25.0, 10.0];

/// Drawing surface handed to overlays by the plot renderer
pub trait PlotCanvas {
    /// Canvas x position of an x-scale value
    fn x_position(&self, value: f64) -> f64;

    /// Canvas y position of a y-scale value
    fn y_position(&self, value: f64) -> f64;

    /// Stroke a dashed straight line between two canvas points
    fn stroke_dashed(&mut self, from: (f64, f64), to: (f64, f64), color: &str, dash: &[f64]);
}

/// Horizontal threshold line, or nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThresholdOverlay {
    threshold: Option<f64>,
}

impl ThresholdOverlay {
    pub fn new(threshold: Option<f64>) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Draw the line across the data's x extent.
    ///
    /// Returns whether anything was drawn. Never touches `data`.
    pub fn draw<C: PlotCanvas + ?Sized>(&self, canvas: &mut C, data: &AlignedPlotData) -> bool {
        let Some(threshold) = self.threshold else {
            return false;
        };
        let Some((first, last)) = data.x_extent() else {
            return false;
        };

        let x0 = canvas.x_position(first);
        let x1 = canvas.x_position(last);
        let y = canvas.y_position(threshold);

        canvas.stroke_dashed((x0, y), (x1, y), THRESHOLD_COLOR, &THRESHOLD_DASH);
        true
    }
}
