//! Burn-Rate Computations
//!
//! Everything that turns objective and alert data into numbers and strings
//! for the alert table and the burn-rate graphs. All of it is synchronous.

pub mod align;
pub mod current;
pub mod duration;
pub mod gaps;
pub mod overlay;
pub mod threshold;

pub use align::{align, AlignedBurnrates, AlignedPlotData};
pub use current::{format_current, to_fixed};
pub use duration::format_duration;
pub use gaps::{Gap, GapFiller, GapSet};
pub use overlay::{PlotCanvas, ThresholdOverlay};
pub use threshold::{exhaustion_ms, threshold, threshold_formula};
