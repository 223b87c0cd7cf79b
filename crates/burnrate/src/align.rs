//! Burn-Rate Series Alignment
//!
//! Merges the timeseries returned for one alert's window pair into a single
//! shared-timestamp buffer the plot primitive can draw directly.

use objectives::Timeseries;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Shared timestamp axis plus index-aligned value series.
///
/// Serializes as `[[timestamps...], [series 1...], ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPlotData {
    timestamps: Vec<f64>,
    series: Vec<Vec<f64>>,
}

impl AlignedPlotData {
    pub fn new(timestamps: Vec<f64>, series: Vec<Vec<f64>>) -> Self {
        Self { timestamps, series }
    }

    /// No timestamps and no series
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn series(&self) -> &[Vec<f64>] {
        &self.series
    }

    /// Number of value series (excluding the timestamp axis)
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Number of sequences including the timestamp axis
    pub fn sequence_count(&self) -> usize {
        1 + self.series.len()
    }

    /// Sequence by position; 0 is the timestamp axis
    pub fn sequence(&self, index: usize) -> Option<&[f64]> {
        match index {
            0 => Some(&self.timestamps),
            i => self.series.get(i - 1).map(Vec::as_slice),
        }
    }

    /// Whether every value series has the timestamp axis' length
    pub fn is_aligned(&self) -> bool {
        self.series.iter().all(|s| s.len() == self.timestamps.len())
    }

    /// First and last timestamp
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        Some((*self.timestamps.first()?, *self.timestamps.last()?))
    }
}

impl Serialize for AlignedPlotData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.sequence_count()))?;
        seq.serialize_element(&self.timestamps)?;
        for s in &self.series {
            seq.serialize_element(s)?;
        }
        seq.end()
    }
}

/// Aligned data plus one display label per value series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignedBurnrates {
    pub data: AlignedPlotData,
    /// `labels[i]` describes `data.sequence(i + 1)`
    pub labels: Vec<String>,
}

/// Align burn-rate timeseries on the first item's timestamp axis.
///
/// Value series of every item are appended in input order, and so are the
/// labels. Precondition: all items carry the same timestamp series. Nothing
/// is resampled; mismatched axes produce misaligned data.
pub fn align(timeseries: &[Timeseries]) -> AlignedBurnrates {
    let timestamps = timeseries
        .first()
        .and_then(Timeseries::timestamps)
        .map(<[f64]>::to_vec)
        .unwrap_or_default();

    let mut series = Vec::new();
    let mut labels = Vec::new();

    for (i, item) in timeseries.iter().enumerate() {
        if i > 0 {
            if let Some(axis) = item.timestamps() {
                if axis.len() != timestamps.len() {
                    debug!(
                        "Timeseries {} has {} timestamps, axis has {}",
                        i,
                        axis.len(),
                        timestamps.len()
                    );
                }
            }
        }

        series.extend(item.value_series().iter().map(|s| s.values.clone()));
        labels.extend(item.labels.iter().cloned());
    }

    AlignedBurnrates {
        data: AlignedPlotData::new(timestamps, series),
        labels,
    }
}
