//! Missing-Data Gap Detection
//!
//! Tells the plot where not to draw a line: spans inside the visible range
//! that have no usable sample behind them.

use serde::Serialize;

/// Samples the service aims for across the requested range
pub const TARGET_POINTS: f64 = 1000.0;

/// Lower bound for the expected sample step (seconds)
pub const MIN_STEP_SECONDS: f64 = 1.0;

/// Span `[start, end]` in seconds without samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gap {
    pub start: f64,
    pub end: f64,
}

/// Ascending, non-overlapping gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GapSet(Vec<Gap>);

impl GapSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gap> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Gap] {
        &self.0
    }

    /// Append a gap, merging it into the last one when they touch
    fn push(&mut self, start: f64, end: f64) {
        if end <= start {
            return;
        }
        if let Some(last) = self.0.last_mut() {
            if start <= last.end {
                last.end = last.end.max(end);
                return;
            }
        }
        self.0.push(Gap { start, end });
    }
}

/// Gap policy for one visible range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapFiller {
    from: f64,
    to: f64,
    max_step: f64,
}

impl GapFiller {
    /// Range bounds in seconds
    pub fn new(from: f64, to: f64) -> Self {
        let step = ((to - from) / TARGET_POINTS).max(MIN_STEP_SECONDS);
        Self {
            from,
            to,
            max_step: step * 2.0,
        }
    }

    /// Range bounds in milliseconds, as the dashboard tracks them
    pub fn from_millis(from_ms: i64, to_ms: i64) -> Self {
        Self::new(from_ms as f64 / 1000.0, to_ms as f64 / 1000.0)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.from, self.to)
    }

    /// Largest distance between samples that still counts as contiguous
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Gaps of one value series against its timestamp axis.
    ///
    /// A sample is usable when its timestamp is finite and its value is not
    /// `NaN`. Spans wider than [`max_step`](Self::max_step) between usable
    /// samples, spans that skip a missing sample, and uncovered range edges
    /// are gaps. Every gap is clipped to the visible range.
    pub fn gaps(&self, timestamps: &[f64], values: &[f64]) -> GapSet {
        let mut set = GapSet::new();
        if self.from.is_nan() || self.to.is_nan() || self.to <= self.from {
            return set;
        }

        let mut last = self.from;
        let mut seen_any = false;
        let mut skipped = false;

        for (i, &t) in timestamps.iter().enumerate() {
            if !t.is_finite() {
                continue;
            }
            let usable = values.get(i).is_some_and(|v| !v.is_nan());
            if !usable {
                skipped = true;
                continue;
            }

            if skipped || t - last > self.max_step {
                self.push_clipped(&mut set, last, t);
            }
            last = t;
            seen_any = true;
            skipped = false;
        }

        if !seen_any {
            set.push(self.from, self.to);
        } else if skipped || self.to - last > self.max_step {
            self.push_clipped(&mut set, last, self.to);
        }

        set
    }

    fn push_clipped(&self, set: &mut GapSet, start: f64, end: f64) {
        set.push(start.max(self.from), end.min(self.to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // One hour range: step 3.6s, contiguous up to 7.2s apart
    const FROM: f64 = 1_700_000_000.0;
    const TO: f64 = FROM + 3600.0;

    fn contiguous(step: f64) -> Vec<f64> {
        let mut ts = Vec::new();
        let mut t = FROM;
        while t <= TO {
            ts.push(t);
            t += step;
        }
        ts
    }

    #[test]
    fn test_contiguous_series_has_no_gaps() {
        let filler = GapFiller::new(FROM, TO);
        let ts = contiguous(3.6);
        let values = vec![0.1; ts.len()];
        assert!(filler.gaps(&ts, &values).is_empty());
    }

    #[test]
    fn test_hole_between_samples() {
        let filler = GapFiller::new(FROM, TO);
        let mut ts = contiguous(3.6);
        ts.retain(|t| !(*t > FROM + 1000.0 && *t < FROM + 1100.0));
        let values = vec![0.1; ts.len()];

        let gaps = filler.gaps(&ts, &values);
        assert_eq!(gaps.len(), 1);
        let gap = gaps.as_slice()[0];
        assert!(gap.start <= FROM + 1000.0 && gap.end >= FROM + 1100.0);
    }

    #[test]
    fn test_nan_values_are_missing() {
        let filler = GapFiller::new(FROM, TO);
        let ts = contiguous(3.6);
        let mut values = vec![0.1; ts.len()];
        values[10] = f64::NAN;

        let gaps = filler.gaps(&ts, &values);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps.as_slice()[0], Gap { start: ts[9], end: ts[11] });
    }

    #[test]
    fn test_uncovered_edges() {
        let filler = GapFiller::new(FROM, TO);
        let ts: Vec<f64> = contiguous(3.6)
            .into_iter()
            .filter(|t| *t >= FROM + 600.0 && *t <= FROM + 3000.0)
            .collect();
        let values = vec![0.2; ts.len()];

        let gaps = filler.gaps(&ts, &values);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps.as_slice()[0].start, FROM);
        assert_eq!(gaps.as_slice()[1].end, TO);
    }

    #[test]
    fn test_no_samples_is_one_gap() {
        let filler = GapFiller::new(FROM, TO);
        let gaps = filler.gaps(&[], &[]);
        assert_eq!(gaps.as_slice(), &[Gap { start: FROM, end: TO }]);
    }

    #[test]
    fn test_empty_range() {
        let filler = GapFiller::new(TO, FROM);
        assert!(filler.gaps(&[FROM], &[1.0]).is_empty());
    }

    #[test]
    fn test_from_millis() {
        let filler = GapFiller::from_millis(1_000_000, 4_600_000);
        assert_eq!(filler.range(), (1000.0, 4600.0));
        assert!((filler.max_step() - 7.2).abs() < 1e-9);
        // Short ranges still tolerate one-second scrape jitter
        assert_eq!(GapFiller::new(0.0, 10.0).max_step(), 2.0);
    }

    proptest! {
        #[test]
        fn prop_gaps_are_ordered_and_bounded(
            offsets in proptest::collection::vec(-100.0f64..3700.0, 0..200),
            missing in proptest::collection::vec(any::<bool>(), 200)
        ) {
            let mut ts: Vec<f64> = offsets.iter().map(|o| FROM + o).collect();
            ts.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let values: Vec<f64> = ts
                .iter()
                .zip(&missing)
                .map(|(_, m)| if *m { f64::NAN } else { 1.0 })
                .collect();

            let gaps = GapFiller::new(FROM, TO).gaps(&ts, &values);

            let mut prev_end = f64::NEG_INFINITY;
            for gap in gaps.iter() {
                prop_assert!(gap.start >= FROM && gap.end <= TO);
                prop_assert!(gap.start < gap.end);
                prop_assert!(gap.start > prev_end);
                prev_end = gap.end;
            }
        }
    }
}
