use serde::Serialize;
use std::slice::Iter;

/// Represent a range of time, from a start to an end, in seconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    /// Returns the start time of the range
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the end time of the range
    pub fn end(&self) -> f64 {
        self.end
    }
}

/// Non-contiguous, chronologically ordered ranges of buffered media
///
/// Ranges never overlap nor touch: adding a range merges it with every range
/// it intersects or abuts.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeRanges {
    ranges: Vec<TimeRange>,
}

impl TimeRanges {
    /// Create a new empty `TimeRanges` object
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(start, end)` pairs in any order
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut ranges = Self::new();
        for (start, end) in pairs {
            ranges.add(start, end);
        }
        ranges
    }

    /// Add a range of time, merging it with the ranges already there
    ///
    /// Empty, inverted, and non-finite ranges are ignored.
    pub fn add(&mut self, start: f64, end: f64) {
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return;
        }

        // First range that ends at or after the new start can merge.
        let first = self.ranges.partition_point(|r| r.end < start);
        // Ranges starting at or before the new end also merge.
        let last = self.ranges.partition_point(|r| r.start <= end);

        if first >= last {
            self.ranges.insert(first, TimeRange { start, end });
            return;
        }

        let merged = TimeRange {
            start: start.min(self.ranges[first].start),
            end: end.max(self.ranges[last - 1].end),
        };
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    /// Returns the number of non-contiguous ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the starting time of the range whose index is given in argument.
    ///
    /// Returns `None` if the given index is superior or equal to the number of actual ranges.
    pub fn start(&self, idx: usize) -> Option<f64> {
        self.ranges.get(idx).map(|r| r.start)
    }

    /// Returns the ending time of the range whose index is given in argument.
    ///
    /// Returns `None` if the given index is superior or equal to the number of actual ranges.
    pub fn end(&self, idx: usize) -> Option<f64> {
        self.ranges.get(idx).map(|r| r.end)
    }

    /// Returns the range containing the given position, or else the first
    /// range starting after it.
    pub fn range_at_or_after(&self, pos: f64) -> Option<&TimeRange> {
        self.ranges.iter().find(|r| r.end > pos)
    }

    pub fn clear(&mut self) {
        self.ranges.clear()
    }

    pub fn iter(&self) -> Iter<'_, TimeRange> {
        self.ranges.iter()
    }
}

impl<'a> IntoIterator for &'a TimeRanges {
    type Item = &'a TimeRange;
    type IntoIter = Iter<'a, TimeRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
