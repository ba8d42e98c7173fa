//! Daily cost series.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// An ordered-by-date mapping from day to summed cost.
///
/// At most one value per day; adding to an existing day accumulates into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl DailySeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add cost to a day, accumulating if the day already has a value.
    pub fn add(&mut self, day: NaiveDate, cost: f64) {
        *self.points.entry(day).or_insert(0.0) += cost;
    }

    /// The cost recorded for a day, if any.
    pub fn get(&self, day: NaiveDate) -> Option<f64> {
        self.points.get(&day).copied()
    }

    /// Whether the series has a value for this day.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.points.contains_key(&day)
    }

    /// Number of days with a value.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest day in the series.
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    /// Latest day in the series.
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Iterate (day, cost) pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Fill gap days strictly inside the observed range by linear
    /// interpolation between their nearest known neighbors. Days outside the
    /// range are never created, so a missing target day stays missing.
    pub fn interpolate_gaps(&mut self) {
        let known: Vec<(NaiveDate, f64)> = self.iter().collect();
        for pair in known.windows(2) {
            let (start, start_cost) = pair[0];
            let (end, end_cost) = pair[1];
            let span = (end - start).num_days();
            for offset in 1..span {
                let day = start + Duration::days(offset);
                let t = offset as f64 / span as f64;
                self.points.insert(day, start_cost + (end_cost - start_cost) * t);
            }
        }
    }

    /// The sub-series within the closed range [start, end].
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> DailySeries {
        DailySeries {
            points: self
                .points
                .range(start..=end)
                .map(|(d, v)| (*d, *v))
                .collect(),
        }
    }

    /// Costs in date order, excluding the given days.
    pub fn values_excluding(&self, days: &[NaiveDate]) -> Vec<f64> {
        self.points
            .iter()
            .filter(|(d, _)| !days.contains(d))
            .map(|(_, v)| *v)
            .collect()
    }
}
