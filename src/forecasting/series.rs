use std::collections::BTreeMap;

use bigdecimal::ToPrimitive;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ingestion::types::Observation;

/// A single point of the series as exposed over the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Date-indexed expense series, ordered by date, one value per day
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl ObservationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from raw observations, summing amounts that fall on the same day.
    ///
    /// Amounts are summed exactly before being converted to `f64`.
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut totals: BTreeMap<NaiveDate, bigdecimal::BigDecimal> = BTreeMap::new();
        for obs in observations {
            *totals.entry(obs.date).or_default() += &obs.amount;
        }

        let points = totals
            .into_iter()
            .filter_map(|(date, total)| total.to_f64().map(|v| (date, v)))
            .filter(|(_, v)| v.is_finite())
            .collect();

        Self { points }
    }

    /// Insert or replace the value for `date`
    pub fn insert(&mut self, date: NaiveDate, amount: f64) {
        self.points.insert(date, amount);
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.points.get(date).copied()
    }

    /// Merge `newer` into this series. On a date present in both, the newer value wins.
    pub fn merge(&mut self, newer: &ObservationSeries) {
        for (date, amount) in &newer.points {
            self.points.insert(*date, *amount);
        }
    }

    /// Reindex to a daily frequency between the first and last date, carrying the
    /// last known value forward over missing days.
    pub fn fill_daily(&self) -> ObservationSeries {
        let (Some(first), Some(last)) = (self.first_date(), self.last_date()) else {
            return self.clone();
        };

        let mut points = BTreeMap::new();
        let mut carried = self.points[&first];
        let mut day = first;
        while day <= last {
            if let Some(v) = self.points.get(&day) {
                carried = *v;
            }
            points.insert(day, carried);
            day += Duration::days(1);
        }

        ObservationSeries { points }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.keys().copied().collect()
    }

    pub fn points(&self) -> Vec<SeriesPoint> {
        self.points
            .iter()
            .map(|(date, amount)| SeriesPoint {
                date: *date,
                amount: *amount,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.points.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every date of `other` is present in this series
    pub fn contains_all(&self, other: &ObservationSeries) -> bool {
        other.points.keys().all(|d| self.points.contains_key(d))
    }
}

impl FromIterator<(NaiveDate, f64)> for ObservationSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(d: &str, amount: &str) -> Observation {
        Observation {
            date: date(d),
            amount: BigDecimal::from_str(amount).unwrap(),
        }
    }

    #[test]
    fn test_same_day_amounts_are_summed() {
        let series = ObservationSeries::from_observations(&[
            obs("2024-01-01", "10"),
            obs("2024-01-01", "15"),
            obs("2024-01-02", "7.5"),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&date("2024-01-01")), Some(25.0));
        assert_eq!(series.get(&date("2024-01-02")), Some(7.5));
    }

    #[test]
    fn test_merge_newer_value_wins() {
        let mut history: ObservationSeries =
            [(date("2024-01-01"), 5.0), (date("2024-01-02"), 6.0)].into_iter().collect();
        let incoming: ObservationSeries =
            [(date("2024-01-02"), 60.0), (date("2024-01-03"), 7.0)].into_iter().collect();

        history.merge(&incoming);

        assert_eq!(history.values(), vec![5.0, 60.0, 7.0]);
        assert!(history.contains_all(&incoming));
    }

    #[test]
    fn test_fill_daily_forward_fills_gaps() {
        let series: ObservationSeries =
            [(date("2024-01-01"), 1.0), (date("2024-01-04"), 4.0)].into_iter().collect();

        let filled = series.fill_daily();

        assert_eq!(filled.len(), 4);
        assert_eq!(filled.values(), vec![1.0, 1.0, 1.0, 4.0]);
        assert_eq!(filled.first_date(), Some(date("2024-01-01")));
        assert_eq!(filled.last_date(), Some(date("2024-01-04")));
    }

    #[test]
    fn test_fill_daily_on_empty_series() {
        let series = ObservationSeries::new();
        assert!(series.fill_daily().is_empty());
    }
}
