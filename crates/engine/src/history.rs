//! Date-range filtering and period summaries over trip history.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine, TripRecord};

/// Inclusive range over a record's effective date. Either bound may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// A range whose `start` is after its `end` is valid and matches nothing.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range with no bounds; every record passes.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Parses optional `YYYY-MM-DD` bounds. Empty strings are open bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ResultEngine<Self> {
        Ok(Self::new(parse_bound(start)?, parse_bound(end)?))
    }

    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

fn parse_bound(raw: Option<&str>) -> ResultEngine<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| EngineError::InvalidDate(format!("expected YYYY-MM-DD, got {raw}"))),
    }
}

/// Totals over a set of trips.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeriodSummary {
    /// Sum of saved net profits, base currency.
    pub total_profit: f64,
    pub total_distance_km: f64,
    pub trip_count: usize,
}

/// Records whose effective date falls in `range`, order preserved.
#[must_use]
pub fn filter(records: &[TripRecord], range: &DateRange) -> Vec<TripRecord> {
    records
        .iter()
        .filter(|record| range.contains(record.effective_date()))
        .cloned()
        .collect()
}

#[must_use]
pub fn summarize(records: &[TripRecord]) -> PeriodSummary {
    records
        .iter()
        .fold(PeriodSummary::default(), |acc, record| PeriodSummary {
            total_profit: acc.total_profit + record.summary.total_net_profit,
            total_distance_km: acc.total_distance_km + record.inputs.distance_km,
            trip_count: acc.trip_count + 1,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Currency, TripInputs, TripSummary};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, date: Option<NaiveDate>, km: f64, profit: f64) -> TripRecord {
        TripRecord {
            id: id.to_string(),
            created_at_ms: 1_704_067_200_000, // 2024-01-01
            trip_date: date,
            inputs: TripInputs {
                distance_km: km,
                ..TripInputs::default()
            },
            summary: TripSummary {
                total_net_profit: profit,
                currency: Currency::Pln,
            },
        }
    }

    #[test]
    fn unbounded_range_keeps_everything() {
        let records = vec![
            record("2", Some(day(2024, 2, 5)), 300.0, 50.0),
            record("1", Some(day(2024, 1, 10)), 500.0, 587.25),
        ];
        assert_eq!(filter(&records, &DateRange::all()), records);
    }

    #[test]
    fn start_bound_excludes_older_trips() {
        let records = vec![
            record("2", Some(day(2024, 2, 5)), 300.0, 50.0),
            record("1", Some(day(2024, 1, 10)), 500.0, 587.25),
        ];
        let range = DateRange::parse(Some("2024-02-01"), None).unwrap();
        let filtered = filter(&records, &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");

        let summary = summarize(&filtered);
        assert_eq!(summary.total_distance_km, 300.0);
        assert_eq!(summary.total_profit, 50.0);
        assert_eq!(summary.trip_count, 1);
    }

    #[test]
    fn bounds_are_inclusive() {
        let records = vec![record("1", Some(day(2024, 3, 1)), 1.0, 1.0)];
        let range = DateRange::parse(Some("2024-03-01"), Some("2024-03-01")).unwrap();
        assert_eq!(filter(&records, &range).len(), 1);
    }

    #[test]
    fn missing_trip_date_uses_creation_day() {
        let records = vec![record("1", None, 1.0, 1.0)];
        let range = DateRange::parse(None, Some("2023-12-31")).unwrap();
        assert!(filter(&records, &range).is_empty());
        let range = DateRange::parse(Some("2024-01-01"), Some("")).unwrap();
        assert_eq!(filter(&records, &range).len(), 1);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize(&[]), PeriodSummary::default());
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let records = vec![
            record("2", Some(day(2024, 2, 5)), 300.0, 50.0),
            record("1", Some(day(2024, 1, 10)), 500.0, 587.25),
        ];
        let range = DateRange::parse(Some("2024-02-01"), Some("2024-01-01")).unwrap();
        let filtered = filter(&records, &range);
        assert!(filtered.is_empty());
        assert_eq!(summarize(&filtered), PeriodSummary::default());
    }

    #[test]
    fn malformed_bound_is_rejected() {
        assert!(matches!(
            DateRange::parse(Some("01.02.2024"), None),
            Err(EngineError::InvalidDate(_))
        ));
        assert!(matches!(
            DateRange::parse(None, Some("2024-13-01")),
            Err(EngineError::InvalidDate(_))
        ));
    }
}
