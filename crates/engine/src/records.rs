//! Persisted trip history records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Currency, TripInputs, migrate::StoredTrip};

/// Profit snapshot taken when the trip was saved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripSummary {
    /// Always in the base currency.
    pub total_net_profit: f64,
    /// Currency the trip was displayed in when it was saved.
    pub currency: Currency,
}

/// One saved trip. Immutable once created.
///
/// The JSON shape is the historical one (`timestamp`, `date`,
/// `inputs.freightAmount`, ...); older shapes are upgraded on
/// deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTrip", into = "StoredTrip")]
pub struct TripRecord {
    pub id: String,
    pub created_at_ms: i64,
    /// User-assigned logical date.
    pub trip_date: Option<NaiveDate>,
    pub inputs: TripInputs,
    pub summary: TripSummary,
}

impl TripRecord {
    /// Date used for filtering and display: the trip date, or the UTC day the
    /// record was created.
    #[must_use]
    pub fn effective_date(&self) -> NaiveDate {
        self.trip_date
            .unwrap_or_else(|| created_date(self.created_at_ms))
    }
}

/// UTC calendar day of an epoch-milliseconds instant.
#[must_use]
pub fn created_date(created_at_ms: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(created_at_ms)
        .unwrap_or_default()
        .date_naive()
}
