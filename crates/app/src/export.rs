//! CSV export of trip history.

use std::{fs, path::Path};

use csv::Writer;
use engine::TripRecord;
use serde::Serialize;

use crate::error::{AppError, Result};

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    id: &'a str,
    distance_km: f64,
    net_profit_pln: f64,
    currency: &'static str,
    tax_residency: &'a str,
}

/// Serializes `records` in the given order, one row per trip.
pub fn history_csv(records: &[TripRecord]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    for record in records {
        writer.serialize(ExportRow {
            date: record.effective_date().format("%Y-%m-%d").to_string(),
            id: &record.id,
            distance_km: record.inputs.distance_km,
            net_profit_pln: record.summary.total_net_profit,
            currency: record.summary.currency.code(),
            tax_residency: &record.inputs.tax_residency,
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| AppError::Io(err.into_error()))
}

pub fn write_history_csv(path: &Path, records: &[TripRecord]) -> Result<()> {
    fs::write(path, history_csv(records)?)?;
    tracing::info!(path = %path.display(), rows = records.len(), "history exported");
    Ok(())
}
