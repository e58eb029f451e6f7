//! Trip history collection.
//!
//! The whole newest-first collection is the unit of persistence: every
//! mutation rewrites it under [`TRIP_HISTORY_KEY`]. Mutations work on the
//! stored JSON values, so records a mutation does not touch are written back
//! exactly as they were read.

use serde_json::Value;

use crate::{BlobStore, EngineError, ResultEngine, TripRecord, storage::TRIP_HISTORY_KEY};

/// Ordered store of saved trips over a [`BlobStore`].
#[derive(Clone, Debug)]
pub struct TripStore<S> {
    store: S,
}

impl<S: BlobStore> TripStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored records as raw JSON, newest first.
    ///
    /// Missing, unreadable or malformed data loads as an empty collection;
    /// the next mutation overwrites it.
    fn load_raw(&self) -> Vec<Value> {
        let raw = match self.store.read(TRIP_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!("trip history unreadable, starting empty: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("trip history malformed, starting empty: {err}");
                Vec::new()
            }
        }
    }

    fn write_raw(&self, records: &[Value]) -> ResultEngine<()> {
        self.store
            .write(TRIP_HISTORY_KEY, &serde_json::to_string(records)?)
    }

    /// Full collection, newest first, upgraded to the current model.
    ///
    /// A record that cannot be read is skipped here but kept in storage.
    pub fn load_all(&self) -> Vec<TripRecord> {
        self.load_raw()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!("skipping unreadable trip record: {err}");
                    None
                }
            })
            .collect()
    }

    /// Looks a record up by id.
    pub fn find(&self, id: &str) -> ResultEngine<TripRecord> {
        self.load_all()
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("trip {id}")))
    }

    /// Id for a record created at `now_ms`, unique among the stored ones.
    #[must_use]
    pub fn next_id(&self, now_ms: i64) -> String {
        let raw = self.load_raw();
        next_trip_id(now_ms, raw.iter().filter_map(stored_id))
    }

    /// Prepends `record`. A duplicate id means the id policy is broken and is
    /// reported as `ExistingKey`; nothing is written in that case.
    pub fn append(&self, record: TripRecord) -> ResultEngine<()> {
        let mut records = self.load_raw();
        if records.iter().any(|raw| stored_id(raw) == Some(record.id.as_str())) {
            return Err(EngineError::ExistingKey(format!("trip {}", record.id)));
        }
        tracing::info!(id = %record.id, "saving trip");
        records.insert(0, serde_json::to_value(record)?);
        self.write_raw(&records)
    }

    /// Removes the record with `id`. Returns whether anything was removed.
    pub fn delete_by_id(&self, id: &str) -> ResultEngine<bool> {
        let mut records = self.load_raw();
        let before = records.len();
        records.retain(|raw| stored_id(raw) != Some(id));
        if records.len() == before {
            return Ok(false);
        }
        tracing::info!(id, "deleting trip");
        self.write_raw(&records)?;
        Ok(true)
    }

    /// Rewrites the whole collection in the current shape.
    pub fn replace_all(&self, records: &[TripRecord]) -> ResultEngine<()> {
        let payload = serde_json::to_string(records)?;
        self.store.write(TRIP_HISTORY_KEY, &payload)
    }
}

fn stored_id(raw: &Value) -> Option<&str> {
    raw.get("id").and_then(Value::as_str)
}

/// Creation-timestamp-derived id, bumped past every numeric id already in
/// use so ids stay unique and increasing even within one millisecond.
#[must_use]
pub fn next_trip_id<'a>(now_ms: i64, existing: impl IntoIterator<Item = &'a str>) -> String {
    let newest = existing
        .into_iter()
        .filter_map(|id| id.parse::<i64>().ok())
        .max();
    match newest {
        Some(newest) if newest >= now_ms => (newest + 1).to_string(),
        _ => now_ms.to_string(),
    }
}
