//! Persisted trip shape and its upgrade to the current model.
//!
//! Early releases stored only a flat freight amount and no fuel consumption;
//! the per-km revenue mode and the consumption field were added later. Form
//! fields that were left empty were written as `""`. Everything is upgraded
//! here, once, when a record is deserialized. Loading never writes.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    Currency, DEFAULT_FUEL_CONSUMPTION_L_PER_100KM, DEFAULT_TAX_RESIDENCY, ExchangeRate, Revenue,
    TripInputs, TripRecord, TripSummary,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredTrip {
    id: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default)]
    inputs: StoredInputs,
    #[serde(default)]
    summary: StoredSummary,
}

/// Profit snapshot as written. A form with a cleared field produced a NaN
/// profit, which JSON stores as `null`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredSummary {
    #[serde(default, deserialize_with = "lenient_number")]
    total_net_profit: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredInputs {
    #[serde(default, deserialize_with = "lenient_number")]
    distance: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    freight_amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    rate_per_km: Option<f64>,
    #[serde(default)]
    is_rate_per_km_mode: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    custom_fuel_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    custom_toll_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    custom_service_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    fuel_consumption: Option<f64>,
    #[serde(default)]
    tax_residency: Option<String>,
    #[serde(default)]
    is_euro_mode: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    exchange_rate: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

/// Accepts a number, a numeric string, `""` or `null`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<LenientNumber>::deserialize(deserializer)? {
        None => None,
        Some(LenientNumber::Number(value)) => Some(value),
        Some(LenientNumber::Text(text)) => text.trim().parse::<f64>().ok(),
    };
    Ok(value.filter(|value| value.is_finite()))
}

/// Upgrades stored inputs of any release to the current model.
pub(crate) fn normalize_inputs(raw: StoredInputs) -> TripInputs {
    let distance_km = raw.distance.unwrap_or(0.0);
    let revenue = if raw.is_rate_per_km_mode.unwrap_or(false) {
        Revenue::PerKmRate(raw.rate_per_km.unwrap_or(0.0))
    } else {
        Revenue::FlatAmount(raw.freight_amount.unwrap_or(0.0))
    };
    let exchange_rate = raw
        .exchange_rate
        .and_then(|rate| ExchangeRate::new(rate).ok())
        .unwrap_or_default();
    let tax_residency = raw
        .tax_residency
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TAX_RESIDENCY.to_string());

    TripInputs {
        distance_km,
        revenue,
        is_euro_mode: raw.is_euro_mode.unwrap_or(false),
        exchange_rate,
        fuel_consumption_l_per_100km: raw
            .fuel_consumption
            .unwrap_or(DEFAULT_FUEL_CONSUMPTION_L_PER_100KM),
        fuel_price_per_liter: raw.custom_fuel_price.unwrap_or(0.0),
        toll_cost_per_km: raw.custom_toll_cost.unwrap_or(0.0),
        service_cost_per_km: raw.custom_service_cost.unwrap_or(0.0),
        tax_residency,
    }
}

fn denormalize_inputs(inputs: TripInputs) -> StoredInputs {
    let (freight_amount, rate_per_km) = match inputs.revenue {
        Revenue::FlatAmount(amount) => (Some(amount), None),
        Revenue::PerKmRate(rate) => (None, Some(rate)),
    };
    StoredInputs {
        distance: Some(inputs.distance_km),
        freight_amount,
        rate_per_km,
        is_rate_per_km_mode: Some(inputs.revenue.is_per_km()),
        custom_fuel_price: Some(inputs.fuel_price_per_liter),
        custom_toll_cost: Some(inputs.toll_cost_per_km),
        custom_service_cost: Some(inputs.service_cost_per_km),
        fuel_consumption: Some(inputs.fuel_consumption_l_per_100km),
        tax_residency: Some(inputs.tax_residency),
        is_euro_mode: Some(inputs.is_euro_mode),
        exchange_rate: Some(inputs.exchange_rate.value()),
    }
}

impl From<StoredTrip> for TripRecord {
    fn from(raw: StoredTrip) -> Self {
        let trip_date = raw
            .date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
            .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok());
        let inputs = normalize_inputs(raw.inputs);
        let currency = raw
            .summary
            .currency
            .as_deref()
            .and_then(|code| Currency::try_from(code).ok())
            .unwrap_or_else(|| inputs.revenue_currency());
        TripRecord {
            id: raw.id,
            created_at_ms: raw.timestamp,
            trip_date,
            inputs,
            summary: TripSummary {
                total_net_profit: raw.summary.total_net_profit.unwrap_or(0.0),
                currency,
            },
        }
    }
}

impl From<TripRecord> for StoredTrip {
    fn from(record: TripRecord) -> Self {
        StoredTrip {
            id: record.id,
            timestamp: record.created_at_ms,
            date: record
                .trip_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            inputs: denormalize_inputs(record.inputs),
            summary: StoredSummary {
                total_net_profit: Some(record.summary.total_net_profit),
                currency: Some(record.summary.currency.code().to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_RELEASE: &str = r#"{
        "id": "1704880000000",
        "timestamp": 1704880000000,
        "date": "2024-01-10",
        "inputs": {
            "distance": 500,
            "freightAmount": 2000,
            "customFuelPrice": 5,
            "customTollCost": 0.4,
            "customServiceCost": 0.65,
            "taxResidency": "Polska",
            "isEuroMode": false,
            "exchangeRate": 4.3
        },
        "summary": { "totalNetProfit": 587.25, "currency": "PLN" }
    }"#;

    #[test]
    fn first_release_record_gets_defaults() {
        let record: TripRecord = serde_json::from_str(FIRST_RELEASE).unwrap();
        assert_eq!(record.inputs.revenue, Revenue::FlatAmount(2000.0));
        assert_eq!(
            record.inputs.fuel_consumption_l_per_100km,
            DEFAULT_FUEL_CONSUMPTION_L_PER_100KM
        );
        assert_eq!(record.trip_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(record.summary.currency, Currency::Pln);
    }

    #[test]
    fn empty_form_fields_are_absent() {
        let json = r#"{
            "id": "1",
            "timestamp": 0,
            "date": "",
            "inputs": {
                "distance": "",
                "freightAmount": "",
                "ratePerKm": "4.5",
                "isRatePerKmMode": true,
                "customFuelPrice": 5,
                "customTollCost": 0.4,
                "customServiceCost": 0.65,
                "fuelConsumption": 28,
                "taxResidency": "Niemcy",
                "isEuroMode": true,
                "exchangeRate": 0
            },
            "summary": { "totalNetProfit": 0, "currency": "EUR" }
        }"#;
        let record: TripRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.trip_date, None);
        assert_eq!(record.inputs.distance_km, 0.0);
        assert_eq!(record.inputs.revenue, Revenue::PerKmRate(4.5));
        assert_eq!(record.inputs.fuel_consumption_l_per_100km, 28.0);
        assert_eq!(record.inputs.exchange_rate, ExchangeRate::default());
    }

    #[test]
    fn null_profit_and_unknown_currency_still_load() {
        let json = r#"{
            "id": "1704880000001",
            "timestamp": 1704880000001,
            "inputs": { "distance": 500, "freightAmount": 2000, "isEuroMode": true },
            "summary": { "totalNetProfit": null, "currency": "USD" }
        }"#;
        let record: TripRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.summary.total_net_profit, 0.0);
        assert_eq!(record.summary.currency, Currency::Eur);

        let bare: TripRecord = serde_json::from_str(r#"{"id":"7","timestamp":0}"#).unwrap();
        assert_eq!(bare.summary.total_net_profit, 0.0);
        assert_eq!(bare.inputs.tax_residency, DEFAULT_TAX_RESIDENCY);
    }

    #[test]
    fn upgraded_shape_is_written_on_serialize() {
        let record: TripRecord = serde_json::from_str(FIRST_RELEASE).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["inputs"]["isRatePerKmMode"], false);
        assert_eq!(value["inputs"]["fuelConsumption"], 30.0);
        assert_eq!(value["date"], "2024-01-10");
        assert!(value["inputs"].get("ratePerKm").is_none());

        let again: TripRecord = serde_json::from_value(value).unwrap();
        assert_eq!(again, record);
    }
}
