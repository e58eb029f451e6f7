use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// EUR -> PLN rate used when nothing better is known.
pub const DEFAULT_EXCHANGE_RATE: f64 = 4.30;

/// Currency a trip figure is denominated or displayed in.
///
/// All computed amounts live in the base currency (`PLN`). `EUR` is the
/// secondary currency: revenue may be entered in it and results may be
/// displayed in it, converted with an [`ExchangeRate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Pln,
    Eur,
}

impl Currency {
    /// The currency every engine amount is expressed in.
    pub const BASE: Currency = Currency::Pln;

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Pln => "PLN",
            Currency::Eur => "EUR",
        }
    }

    /// Symbol appended to formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Pln => "zł",
            Currency::Eur => "€",
        }
    }

    /// Display currency for a trip entered in EUR mode or not.
    #[must_use]
    pub const fn for_euro_mode(is_euro_mode: bool) -> Self {
        if is_euro_mode {
            Currency::Eur
        } else {
            Currency::Pln
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLN" => Ok(Currency::Pln),
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Secondary-to-base conversion rate (`EUR * rate = PLN`).
///
/// Always finite and strictly positive; the only way to build one is
/// [`ExchangeRate::new`], which is also applied on deserialization.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Validates and wraps a rate.
    ///
    /// ```rust
    /// use engine::ExchangeRate;
    ///
    /// assert!(ExchangeRate::new(4.3).is_ok());
    /// assert!(ExchangeRate::new(0.0).is_err());
    /// assert!(ExchangeRate::new(f64::NAN).is_err());
    /// ```
    pub fn new(value: f64) -> ResultEngine<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidAmount(format!(
                "exchange rate must be a finite number > 0, got {value}"
            )))
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self(DEFAULT_EXCHANGE_RATE)
    }
}

impl TryFrom<f64> for ExchangeRate {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExchangeRate> for f64 {
    fn from(value: ExchangeRate) -> Self {
        value.0
    }
}

impl core::fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Converts an amount denominated in `source` into the base currency.
#[must_use]
pub fn to_base(amount: f64, source: Currency, rate: ExchangeRate) -> f64 {
    match source {
        Currency::Pln => amount,
        Currency::Eur => amount * rate.value(),
    }
}

/// Converts a base-currency amount into `target` for display.
///
/// Inverse of [`to_base`].
#[must_use]
pub fn to_display(amount_base: f64, target: Currency, rate: ExchangeRate) -> f64 {
    match target {
        Currency::Pln => amount_base,
        Currency::Eur => amount_base / rate.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_round_trip_through_strings() {
        assert_eq!(Currency::try_from("pln").unwrap(), Currency::Pln);
        assert_eq!(Currency::try_from(" EUR ").unwrap(), Currency::Eur);
        assert!(Currency::try_from("USD").is_err());
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn rate_rejects_non_positive_values() {
        assert!(ExchangeRate::new(-1.0).is_err());
        assert!(ExchangeRate::new(f64::INFINITY).is_err());
        assert_eq!(ExchangeRate::new(4.3521).unwrap().to_string(), "4.3521");
    }

    #[test]
    fn rate_deserialization_is_validated() {
        let rate: ExchangeRate = serde_json::from_str("4.3").unwrap();
        assert_eq!(rate.value(), 4.3);
        assert!(serde_json::from_str::<ExchangeRate>("0").is_err());
    }

    #[test]
    fn display_conversion_inverts_base_conversion() {
        let rate = ExchangeRate::new(4.30).unwrap();
        let base = to_base(500.0, Currency::Eur, rate);
        assert!((base - 2150.0).abs() < 1e-9);
        assert!((to_display(base, Currency::Eur, rate) - 500.0).abs() < 1e-9);
        assert_eq!(to_display(base, Currency::Pln, rate), base);
    }
}
