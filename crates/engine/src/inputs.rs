//! Trip inputs: the immutable snapshot the calculation runs on.

use crate::{Currency, DEFAULT_TAX_RESIDENCY, EngineError, ExchangeRate, ResultEngine};

/// Average consumption of a loaded tractor-trailer, litres per 100 km.
pub const DEFAULT_FUEL_CONSUMPTION_L_PER_100KM: f64 = 30.0;
pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 5.00;
pub const DEFAULT_TOLL_COST_PER_KM: f64 = 0.40;
pub const DEFAULT_SERVICE_COST_PER_KM: f64 = 0.65;

/// Where the trip revenue comes from.
///
/// The figure is denominated in EUR when the owning [`TripInputs`] is in
/// EUR mode, otherwise in PLN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Revenue {
    /// Fixed freight amount for the whole trip.
    FlatAmount(f64),
    /// Rate per kilometre, multiplied by the trip distance.
    PerKmRate(f64),
}

impl Revenue {
    /// Revenue in the currency it was entered in.
    #[must_use]
    pub fn resolve(self, distance_km: f64) -> f64 {
        match self {
            Revenue::FlatAmount(amount) => amount,
            Revenue::PerKmRate(rate) => distance_km * rate,
        }
    }

    #[must_use]
    pub const fn is_per_km(self) -> bool {
        matches!(self, Revenue::PerKmRate(_))
    }

    /// The figure the user entered, regardless of mode.
    #[must_use]
    pub const fn figure(self) -> f64 {
        match self {
            Revenue::FlatAmount(value) | Revenue::PerKmRate(value) => value,
        }
    }
}

impl Default for Revenue {
    fn default() -> Self {
        Revenue::FlatAmount(0.0)
    }
}

/// Everything needed to price a single trip.
///
/// Missing numbers are represented as `0.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct TripInputs {
    pub distance_km: f64,
    pub revenue: Revenue,
    /// Revenue figure is in EUR rather than PLN.
    pub is_euro_mode: bool,
    pub exchange_rate: ExchangeRate,
    pub fuel_consumption_l_per_100km: f64,
    pub fuel_price_per_liter: f64,
    pub toll_cost_per_km: f64,
    pub service_cost_per_km: f64,
    pub tax_residency: String,
}

impl Default for TripInputs {
    fn default() -> Self {
        Self {
            distance_km: 0.0,
            revenue: Revenue::default(),
            is_euro_mode: false,
            exchange_rate: ExchangeRate::default(),
            fuel_consumption_l_per_100km: DEFAULT_FUEL_CONSUMPTION_L_PER_100KM,
            fuel_price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
            toll_cost_per_km: DEFAULT_TOLL_COST_PER_KM,
            service_cost_per_km: DEFAULT_SERVICE_COST_PER_KM,
            tax_residency: DEFAULT_TAX_RESIDENCY.to_string(),
        }
    }
}

impl TripInputs {
    /// Currency the revenue figure is denominated in.
    #[must_use]
    pub const fn revenue_currency(&self) -> Currency {
        Currency::for_euro_mode(self.is_euro_mode)
    }

    /// Rejects negative or non-finite numbers.
    pub fn validate_numbers(&self) -> ResultEngine<()> {
        let fields = [
            ("distance", self.distance_km),
            ("revenue", self.revenue.figure()),
            ("fuel consumption", self.fuel_consumption_l_per_100km),
            ("fuel price", self.fuel_price_per_liter),
            ("toll cost", self.toll_cost_per_km),
            ("service cost", self.service_cost_per_km),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidAmount(format!(
                    "{label} must be a finite number >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// A trip can only be saved with a distance and a revenue figure.
    pub fn require_saveable(&self) -> ResultEngine<()> {
        self.validate_numbers()?;
        if self.distance_km <= 0.0 {
            return Err(EngineError::InvalidTrip("distance is required".to_string()));
        }
        if self.revenue.figure() <= 0.0 {
            let what = if self.revenue.is_per_km() {
                "rate per km"
            } else {
                "freight amount"
            };
            return Err(EngineError::InvalidTrip(format!("{what} is required")));
        }
        Ok(())
    }
}
