//! Trip profitability calculation.
//!
//! [`compute`] is pure: it reads a [`TripInputs`] snapshot and a resolved tax
//! rate and returns a fresh [`CalculationResults`]. No rounding happens
//! here; formatting is left to whoever displays the numbers.

use crate::{TripInputs, currency::to_base};

/// Derived figures for one trip, all in the base currency.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalculationResults {
    pub total_fuel_cost: f64,
    pub total_toll_cost: f64,
    pub total_service_cost: f64,
    /// Fuel + toll + service.
    pub total_operational_cost: f64,
    pub total_revenue: f64,
    pub earnings_before_tax: f64,
    /// Never negative; zero on a loss.
    pub tax_cost: f64,
    pub total_net_profit: f64,
    pub net_profit_per_km: f64,
    /// Breakeven revenue.
    pub suggested_price: f64,
}

impl CalculationResults {
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.total_net_profit >= 0.0
    }
}

/// Prices a trip.
///
/// `tax_rate` is the fraction charged on positive earnings before tax and
/// must lie in `[0, 1)`.
#[must_use]
pub fn compute(inputs: &TripInputs, tax_rate: f64) -> CalculationResults {
    let distance = inputs.distance_km;

    let revenue_raw = inputs.revenue.resolve(distance);
    // A true zero stays a true zero.
    let total_revenue = if revenue_raw > 0.0 {
        to_base(revenue_raw, inputs.revenue_currency(), inputs.exchange_rate)
    } else {
        revenue_raw
    };

    let total_fuel_cost =
        distance * (inputs.fuel_consumption_l_per_100km / 100.0) * inputs.fuel_price_per_liter;
    let total_toll_cost = distance * inputs.toll_cost_per_km;
    let total_service_cost = distance * inputs.service_cost_per_km;
    let total_operational_cost = total_fuel_cost + total_toll_cost + total_service_cost;

    let earnings_before_tax = total_revenue - total_operational_cost;
    let tax_cost = if earnings_before_tax > 0.0 {
        earnings_before_tax * tax_rate
    } else {
        0.0
    };
    let total_net_profit = earnings_before_tax - tax_cost;
    let net_profit_per_km = if distance > 0.0 {
        total_net_profit / distance
    } else {
        0.0
    };

    CalculationResults {
        total_fuel_cost,
        total_toll_cost,
        total_service_cost,
        total_operational_cost,
        total_revenue,
        earnings_before_tax,
        tax_cost,
        total_net_profit,
        net_profit_per_km,
        suggested_price: total_operational_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExchangeRate, Revenue};

    const EPS: f64 = 1e-9;

    fn scenario_a() -> TripInputs {
        TripInputs {
            distance_km: 500.0,
            revenue: Revenue::FlatAmount(2000.0),
            fuel_consumption_l_per_100km: 30.0,
            fuel_price_per_liter: 5.0,
            toll_cost_per_km: 0.40,
            service_cost_per_km: 0.65,
            ..TripInputs::default()
        }
    }

    #[test]
    fn flat_freight_in_pln() {
        let r = compute(&scenario_a(), 0.19);
        assert!((r.total_fuel_cost - 750.0).abs() < EPS);
        assert!((r.total_toll_cost - 200.0).abs() < EPS);
        assert!((r.total_service_cost - 325.0).abs() < EPS);
        assert!((r.total_operational_cost - 1275.0).abs() < EPS);
        assert!((r.earnings_before_tax - 725.0).abs() < EPS);
        assert!((r.tax_cost - 137.75).abs() < EPS);
        assert!((r.total_net_profit - 587.25).abs() < EPS);
        assert!((r.net_profit_per_km - 1.1745).abs() < EPS);
        assert_eq!(r.suggested_price, r.total_operational_cost);
    }

    #[test]
    fn per_km_rate_matches_flat_freight() {
        let inputs = TripInputs {
            revenue: Revenue::PerKmRate(4.0),
            ..scenario_a()
        };
        assert_eq!(compute(&inputs, 0.19), compute(&scenario_a(), 0.19));
    }

    #[test]
    fn loss_is_never_taxed() {
        let inputs = TripInputs {
            distance_km: 100.0,
            revenue: Revenue::FlatAmount(50.0),
            ..scenario_a()
        };
        let r = compute(&inputs, 0.19);
        assert!(r.earnings_before_tax < 0.0);
        assert_eq!(r.tax_cost, 0.0);
        assert_eq!(r.total_net_profit, r.earnings_before_tax);
        assert!(!r.is_profitable());
    }

    #[test]
    fn euro_freight_is_converted_to_pln() {
        let inputs = TripInputs {
            revenue: Revenue::FlatAmount(500.0),
            is_euro_mode: true,
            exchange_rate: ExchangeRate::new(4.30).unwrap(),
            ..scenario_a()
        };
        let r = compute(&inputs, 0.19);
        assert!((r.total_revenue - 2150.0).abs() < EPS);
    }

    #[test]
    fn zero_distance_gives_zero_profit_per_km() {
        let inputs = TripInputs {
            distance_km: 0.0,
            revenue: Revenue::FlatAmount(1000.0),
            ..TripInputs::default()
        };
        let r = compute(&inputs, 0.19);
        assert_eq!(r.net_profit_per_km, 0.0);
        assert_eq!(r.total_operational_cost, 0.0);
    }

    #[test]
    fn zero_revenue_in_euro_mode_stays_zero() {
        let inputs = TripInputs {
            revenue: Revenue::FlatAmount(0.0),
            is_euro_mode: true,
            ..scenario_a()
        };
        assert_eq!(compute(&inputs, 0.19).total_revenue, 0.0);
    }
}
