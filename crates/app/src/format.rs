//! Display formatting. Amounts arrive in the base currency and are converted
//! to the display currency here, at the last moment.

use engine::{Currency, ExchangeRate, to_display};

/// `2150` PLN shown in EUR at 4.30 -> `"500.00 EUR"`.
pub fn money(amount_base: f64, currency: Currency, rate: ExchangeRate) -> String {
    let amount = to_display(amount_base, currency, rate);
    format!("{amount:.2} {currency}")
}

/// Per-km figures keep up to four decimals, at least two.
pub fn per_km(amount_base: f64, currency: Currency, rate: ExchangeRate) -> String {
    let amount = to_display(amount_base, currency, rate);
    let mut text = format!("{amount:.4}");
    while text.ends_with('0') && text.len() - text.find('.').unwrap_or(text.len()) > 3 {
        text.pop();
    }
    format!("{text} {currency}/km")
}

/// Tax rate as a percentage, `0.258` -> `"25.8%"`.
pub fn percent(rate: f64) -> String {
    let text = format!("{:.2}", rate * 100.0);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}%")
}
