//! Corporate income tax rates per tax residency.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Residency used when nothing else is known.
pub const DEFAULT_TAX_RESIDENCY: &str = "Polska";

/// Tax rate of a single jurisdiction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaxRate {
    /// Fraction of positive earnings paid as tax, in `[0, 1)`.
    pub rate: f64,
    pub flag: &'static str,
}

const STANDARD_RATES: &[(&str, TaxRate)] = &[
    ("Polska", TaxRate { rate: 0.19, flag: "🇵🇱" }),
    ("Czechy", TaxRate { rate: 0.21, flag: "🇨🇿" }),
    ("Słowacja", TaxRate { rate: 0.21, flag: "🇸🇰" }),
    ("Litwa", TaxRate { rate: 0.16, flag: "🇱🇹" }),
    ("Niemcy", TaxRate { rate: 0.30, flag: "🇩🇪" }),
    ("Holandia", TaxRate { rate: 0.258, flag: "🇳🇱" }),
    ("Ukraina", TaxRate { rate: 0.18, flag: "🇺🇦" }),
];

/// Static mapping from jurisdiction name to tax rate.
#[derive(Clone, Copy, Debug)]
pub struct TaxTable {
    entries: &'static [(&'static str, TaxRate)],
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            entries: STANDARD_RATES,
        }
    }
}

impl TaxTable {
    /// Exact lookup by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TaxRate> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, rate)| *rate)
    }

    /// Rate fraction for `name`, `KeyNotFound` if the jurisdiction is unknown.
    pub fn rate(&self, name: &str) -> ResultEngine<f64> {
        self.get(name)
            .map(|entry| entry.rate)
            .ok_or_else(|| EngineError::KeyNotFound(format!("tax residency {name}")))
    }

    /// Maps free-form user input (any case, with or without accents) to the
    /// canonical jurisdiction name.
    pub fn resolve(&self, input: &str) -> ResultEngine<&'static str> {
        if let Some((key, _)) = self.entries.iter().find(|(key, _)| *key == input.trim()) {
            return Ok(key);
        }
        let wanted = fold_key(input);
        self.entries
            .iter()
            .find(|(key, _)| fold_key(key) == wanted)
            .map(|(key, _)| *key)
            .ok_or_else(|| EngineError::KeyNotFound(format!("tax residency {}", input.trim())))
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, TaxRate)> + '_ {
        self.entries.iter().map(|(key, rate)| (*key, *rate))
    }
}

fn fold_key(input: &str) -> String {
    input
        .trim()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
