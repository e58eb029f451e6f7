//! Held EUR -> PLN exchange rate and its refresh from an external provider.

use std::future::Future;

use crate::{BlobStore, EngineError, ExchangeRate, ResultEngine, storage::EXCHANGE_RATE_KEY};

/// Source of the current exchange rate (EUR -> PLN).
///
/// Implementations report transport, parse or validation problems as an
/// error. They carry no timeout of their own; callers that need one wrap
/// the returned future.
pub trait RateProvider {
    fn fetch_rate(&self) -> impl Future<Output = ResultEngine<f64>> + Send;
}

/// The exchange rate currently in effect, persisted across sessions.
#[derive(Clone, Debug)]
pub struct RateBook<S> {
    store: S,
    current: ExchangeRate,
}

impl<S: BlobStore> RateBook<S> {
    /// Loads the held rate, falling back to the default when absent or corrupt.
    pub fn load(store: S) -> Self {
        let current = match store.read(EXCHANGE_RATE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("stored exchange rate ignored: {err}");
                ExchangeRate::default()
            }),
            Ok(None) => ExchangeRate::default(),
            Err(err) => {
                tracing::warn!("stored exchange rate unreadable: {err}");
                ExchangeRate::default()
            }
        };
        Self { store, current }
    }

    #[must_use]
    pub fn current(&self) -> ExchangeRate {
        self.current
    }

    /// Replaces the held rate with a manually entered one.
    pub fn set(&mut self, rate: ExchangeRate) -> ResultEngine<()> {
        self.store
            .write(EXCHANGE_RATE_KEY, &serde_json::to_string(&rate)?)?;
        tracing::info!(%rate, "exchange rate updated");
        self.current = rate;
        Ok(())
    }

    /// Asks `provider` once for a fresh rate.
    ///
    /// The fetched value must be finite and positive. On any failure the held
    /// rate stays as it was and `RateUnavailable` carries it back to the
    /// caller.
    pub async fn refresh<P: RateProvider>(&mut self, provider: &P) -> ResultEngine<ExchangeRate> {
        let retained = self.current;
        let outcome = match provider.fetch_rate().await {
            Ok(value) => ExchangeRate::new(value).and_then(|rate| self.set(rate).map(|()| rate)),
            Err(err) => Err(err),
        };
        outcome.map_err(|err| {
            tracing::warn!(%retained, "exchange rate refresh failed: {err}");
            EngineError::RateUnavailable {
                retained,
                reason: err.to_string(),
            }
        })
    }
}
