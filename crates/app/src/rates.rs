//! Exchange-rate providers backed by the National Bank of Poland.

use std::time::Duration;

use engine::{EngineError, RateProvider, ResultEngine};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct NbpTable {
    rates: Vec<NbpRate>,
}

#[derive(Debug, Deserialize)]
struct NbpRate {
    mid: f64,
}

/// EUR mid rate from NBP table A.
#[derive(Debug, Clone)]
pub struct NbpRateProvider {
    endpoint: Url,
    http: reqwest::Client,
}

impl NbpRateProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = Url::parse(base_url)
            .and_then(|url| url.join("api/exchangerates/rates/a/eur/?format=json"))
            .map_err(|err| AppError::InvalidSetting(format!("rate.base_url: {err}")))?;
        Ok(Self {
            endpoint,
            http: reqwest::Client::new(),
        })
    }
}

impl RateProvider for NbpRateProvider {
    async fn fetch_rate(&self) -> ResultEngine<f64> {
        tracing::debug!(endpoint = %self.endpoint, "fetching exchange rate");
        let table = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| EngineError::Provider(err.to_string()))?
            .json::<NbpTable>()
            .await
            .map_err(|err| EngineError::Provider(format!("unexpected response: {err}")))?;
        table
            .rates
            .first()
            .map(|rate| rate.mid)
            .ok_or_else(|| EngineError::Provider("empty rate table".to_string()))
    }
}

/// Bounds every fetch of the inner provider.
#[derive(Debug, Clone)]
pub struct WithTimeout<P> {
    inner: P,
    limit: Duration,
}

impl<P> WithTimeout<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl<P: RateProvider + Sync> RateProvider for WithTimeout<P> {
    async fn fetch_rate(&self) -> ResultEngine<f64> {
        tokio::time::timeout(self.limit, self.inner.fetch_rate())
            .await
            .map_err(|_| {
                EngineError::Provider(format!("no answer within {:?}", self.limit))
            })?
    }
}
