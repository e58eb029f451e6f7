//! Freight trip profitability engine.
//!
//! Prices trips from distance, revenue and running costs, keeps a history of
//! saved trips in a [`BlobStore`] and aggregates it over date ranges. Access
//! goes through a principal directory: nothing but login works until a
//! principal is present.
//!
//! ```rust
//! use engine::{Engine, MemoryBlobStore, Revenue, TripInputs};
//!
//! let engine = Engine::builder().store(MemoryBlobStore::new()).build().unwrap();
//! engine.login("admin", "admin123").unwrap();
//!
//! let inputs = TripInputs {
//!     distance_km: 500.0,
//!     revenue: Revenue::FlatAmount(2000.0),
//!     ..TripInputs::default()
//! };
//! let results = engine.calculate(&inputs).unwrap();
//! assert!((results.total_net_profit - 587.25).abs() < 1e-9);
//! ```

use chrono::{DateTime, NaiveDate, Utc};

pub use calculation::{CalculationResults, compute};
pub use currency::{Currency, DEFAULT_EXCHANGE_RATE, ExchangeRate, to_base, to_display};
pub use error::EngineError;
pub use history::{DateRange, PeriodSummary, filter, summarize};
pub use inputs::{
    DEFAULT_FUEL_CONSUMPTION_L_PER_100KM, DEFAULT_FUEL_PRICE_PER_LITER,
    DEFAULT_SERVICE_COST_PER_KM, DEFAULT_TOLL_COST_PER_KM, Revenue, TripInputs,
};
pub use rates::{RateBook, RateProvider};
pub use records::{TripRecord, TripSummary};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use tax::{DEFAULT_TAX_RESIDENCY, TaxRate, TaxTable};
pub use trips::{TripStore, next_trip_id};
pub use users::{ADMIN_USERNAME, Principal, Role, UserDirectory, require_admin};

mod calculation;
mod currency;
mod error;
mod history;
mod inputs;
mod migrate;
mod rates;
mod records;
pub mod storage;
mod tax;
mod trips;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Everything the calculator does, behind the login gate.
#[derive(Debug)]
pub struct Engine<S> {
    trips: TripStore<S>,
    users: UserDirectory<S>,
    rates: RateBook<S>,
    tax_table: TaxTable,
}

impl<S: BlobStore + Clone> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn tax_table(&self) -> &TaxTable {
        &self.tax_table
    }

    pub fn login(&self, username: &str, password: &str) -> ResultEngine<Principal> {
        self.users.login(username, password)
    }

    pub fn logout(&self) -> ResultEngine<()> {
        self.users.logout()
    }

    pub fn current_principal(&self) -> ResultEngine<Option<Principal>> {
        self.users.current_principal()
    }

    fn require_principal(&self) -> ResultEngine<Principal> {
        self.users
            .current_principal()?
            .ok_or_else(|| EngineError::Forbidden("login required".to_string()))
    }

    fn require_admin(&self) -> ResultEngine<Principal> {
        let principal = self.require_principal()?;
        require_admin(&principal)?;
        Ok(principal)
    }

    pub fn list_principals(&self) -> ResultEngine<Vec<Principal>> {
        self.require_admin()?;
        self.users.list_principals()
    }

    pub fn create_principal(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<Principal> {
        self.require_admin()?;
        self.users.create_principal(username, password, role)
    }

    pub fn delete_principal(&self, username: &str) -> ResultEngine<()> {
        self.require_admin()?;
        self.users.delete_principal(username)
    }

    /// Prices `inputs` with the rate of their tax residency.
    pub fn calculate(&self, inputs: &TripInputs) -> ResultEngine<CalculationResults> {
        self.require_principal()?;
        inputs.validate_numbers()?;
        let tax_rate = self.tax_table.rate(&inputs.tax_residency)?;
        let results = compute(inputs, tax_rate);
        tracing::debug!(
            distance_km = inputs.distance_km,
            net_profit = results.total_net_profit,
            "trip priced"
        );
        Ok(results)
    }

    /// Validates, prices and appends a new history record.
    pub fn save_trip(
        &self,
        inputs: TripInputs,
        trip_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ResultEngine<TripRecord> {
        self.require_principal()?;
        inputs.require_saveable()?;
        let results = self.calculate(&inputs)?;

        let now_ms = now.timestamp_millis();
        let id = self.trips.next_id(now_ms);
        let record = TripRecord {
            id,
            created_at_ms: now_ms,
            trip_date,
            summary: TripSummary {
                total_net_profit: results.total_net_profit,
                currency: Currency::for_euro_mode(inputs.is_euro_mode),
            },
            inputs,
        };
        self.trips.append(record.clone())?;
        Ok(record)
    }

    /// Saved trips, newest first.
    pub fn trips(&self) -> ResultEngine<Vec<TripRecord>> {
        self.require_principal()?;
        Ok(self.trips.load_all())
    }

    /// A saved trip, its inputs upgraded to the current model for re-editing.
    pub fn load_trip(&self, id: &str) -> ResultEngine<TripRecord> {
        self.require_principal()?;
        self.trips.find(id)
    }

    pub fn delete_trip(&self, id: &str) -> ResultEngine<bool> {
        self.require_principal()?;
        self.trips.delete_by_id(id)
    }

    /// Trips in `range` together with their totals.
    pub fn history(&self, range: &DateRange) -> ResultEngine<(Vec<TripRecord>, PeriodSummary)> {
        self.require_principal()?;
        let filtered = filter(&self.trips.load_all(), range);
        let summary = summarize(&filtered);
        Ok((filtered, summary))
    }

    #[must_use]
    pub fn exchange_rate(&self) -> ExchangeRate {
        self.rates.current()
    }

    pub fn set_exchange_rate(&mut self, rate: ExchangeRate) -> ResultEngine<()> {
        self.require_principal()?;
        self.rates.set(rate)
    }

    /// Fetches a fresh rate from `provider`; the held rate survives failures.
    pub async fn refresh_rate<P: RateProvider>(
        &mut self,
        provider: &P,
    ) -> ResultEngine<ExchangeRate> {
        self.require_principal()?;
        self.rates.refresh(provider).await
    }
}

/// The builder for `Engine`
#[derive(Debug)]
pub struct EngineBuilder<S> {
    store: Option<S>,
    tax_table: TaxTable,
}

impl<S> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            tax_table: TaxTable::default(),
        }
    }
}

impl<S: BlobStore + Clone> EngineBuilder<S> {
    /// Pass the required blob store
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    pub fn tax_table(mut self, tax_table: TaxTable) -> EngineBuilder<S> {
        self.tax_table = tax_table;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Storage("missing blob store".to_string()))?;
        Ok(Engine {
            trips: TripStore::new(store.clone()),
            users: UserDirectory::new(store.clone()),
            rates: RateBook::load(store),
            tax_table: self.tax_table,
        })
    }
}
