//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidTrip`] thrown when a trip is saved without distance or revenue.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] thrown when an id or username is already taken.
//! - [`RateUnavailable`] thrown when an exchange-rate refresh fails.
//!
//!  [`InvalidTrip`]: EngineError::InvalidTrip
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`RateUnavailable`]: EngineError::RateUnavailable
use thiserror::Error;

use crate::ExchangeRate;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid trip: {0}")]
    InvalidTrip(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Rate provider error: {0}")]
    Provider(String),
    #[error("Exchange rate unavailable ({reason}), keeping {retained}")]
    RateUnavailable {
        retained: ExchangeRate,
        reason: String,
    },
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" is protected and cannot be deleted")]
    ProtectedPrincipal(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidTrip(a), Self::InvalidTrip(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::Provider(a), Self::Provider(b)) => a == b,
            (
                Self::RateUnavailable {
                    retained: a,
                    reason: ra,
                },
                Self::RateUnavailable {
                    retained: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InvalidPrincipal(a), Self::InvalidPrincipal(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ProtectedPrincipal(a), Self::ProtectedPrincipal(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.to_string() == b.to_string(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
