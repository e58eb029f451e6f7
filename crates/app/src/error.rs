use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}
