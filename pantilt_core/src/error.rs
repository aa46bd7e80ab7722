use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TrackerError {
    #[error("motion detector error: {0}")]
    Detector(String),
    #[error("actuator error: {0}")]
    Actuator(String),
    #[error("actuator fault: {0}")]
    ActuatorFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing capture geometry")]
    MissingCapture,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
