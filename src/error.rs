use thiserror::Error;

/// Errors raised around the planner: sensors, configuration and log replay.
/// The planner itself always produces a heading.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("NMEA parse error: {0}")]
    Nmea(String),

    #[error("no GPS fix available")]
    NoFix,

    #[error("no heading available (speed too low?)")]
    NoHeading,

    #[error("invalid sensor noise model: {0}")]
    InvalidNoise(String),
}
