use crate::body::BodyId;

/// Reasons a host command is rejected. A rejected command is dropped and leaves
/// the engine untouched.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("malformed command payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("command payload is not valid UTF-8")]
    Encoding,
    #[error("field `{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("radius must not be negative, got {0}")]
    NegativeRadius(f64),
    #[error("time scale must be positive, got {0}")]
    NonPositiveTimeScale(f64),
    #[error("body id {0} has already been used")]
    DuplicateId(BodyId),
    #[error("no body ids left to allocate")]
    IdsExhausted,
}

/// Errors from loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config value `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Errors talking to a running [`Driver`](crate::driver::Driver).
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("the engine thread has stopped")]
    Disconnected,
    #[error(transparent)]
    Command(#[from] CommandError),
}
