use thiserror::Error;

/// Construction-time validation failures. Every config record in this crate is checked
/// once, at `new`/`TryFrom::try_from` time; a bad value here is a startup failure for the
/// owning subsystem, never a per-hit error.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be > 0, got {value}")]
    MustBePositive { field: &'static str, value: f64 },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{greater} ({greater_value}) must be >= {lesser} ({lesser_value})")]
    MustBeAtLeast {
        greater: &'static str,
        greater_value: f64,
        lesser: &'static str,
        lesser_value: f64,
    },
}
