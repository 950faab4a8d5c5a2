use thiserror::Error;

/// Errors raised while building a pool.
///
/// Everything after construction (full queue, failed I/O, missing
/// connection) is reported through return values and request flags instead.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn worker thread #{index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading a [`PoolConfig`](crate::app::PoolConfig) from
/// the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}
