//! Configuration error types.

/// Errors produced while loading, validating, or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading `config.ron` from disk failed.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Writing `config.ron` to disk failed.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Serializing the config back to RON failed.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value parsed fine but is outside the range the scene can use.
    #[error("invalid config value `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field, e.g. `scene.star_layers[2].radius`.
        field: String,
        /// Human-readable explanation.
        reason: &'static str,
    },
}
