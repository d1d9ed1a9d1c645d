//! Error types for the ts-models library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input too short for the convolution/pooling stack
    #[error("sequence of length {input_dim} collapses to nothing in the convolution stack")]
    SequenceTooShort { input_dim: usize },
}
