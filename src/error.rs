use thiserror::Error;

#[derive(Error, Debug)]
pub enum GondolaError {
    // Construction errors
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // Argument errors on fit/encode/decode
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Training errors
    #[error("insufficient training data: codebook size {ks} requires more than {ks} vectors, got {n}")]
    InsufficientTrainingData { ks: usize, n: usize },

    // State errors
    #[error("quantizer has not been trained, call fit first")]
    NotTrained,
}

pub type Result<T> = std::result::Result<T, GondolaError>;
