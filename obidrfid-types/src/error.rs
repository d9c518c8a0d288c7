//! Errors raised while building data types from raw reader bytes

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied value is out of range or the wrong size
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reader-supplied bytes could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}
