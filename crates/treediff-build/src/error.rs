use thiserror::Error;

/// Failure building a tree from a host value.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unsupported value: {0}; expected an integer, string, array, or object")]
    Unsupported(String),
}
