use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Decode errors
    #[error("no bits received")]
    EmptyFrame,

    #[error("invalid format definition: {0}")]
    InvalidFormat(String),

    #[error("field out of range: {0}")]
    FieldRange(String),

    // Table errors
    #[error("record not found: {0}")]
    RecordNotFound(String),

    // Session errors
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
