use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse source file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse channels file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
