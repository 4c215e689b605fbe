pub mod batch;
pub mod channel;
pub mod error;
pub mod order;
pub mod report;
pub mod source;

pub use error::{Error, Result};
