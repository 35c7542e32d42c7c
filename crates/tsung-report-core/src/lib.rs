pub mod analysis;
pub mod classify;
pub mod error;
pub mod log;
pub mod report;
pub mod series;

pub use error::{Error, Result};
