//! Gateway types module
//!
//! - [`response`]: error envelope and success helpers

pub mod response;

pub use response::{ApiError, ErrorBody, created, ok};
