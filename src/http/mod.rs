//! HTTP plumbing shared by every upstream call
//!
//! Holds the retrying request wrapper and the error type returned by all
//! fetch operations.

mod error;
mod retry;

pub use error::FetchError;
pub use retry::{fetch_with_retry, get_with_retry, is_network_error, is_transient, RetryPolicy};
