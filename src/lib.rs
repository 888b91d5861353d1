//! Authenticated client for the election management API.
//!
//! Every call reads the bearer token from a [`credentials::TokenStore`],
//! attaches it together with a JSON content type, performs exactly one HTTP
//! exchange against the configured backend, and hands the response body (or
//! the original error) straight back.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod headers;
pub mod logging;
pub mod model;
pub mod view;

#[cfg(test)]
mod mock;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use credentials::{AuthToken, AuthenticationError, FileStore, MemoryStore, TokenStore};
pub use error::{Error, Result};

/// The token the `#[backend_test(token)]` harness logs in with.
#[cfg(test)]
pub(crate) const EXAMPLE_TOKEN: &str = "abc123";

/// Enable test logging for this crate.
///
/// The logger is installed through the capturing handle, so tests that
/// assert on log output can swap in a mock appender without a second
/// global logger. Must not be called while such a test holds its guard.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    use log4rs_test_utils::{log_testing::logging_test_setup, test_logging::TestConsoleAppender};

    let console = TestConsoleAppender::make_config(["election_client"], None, None);
    drop(logging_test_setup(console));
}
