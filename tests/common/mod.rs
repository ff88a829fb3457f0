//! Common test infrastructure
//!
//! Temporary page stores, store wrappers that fail on demand, and the
//! dimension values shared by the end-to-end tests.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{temp_store, love_quotes_request};
//!
//! #[test]
//! fn test_bulk() {
//!     let (_dir, store) = temp_store();
//!     let request = love_quotes_request(50, 2);
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    love_quotes_request, quiet_settings, scenario_tuple, temp_store, FlakyStore,
};
