#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregations behind the admin dashboard.
//!
//! Everything here is synchronous and side-effect free: callers decode the
//! user collection, pick a `now`, and get back the serializable shapes from
//! `kintr_analytics_models`.

pub mod demographics;
pub mod rankings;
pub mod tally;
pub mod time;

pub use demographics::tally;
pub use tally::WeightedTally;
pub use time::{TimeParseError, parse_instant};
