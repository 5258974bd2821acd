//! Feed Endpoint Adapters
//!
//! The real exchange transport is a vendor capability supplied from outside
//! the gateway; only its submission interface is consumed here. This module
//! provides the in-process simulator used by local runs and integration
//! tests.

pub mod sim;

pub use sim::{SimFeed, SimFeedConfig};
