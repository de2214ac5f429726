//! Integration test utilities for the raid bot
//!
//! An in-memory chat platform, a settable clock, and a harness that wires
//! them to the real services, store, and queue.

pub mod fakes;
pub mod helpers;

pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;
