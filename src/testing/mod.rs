//! Test doubles and helpers
//!
//! Available to unit tests and, behind the `testing` feature, to
//! downstream crates that want to exercise their own code against a
//! scripted transport.

pub mod mocks;

pub use mocks::{MockTransport, RecordedCall};
