//! Integration tests across `shared-channel` and `channel-runtime`.

pub mod conformance;
pub mod lifecycle;
