//! # Message Channel Test Suite
//!
//! Cross-crate tests for the channel contract.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── conformance.rs  # Outcome contract, one scenario per property
//!     └── lifecycle.rs    # Registration lifecycle under concurrent producers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p channel-tests
//!
//! # By category
//! cargo test -p channel-tests integration::conformance::
//!
//! # Benchmarks
//! cargo bench -p channel-tests
//! ```

pub mod integration;
