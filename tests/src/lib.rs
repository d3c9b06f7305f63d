//! # Plexus Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-component choreography
//!     ├── flows.rs      # End-to-end publication graph flows
//!     └── properties.rs # Observable-behavior property suite
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p px-tests
//!
//! # By category
//! cargo test -p px-tests integration::flows::
//! cargo test -p px-tests integration::properties::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
