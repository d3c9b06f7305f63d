//! # Integration Tests
//!
//! Cross-component choreography: the publishing engine driving the pointer
//! resolver and module gateway against the in-memory adapters.

pub mod flows;
pub mod properties;
