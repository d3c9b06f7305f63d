//! # Shared Types Crate
//!
//! This crate contains the value objects, entity records, and error taxonomy
//! shared by every Plexus component crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Explicit Absence**: Optional fields are `Option<T>`, never a zero
//!   sentinel. The wire level may encode absence as zero; the core does not.
//! - **Ids Are Opaque**: `ProfileId`, `PubId`, and `GroupId` are allocated by
//!   the external identity layer and never interpreted beyond equality and
//!   ordering.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
