//! # Ports
//!
//! Hexagonal boundaries of the publishing engine:
//! - `inbound` - the API the identity/ownership layer drives.
//! - `outbound` - the interfaces the engine depends on (graph store,
//!   notification sink, clock).

pub mod inbound;
pub mod outbound;
