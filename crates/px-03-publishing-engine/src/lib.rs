//! # PX-03 Publishing Engine - Publication Graph Orchestration
//!
//! **Component ID:** 03
//!
//! ## Purpose
//!
//! Orchestrates profile creation and every publication-creation variant
//! (post, comment, mirror, and their group-scoped forms, plus group
//! creation itself). Uses the Pointer Resolver (px-01) to validate and
//! rewrite references and the Module Gateway (px-02) to attach extension
//! modules, then records the new entity and emits a creation notification.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Handle Uniqueness | `service.rs` - hash-indexed check-then-write under the apply lock |
//! | INVARIANT-2 | Validation Before Write | every "not whitelisted" / "does not exist" failure precedes the write it guards |
//! | INVARIANT-3 | Mirrors Store The Root | mirror creation resolves the target and stores the root pointer, never an intermediate mirror |
//! | INVARIANT-4 | Mandatory Collect Module | every post and comment carries a collect module, even a permissive open one |
//! | INVARIANT-5 | Serial Execution | one apply mutex per service funnels every request to completion |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Graph store | [`ports::outbound::GraphStore`] | Read/write profile, publication, and group records |
//! | Whitelist registry | `px_02_module_gateway::ports::WhitelistOracle` | Approve module addresses |
//! | Module registry | `px_02_module_gateway::ports::ModuleRegistry` | Resolve module implementations |
//! | Notification sink | [`ports::outbound::NotificationSink`] | Deliver creation notifications |
//! | Clock | [`ports::outbound::TimeSource`] | Timestamp notifications |
//!
//! ## Usage Example
//!
//! ```ignore
//! use px_03_publishing_engine::prelude::*;
//!
//! let service = create_test_service();
//! let created = service
//!     .create_profile(caller, request, ProfileId::new(1))
//!     .await?;
//! println!("profile {} created", created.profile_id);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain services
    pub use crate::domain::services::{
        handle_hash, validate_handle, validate_profile_image_uri, MAX_HANDLE_LENGTH,
        MAX_PROFILE_IMAGE_URI_LENGTH,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{
        CommentRequest, CreateProfileRequest, GroupCommentRequest, GroupMirrorRequest,
        GroupPostRequest, GroupRequest, MirrorRequest, PostRequest, PublishingApi,
        SetFollowModuleRequest,
    };
    pub use crate::ports::outbound::{GraphStore, NotificationSink, TimeSource};

    // Events
    pub use crate::events::{
        topics, CommentCreated, FollowModuleSet, GroupCommentCreated, GroupCreated,
        GroupMirrorCreated, MirrorCreated, Notification, PostCreated, PostPublishedInGroup,
        ProfileCreated,
    };

    // Adapters
    pub use crate::adapters::{
        FixedTimeSource, InMemoryGraphStore, RecordingNotificationSink, SystemTimeSource,
        TracingNotificationSink,
    };

    // Service
    pub use crate::service::{
        create_test_service, PublishingService, ServiceConfig, ServiceStats,
    };

    // Re-exported collaborator types
    pub use shared_types::{
        Address, Bytes, GroupId, ProfileId, PubId, PublishError, PublicationKind,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID.
pub const COMPONENT_ID: u8 = 3;

/// Component name.
pub const COMPONENT_NAME: &str = "Publishing Engine";

// =============================================================================
// TESTS
// =============================================================================
