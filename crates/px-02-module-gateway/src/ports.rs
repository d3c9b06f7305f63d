//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the Module Gateway depends on: the whitelist oracle, the
//! module role traits with their fixed initialization entry points, the
//! registry resolving addresses to implementations, and the narrow store
//! surface that records attachments.
//!
//! Module init payloads and return data are opaque [`Bytes`]; the gateway
//! forwards them verbatim in both directions and never interprets them.

use async_trait::async_trait;
use shared_types::{Address, Bytes, GroupId, ModuleError, ProfileId, PubId, StoreError};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// MODULE ROLES
// =============================================================================

/// The role a module address is whitelisted for.
///
/// Join gating reuses the follow-module interface but is approved as its
/// own role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleRole {
    /// Gates follows on a profile.
    Follow,
    /// Gates collects on a publication or group.
    Collect,
    /// Gates comments and mirrors referencing a publication.
    Reference,
    /// Gates membership of a group.
    Join,
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Follow => "follow",
            Self::Collect => "collect",
            Self::Reference => "reference",
            Self::Join => "join",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// WHITELIST ORACLE
// =============================================================================

/// Read-only approval lookup for module addresses.
///
/// Whitelist administration is an external concern; the gateway only
/// consumes the boolean and re-checks on every call (no staleness
/// tolerance).
#[async_trait]
pub trait WhitelistOracle: Send + Sync {
    /// Returns true if `module` is approved for `role`.
    async fn is_approved(&self, module: Address, role: ModuleRole) -> bool;
}

// =============================================================================
// MODULE INTERFACES
// =============================================================================

/// Follow-gating module interface.
///
/// Also the interface join modules implement: the gateway passes a group
/// id in the profile-id slot for join initialization.
#[async_trait]
pub trait FollowModule: Send + Sync {
    /// Fixed initialization entry point.
    ///
    /// Returns opaque bytes forwarded into the caller's notification.
    async fn initialize_follow_module(
        &self,
        profile_id: ProfileId,
        init_data: &Bytes,
    ) -> Result<Bytes, ModuleError>;
}

/// Collect-gating module interface.
#[async_trait]
pub trait CollectModule: Send + Sync {
    /// Fixed initialization entry point.
    ///
    /// Invoked after the attachment is recorded, so the module can observe
    /// its own attachment.
    async fn initialize_publication_collect_module(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
        init_data: &Bytes,
    ) -> Result<Bytes, ModuleError>;
}

/// Reference-gating module interface.
#[async_trait]
pub trait ReferenceModule: Send + Sync {
    /// Fixed initialization entry point.
    async fn initialize_reference_module(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
        init_data: &Bytes,
    ) -> Result<Bytes, ModuleError>;

    /// Comment-processing hook, invoked on the pointed publication's
    /// reference module. An `Err` rejects the comment and aborts the
    /// enclosing request.
    async fn process_comment(
        &self,
        commenter_profile_id: ProfileId,
        pointed_profile_id: ProfileId,
        pointed_pub_id: PubId,
        data: &Bytes,
    ) -> Result<(), ModuleError>;

    /// Mirror-processing hook, invoked on the root publication's
    /// reference module. An `Err` rejects the mirror and aborts the
    /// enclosing request.
    async fn process_mirror(
        &self,
        mirrorer_profile_id: ProfileId,
        root_profile_id: ProfileId,
        root_pub_id: PubId,
        data: &Bytes,
    ) -> Result<(), ModuleError>;
}

// =============================================================================
// MODULE REGISTRY
// =============================================================================

/// Resolves module addresses to implementations, per role.
///
/// Registration is a deployment concern; lookups are synchronous and
/// read-only. A whitelisted address with no registration is a
/// configuration fault and fails the request.
pub trait ModuleRegistry: Send + Sync {
    /// Resolve a follow (or join) module implementation.
    fn follow_module(&self, module: Address) -> Option<Arc<dyn FollowModule>>;

    /// Resolve a collect module implementation.
    fn collect_module(&self, module: Address) -> Option<Arc<dyn CollectModule>>;

    /// Resolve a reference module implementation.
    fn reference_module(&self, module: Address) -> Option<Arc<dyn ReferenceModule>>;
}

// =============================================================================
// ATTACHMENT TARGETS
// =============================================================================

/// Record a collect module is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectTarget {
    /// A plain publication.
    Publication {
        /// Owning profile.
        profile_id: ProfileId,
        /// Publication id.
        pub_id: PubId,
    },
    /// A group-scoped publication.
    GroupPublication {
        /// Enclosing group.
        group_id: GroupId,
        /// Owning profile.
        profile_id: ProfileId,
        /// Publication id.
        pub_id: PubId,
    },
    /// A group record itself.
    Group {
        /// Profile that owns the group.
        profile_id: ProfileId,
        /// The group.
        group_id: GroupId,
    },
}

impl CollectTarget {
    /// The `(profile, pub)` pair the module observes at initialization.
    ///
    /// A group target passes the group id in the pub-id slot.
    #[must_use]
    pub fn module_slot(&self) -> (ProfileId, PubId) {
        match *self {
            Self::Publication {
                profile_id, pub_id, ..
            }
            | Self::GroupPublication {
                profile_id, pub_id, ..
            } => (profile_id, pub_id),
            Self::Group {
                profile_id,
                group_id,
            } => (profile_id, PubId::new(group_id.as_u64())),
        }
    }
}

/// Record a reference module is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// A plain publication.
    Publication {
        /// Owning profile.
        profile_id: ProfileId,
        /// Publication id.
        pub_id: PubId,
    },
    /// A group-scoped publication.
    GroupPublication {
        /// Enclosing group.
        group_id: GroupId,
        /// Owning profile.
        profile_id: ProfileId,
        /// Publication id.
        pub_id: PubId,
    },
}

impl ReferenceTarget {
    /// The `(profile, pub)` pair the module observes at initialization.
    #[must_use]
    pub fn module_slot(&self) -> (ProfileId, PubId) {
        match *self {
            Self::Publication {
                profile_id, pub_id, ..
            }
            | Self::GroupPublication {
                profile_id, pub_id, ..
            } => (profile_id, pub_id),
        }
    }
}

// =============================================================================
// ATTACHMENT STORE
// =============================================================================

/// Write surface for recording module attachments.
///
/// Each call mutates exactly one record field. The gateway writes the
/// attachment before invoking the module's initialization, so a failing
/// module leaves the address recorded; all-or-nothing visibility is the
/// enclosing identity layer's transaction boundary.
#[async_trait]
pub trait ModuleAttachmentStore: Send + Sync {
    /// Record a collect module on the target record.
    async fn set_collect_module(
        &self,
        target: CollectTarget,
        module: Address,
    ) -> Result<(), StoreError>;

    /// Record a reference module on the target record.
    async fn set_reference_module(
        &self,
        target: ReferenceTarget,
        module: Address,
    ) -> Result<(), StoreError>;

    /// Record a join module on the group record.
    async fn set_join_module(&self, group_id: GroupId, module: Address) -> Result<(), StoreError>;
}

// =============================================================================
// TESTS
// =============================================================================
