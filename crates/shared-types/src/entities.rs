//! # Entity Records
//!
//! The keyed records the publication graph is made of: profiles,
//! publications, and groups. Records are written by the publishing engine
//! and the module gateway; the pointer resolver only reads them.
//!
//! Absence is always `Option::None`. The original wire encoding uses zero
//! values for "no module" and "no pointer"; that encoding stops at the
//! boundary of this crate.

use crate::value_objects::{Address, GroupId, ProfileId, PubId};
use serde::{Deserialize, Serialize};

// =============================================================================
// PROFILE
// =============================================================================

/// A user profile.
///
/// Created once; `handle` and `follow_nft_uri` are immutable afterwards,
/// `follow_module` is mutable, and `publication_count` advances with each
/// plain publication. The count tracks the highest assigned publication id
/// and backs the existence check for comment targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Unique human-readable handle, `[0-9a-z._-]`, bounded length.
    pub handle: String,
    /// Display image URI, bounded length.
    pub image_uri: String,
    /// Display URI for the follow NFT collection.
    pub follow_nft_uri: String,
    /// Attached follow-gating module, if any.
    pub follow_module: Option<Address>,
    /// Highest plain publication id assigned to this profile.
    pub publication_count: u64,
}

// =============================================================================
// PUBLICATION
// =============================================================================

/// Target of a comment or mirror: another publication in the same
/// namespace (plain or group-scoped).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubPointer {
    /// Profile owning the pointed publication.
    pub profile_id: ProfileId,
    /// Id of the pointed publication.
    pub pub_id: PubId,
}

impl PubPointer {
    /// Creates a pointer to `(profile_id, pub_id)`.
    #[must_use]
    pub const fn new(profile_id: ProfileId, pub_id: PubId) -> Self {
        Self { profile_id, pub_id }
    }
}

/// Classification of a publication record.
///
/// Derived from the record's fields, never stored:
/// - `Post`: no pointer.
/// - `Comment`: pointer present and the record carries its own collect
///   module (content-bearing).
/// - `Mirror`: pointer present and no collect module (forwarding-only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublicationKind {
    /// Original content, no pointer.
    Post,
    /// Content-bearing reply pointing at another publication.
    Comment,
    /// Forwarding pointer to a leaf publication.
    Mirror,
}

/// A publication record.
///
/// Keyed by `(ProfileId, PubId)` for plain publications and
/// `(GroupId, ProfileId, PubId)` for group-scoped ones. Created once per
/// slot and never deleted; module addresses are set at creation time and
/// are immutable thereafter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Content URI. Empty for mirrors.
    pub content_uri: String,
    /// Attached collect module. `None` exactly for mirrors.
    pub collect_module: Option<Address>,
    /// Attached reference module, if any.
    pub reference_module: Option<Address>,
    /// Pointer to another publication. Present for comments and mirrors;
    /// mirrors always store the resolved root, never an intermediate
    /// mirror.
    pub pointed: Option<PubPointer>,
    /// Group the publication was published into, if any.
    pub group: Option<GroupId>,
}

impl PublicationRecord {
    /// Classifies this record as post, comment, or mirror.
    #[must_use]
    pub fn kind(&self) -> PublicationKind {
        match (&self.pointed, &self.collect_module) {
            (None, _) => PublicationKind::Post,
            (Some(_), Some(_)) => PublicationKind::Comment,
            (Some(_), None) => PublicationKind::Mirror,
        }
    }

    /// Returns true if this record is a forwarding mirror.
    #[must_use]
    pub fn is_mirror(&self) -> bool {
        self.kind() == PublicationKind::Mirror
    }
}

// =============================================================================
// GROUP
// =============================================================================

/// A group record.
///
/// Analogous to a profile but membership-gated: the join module fills the
/// role the follow module fills for profiles, and the group is itself owned
/// by a profile. Group-scoped publications live in the
/// `(GroupId, ProfileId, PubId)` namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Profile that created and owns the group.
    pub profile_id: ProfileId,
    /// Group content URI.
    pub content_uri: String,
    /// Attached collect module.
    pub collect_module: Option<Address>,
    /// Attached join-gating module. Set at creation, before the module's
    /// own initialization runs.
    pub join_module: Option<Address>,
}

// =============================================================================
// TESTS
// =============================================================================
