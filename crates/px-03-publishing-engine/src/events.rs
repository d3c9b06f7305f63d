//! # Notification Schema
//!
//! Structured records a subscriber can observe, one per creation
//! operation. Each carries the full input parameter set, every module's
//! opaque return payload, and a unix timestamp. Transport is out of scope;
//! the engine hands these to a [`crate::ports::outbound::NotificationSink`].

use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, GroupId, ProfileId, PubId};

// =============================================================================
// PROFILE NOTIFICATIONS
// =============================================================================

/// A profile was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCreated {
    /// The new profile's id.
    pub profile_id: ProfileId,
    /// Authenticated caller that created the profile.
    pub creator: Address,
    /// Address owning the profile.
    pub owner: Address,
    /// The profile's handle.
    pub handle: String,
    /// Display image URI.
    pub image_uri: String,
    /// Attached follow module, if any.
    pub follow_module: Option<Address>,
    /// The follow module's opaque init return data.
    pub follow_module_return_data: Bytes,
    /// Display URI for the follow NFT collection.
    pub follow_nft_uri: String,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// A profile's follow module was replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowModuleSet {
    /// Target profile.
    pub profile_id: ProfileId,
    /// The new follow module; `None` means detached.
    pub follow_module: Option<Address>,
    /// The module's opaque init return data.
    pub follow_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

// =============================================================================
// POST NOTIFICATIONS
// =============================================================================

/// A post was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreated {
    /// Publishing profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Content URI.
    pub content_uri: String,
    /// Attached collect module.
    pub collect_module: Address,
    /// The collect module's opaque init return data.
    pub collect_module_return_data: Bytes,
    /// Attached reference module, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// A post was published into a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPublishedInGroup {
    /// Enclosing group.
    pub group_id: GroupId,
    /// Publishing profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Content URI.
    pub content_uri: String,
    /// Attached collect module.
    pub collect_module: Address,
    /// The collect module's opaque init return data.
    pub collect_module_return_data: Bytes,
    /// Attached reference module, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

// =============================================================================
// GROUP NOTIFICATIONS
// =============================================================================

/// A group was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreated {
    /// The new group's id.
    pub group_id: GroupId,
    /// Profile that created and owns the group.
    pub profile_id: ProfileId,
    /// Group content URI.
    pub content_uri: String,
    /// Attached collect module.
    pub collect_module: Address,
    /// The collect module's opaque init return data.
    pub collect_module_return_data: Bytes,
    /// Attached join module.
    pub join_module: Address,
    /// The join module's opaque init return data.
    pub join_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

// =============================================================================
// COMMENT NOTIFICATIONS
// =============================================================================

/// A comment was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreated {
    /// Commenting profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Content URI.
    pub content_uri: String,
    /// Profile owning the pointed publication.
    pub profile_id_pointed: ProfileId,
    /// Id of the pointed publication.
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the pointed publication's reference
    /// module hook.
    pub reference_module_data: Bytes,
    /// Attached collect module.
    pub collect_module: Address,
    /// The collect module's opaque init return data.
    pub collect_module_return_data: Bytes,
    /// Attached reference module, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// A comment was created inside a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCommentCreated {
    /// Enclosing group.
    pub group_id: GroupId,
    /// Commenting profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Content URI.
    pub content_uri: String,
    /// Profile owning the pointed publication.
    pub profile_id_pointed: ProfileId,
    /// Id of the pointed publication.
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the pointed publication's reference
    /// module hook.
    pub reference_module_data: Bytes,
    /// Attached collect module.
    pub collect_module: Address,
    /// The collect module's opaque init return data.
    pub collect_module_return_data: Bytes,
    /// Attached reference module, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

// =============================================================================
// MIRROR NOTIFICATIONS
// =============================================================================

/// A mirror was created.
///
/// Carries both the immediate target the caller named and the resolved
/// root the mirror stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorCreated {
    /// Mirroring profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Profile owning the immediate target.
    pub profile_id_pointed: ProfileId,
    /// Id of the immediate target.
    pub pub_id_pointed: PubId,
    /// Profile owning the resolved root.
    pub root_profile_id: ProfileId,
    /// Id of the resolved root.
    pub root_pub_id: PubId,
    /// Opaque payload forwarded to the root's reference module hook.
    pub reference_module_data: Bytes,
    /// Reference module attached to the new mirror, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// A mirror was created inside a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMirrorCreated {
    /// Enclosing group.
    pub group_id: GroupId,
    /// Mirroring profile.
    pub profile_id: ProfileId,
    /// The new publication's id.
    pub pub_id: PubId,
    /// Profile owning the immediate target.
    pub profile_id_pointed: ProfileId,
    /// Id of the immediate target.
    pub pub_id_pointed: PubId,
    /// Profile owning the resolved root.
    pub root_profile_id: ProfileId,
    /// Id of the resolved root.
    pub root_pub_id: PubId,
    /// Opaque payload forwarded to the root's reference module hook.
    pub reference_module_data: Bytes,
    /// Reference module attached to the new mirror, if any.
    pub reference_module: Option<Address>,
    /// The reference module's opaque init return data.
    pub reference_module_return_data: Bytes,
    /// Unix timestamp.
    pub timestamp: u64,
}

// =============================================================================
// NOTIFICATION ENVELOPE
// =============================================================================

/// Any creation notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// See [`ProfileCreated`].
    ProfileCreated(ProfileCreated),
    /// See [`FollowModuleSet`].
    FollowModuleSet(FollowModuleSet),
    /// See [`PostCreated`].
    PostCreated(PostCreated),
    /// See [`PostPublishedInGroup`].
    PostPublishedInGroup(PostPublishedInGroup),
    /// See [`GroupCreated`].
    GroupCreated(GroupCreated),
    /// See [`CommentCreated`].
    CommentCreated(CommentCreated),
    /// See [`GroupCommentCreated`].
    GroupCommentCreated(GroupCommentCreated),
    /// See [`MirrorCreated`].
    MirrorCreated(MirrorCreated),
    /// See [`GroupMirrorCreated`].
    GroupMirrorCreated(GroupMirrorCreated),
}

impl Notification {
    /// The topic string for this notification.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ProfileCreated(_) => topics::PROFILE_CREATED,
            Self::FollowModuleSet(_) => topics::FOLLOW_MODULE_SET,
            Self::PostCreated(_) => topics::POST_CREATED,
            Self::PostPublishedInGroup(_) => topics::POST_PUBLISHED_IN_GROUP,
            Self::GroupCreated(_) => topics::GROUP_CREATED,
            Self::CommentCreated(_) => topics::COMMENT_CREATED,
            Self::GroupCommentCreated(_) => topics::GROUP_COMMENT_CREATED,
            Self::MirrorCreated(_) => topics::MIRROR_CREATED,
            Self::GroupMirrorCreated(_) => topics::GROUP_MIRROR_CREATED,
        }
    }
}

// =============================================================================
// TOPICS
// =============================================================================

/// Topic strings for notification routing.
pub mod topics {
    /// Topic for profile creation.
    pub const PROFILE_CREATED: &str = "publishing.profile.created";

    /// Topic for follow module replacement.
    pub const FOLLOW_MODULE_SET: &str = "publishing.profile.follow_module_set";

    /// Topic for post creation.
    pub const POST_CREATED: &str = "publishing.post.created";

    /// Topic for posts published into a group.
    pub const POST_PUBLISHED_IN_GROUP: &str = "publishing.group.post.created";

    /// Topic for group creation.
    pub const GROUP_CREATED: &str = "publishing.group.created";

    /// Topic for comment creation.
    pub const COMMENT_CREATED: &str = "publishing.comment.created";

    /// Topic for comments inside a group.
    pub const GROUP_COMMENT_CREATED: &str = "publishing.group.comment.created";

    /// Topic for mirror creation.
    pub const MIRROR_CREATED: &str = "publishing.mirror.created";

    /// Topic for mirrors inside a group.
    pub const GROUP_MIRROR_CREATED: &str = "publishing.group.mirror.created";
}

// =============================================================================
// TESTS
// =============================================================================
