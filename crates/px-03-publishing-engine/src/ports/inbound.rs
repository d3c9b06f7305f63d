//! # Driving Ports (API - Inbound)
//!
//! The publication-graph API and its request payloads. The caller is the
//! identity/ownership layer: it authenticates the caller address, allocates
//! monotonically increasing profile/publication/group ids, and owns the
//! transaction boundary that makes each request all-or-nothing.
//!
//! Module addresses are `Option<Address>` where the slot is optional; the
//! wire-level zero-address encoding is the caller's concern.

use crate::events::{
    CommentCreated, FollowModuleSet, GroupCommentCreated, GroupCreated, GroupMirrorCreated,
    MirrorCreated, PostCreated, PostPublishedInGroup, ProfileCreated,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, GroupId, ProfileId, PubId, PublishError};

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

/// Inputs for profile creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    /// Address that will own the profile.
    pub owner: Address,
    /// Unique handle, `[0-9a-z._-]`, bounded length.
    pub handle: String,
    /// Display image URI, bounded length.
    pub image_uri: String,
    /// Follow module to attach, if any.
    pub follow_module: Option<Address>,
    /// Opaque init payload for the follow module.
    pub follow_module_init_data: Bytes,
    /// Display URI for the follow NFT collection.
    pub follow_nft_uri: String,
}

/// Inputs for replacing a profile's follow module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetFollowModuleRequest {
    /// Target profile.
    pub profile_id: ProfileId,
    /// New follow module; `None` detaches.
    pub follow_module: Option<Address>,
    /// Opaque init payload for the new module.
    pub follow_module_init_data: Bytes,
}

/// Inputs for a plain post.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostRequest {
    /// Publishing profile.
    pub profile_id: ProfileId,
    /// Content URI.
    pub content_uri: String,
    /// Collect module to attach. Mandatory: every post resolves to some
    /// collect module, even a permissive open one.
    pub collect_module: Address,
    /// Opaque init payload for the collect module.
    pub collect_module_init_data: Bytes,
    /// Reference module to attach, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

/// Inputs for a post published into a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupPostRequest {
    /// Publishing profile.
    pub profile_id: ProfileId,
    /// Target group.
    pub group_id: GroupId,
    /// Content URI.
    pub content_uri: String,
    /// Collect module to attach (mandatory).
    pub collect_module: Address,
    /// Opaque init payload for the collect module.
    pub collect_module_init_data: Bytes,
    /// Reference module to attach, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

/// Inputs for group creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupRequest {
    /// Profile creating and owning the group.
    pub profile_id: ProfileId,
    /// Group content URI.
    pub content_uri: String,
    /// Collect module to attach (mandatory).
    pub collect_module: Address,
    /// Opaque init payload for the collect module.
    pub collect_module_init_data: Bytes,
    /// Join module gating membership (mandatory; join reuses the follow
    /// module interface).
    pub join_module: Address,
    /// Opaque init payload for the join module.
    pub join_module_init_data: Bytes,
}

/// Inputs for a plain comment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentRequest {
    /// Commenting profile.
    pub profile_id: ProfileId,
    /// Content URI.
    pub content_uri: String,
    /// Profile owning the pointed publication.
    pub profile_id_pointed: ProfileId,
    /// Id of the pointed publication.
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the pointed publication's reference
    /// module hook.
    pub reference_module_data: Bytes,
    /// Collect module to attach (mandatory).
    pub collect_module: Address,
    /// Opaque init payload for the collect module.
    pub collect_module_init_data: Bytes,
    /// Reference module to attach, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

/// Inputs for a comment inside a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupCommentRequest {
    /// Commenting profile.
    pub profile_id: ProfileId,
    /// Enclosing group.
    pub group_id: GroupId,
    /// Content URI.
    pub content_uri: String,
    /// Profile owning the pointed publication.
    pub profile_id_pointed: ProfileId,
    /// Id of the pointed publication (within the group).
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the pointed publication's reference
    /// module hook.
    pub reference_module_data: Bytes,
    /// Collect module to attach (mandatory).
    pub collect_module: Address,
    /// Opaque init payload for the collect module.
    pub collect_module_init_data: Bytes,
    /// Reference module to attach, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

/// Inputs for a plain mirror.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MirrorRequest {
    /// Mirroring profile.
    pub profile_id: ProfileId,
    /// Profile owning the mirrored publication (immediate target; the
    /// stored pointer is the resolved root).
    pub profile_id_pointed: ProfileId,
    /// Id of the mirrored publication (immediate target).
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the root's reference module hook.
    pub reference_module_data: Bytes,
    /// Reference module to attach to the new mirror, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

/// Inputs for a mirror inside a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupMirrorRequest {
    /// Mirroring profile.
    pub profile_id: ProfileId,
    /// Enclosing group.
    pub group_id: GroupId,
    /// Profile owning the mirrored publication (immediate target).
    pub profile_id_pointed: ProfileId,
    /// Id of the mirrored publication (immediate target, within the
    /// group).
    pub pub_id_pointed: PubId,
    /// Opaque payload forwarded to the root's reference module hook.
    pub reference_module_data: Bytes,
    /// Reference module to attach to the new mirror, if any.
    pub reference_module: Option<Address>,
    /// Opaque init payload for the reference module.
    pub reference_module_init_data: Bytes,
}

// =============================================================================
// PUBLISHING API
// =============================================================================

/// The publication-graph API.
///
/// Each operation is a single atomic request: it runs to completion or
/// fails with no effect visible outside the enclosing transaction
/// boundary, and returns the notification it emitted.
#[async_trait]
pub trait PublishingApi: Send + Sync {
    /// Create a profile.
    async fn create_profile(
        &self,
        caller: Address,
        request: CreateProfileRequest,
        new_profile_id: ProfileId,
    ) -> Result<ProfileCreated, PublishError>;

    /// Replace a profile's follow module. Initialization re-runs on every
    /// call, even with unchanged inputs.
    async fn set_follow_module(
        &self,
        request: SetFollowModuleRequest,
    ) -> Result<FollowModuleSet, PublishError>;

    /// Create a post.
    async fn create_post(
        &self,
        request: PostRequest,
        new_pub_id: PubId,
    ) -> Result<PostCreated, PublishError>;

    /// Publish a post into a group.
    async fn create_group_post(
        &self,
        request: GroupPostRequest,
        new_pub_id: PubId,
    ) -> Result<PostPublishedInGroup, PublishError>;

    /// Create a group.
    async fn create_group(
        &self,
        request: GroupRequest,
        new_group_id: GroupId,
    ) -> Result<GroupCreated, PublishError>;

    /// Comment on an existing publication.
    async fn create_comment(
        &self,
        request: CommentRequest,
        new_pub_id: PubId,
    ) -> Result<CommentCreated, PublishError>;

    /// Comment on a publication inside a group.
    async fn create_group_comment(
        &self,
        request: GroupCommentRequest,
        new_pub_id: PubId,
    ) -> Result<GroupCommentCreated, PublishError>;

    /// Mirror an existing publication.
    async fn create_mirror(
        &self,
        request: MirrorRequest,
        new_pub_id: PubId,
    ) -> Result<MirrorCreated, PublishError>;

    /// Mirror a publication inside a group.
    async fn create_group_mirror(
        &self,
        request: GroupMirrorRequest,
        new_pub_id: PubId,
    ) -> Result<GroupMirrorCreated, PublishError>;
}

// =============================================================================
// TESTS
// =============================================================================
