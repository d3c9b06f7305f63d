//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the publishing engine depends on. Adapters implement these
//! to provide the graph store, notification delivery, and the clock.
//!
//! The store supertraits pull in the read surface the pointer resolver
//! needs (`PublicationRead`, px-01) and the attachment-write surface the
//! module gateway needs (`ModuleAttachmentStore`, px-02), so one store
//! implementation serves all three components.

use crate::events::Notification;
use async_trait::async_trait;
use px_01_pointer_resolver::ports::PublicationRead;
use px_02_module_gateway::ports::ModuleAttachmentStore;
use shared_types::{
    Address, GroupId, GroupRecord, HandleHash, ProfileId, ProfileRecord, PubId, PublicationRecord,
    StoreError,
};

// =============================================================================
// GRAPH STORE
// =============================================================================

/// The keyed store behind the publication graph.
///
/// ## Semantics
///
/// - Lookups return `Ok(None)` for slots that were never written; no
///   zeroed defaults.
/// - The engine serializes every request, so implementations never see
///   interleaved mutation (one writer at a time).
/// - The engine does not roll back earlier writes when a later step of the
///   same request fails; the enclosing identity layer's transaction
///   boundary makes requests all-or-nothing. Durable adapters should wrap
///   each request in their own transaction.
#[async_trait]
pub trait GraphStore: PublicationRead + ModuleAttachmentStore {
    /// Get a profile record.
    async fn profile(&self, profile_id: ProfileId) -> Result<Option<ProfileRecord>, StoreError>;

    /// Write a profile record.
    async fn put_profile(
        &self,
        profile_id: ProfileId,
        record: ProfileRecord,
    ) -> Result<(), StoreError>;

    /// Overwrite a profile's follow module field.
    async fn set_follow_module(
        &self,
        profile_id: ProfileId,
        module: Option<Address>,
    ) -> Result<(), StoreError>;

    /// Set a profile's publication counter.
    async fn set_publication_count(
        &self,
        profile_id: ProfileId,
        count: u64,
    ) -> Result<(), StoreError>;

    /// Look up the profile a handle hash is indexed to.
    async fn profile_id_by_handle(
        &self,
        hash: HandleHash,
    ) -> Result<Option<ProfileId>, StoreError>;

    /// Index a handle hash to a profile.
    async fn put_handle_index(
        &self,
        hash: HandleHash,
        profile_id: ProfileId,
    ) -> Result<(), StoreError>;

    /// Write a plain publication record.
    async fn put_publication(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
        record: PublicationRecord,
    ) -> Result<(), StoreError>;

    /// Write a group-scoped publication record.
    async fn put_group_publication(
        &self,
        group_id: GroupId,
        profile_id: ProfileId,
        pub_id: PubId,
        record: PublicationRecord,
    ) -> Result<(), StoreError>;

    /// Get a group record.
    async fn group(&self, group_id: GroupId) -> Result<Option<GroupRecord>, StoreError>;

    /// Write a group record.
    async fn put_group(&self, group_id: GroupId, record: GroupRecord) -> Result<(), StoreError>;
}

// =============================================================================
// NOTIFICATION SINK
// =============================================================================

/// Delivery target for creation notifications.
///
/// Transport is out of scope: subscribers may bridge to a bus, a log, or a
/// test recorder. Delivery happens after every write and module call of
/// the request succeeded.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish a notification.
    async fn publish(&self, notification: Notification);
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Clock used to timestamp notifications.
pub trait TimeSource: Send + Sync {
    /// Current unix time in seconds.
    fn now_unix(&self) -> u64;
}

// =============================================================================
// TESTS
// =============================================================================
