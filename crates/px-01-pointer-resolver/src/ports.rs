//! # Driven Ports (SPI - Outbound)
//!
//! Read-only interface the resolver depends on. The publishing engine's
//! graph store implements this trait; adapters may also back it with a
//! projection or cache as long as reads stay consistent within a request.

use async_trait::async_trait;
use shared_types::{GroupId, ProfileId, PubId, PublicationRecord, StoreError};

// =============================================================================
// PUBLICATION READ
// =============================================================================

/// Read access to publication records.
///
/// Lookups return `Ok(None)` for slots that were never written; the
/// resolver translates that into `PublicationDoesNotExist`. Implementations
/// must not substitute default records for missing ones.
#[async_trait]
pub trait PublicationRead: Send + Sync {
    /// Get a plain publication record.
    ///
    /// # Arguments
    ///
    /// * `profile_id` - Owning profile
    /// * `pub_id` - Publication id within the profile
    ///
    /// # Returns
    ///
    /// * `Some(PublicationRecord)` - If the slot was written
    /// * `None` - If the publication does not exist
    async fn publication(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
    ) -> Result<Option<PublicationRecord>, StoreError>;

    /// Get a group-scoped publication record.
    ///
    /// Group publications live in their own `(group, profile, pub)`
    /// namespace, disjoint from plain publications.
    async fn group_publication(
        &self,
        group_id: GroupId,
        profile_id: ProfileId,
        pub_id: PubId,
    ) -> Result<Option<PublicationRecord>, StoreError>;
}

// =============================================================================
// TESTS
// =============================================================================
