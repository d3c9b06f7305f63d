//! # Pointer Resolution
//!
//! Collapses a publication reference to its root leaf. Mirror creation
//! rewrites pointers to the already-resolved root at write time, so stored
//! chains never exceed depth 1 and resolution is O(1): one read for the
//! leaf short-circuit, at most one more to fetch the root's collect module.

use crate::ports::PublicationRead;
use shared_types::{Address, GroupId, ProfileId, PubId, PublicationRecord, PublishError};

// =============================================================================
// RESOLVED POINTER
// =============================================================================

/// The root of a publication reference.
///
/// Always identifies a leaf: a post or comment carrying its own collect
/// module. Mirrors never appear as resolution results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPointer {
    /// Profile owning the root publication.
    pub profile_id: ProfileId,
    /// Id of the root publication.
    pub pub_id: PubId,
    /// The root's collect module.
    pub collect_module: Address,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolves a plain publication reference to its root.
///
/// # Errors
///
/// * [`PublishError::PublicationDoesNotExist`] - The slot was never
///   written, the record forwards nowhere, or the pointed slot is not a
///   leaf (a depth-1 invariant breach observable only with a corrupted
///   store).
/// * [`PublishError::Store`] - The store failed.
pub async fn resolve_pointer<S>(
    profile_id: ProfileId,
    pub_id: PubId,
    store: &S,
) -> Result<ResolvedPointer, PublishError>
where
    S: PublicationRead + ?Sized,
{
    let record = store
        .publication(profile_id, pub_id)
        .await?
        .ok_or(PublishError::PublicationDoesNotExist)?;

    resolve_record(profile_id, pub_id, &record, |p, i| async move {
        store.publication(p, i).await.map_err(PublishError::from)
    })
    .await
}

/// Resolves a group-scoped publication reference to its root.
///
/// Pointers inside a group namespace are interpreted within the same
/// group.
///
/// # Errors
///
/// Same as [`resolve_pointer`].
pub async fn resolve_group_pointer<S>(
    group_id: GroupId,
    profile_id: ProfileId,
    pub_id: PubId,
    store: &S,
) -> Result<ResolvedPointer, PublishError>
where
    S: PublicationRead + ?Sized,
{
    let record = store
        .group_publication(group_id, profile_id, pub_id)
        .await?
        .ok_or(PublishError::PublicationDoesNotExist)?;

    resolve_record(profile_id, pub_id, &record, |p, i| async move {
        store
            .group_publication(group_id, p, i)
            .await
            .map_err(PublishError::from)
    })
    .await
}

/// Shared resolution step over an already-fetched record.
///
/// `read_pointed` fetches the pointed slot from the same namespace the
/// record came from.
async fn resolve_record<F, Fut>(
    profile_id: ProfileId,
    pub_id: PubId,
    record: &PublicationRecord,
    read_pointed: F,
) -> Result<ResolvedPointer, PublishError>
where
    F: FnOnce(ProfileId, PubId) -> Fut,
    Fut: std::future::Future<Output = Result<Option<PublicationRecord>, PublishError>>,
{
    // Leaf short-circuit: a record with its own collect module is a post
    // or comment and is returned unchanged.
    if let Some(collect_module) = record.collect_module {
        return Ok(ResolvedPointer {
            profile_id,
            pub_id,
            collect_module,
        });
    }

    // Forwarding mirror: follow the stored pointer exactly one hop.
    let pointed = record
        .pointed
        .ok_or(PublishError::PublicationDoesNotExist)?;

    let target = read_pointed(pointed.profile_id, pointed.pub_id)
        .await?
        .ok_or(PublishError::PublicationDoesNotExist)?;

    // The pointed slot must itself be a leaf (depth-1 invariant).
    let collect_module = target
        .collect_module
        .ok_or(PublishError::PublicationDoesNotExist)?;

    Ok(ResolvedPointer {
        profile_id: pointed.profile_id,
        pub_id: pointed.pub_id,
        collect_module,
    })
}

// =============================================================================
// TESTS
// =============================================================================
