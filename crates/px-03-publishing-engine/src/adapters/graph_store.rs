//! # Graph Store Adapter
//!
//! In-memory graph store. Production embeddings back the same traits with
//! a durable keyed store and wrap each request in a transaction; the
//! engine itself guarantees a single writer.

use crate::ports::outbound::GraphStore;
use async_trait::async_trait;
use px_01_pointer_resolver::ports::PublicationRead;
use px_02_module_gateway::ports::{CollectTarget, ModuleAttachmentStore, ReferenceTarget};
use shared_types::{
    Address, GroupId, GroupRecord, HandleHash, ProfileId, ProfileRecord, PubId, PublicationRecord,
    StoreError,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory graph store.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    /// Profile records.
    profiles: RwLock<HashMap<ProfileId, ProfileRecord>>,
    /// Handle hash index.
    handles: RwLock<HashMap<HandleHash, ProfileId>>,
    /// Plain publications.
    publications: RwLock<HashMap<(ProfileId, PubId), PublicationRecord>>,
    /// Group-scoped publications.
    group_publications: RwLock<HashMap<(GroupId, ProfileId, PubId), PublicationRecord>>,
    /// Group records.
    groups: RwLock<HashMap<GroupId, GroupRecord>>,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn missing_target(what: &str) -> StoreError {
        StoreError::Other(format!("attachment target missing: {what}"))
    }
}

#[async_trait]
impl PublicationRead for InMemoryGraphStore {
    async fn publication(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        Ok(self
            .publications
            .read()
            .unwrap()
            .get(&(profile_id, pub_id))
            .cloned())
    }

    async fn group_publication(
        &self,
        group_id: GroupId,
        profile_id: ProfileId,
        pub_id: PubId,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        Ok(self
            .group_publications
            .read()
            .unwrap()
            .get(&(group_id, profile_id, pub_id))
            .cloned())
    }
}

#[async_trait]
impl ModuleAttachmentStore for InMemoryGraphStore {
    async fn set_collect_module(
        &self,
        target: CollectTarget,
        module: Address,
    ) -> Result<(), StoreError> {
        match target {
            CollectTarget::Publication { profile_id, pub_id } => {
                let mut publications = self.publications.write().unwrap();
                let record = publications
                    .get_mut(&(profile_id, pub_id))
                    .ok_or_else(|| Self::missing_target("publication"))?;
                record.collect_module = Some(module);
            }
            CollectTarget::GroupPublication {
                group_id,
                profile_id,
                pub_id,
            } => {
                let mut publications = self.group_publications.write().unwrap();
                let record = publications
                    .get_mut(&(group_id, profile_id, pub_id))
                    .ok_or_else(|| Self::missing_target("group publication"))?;
                record.collect_module = Some(module);
            }
            CollectTarget::Group { group_id, .. } => {
                let mut groups = self.groups.write().unwrap();
                let record = groups
                    .get_mut(&group_id)
                    .ok_or_else(|| Self::missing_target("group"))?;
                record.collect_module = Some(module);
            }
        }
        Ok(())
    }

    async fn set_reference_module(
        &self,
        target: ReferenceTarget,
        module: Address,
    ) -> Result<(), StoreError> {
        match target {
            ReferenceTarget::Publication { profile_id, pub_id } => {
                let mut publications = self.publications.write().unwrap();
                let record = publications
                    .get_mut(&(profile_id, pub_id))
                    .ok_or_else(|| Self::missing_target("publication"))?;
                record.reference_module = Some(module);
            }
            ReferenceTarget::GroupPublication {
                group_id,
                profile_id,
                pub_id,
            } => {
                let mut publications = self.group_publications.write().unwrap();
                let record = publications
                    .get_mut(&(group_id, profile_id, pub_id))
                    .ok_or_else(|| Self::missing_target("group publication"))?;
                record.reference_module = Some(module);
            }
        }
        Ok(())
    }

    async fn set_join_module(&self, group_id: GroupId, module: Address) -> Result<(), StoreError> {
        let mut groups = self.groups.write().unwrap();
        let record = groups
            .get_mut(&group_id)
            .ok_or_else(|| Self::missing_target("group"))?;
        record.join_module = Some(module);
        Ok(())
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn profile(&self, profile_id: ProfileId) -> Result<Option<ProfileRecord>, StoreError> {
        Ok(self.profiles.read().unwrap().get(&profile_id).cloned())
    }

    async fn put_profile(
        &self,
        profile_id: ProfileId,
        record: ProfileRecord,
    ) -> Result<(), StoreError> {
        self.profiles.write().unwrap().insert(profile_id, record);
        Ok(())
    }

    async fn set_follow_module(
        &self,
        profile_id: ProfileId,
        module: Option<Address>,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().unwrap();
        let record = profiles
            .get_mut(&profile_id)
            .ok_or_else(|| Self::missing_target("profile"))?;
        record.follow_module = module;
        Ok(())
    }

    async fn set_publication_count(
        &self,
        profile_id: ProfileId,
        count: u64,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().unwrap();
        let record = profiles
            .get_mut(&profile_id)
            .ok_or_else(|| Self::missing_target("profile"))?;
        record.publication_count = count;
        Ok(())
    }

    async fn profile_id_by_handle(
        &self,
        hash: HandleHash,
    ) -> Result<Option<ProfileId>, StoreError> {
        Ok(self.handles.read().unwrap().get(&hash).copied())
    }

    async fn put_handle_index(
        &self,
        hash: HandleHash,
        profile_id: ProfileId,
    ) -> Result<(), StoreError> {
        self.handles.write().unwrap().insert(hash, profile_id);
        Ok(())
    }

    async fn put_publication(
        &self,
        profile_id: ProfileId,
        pub_id: PubId,
        record: PublicationRecord,
    ) -> Result<(), StoreError> {
        self.publications
            .write()
            .unwrap()
            .insert((profile_id, pub_id), record);
        Ok(())
    }

    async fn put_group_publication(
        &self,
        group_id: GroupId,
        profile_id: ProfileId,
        pub_id: PubId,
        record: PublicationRecord,
    ) -> Result<(), StoreError> {
        self.group_publications
            .write()
            .unwrap()
            .insert((group_id, profile_id, pub_id), record);
        Ok(())
    }

    async fn group(&self, group_id: GroupId) -> Result<Option<GroupRecord>, StoreError> {
        Ok(self.groups.read().unwrap().get(&group_id).cloned())
    }

    async fn put_group(&self, group_id: GroupId, record: GroupRecord) -> Result<(), StoreError> {
        self.groups.write().unwrap().insert(group_id, record);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
