//! # Adapters
//!
//! In-memory whitelist and registry implementations plus the permissive
//! open modules. Production deployments replace the whitelist with the
//! registry-administration collaborator; the open modules are real
//! protocol pieces for callers that want ungated behavior.

use crate::ports::{
    CollectModule, FollowModule, ModuleRegistry, ModuleRole, ReferenceModule, WhitelistOracle,
};
use async_trait::async_trait;
use shared_types::{Address, Bytes, ModuleError, ProfileId, PubId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

// =============================================================================
// IN-MEMORY WHITELIST
// =============================================================================

/// In-memory whitelist oracle.
///
/// Administration (who may approve or revoke) is outside the core; this
/// adapter only exposes the mutations tests and embedders need.
#[derive(Debug, Default)]
pub struct InMemoryWhitelist {
    approved: RwLock<HashSet<(Address, ModuleRole)>>,
}

impl InMemoryWhitelist {
    /// Create an empty whitelist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve a module address for a role.
    pub fn approve(&self, module: Address, role: ModuleRole) {
        self.approved.write().unwrap().insert((module, role));
    }

    /// Revoke a module address for a role.
    pub fn revoke(&self, module: Address, role: ModuleRole) {
        self.approved.write().unwrap().remove(&(module, role));
    }
}

#[async_trait]
impl WhitelistOracle for InMemoryWhitelist {
    async fn is_approved(&self, module: Address, role: ModuleRole) -> bool {
        self.approved.read().unwrap().contains(&(module, role))
    }
}

// =============================================================================
// IN-MEMORY MODULE REGISTRY
// =============================================================================

/// In-memory registry mapping module addresses to implementations.
///
/// Registration happens at deployment/wiring time; lookups clone the
/// shared handle.
#[derive(Default)]
pub struct InMemoryModuleRegistry {
    follow: RwLock<HashMap<Address, Arc<dyn FollowModule>>>,
    collect: RwLock<HashMap<Address, Arc<dyn CollectModule>>>,
    reference: RwLock<HashMap<Address, Arc<dyn ReferenceModule>>>,
}

impl InMemoryModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a follow (or join) module implementation.
    pub fn register_follow(&self, module: Address, implementation: Arc<dyn FollowModule>) {
        self.follow.write().unwrap().insert(module, implementation);
    }

    /// Register a collect module implementation.
    pub fn register_collect(&self, module: Address, implementation: Arc<dyn CollectModule>) {
        self.collect.write().unwrap().insert(module, implementation);
    }

    /// Register a reference module implementation.
    pub fn register_reference(&self, module: Address, implementation: Arc<dyn ReferenceModule>) {
        self.reference
            .write()
            .unwrap()
            .insert(module, implementation);
    }
}

impl ModuleRegistry for InMemoryModuleRegistry {
    fn follow_module(&self, module: Address) -> Option<Arc<dyn FollowModule>> {
        self.follow.read().unwrap().get(&module).cloned()
    }

    fn collect_module(&self, module: Address) -> Option<Arc<dyn CollectModule>> {
        self.collect.read().unwrap().get(&module).cloned()
    }

    fn reference_module(&self, module: Address) -> Option<Arc<dyn ReferenceModule>> {
        self.reference.read().unwrap().get(&module).cloned()
    }
}

// =============================================================================
// OPEN MODULES
// =============================================================================

/// Follow module that admits everyone and returns no data.
///
/// Also serves as an open join module (the interfaces are shared).
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenFollowModule;

#[async_trait]
impl FollowModule for OpenFollowModule {
    async fn initialize_follow_module(
        &self,
        _profile_id: ProfileId,
        _init_data: &Bytes,
    ) -> Result<Bytes, ModuleError> {
        Ok(Bytes::new())
    }
}

/// Collect module that permits every collect and returns no data.
///
/// Callers that want ungated posts attach this: every post must carry some
/// collect module, and this is the permissive one.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCollectModule;

#[async_trait]
impl CollectModule for OpenCollectModule {
    async fn initialize_publication_collect_module(
        &self,
        _profile_id: ProfileId,
        _pub_id: PubId,
        _init_data: &Bytes,
    ) -> Result<Bytes, ModuleError> {
        Ok(Bytes::new())
    }
}

/// Reference module that accepts every comment and mirror.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenReferenceModule;

#[async_trait]
impl ReferenceModule for OpenReferenceModule {
    async fn initialize_reference_module(
        &self,
        _profile_id: ProfileId,
        _pub_id: PubId,
        _init_data: &Bytes,
    ) -> Result<Bytes, ModuleError> {
        Ok(Bytes::new())
    }

    async fn process_comment(
        &self,
        _commenter_profile_id: ProfileId,
        _pointed_profile_id: ProfileId,
        _pointed_pub_id: PubId,
        _data: &Bytes,
    ) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn process_mirror(
        &self,
        _mirrorer_profile_id: ProfileId,
        _root_profile_id: ProfileId,
        _root_pub_id: PubId,
        _data: &Bytes,
    ) -> Result<(), ModuleError> {
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
