//! # Module Gateway
//!
//! The single choke point between the publishing engine and untrusted
//! extension modules. Whitelist checks happen before any write, attachments
//! are recorded before the module's own initialization runs, and every
//! module invocation is budgeted. Module failures are forwarded verbatim
//! and abort the enclosing request; the gateway never retries.

use crate::ports::{
    CollectModule, CollectTarget, FollowModule, ModuleAttachmentStore, ModuleRegistry, ModuleRole,
    ReferenceModule, ReferenceTarget, WhitelistOracle,
};
use shared_types::{Address, Bytes, GroupId, ModuleError, ProfileId, PubId, PublishError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Module Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Wall-clock budget per module invocation in milliseconds. A module
    /// that exhausts the budget fails the request.
    pub module_call_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            module_call_timeout_ms: 5000,
        }
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// The Module Gateway.
///
/// Generic over the whitelist oracle and the module registry so tests can
/// substitute fakes for both.
pub struct ModuleGateway<W: WhitelistOracle, R: ModuleRegistry> {
    whitelist: Arc<W>,
    registry: Arc<R>,
    config: GatewayConfig,
}

impl<W: WhitelistOracle, R: ModuleRegistry> ModuleGateway<W, R> {
    /// Create a new gateway.
    pub fn new(whitelist: Arc<W>, registry: Arc<R>, config: GatewayConfig) -> Self {
        Self {
            whitelist,
            registry,
            config,
        }
    }

    /// Initialize a follow module for a profile.
    ///
    /// The gateway does not record the attachment; the profile's follow
    /// module field is owned by the publishing engine (it is the one
    /// mutable module slot).
    ///
    /// # Errors
    ///
    /// * [`PublishError::FollowModuleNotWhitelisted`]
    /// * [`PublishError::ModuleNotRegistered`]
    /// * [`PublishError::Module`] / [`PublishError::ModuleCallTimeout`]
    pub async fn init_follow_module(
        &self,
        profile_id: ProfileId,
        module: Address,
        init_data: &Bytes,
    ) -> Result<Bytes, PublishError> {
        if !self.whitelist.is_approved(module, ModuleRole::Follow).await {
            warn!(%module, "follow module not whitelisted");
            return Err(PublishError::FollowModuleNotWhitelisted(module));
        }

        let implementation = self
            .registry
            .follow_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        debug!(%module, %profile_id, "initializing follow module");
        self.call_budgeted(implementation.initialize_follow_module(profile_id, init_data))
            .await
    }

    /// Initialize a collect module for a publication or group.
    ///
    /// Records the attachment on the target record before invoking the
    /// module, so the module's initialization can observe it.
    ///
    /// # Errors
    ///
    /// * [`PublishError::CollectModuleNotWhitelisted`]
    /// * [`PublishError::ModuleNotRegistered`]
    /// * [`PublishError::Store`]
    /// * [`PublishError::Module`] / [`PublishError::ModuleCallTimeout`]
    pub async fn init_collect_module<S>(
        &self,
        target: CollectTarget,
        module: Address,
        init_data: &Bytes,
        store: &S,
    ) -> Result<Bytes, PublishError>
    where
        S: ModuleAttachmentStore + ?Sized,
    {
        if !self
            .whitelist
            .is_approved(module, ModuleRole::Collect)
            .await
        {
            warn!(%module, "collect module not whitelisted");
            return Err(PublishError::CollectModuleNotWhitelisted(module));
        }

        let implementation = self
            .registry
            .collect_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        store.set_collect_module(target, module).await?;

        let (profile_id, pub_id) = target.module_slot();
        debug!(%module, %profile_id, %pub_id, "initializing collect module");
        self.call_budgeted(implementation.initialize_publication_collect_module(
            profile_id, pub_id, init_data,
        ))
        .await
    }

    /// Initialize a reference module for a publication.
    ///
    /// A publication is permitted to have no reference module: `None`
    /// short-circuits to an empty payload with no whitelist check and no
    /// write.
    ///
    /// # Errors
    ///
    /// * [`PublishError::ReferenceModuleNotWhitelisted`]
    /// * [`PublishError::ModuleNotRegistered`]
    /// * [`PublishError::Store`]
    /// * [`PublishError::Module`] / [`PublishError::ModuleCallTimeout`]
    pub async fn init_reference_module<S>(
        &self,
        target: ReferenceTarget,
        module: Option<Address>,
        init_data: &Bytes,
        store: &S,
    ) -> Result<Bytes, PublishError>
    where
        S: ModuleAttachmentStore + ?Sized,
    {
        let Some(module) = module else {
            return Ok(Bytes::new());
        };

        if !self
            .whitelist
            .is_approved(module, ModuleRole::Reference)
            .await
        {
            warn!(%module, "reference module not whitelisted");
            return Err(PublishError::ReferenceModuleNotWhitelisted(module));
        }

        let implementation = self
            .registry
            .reference_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        store.set_reference_module(target, module).await?;

        let (profile_id, pub_id) = target.module_slot();
        debug!(%module, %profile_id, %pub_id, "initializing reference module");
        self.call_budgeted(implementation.initialize_reference_module(
            profile_id, pub_id, init_data,
        ))
        .await
    }

    /// Initialize a join module for a group.
    ///
    /// Join and follow gating share one module interface: the module is
    /// resolved from the follow registry slot and initialized with the
    /// group id in the profile-id slot.
    ///
    /// # Errors
    ///
    /// * [`PublishError::JoinModuleNotWhitelisted`]
    /// * [`PublishError::ModuleNotRegistered`]
    /// * [`PublishError::Store`]
    /// * [`PublishError::Module`] / [`PublishError::ModuleCallTimeout`]
    pub async fn init_join_module<S>(
        &self,
        group_id: GroupId,
        module: Address,
        init_data: &Bytes,
        store: &S,
    ) -> Result<Bytes, PublishError>
    where
        S: ModuleAttachmentStore + ?Sized,
    {
        if !self.whitelist.is_approved(module, ModuleRole::Join).await {
            warn!(%module, "join module not whitelisted");
            return Err(PublishError::JoinModuleNotWhitelisted(module));
        }

        let implementation = self
            .registry
            .follow_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        store.set_join_module(group_id, module).await?;

        debug!(%module, %group_id, "initializing join module");
        self.call_budgeted(
            implementation.initialize_follow_module(ProfileId::new(group_id.as_u64()), init_data),
        )
        .await
    }

    /// Dispatch the comment-processing hook on an attached reference
    /// module. No whitelist re-check: the module was approved when it was
    /// attached.
    ///
    /// # Errors
    ///
    /// * [`PublishError::ModuleNotRegistered`]
    /// * [`PublishError::Module`] / [`PublishError::ModuleCallTimeout`] -
    ///   a rejecting hook aborts the enclosing request.
    pub async fn process_comment_hook(
        &self,
        module: Address,
        commenter_profile_id: ProfileId,
        pointed_profile_id: ProfileId,
        pointed_pub_id: PubId,
        data: &Bytes,
    ) -> Result<(), PublishError> {
        let implementation = self
            .registry
            .reference_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        debug!(%module, %commenter_profile_id, "processing comment hook");
        self.call_budgeted(implementation.process_comment(
            commenter_profile_id,
            pointed_profile_id,
            pointed_pub_id,
            data,
        ))
        .await
    }

    /// Dispatch the mirror-processing hook on the root publication's
    /// reference module.
    ///
    /// # Errors
    ///
    /// Same as [`Self::process_comment_hook`].
    pub async fn process_mirror_hook(
        &self,
        module: Address,
        mirrorer_profile_id: ProfileId,
        root_profile_id: ProfileId,
        root_pub_id: PubId,
        data: &Bytes,
    ) -> Result<(), PublishError> {
        let implementation = self
            .registry
            .reference_module(module)
            .ok_or(PublishError::ModuleNotRegistered(module))?;

        debug!(%module, %mirrorer_profile_id, "processing mirror hook");
        self.call_budgeted(implementation.process_mirror(
            mirrorer_profile_id,
            root_profile_id,
            root_pub_id,
            data,
        ))
        .await
    }

    /// Run a module invocation under the configured wall-clock budget.
    async fn call_budgeted<T, F>(&self, call: F) -> Result<T, PublishError>
    where
        F: Future<Output = Result<T, ModuleError>>,
    {
        let budget = Duration::from_millis(self.config.module_call_timeout_ms);
        match tokio::time::timeout(budget, call).await {
            Ok(result) => result.map_err(PublishError::Module),
            Err(_) => Err(PublishError::ModuleCallTimeout {
                max_ms: self.config.module_call_timeout_ms,
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
