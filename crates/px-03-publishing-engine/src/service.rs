//! # Publishing Service
//!
//! Orchestrates every creation operation of the publication graph. Each
//! request runs to completion under a single apply lock: validate, write,
//! attach modules through the gateway, then emit one notification carrying
//! all inputs and all module return payloads.
//!
//! ## Serialization
//!
//! The whole API is funneled through one `tokio::sync::Mutex` per service
//! instance. Every invariant here (handle check-then-write, publication
//! count check-then-write, mirror pointer resolution) assumes requests
//! never interleave; embedders MUST NOT share the underlying store with a
//! second writer.

use crate::adapters::{
    FixedTimeSource, InMemoryGraphStore, RecordingNotificationSink,
};
use crate::domain::services::{handle_hash, validate_handle, validate_profile_image_uri};
use crate::events::{
    CommentCreated, FollowModuleSet, GroupCommentCreated, GroupCreated, GroupMirrorCreated,
    MirrorCreated, Notification, PostCreated, PostPublishedInGroup, ProfileCreated,
};
use crate::ports::inbound::{
    CommentRequest, CreateProfileRequest, GroupCommentRequest, GroupMirrorRequest,
    GroupPostRequest, GroupRequest, MirrorRequest, PostRequest, PublishingApi,
    SetFollowModuleRequest,
};
use crate::ports::outbound::{GraphStore, NotificationSink, TimeSource};

use async_trait::async_trait;
use px_01_pointer_resolver::ports::PublicationRead;
use px_01_pointer_resolver::resolver::{resolve_group_pointer, resolve_pointer};
use px_02_module_gateway::adapters::{
    InMemoryModuleRegistry, InMemoryWhitelist, OpenCollectModule, OpenFollowModule,
    OpenReferenceModule,
};
use px_02_module_gateway::gateway::{GatewayConfig, ModuleGateway};
use px_02_module_gateway::ports::{
    CollectTarget, ModuleRegistry, ModuleRole, ReferenceTarget, WhitelistOracle,
};
use shared_types::{
    Address, Bytes, GroupId, GroupRecord, ProfileId, ProfileRecord, PubId, PubPointer,
    PublicationRecord, PublishError,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Publishing Service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Module gateway configuration (call budget).
    pub gateway: GatewayConfig,
}

/// Statistics for the Publishing Service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Total requests handled.
    pub requests_processed: u64,
    /// Requests that committed.
    pub successful_requests: u64,
    /// Requests aborted by validation, store, or module failure.
    pub failed_requests: u64,
    /// Profiles created.
    pub profiles_created: u64,
    /// Publications created (posts, comments, mirrors, all namespaces).
    pub publications_created: u64,
    /// Groups created.
    pub groups_created: u64,
    /// Average request time in microseconds.
    pub avg_request_time_us: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The main Publishing Service.
///
/// This service:
/// 1. Validates request-specific invariants
/// 2. Delegates reference resolution to the pointer resolver (px-01)
/// 3. Writes the new profile/publication/group record
/// 4. Delegates module attachment to the module gateway (px-02)
/// 5. Emits one creation notification per request
pub struct PublishingService<S, W, R>
where
    S: GraphStore,
    W: WhitelistOracle,
    R: ModuleRegistry,
{
    /// Graph store adapter.
    store: Arc<S>,
    /// Module gateway (whitelist + registry + call budget).
    gateway: ModuleGateway<W, R>,
    /// Notification delivery.
    sink: Arc<dyn NotificationSink>,
    /// Clock for notification timestamps.
    time: Arc<dyn TimeSource>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
    /// Serializes every request (strictly serial execution).
    apply_lock: Mutex<()>,
}

impl<S, W, R> PublishingService<S, W, R>
where
    S: GraphStore,
    W: WhitelistOracle,
    R: ModuleRegistry,
{
    /// Create a new Publishing Service.
    pub fn new(
        store: Arc<S>,
        whitelist: Arc<W>,
        registry: Arc<R>,
        sink: Arc<dyn NotificationSink>,
        time: Arc<dyn TimeSource>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            gateway: ModuleGateway::new(whitelist, registry, config.gateway),
            sink,
            time,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
            apply_lock: Mutex::new(()),
        }
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    // =========================================================================
    // REQUEST HANDLERS
    // =========================================================================

    /// Handle a profile-creation request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_profile(
        &self,
        caller: Address,
        request: CreateProfileRequest,
        new_profile_id: ProfileId,
    ) -> Result<ProfileCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self
            .create_profile_inner(caller, request, new_profile_id)
            .await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a follow-module replacement request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_set_follow_module(
        &self,
        request: SetFollowModuleRequest,
    ) -> Result<FollowModuleSet, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.set_follow_module_inner(request).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a post-creation request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_post(
        &self,
        request: PostRequest,
        new_pub_id: PubId,
    ) -> Result<PostCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_post_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a group-post request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_group_post(
        &self,
        request: GroupPostRequest,
        new_pub_id: PubId,
    ) -> Result<PostPublishedInGroup, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_group_post_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a group-creation request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_group(
        &self,
        request: GroupRequest,
        new_group_id: GroupId,
    ) -> Result<GroupCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_group_inner(request, new_group_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a comment-creation request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_comment(
        &self,
        request: CommentRequest,
        new_pub_id: PubId,
    ) -> Result<CommentCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_comment_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a group-comment request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_group_comment(
        &self,
        request: GroupCommentRequest,
        new_pub_id: PubId,
    ) -> Result<GroupCommentCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_group_comment_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a mirror-creation request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_mirror(
        &self,
        request: MirrorRequest,
        new_pub_id: PubId,
    ) -> Result<MirrorCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_mirror_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    /// Handle a group-mirror request.
    #[instrument(skip(self, request), fields(correlation_id = %Uuid::new_v4()))]
    pub async fn handle_create_group_mirror(
        &self,
        request: GroupMirrorRequest,
        new_pub_id: PubId,
    ) -> Result<GroupMirrorCreated, PublishError> {
        let _guard = self.apply_lock.lock().await;
        let started = Instant::now();
        let result = self.create_group_mirror_inner(request, new_pub_id).await;
        self.finish(started, &result).await;
        result
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    async fn create_profile_inner(
        &self,
        caller: Address,
        request: CreateProfileRequest,
        new_profile_id: ProfileId,
    ) -> Result<ProfileCreated, PublishError> {
        validate_handle(&request.handle)?;
        validate_profile_image_uri(&request.image_uri)?;

        let hash = handle_hash(&request.handle);
        if self.store.profile_id_by_handle(hash).await?.is_some() {
            return Err(PublishError::HandleTaken);
        }

        self.store.put_handle_index(hash, new_profile_id).await?;
        self.store
            .put_profile(
                new_profile_id,
                ProfileRecord {
                    handle: request.handle.clone(),
                    image_uri: request.image_uri.clone(),
                    follow_nft_uri: request.follow_nft_uri.clone(),
                    follow_module: None,
                    publication_count: 0,
                },
            )
            .await?;

        let follow_module_return_data = match request.follow_module {
            Some(module) => {
                let returned = self
                    .gateway
                    .init_follow_module(new_profile_id, module, &request.follow_module_init_data)
                    .await?;
                self.store
                    .set_follow_module(new_profile_id, Some(module))
                    .await?;
                returned
            }
            None => Bytes::new(),
        };

        self.stats.write().await.profiles_created += 1;
        info!(profile_id = %new_profile_id, handle = %request.handle, "profile created");

        let notification = ProfileCreated {
            profile_id: new_profile_id,
            creator: caller,
            owner: request.owner,
            handle: request.handle,
            image_uri: request.image_uri,
            follow_module: request.follow_module,
            follow_module_return_data,
            follow_nft_uri: request.follow_nft_uri,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::ProfileCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn set_follow_module_inner(
        &self,
        request: SetFollowModuleRequest,
    ) -> Result<FollowModuleSet, PublishError> {
        self.store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;

        // Initialization re-runs on every call; it is never memoized, even
        // for an unchanged module.
        let follow_module_return_data = match request.follow_module {
            Some(module) => {
                self.gateway
                    .init_follow_module(
                        request.profile_id,
                        module,
                        &request.follow_module_init_data,
                    )
                    .await?
            }
            None => Bytes::new(),
        };

        self.store
            .set_follow_module(request.profile_id, request.follow_module)
            .await?;

        info!(profile_id = %request.profile_id, "follow module set");

        let notification = FollowModuleSet {
            profile_id: request.profile_id,
            follow_module: request.follow_module,
            follow_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::FollowModuleSet(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_post_inner(
        &self,
        request: PostRequest,
        new_pub_id: PubId,
    ) -> Result<PostCreated, PublishError> {
        let profile = self
            .store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;

        let count = profile.publication_count.max(new_pub_id.as_u64());
        self.store
            .set_publication_count(request.profile_id, count)
            .await?;
        self.store
            .put_publication(
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    content_uri: request.content_uri.clone(),
                    ..Default::default()
                },
            )
            .await?;

        let collect_module_return_data = self
            .gateway
            .init_collect_module(
                CollectTarget::Publication {
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.collect_module,
                &request.collect_module_init_data,
                &*self.store,
            )
            .await?;
        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::Publication {
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        self.stats.write().await.publications_created += 1;
        info!(profile_id = %request.profile_id, pub_id = %new_pub_id, "post created");

        let notification = PostCreated {
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            content_uri: request.content_uri,
            collect_module: request.collect_module,
            collect_module_return_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::PostCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_group_post_inner(
        &self,
        request: GroupPostRequest,
        new_pub_id: PubId,
    ) -> Result<PostPublishedInGroup, PublishError> {
        self.store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;
        self.store
            .group(request.group_id)
            .await?
            .ok_or(PublishError::GroupDoesNotExist(request.group_id))?;

        self.store
            .put_group_publication(
                request.group_id,
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    content_uri: request.content_uri.clone(),
                    group: Some(request.group_id),
                    ..Default::default()
                },
            )
            .await?;

        let collect_module_return_data = self
            .gateway
            .init_collect_module(
                CollectTarget::GroupPublication {
                    group_id: request.group_id,
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.collect_module,
                &request.collect_module_init_data,
                &*self.store,
            )
            .await?;
        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::GroupPublication {
                    group_id: request.group_id,
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        self.stats.write().await.publications_created += 1;
        info!(
            group_id = %request.group_id,
            profile_id = %request.profile_id,
            pub_id = %new_pub_id,
            "post published in group"
        );

        let notification = PostPublishedInGroup {
            group_id: request.group_id,
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            content_uri: request.content_uri,
            collect_module: request.collect_module,
            collect_module_return_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::PostPublishedInGroup(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_group_inner(
        &self,
        request: GroupRequest,
        new_group_id: GroupId,
    ) -> Result<GroupCreated, PublishError> {
        self.store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;

        self.store
            .put_group(
                new_group_id,
                GroupRecord {
                    profile_id: request.profile_id,
                    content_uri: request.content_uri.clone(),
                    collect_module: None,
                    join_module: None,
                },
            )
            .await?;

        let collect_module_return_data = self
            .gateway
            .init_collect_module(
                CollectTarget::Group {
                    profile_id: request.profile_id,
                    group_id: new_group_id,
                },
                request.collect_module,
                &request.collect_module_init_data,
                &*self.store,
            )
            .await?;
        let join_module_return_data = self
            .gateway
            .init_join_module(
                new_group_id,
                request.join_module,
                &request.join_module_init_data,
                &*self.store,
            )
            .await?;

        self.stats.write().await.groups_created += 1;
        info!(group_id = %new_group_id, profile_id = %request.profile_id, "group created");

        let notification = GroupCreated {
            group_id: new_group_id,
            profile_id: request.profile_id,
            content_uri: request.content_uri,
            collect_module: request.collect_module,
            collect_module_return_data,
            join_module: request.join_module,
            join_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::GroupCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_comment_inner(
        &self,
        request: CommentRequest,
        new_pub_id: PubId,
    ) -> Result<CommentCreated, PublishError> {
        let profile = self
            .store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;

        // Pointer guards, all before any write.
        if request.profile_id_pointed == request.profile_id && request.pub_id_pointed == new_pub_id
        {
            return Err(PublishError::CannotCommentOnSelf);
        }
        if request.pub_id_pointed.as_u64() == 0 {
            return Err(PublishError::PublicationDoesNotExist);
        }
        let pointed_count = self
            .store
            .profile(request.profile_id_pointed)
            .await?
            .map_or(0, |p| p.publication_count);
        if pointed_count < request.pub_id_pointed.as_u64() {
            return Err(PublishError::PublicationDoesNotExist);
        }

        let count = profile.publication_count.max(new_pub_id.as_u64());
        self.store
            .set_publication_count(request.profile_id, count)
            .await?;
        // The pointer is stored unresolved: comments point directly at
        // their target, mirrors are the ones that collapse.
        self.store
            .put_publication(
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    content_uri: request.content_uri.clone(),
                    pointed: Some(PubPointer::new(
                        request.profile_id_pointed,
                        request.pub_id_pointed,
                    )),
                    ..Default::default()
                },
            )
            .await?;

        let collect_module_return_data = self
            .gateway
            .init_collect_module(
                CollectTarget::Publication {
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.collect_module,
                &request.collect_module_init_data,
                &*self.store,
            )
            .await?;
        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::Publication {
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        // The pointed publication's reference module gets the last word; a
        // rejecting hook aborts the whole operation.
        if let Some(pointed_record) = self
            .store
            .publication(request.profile_id_pointed, request.pub_id_pointed)
            .await?
        {
            if let Some(module) = pointed_record.reference_module {
                self.gateway
                    .process_comment_hook(
                        module,
                        request.profile_id,
                        request.profile_id_pointed,
                        request.pub_id_pointed,
                        &request.reference_module_data,
                    )
                    .await?;
            }
        }

        self.stats.write().await.publications_created += 1;
        info!(
            profile_id = %request.profile_id,
            pub_id = %new_pub_id,
            pointed = %request.pub_id_pointed,
            "comment created"
        );

        let notification = CommentCreated {
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            content_uri: request.content_uri,
            profile_id_pointed: request.profile_id_pointed,
            pub_id_pointed: request.pub_id_pointed,
            reference_module_data: request.reference_module_data,
            collect_module: request.collect_module,
            collect_module_return_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::CommentCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_group_comment_inner(
        &self,
        request: GroupCommentRequest,
        new_pub_id: PubId,
    ) -> Result<GroupCommentCreated, PublishError> {
        self.store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;
        self.store
            .group(request.group_id)
            .await?
            .ok_or(PublishError::GroupDoesNotExist(request.group_id))?;

        if request.pub_id_pointed.as_u64() == request.group_id.as_u64() {
            return Err(PublishError::CannotCommentOnGroup);
        }
        if request.profile_id_pointed == request.profile_id && request.pub_id_pointed == new_pub_id
        {
            return Err(PublishError::CannotCommentOnSelf);
        }

        // Record presence in the group namespace is the existence proof.
        let pointed_record = self
            .store
            .group_publication(
                request.group_id,
                request.profile_id_pointed,
                request.pub_id_pointed,
            )
            .await?
            .ok_or(PublishError::PublicationDoesNotExist)?;

        self.store
            .put_group_publication(
                request.group_id,
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    content_uri: request.content_uri.clone(),
                    pointed: Some(PubPointer::new(
                        request.profile_id_pointed,
                        request.pub_id_pointed,
                    )),
                    group: Some(request.group_id),
                    ..Default::default()
                },
            )
            .await?;

        let collect_module_return_data = self
            .gateway
            .init_collect_module(
                CollectTarget::GroupPublication {
                    group_id: request.group_id,
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.collect_module,
                &request.collect_module_init_data,
                &*self.store,
            )
            .await?;
        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::GroupPublication {
                    group_id: request.group_id,
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        if let Some(module) = pointed_record.reference_module {
            self.gateway
                .process_comment_hook(
                    module,
                    request.profile_id,
                    request.profile_id_pointed,
                    request.pub_id_pointed,
                    &request.reference_module_data,
                )
                .await?;
        }

        self.stats.write().await.publications_created += 1;
        info!(
            group_id = %request.group_id,
            profile_id = %request.profile_id,
            pub_id = %new_pub_id,
            "group comment created"
        );

        let notification = GroupCommentCreated {
            group_id: request.group_id,
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            content_uri: request.content_uri,
            profile_id_pointed: request.profile_id_pointed,
            pub_id_pointed: request.pub_id_pointed,
            reference_module_data: request.reference_module_data,
            collect_module: request.collect_module,
            collect_module_return_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::GroupCommentCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_mirror_inner(
        &self,
        request: MirrorRequest,
        new_pub_id: PubId,
    ) -> Result<MirrorCreated, PublishError> {
        let profile = self
            .store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;

        // Resolve before writing: the mirror stores the root, never the
        // immediate target.
        let root = resolve_pointer(
            request.profile_id_pointed,
            request.pub_id_pointed,
            &*self.store,
        )
        .await?;

        let count = profile.publication_count.max(new_pub_id.as_u64());
        self.store
            .set_publication_count(request.profile_id, count)
            .await?;
        self.store
            .put_publication(
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    pointed: Some(PubPointer::new(root.profile_id, root.pub_id)),
                    ..Default::default()
                },
            )
            .await?;

        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::Publication {
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        // The root's reference module gets the last word on mirrors.
        if let Some(root_record) = self
            .store
            .publication(root.profile_id, root.pub_id)
            .await?
        {
            if let Some(module) = root_record.reference_module {
                self.gateway
                    .process_mirror_hook(
                        module,
                        request.profile_id,
                        root.profile_id,
                        root.pub_id,
                        &request.reference_module_data,
                    )
                    .await?;
            }
        }

        self.stats.write().await.publications_created += 1;
        info!(
            profile_id = %request.profile_id,
            pub_id = %new_pub_id,
            root_profile = %root.profile_id,
            root_pub = %root.pub_id,
            "mirror created"
        );

        let notification = MirrorCreated {
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            profile_id_pointed: request.profile_id_pointed,
            pub_id_pointed: request.pub_id_pointed,
            root_profile_id: root.profile_id,
            root_pub_id: root.pub_id,
            reference_module_data: request.reference_module_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::MirrorCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    async fn create_group_mirror_inner(
        &self,
        request: GroupMirrorRequest,
        new_pub_id: PubId,
    ) -> Result<GroupMirrorCreated, PublishError> {
        self.store
            .profile(request.profile_id)
            .await?
            .ok_or(PublishError::ProfileDoesNotExist(request.profile_id))?;
        self.store
            .group(request.group_id)
            .await?
            .ok_or(PublishError::GroupDoesNotExist(request.group_id))?;

        let root = resolve_group_pointer(
            request.group_id,
            request.profile_id_pointed,
            request.pub_id_pointed,
            &*self.store,
        )
        .await?;

        self.store
            .put_group_publication(
                request.group_id,
                request.profile_id,
                new_pub_id,
                PublicationRecord {
                    pointed: Some(PubPointer::new(root.profile_id, root.pub_id)),
                    group: Some(request.group_id),
                    ..Default::default()
                },
            )
            .await?;

        let reference_module_return_data = self
            .gateway
            .init_reference_module(
                ReferenceTarget::GroupPublication {
                    group_id: request.group_id,
                    profile_id: request.profile_id,
                    pub_id: new_pub_id,
                },
                request.reference_module,
                &request.reference_module_init_data,
                &*self.store,
            )
            .await?;

        if let Some(root_record) = self
            .store
            .group_publication(request.group_id, root.profile_id, root.pub_id)
            .await?
        {
            if let Some(module) = root_record.reference_module {
                self.gateway
                    .process_mirror_hook(
                        module,
                        request.profile_id,
                        root.profile_id,
                        root.pub_id,
                        &request.reference_module_data,
                    )
                    .await?;
            }
        }

        self.stats.write().await.publications_created += 1;
        info!(
            group_id = %request.group_id,
            profile_id = %request.profile_id,
            pub_id = %new_pub_id,
            "group mirror created"
        );

        let notification = GroupMirrorCreated {
            group_id: request.group_id,
            profile_id: request.profile_id,
            pub_id: new_pub_id,
            profile_id_pointed: request.profile_id_pointed,
            pub_id_pointed: request.pub_id_pointed,
            root_profile_id: root.profile_id,
            root_pub_id: root.pub_id,
            reference_module_data: request.reference_module_data,
            reference_module: request.reference_module,
            reference_module_return_data,
            timestamp: self.time.now_unix(),
        };
        self.sink
            .publish(Notification::GroupMirrorCreated(notification.clone()))
            .await;
        Ok(notification)
    }

    // =========================================================================
    // STATS
    // =========================================================================

    async fn finish<T>(&self, started: Instant, result: &Result<T, PublishError>) {
        if let Err(error) = result {
            warn!(%error, "request aborted");
        }

        let elapsed_us = started.elapsed().as_micros() as u64;
        let mut stats = self.stats.write().await;
        stats.requests_processed += 1;
        match result {
            Ok(_) => stats.successful_requests += 1,
            Err(_) => stats.failed_requests += 1,
        }
        let total = stats.requests_processed;
        stats.avg_request_time_us = (stats.avg_request_time_us * (total - 1) + elapsed_us) / total;
    }
}

// =============================================================================
// PublishingApi Implementation
// =============================================================================

#[async_trait]
impl<S, W, R> PublishingApi for PublishingService<S, W, R>
where
    S: GraphStore,
    W: WhitelistOracle,
    R: ModuleRegistry,
{
    async fn create_profile(
        &self,
        caller: Address,
        request: CreateProfileRequest,
        new_profile_id: ProfileId,
    ) -> Result<ProfileCreated, PublishError> {
        self.handle_create_profile(caller, request, new_profile_id)
            .await
    }

    async fn set_follow_module(
        &self,
        request: SetFollowModuleRequest,
    ) -> Result<FollowModuleSet, PublishError> {
        self.handle_set_follow_module(request).await
    }

    async fn create_post(
        &self,
        request: PostRequest,
        new_pub_id: PubId,
    ) -> Result<PostCreated, PublishError> {
        self.handle_create_post(request, new_pub_id).await
    }

    async fn create_group_post(
        &self,
        request: GroupPostRequest,
        new_pub_id: PubId,
    ) -> Result<PostPublishedInGroup, PublishError> {
        self.handle_create_group_post(request, new_pub_id).await
    }

    async fn create_group(
        &self,
        request: GroupRequest,
        new_group_id: GroupId,
    ) -> Result<GroupCreated, PublishError> {
        self.handle_create_group(request, new_group_id).await
    }

    async fn create_comment(
        &self,
        request: CommentRequest,
        new_pub_id: PubId,
    ) -> Result<CommentCreated, PublishError> {
        self.handle_create_comment(request, new_pub_id).await
    }

    async fn create_group_comment(
        &self,
        request: GroupCommentRequest,
        new_pub_id: PubId,
    ) -> Result<GroupCommentCreated, PublishError> {
        self.handle_create_group_comment(request, new_pub_id).await
    }

    async fn create_mirror(
        &self,
        request: MirrorRequest,
        new_pub_id: PubId,
    ) -> Result<MirrorCreated, PublishError> {
        self.handle_create_mirror(request, new_pub_id).await
    }

    async fn create_group_mirror(
        &self,
        request: GroupMirrorRequest,
        new_pub_id: PubId,
    ) -> Result<GroupMirrorCreated, PublishError> {
        self.handle_create_group_mirror(request, new_pub_id).await
    }
}

// =============================================================================
// TEST SERVICE
// =============================================================================

/// Address the open follow module is registered at in the test service
/// (approved for both the follow and join roles).
pub const OPEN_FOLLOW_MODULE: Address = Address::new([0xFA; 20]);

/// Address the open collect module is registered at in the test service.
pub const OPEN_COLLECT_MODULE: Address = Address::new([0xCA; 20]);

/// Address the open reference module is registered at in the test service.
pub const OPEN_REFERENCE_MODULE: Address = Address::new([0xEA; 20]);

/// Fixed timestamp the test service's clock reports.
pub const TEST_TIMESTAMP: u64 = 1_700_000_000;

/// A fully wired service with in-memory adapters, plus handles to every
/// collaborator for inspection.
pub struct TestService {
    /// The wired service.
    pub service: PublishingService<InMemoryGraphStore, InMemoryWhitelist, InMemoryModuleRegistry>,
    /// Handle to the underlying store.
    pub store: Arc<InMemoryGraphStore>,
    /// Handle to the whitelist.
    pub whitelist: Arc<InMemoryWhitelist>,
    /// Handle to the module registry.
    pub registry: Arc<InMemoryModuleRegistry>,
    /// Handle to the recording sink.
    pub sink: Arc<RecordingNotificationSink>,
}

/// Create a service with in-memory adapters and the open modules
/// pre-registered (for testing).
#[must_use]
pub fn create_test_service() -> TestService {
    let store = Arc::new(InMemoryGraphStore::new());

    let whitelist = Arc::new(InMemoryWhitelist::new());
    whitelist.approve(OPEN_FOLLOW_MODULE, ModuleRole::Follow);
    whitelist.approve(OPEN_FOLLOW_MODULE, ModuleRole::Join);
    whitelist.approve(OPEN_COLLECT_MODULE, ModuleRole::Collect);
    whitelist.approve(OPEN_REFERENCE_MODULE, ModuleRole::Reference);

    let registry = Arc::new(InMemoryModuleRegistry::new());
    registry.register_follow(OPEN_FOLLOW_MODULE, Arc::new(OpenFollowModule));
    registry.register_collect(OPEN_COLLECT_MODULE, Arc::new(OpenCollectModule));
    registry.register_reference(OPEN_REFERENCE_MODULE, Arc::new(OpenReferenceModule));

    let sink = Arc::new(RecordingNotificationSink::new());

    let service = PublishingService::new(
        store.clone(),
        whitelist.clone(),
        registry.clone(),
        sink.clone(),
        Arc::new(FixedTimeSource::new(TEST_TIMESTAMP)),
        ServiceConfig::default(),
    );

    TestService {
        service,
        store,
        whitelist,
        registry,
        sink,
    }
}

// =============================================================================
// TESTS
// =============================================================================
