//! # Integration Test Flows
//!
//! End-to-end choreography across the three components: the publishing
//! engine (px-03) validating requests, the pointer resolver (px-01)
//! collapsing mirror chains, and the module gateway (px-02) attaching and
//! invoking extension modules.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use shared_types::{Address, Bytes, GroupId, ModuleError, ProfileId, PubId, PublishError};

    use px_01_pointer_resolver::ports::PublicationRead;
    use px_01_pointer_resolver::resolver::{resolve_group_pointer, resolve_pointer};
    use px_02_module_gateway::ports::{FollowModule, ModuleRole, ReferenceModule};
    use px_03_publishing_engine::events::Notification;
    use px_03_publishing_engine::ports::outbound::GraphStore;
    use px_03_publishing_engine::prelude::*;
    use px_03_publishing_engine::service::{
        create_test_service, TestService, OPEN_COLLECT_MODULE, OPEN_FOLLOW_MODULE,
        OPEN_REFERENCE_MODULE,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn caller() -> Address {
        Address::new([0x11; 20])
    }

    async fn seed_profile(rig: &TestService, handle: &str, id: u64) -> ProfileId {
        let profile_id = ProfileId::new(id);
        rig.service
            .handle_create_profile(
                caller(),
                CreateProfileRequest {
                    owner: Address::new([0x22; 20]),
                    handle: handle.into(),
                    image_uri: "ipfs://img".into(),
                    follow_module: None,
                    follow_module_init_data: Bytes::new(),
                    follow_nft_uri: "ipfs://nft".into(),
                },
                profile_id,
            )
            .await
            .expect("seed profile");
        profile_id
    }

    fn post_request(profile: u64, reference_module: Option<Address>) -> PostRequest {
        PostRequest {
            profile_id: ProfileId::new(profile),
            content_uri: "ipfs://post".into(),
            collect_module: OPEN_COLLECT_MODULE,
            collect_module_init_data: Bytes::new(),
            reference_module,
            reference_module_init_data: Bytes::new(),
        }
    }

    fn comment_request(profile: u64, pointed_profile: u64, pointed_pub: u64) -> CommentRequest {
        CommentRequest {
            profile_id: ProfileId::new(profile),
            content_uri: "ipfs://comment".into(),
            profile_id_pointed: ProfileId::new(pointed_profile),
            pub_id_pointed: PubId::new(pointed_pub),
            reference_module_data: Bytes::new(),
            collect_module: OPEN_COLLECT_MODULE,
            collect_module_init_data: Bytes::new(),
            reference_module: None,
            reference_module_init_data: Bytes::new(),
        }
    }

    fn mirror_request(profile: u64, pointed_profile: u64, pointed_pub: u64) -> MirrorRequest {
        MirrorRequest {
            profile_id: ProfileId::new(profile),
            profile_id_pointed: ProfileId::new(pointed_profile),
            pub_id_pointed: PubId::new(pointed_pub),
            reference_module_data: Bytes::new(),
            reference_module: None,
            reference_module_init_data: Bytes::new(),
        }
    }

    fn group_request(profile: u64) -> GroupRequest {
        GroupRequest {
            profile_id: ProfileId::new(profile),
            content_uri: "ipfs://group".into(),
            collect_module: OPEN_COLLECT_MODULE,
            collect_module_init_data: Bytes::new(),
            join_module: OPEN_FOLLOW_MODULE,
            join_module_init_data: Bytes::new(),
        }
    }

    /// Reference module admitting only an allowlist of commenters and
    /// mirrorers.
    struct AllowlistReferenceModule {
        allowed: HashSet<ProfileId>,
    }

    #[async_trait]
    impl ReferenceModule for AllowlistReferenceModule {
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
            commenter_profile_id: ProfileId,
            _pointed_profile_id: ProfileId,
            _pointed_pub_id: PubId,
            _data: &Bytes,
        ) -> Result<(), ModuleError> {
            if self.allowed.contains(&commenter_profile_id) {
                Ok(())
            } else {
                Err(ModuleError::new("commenter not allowed"))
            }
        }

        async fn process_mirror(
            &self,
            mirrorer_profile_id: ProfileId,
            _root_profile_id: ProfileId,
            _root_pub_id: PubId,
            _data: &Bytes,
        ) -> Result<(), ModuleError> {
            if self.allowed.contains(&mirrorer_profile_id) {
                Ok(())
            } else {
                Err(ModuleError::new("mirrorer not allowed"))
            }
        }
    }

    /// Follow module echoing its init payload back as return data.
    struct EchoFollowModule;

    #[async_trait]
    impl FollowModule for EchoFollowModule {
        async fn initialize_follow_module(
            &self,
            _profile_id: ProfileId,
            init_data: &Bytes,
        ) -> Result<Bytes, ModuleError> {
            Ok(init_data.clone())
        }
    }

    // =============================================================================
    // FULL LIFECYCLE
    // =============================================================================

    /// Profile -> post -> comment -> mirror -> mirror-of-mirror, with the
    /// resolver collapsing the chain at every step.
    #[tokio::test]
    async fn test_full_publication_lifecycle() {
        let rig = create_test_service();
        let alice = seed_profile(&rig, "alice", 1).await;
        let bob = seed_profile(&rig, "bob", 2).await;
        let carol = seed_profile(&rig, "carol", 3).await;

        // Alice posts.
        let post = rig
            .service
            .handle_create_post(post_request(1, Some(OPEN_REFERENCE_MODULE)), PubId::new(1))
            .await
            .unwrap();
        assert_eq!(post.profile_id, alice);

        // Bob comments on the post; the open reference module admits him.
        let comment = rig
            .service
            .handle_create_comment(comment_request(2, 1, 1), PubId::new(1))
            .await
            .unwrap();
        assert_eq!(comment.profile_id_pointed, alice);

        // Carol mirrors bob's comment (a leaf).
        let mirror = rig
            .service
            .handle_create_mirror(mirror_request(3, 2, 1), PubId::new(1))
            .await
            .unwrap();
        assert_eq!(mirror.root_profile_id, bob);
        assert_eq!(mirror.root_pub_id, PubId::new(1));

        // Alice mirrors carol's mirror; the chain collapses to the
        // comment, not to carol's mirror.
        let second = rig
            .service
            .handle_create_mirror(mirror_request(1, 3, 1), PubId::new(2))
            .await
            .unwrap();
        assert_eq!(second.profile_id_pointed, carol);
        assert_eq!(second.root_profile_id, bob);

        let root = resolve_pointer(alice, PubId::new(2), &*rig.store)
            .await
            .unwrap();
        assert_eq!(root.profile_id, bob);
        assert_eq!(root.pub_id, PubId::new(1));
        assert_eq!(root.collect_module, OPEN_COLLECT_MODULE);

        // One notification per request, in order.
        let recorded = rig.sink.recorded();
        assert_eq!(recorded.len(), 7);
        assert!(matches!(recorded[3], Notification::PostCreated(_)));
        assert!(matches!(recorded[4], Notification::CommentCreated(_)));
        assert!(matches!(recorded[5], Notification::MirrorCreated(_)));
        assert!(matches!(recorded[6], Notification::MirrorCreated(_)));
    }

    // =============================================================================
    // REFERENCE MODULE GATING
    // =============================================================================

    /// A gating reference module on the pointed publication decides who
    /// may comment and who may mirror; rejection aborts the request.
    #[tokio::test]
    async fn test_reference_module_gates_comments_and_mirrors() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        let bob = seed_profile(&rig, "bob", 2).await;
        seed_profile(&rig, "carol", 3).await;

        // Gated module admitting only bob.
        let gate = Address::new([0x99; 20]);
        rig.whitelist.approve(gate, ModuleRole::Reference);
        rig.registry.register_reference(
            gate,
            Arc::new(AllowlistReferenceModule {
                allowed: [bob].into_iter().collect(),
            }),
        );

        rig.service
            .handle_create_post(post_request(1, Some(gate)), PubId::new(1))
            .await
            .unwrap();

        // Bob passes the gate.
        rig.service
            .handle_create_comment(comment_request(2, 1, 1), PubId::new(1))
            .await
            .unwrap();

        // Carol is rejected; the failure is the module's own, verbatim.
        let err = rig
            .service
            .handle_create_comment(comment_request(3, 1, 1), PubId::new(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PublishError::Module(ModuleError::new("commenter not allowed"))
        );
        assert!(err.is_module_raised());

        // Same gate applies to mirrors of the post.
        let err = rig
            .service
            .handle_create_mirror(mirror_request(3, 1, 1), PubId::new(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PublishError::Module(ModuleError::new("mirrorer not allowed"))
        );

        rig.service
            .handle_create_mirror(mirror_request(2, 1, 1), PubId::new(2))
            .await
            .unwrap();
    }

    // =============================================================================
    // GROUP FLOWS
    // =============================================================================

    /// Group creation, group posts, group comments, and group mirrors,
    /// including the group-specific guards.
    #[tokio::test]
    async fn test_group_lifecycle() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        seed_profile(&rig, "bob", 2).await;
        let group = GroupId::new(10);

        let created = rig
            .service
            .handle_create_group(group_request(1), group)
            .await
            .unwrap();
        assert_eq!(created.join_module, OPEN_FOLLOW_MODULE);

        let record = rig.store.group(group).await.unwrap().unwrap();
        assert_eq!(record.collect_module, Some(OPEN_COLLECT_MODULE));
        assert_eq!(record.join_module, Some(OPEN_FOLLOW_MODULE));

        // Alice posts into the group.
        rig.service
            .handle_create_group_post(
                GroupPostRequest {
                    profile_id: ProfileId::new(1),
                    group_id: group,
                    content_uri: "ipfs://group-post".into(),
                    collect_module: OPEN_COLLECT_MODULE,
                    collect_module_init_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap();

        let stored = rig
            .store
            .group_publication(group, ProfileId::new(1), PubId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.group, Some(group));

        // Bob comments on the group post.
        rig.service
            .handle_create_group_comment(
                GroupCommentRequest {
                    profile_id: ProfileId::new(2),
                    group_id: group,
                    content_uri: "ipfs://group-comment".into(),
                    profile_id_pointed: ProfileId::new(1),
                    pub_id_pointed: PubId::new(1),
                    reference_module_data: Bytes::new(),
                    collect_module: OPEN_COLLECT_MODULE,
                    collect_module_init_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap();

        // Bob mirrors the group post; resolution stays inside the group
        // namespace.
        rig.service
            .handle_create_group_mirror(
                GroupMirrorRequest {
                    profile_id: ProfileId::new(2),
                    group_id: group,
                    profile_id_pointed: ProfileId::new(1),
                    pub_id_pointed: PubId::new(1),
                    reference_module_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(2),
            )
            .await
            .unwrap();

        let root = resolve_group_pointer(group, ProfileId::new(2), PubId::new(2), &*rig.store)
            .await
            .unwrap();
        assert_eq!(root.profile_id, ProfileId::new(1));
        assert_eq!(root.pub_id, PubId::new(1));
    }

    /// Commenting on the group itself is rejected before any lookup.
    #[tokio::test]
    async fn test_cannot_comment_on_group() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        let group = GroupId::new(10);
        rig.service
            .handle_create_group(group_request(1), group)
            .await
            .unwrap();

        let err = rig
            .service
            .handle_create_group_comment(
                GroupCommentRequest {
                    profile_id: ProfileId::new(1),
                    group_id: group,
                    content_uri: "ipfs://comment".into(),
                    profile_id_pointed: ProfileId::new(1),
                    // The pointed pub id equals the group id itself.
                    pub_id_pointed: PubId::new(10),
                    reference_module_data: Bytes::new(),
                    collect_module: OPEN_COLLECT_MODULE,
                    collect_module_init_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap_err();

        assert_eq!(err, PublishError::CannotCommentOnGroup);
    }

    /// A group comment needs its target present in the group namespace.
    #[tokio::test]
    async fn test_group_comment_requires_existing_target() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        let group = GroupId::new(10);
        rig.service
            .handle_create_group(group_request(1), group)
            .await
            .unwrap();

        let err = rig
            .service
            .handle_create_group_comment(
                GroupCommentRequest {
                    profile_id: ProfileId::new(1),
                    group_id: group,
                    content_uri: "ipfs://comment".into(),
                    profile_id_pointed: ProfileId::new(1),
                    pub_id_pointed: PubId::new(4),
                    reference_module_data: Bytes::new(),
                    collect_module: OPEN_COLLECT_MODULE,
                    collect_module_init_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap_err();

        assert_eq!(err, PublishError::PublicationDoesNotExist);
    }

    /// An unwhitelisted join module fails group creation with the
    /// join-specific error and leaves the group's module slot unchanged.
    #[tokio::test]
    async fn test_unwhitelisted_join_module_rejected() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;

        let rogue = Address::new([0x66; 20]);
        let mut request = group_request(1);
        request.join_module = rogue;

        let err = rig
            .service
            .handle_create_group(request, GroupId::new(10))
            .await
            .unwrap_err();

        assert_eq!(err, PublishError::JoinModuleNotWhitelisted(rogue));
        let record = rig.store.group(GroupId::new(10)).await.unwrap().unwrap();
        assert!(record.join_module.is_none());
    }

    // =============================================================================
    // MODULE RETURN DATA
    // =============================================================================

    /// Opaque module return data flows verbatim into notifications.
    #[tokio::test]
    async fn test_module_return_data_in_notifications() {
        let rig = create_test_service();

        let echo = Address::new([0x88; 20]);
        rig.whitelist.approve(echo, ModuleRole::Follow);
        rig.registry.register_follow(echo, Arc::new(EchoFollowModule));

        let created = rig
            .service
            .handle_create_profile(
                caller(),
                CreateProfileRequest {
                    owner: Address::new([0x22; 20]),
                    handle: "alice".into(),
                    image_uri: "ipfs://img".into(),
                    follow_module: Some(echo),
                    follow_module_init_data: Bytes::from_slice(b"gate config"),
                    follow_nft_uri: "ipfs://nft".into(),
                },
                ProfileId::new(1),
            )
            .await
            .unwrap();

        assert_eq!(created.follow_module, Some(echo));
        assert_eq!(created.follow_module_return_data.as_slice(), b"gate config");

        // The same payload reached the sink.
        match &rig.sink.recorded()[0] {
            Notification::ProfileCreated(event) => {
                assert_eq!(event.follow_module_return_data.as_slice(), b"gate config");
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }
}
