//! # Observable-Behavior Properties
//!
//! The property suite over the public API: handle uniqueness and
//! validation, existence checks that write nothing, self-reference guards,
//! whitelist gating per role, the zero-reference short-circuit, and
//! follow-module re-initialization.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{Address, Bytes, GroupId, ModuleError, ProfileId, PubId, PublishError};

    use px_02_module_gateway::adapters::{
        InMemoryModuleRegistry, InMemoryWhitelist, OpenCollectModule, OpenFollowModule,
        OpenReferenceModule,
    };
    use px_01_pointer_resolver::ports::PublicationRead;
    use px_02_module_gateway::ports::{FollowModule, ModuleRole, WhitelistOracle};
    use px_03_publishing_engine::prelude::*;
    use px_03_publishing_engine::ports::outbound::GraphStore;
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

    fn profile_request(handle: &str) -> CreateProfileRequest {
        CreateProfileRequest {
            owner: Address::new([0x22; 20]),
            handle: handle.into(),
            image_uri: "ipfs://img".into(),
            follow_module: None,
            follow_module_init_data: Bytes::new(),
            follow_nft_uri: "ipfs://nft".into(),
        }
    }

    async fn seed_profile(rig: &TestService, handle: &str, id: u64) -> ProfileId {
        let profile_id = ProfileId::new(id);
        rig.service
            .handle_create_profile(caller(), profile_request(handle), profile_id)
            .await
            .expect("seed profile");
        profile_id
    }

    fn post_request(profile: u64) -> PostRequest {
        PostRequest {
            profile_id: ProfileId::new(profile),
            content_uri: "ipfs://post".into(),
            collect_module: OPEN_COLLECT_MODULE,
            collect_module_init_data: Bytes::new(),
            reference_module: None,
            reference_module_init_data: Bytes::new(),
        }
    }

    /// Whitelist oracle counting lookups per role.
    struct CountingWhitelist {
        inner: InMemoryWhitelist,
        reference_lookups: AtomicU64,
    }

    #[async_trait]
    impl WhitelistOracle for CountingWhitelist {
        async fn is_approved(&self, module: Address, role: ModuleRole) -> bool {
            if role == ModuleRole::Reference {
                self.reference_lookups.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.is_approved(module, role).await
        }
    }

    /// Follow module counting initializations.
    struct CountingFollowModule {
        calls: AtomicU64,
    }

    #[async_trait]
    impl FollowModule for CountingFollowModule {
        async fn initialize_follow_module(
            &self,
            _profile_id: ProfileId,
            _init_data: &Bytes,
        ) -> Result<Bytes, ModuleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::new())
        }
    }

    // =============================================================================
    // HANDLE PROPERTIES
    // =============================================================================

    /// Every unique valid handle registers exactly once; the second
    /// attempt fails `HandleTaken`.
    #[tokio::test]
    async fn test_unique_handle_registers_exactly_once() {
        let rig = create_test_service();
        let mut rng = StdRng::seed_from_u64(7);
        const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz._-";

        for id in 1..=20u64 {
            let len = rng.gen_range(1..=31);
            let handle: String = (0..len)
                .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
                .collect();

            // First registration under a fresh handle may collide with an
            // earlier random draw; skip those.
            let first = rig
                .service
                .handle_create_profile(caller(), profile_request(&handle), ProfileId::new(id))
                .await;
            match first {
                Ok(created) => assert_eq!(created.handle, handle),
                Err(err) => {
                    assert_eq!(err, PublishError::HandleTaken);
                    continue;
                }
            }

            let second = rig
                .service
                .handle_create_profile(
                    caller(),
                    profile_request(&handle),
                    ProfileId::new(id + 1000),
                )
                .await
                .unwrap_err();
            assert_eq!(second, PublishError::HandleTaken);
        }
    }

    /// Out-of-charset and out-of-length handles fail validation and write
    /// nothing.
    #[tokio::test]
    async fn test_invalid_handles_write_nothing() {
        let rig = create_test_service();

        let cases = [
            (String::new(), PublishError::HandleLengthInvalid),
            ("a".repeat(32), PublishError::HandleLengthInvalid),
            ("Alice".into(), PublishError::HandleContainsInvalidCharacters),
            (
                "with space".into(),
                PublishError::HandleContainsInvalidCharacters,
            ),
            ("emoji🦀".into(), PublishError::HandleContainsInvalidCharacters),
        ];
        for (handle, expected) in cases {
            let err = rig
                .service
                .handle_create_profile(caller(), profile_request(&handle), ProfileId::new(1))
                .await
                .unwrap_err();
            assert_eq!(err, expected, "handle: {handle:?}");
        }

        assert!(rig
            .store
            .profile(ProfileId::new(1))
            .await
            .unwrap()
            .is_none());
        assert!(rig.sink.is_empty());
    }

    // =============================================================================
    // POINTER PROPERTIES
    // =============================================================================

    /// Mirror-of-mirror stores the root's identifiers, never the
    /// intermediate mirror's.
    #[tokio::test]
    async fn test_mirror_chain_depth_is_one() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        seed_profile(&rig, "bob", 2).await;
        seed_profile(&rig, "carol", 3).await;

        rig.service
            .handle_create_post(post_request(1), PubId::new(1))
            .await
            .unwrap();
        rig.service
            .handle_create_mirror(
                MirrorRequest {
                    profile_id: ProfileId::new(2),
                    profile_id_pointed: ProfileId::new(1),
                    pub_id_pointed: PubId::new(1),
                    reference_module_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap();
        rig.service
            .handle_create_mirror(
                MirrorRequest {
                    profile_id: ProfileId::new(3),
                    profile_id_pointed: ProfileId::new(2),
                    pub_id_pointed: PubId::new(1),
                    reference_module_data: Bytes::new(),
                    reference_module: None,
                    reference_module_init_data: Bytes::new(),
                },
                PubId::new(1),
            )
            .await
            .unwrap();

        let stored = rig
            .store
            .publication(ProfileId::new(3), PubId::new(1))
            .await
            .unwrap()
            .unwrap();
        let pointed = stored.pointed.unwrap();
        assert_eq!(pointed.profile_id, ProfileId::new(1));
        assert_eq!(pointed.pub_id, PubId::new(1));

        // Every committed record satisfies the depth-1 invariant.
        let target = rig
            .store
            .publication(pointed.profile_id, pointed.pub_id)
            .await
            .unwrap()
            .unwrap();
        assert!(check_all_invariants(&stored, Some(&target)).is_ok());
    }

    /// Comment existence checks abort before any write.
    #[tokio::test]
    async fn test_comment_existence_failures_write_nothing() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        seed_profile(&rig, "bob", 2).await;
        let before = rig.sink.len();

        for pointed in [0u64, 7] {
            let err = rig
                .service
                .handle_create_comment(
                    CommentRequest {
                        profile_id: ProfileId::new(2),
                        content_uri: "ipfs://comment".into(),
                        profile_id_pointed: ProfileId::new(1),
                        pub_id_pointed: PubId::new(pointed),
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

        assert!(rig
            .store
            .publication(ProfileId::new(2), PubId::new(1))
            .await
            .unwrap()
            .is_none());
        let bob = rig.store.profile(ProfileId::new(2)).await.unwrap().unwrap();
        assert_eq!(bob.publication_count, 0);
        assert_eq!(rig.sink.len(), before);
    }

    /// A comment pointing at its own assigned slot fails the self guard,
    /// not the existence check.
    #[tokio::test]
    async fn test_self_comment_guard() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;

        let err = rig
            .service
            .handle_create_comment(
                CommentRequest {
                    profile_id: ProfileId::new(1),
                    content_uri: "ipfs://comment".into(),
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
            .unwrap_err();

        assert_eq!(err, PublishError::CannotCommentOnSelf);
    }

    // =============================================================================
    // WHITELIST PROPERTIES
    // =============================================================================

    /// Each role rejects an unapproved address with its own error and
    /// leaves the target's module field untouched.
    #[tokio::test]
    async fn test_whitelist_rejection_per_role() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;
        let rogue = Address::new([0x66; 20]);

        // Follow.
        let err = rig
            .service
            .handle_set_follow_module(SetFollowModuleRequest {
                profile_id: ProfileId::new(1),
                follow_module: Some(rogue),
                follow_module_init_data: Bytes::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::FollowModuleNotWhitelisted(rogue));
        let profile = rig.store.profile(ProfileId::new(1)).await.unwrap().unwrap();
        assert!(profile.follow_module.is_none());

        // Collect.
        let mut post = post_request(1);
        post.collect_module = rogue;
        let err = rig
            .service
            .handle_create_post(post, PubId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::CollectModuleNotWhitelisted(rogue));

        // Reference.
        let mut post = post_request(1);
        post.reference_module = Some(rogue);
        let err = rig
            .service
            .handle_create_post(post, PubId::new(2))
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::ReferenceModuleNotWhitelisted(rogue));
        let record = rig
            .store
            .publication(ProfileId::new(1), PubId::new(2))
            .await
            .unwrap()
            .unwrap();
        assert!(record.reference_module.is_none());

        // Join.
        let err = rig
            .service
            .handle_create_group(
                GroupRequest {
                    profile_id: ProfileId::new(1),
                    content_uri: "ipfs://group".into(),
                    collect_module: OPEN_COLLECT_MODULE,
                    collect_module_init_data: Bytes::new(),
                    join_module: rogue,
                    join_module_init_data: Bytes::new(),
                },
                GroupId::new(1),
            )
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::JoinModuleNotWhitelisted(rogue));
    }

    /// An absent reference module never triggers a whitelist lookup and
    /// yields an empty return payload.
    #[tokio::test]
    async fn test_absent_reference_module_short_circuits() {
        let store = Arc::new(InMemoryGraphStore::new());

        let inner = InMemoryWhitelist::new();
        inner.approve(OPEN_FOLLOW_MODULE, ModuleRole::Follow);
        inner.approve(OPEN_COLLECT_MODULE, ModuleRole::Collect);
        inner.approve(OPEN_REFERENCE_MODULE, ModuleRole::Reference);
        let whitelist = Arc::new(CountingWhitelist {
            inner,
            reference_lookups: AtomicU64::new(0),
        });

        let registry = Arc::new(InMemoryModuleRegistry::new());
        registry.register_follow(OPEN_FOLLOW_MODULE, Arc::new(OpenFollowModule));
        registry.register_collect(OPEN_COLLECT_MODULE, Arc::new(OpenCollectModule));
        registry.register_reference(OPEN_REFERENCE_MODULE, Arc::new(OpenReferenceModule));

        let sink = Arc::new(RecordingNotificationSink::new());
        let service = PublishingService::new(
            store,
            whitelist.clone(),
            registry,
            sink,
            Arc::new(FixedTimeSource::new(1_700_000_000)),
            ServiceConfig::default(),
        );

        service
            .handle_create_profile(caller(), profile_request("alice"), ProfileId::new(1))
            .await
            .unwrap();
        let created = service
            .handle_create_post(post_request(1), PubId::new(1))
            .await
            .unwrap();

        assert!(created.reference_module_return_data.is_empty());
        assert_eq!(whitelist.reference_lookups.load(Ordering::SeqCst), 0);
    }

    // =============================================================================
    // FOLLOW MODULE PROPERTIES
    // =============================================================================

    /// `set_follow_module` re-runs initialization on every call with
    /// identical inputs; nothing is memoized.
    #[tokio::test]
    async fn test_follow_module_initialization_not_memoized() {
        let rig = create_test_service();
        seed_profile(&rig, "alice", 1).await;

        let counting = Arc::new(CountingFollowModule {
            calls: AtomicU64::new(0),
        });
        let module = Address::new([0x77; 20]);
        rig.whitelist.approve(module, ModuleRole::Follow);
        rig.registry.register_follow(module, counting.clone());

        for _ in 0..3 {
            rig.service
                .handle_set_follow_module(SetFollowModuleRequest {
                    profile_id: ProfileId::new(1),
                    follow_module: Some(module),
                    follow_module_init_data: Bytes::from_slice(b"same"),
                })
                .await
                .unwrap();
        }

        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
    }
}
