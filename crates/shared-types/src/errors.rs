//! # Error Types
//!
//! The request-fatal error taxonomy for the publication graph core. Every
//! failure aborts the current request; there is no local recovery, no
//! retry, and no default-value substitution. The caller decides whether to
//! resubmit.

use crate::value_objects::{Address, GroupId, ProfileId};
use thiserror::Error;

// =============================================================================
// MODULE ERRORS
// =============================================================================

/// An opaque failure raised by an extension module.
///
/// The core forwards these verbatim and never interprets the contents; a
/// module that fails (or rejects a comment/mirror hook) aborts the whole
/// enclosing request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ModuleError(pub String);

impl ModuleError {
    /// Creates a module error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from graph store access.
///
/// The in-memory store never produces these; durable store adapters map
/// their fault modes here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store backend is unavailable.
    #[error("graph store unavailable")]
    Unavailable,

    /// Store state is corrupted.
    #[error("graph store corruption detected")]
    Corrupted,

    /// Other store error.
    #[error("graph store error: {0}")]
    Other(String),
}

// =============================================================================
// PUBLISH ERRORS
// =============================================================================

/// Errors aborting a publication-graph request.
///
/// Validation failures are detected before or during the write they guard.
/// Earlier already-validated writes in the same request are not rolled back
/// individually; all-or-nothing visibility is the enclosing identity
/// layer's transaction boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Handle is empty or longer than the maximum.
    #[error("handle length invalid")]
    HandleLengthInvalid,

    /// Handle contains a character outside `[0-9a-z._-]`.
    #[error("handle contains invalid characters")]
    HandleContainsInvalidCharacters,

    /// Handle is already indexed to another profile.
    #[error("handle taken")]
    HandleTaken,

    /// Profile image URI exceeds the maximum length.
    #[error("profile image URI length invalid")]
    ProfileImageUriLengthInvalid,

    /// Operation targets a profile that was never created.
    #[error("profile does not exist: {0}")]
    ProfileDoesNotExist(ProfileId),

    /// Operation targets a group that was never created.
    #[error("group does not exist: {0}")]
    GroupDoesNotExist(GroupId),

    /// Referenced publication does not exist (comment or mirror target).
    #[error("publication does not exist")]
    PublicationDoesNotExist,

    /// A comment may not point at itself.
    #[error("cannot comment on self")]
    CannotCommentOnSelf,

    /// A group comment may not point at the group itself.
    #[error("cannot comment on group")]
    CannotCommentOnGroup,

    /// Follow module address is not whitelisted.
    #[error("follow module not whitelisted: {0}")]
    FollowModuleNotWhitelisted(Address),

    /// Collect module address is not whitelisted.
    #[error("collect module not whitelisted: {0}")]
    CollectModuleNotWhitelisted(Address),

    /// Reference module address is not whitelisted.
    #[error("reference module not whitelisted: {0}")]
    ReferenceModuleNotWhitelisted(Address),

    /// Join module address is not whitelisted.
    #[error("join module not whitelisted: {0}")]
    JoinModuleNotWhitelisted(Address),

    /// Module address is whitelisted but no implementation is registered.
    #[error("module not registered: {0}")]
    ModuleNotRegistered(Address),

    /// A module call exceeded its execution budget.
    #[error("module call exceeded budget: {max_ms}ms")]
    ModuleCallTimeout {
        /// Configured budget in milliseconds.
        max_ms: u64,
    },

    /// A module raised a failure; forwarded verbatim.
    #[error("module failure: {0}")]
    Module(#[from] ModuleError),

    /// Graph store fault.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl PublishError {
    /// Returns true if this failure came from an extension module rather
    /// than core validation.
    #[must_use]
    pub fn is_module_raised(&self) -> bool {
        matches!(self, Self::Module(_) | Self::ModuleCallTimeout { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
