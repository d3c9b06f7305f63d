//! # Domain Services
//!
//! Stateless helpers: handle and URI validation, and the Keccak-256 handle
//! hash that keys the uniqueness index.

use shared_types::{HandleHash, PublishError};
use sha3::{Digest, Keccak256};

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum handle length in bytes.
pub const MAX_HANDLE_LENGTH: usize = 31;

/// Maximum profile image URI length in bytes.
pub const MAX_PROFILE_IMAGE_URI_LENGTH: usize = 6000;

// =============================================================================
// VALIDATION
// =============================================================================

/// Validates a profile handle.
///
/// Handles are non-empty, at most [`MAX_HANDLE_LENGTH`] bytes, and drawn
/// from `[0-9a-z._-]`. The charset is byte-wise, so multi-byte characters
/// are rejected by the charset check.
///
/// # Errors
///
/// * [`PublishError::HandleLengthInvalid`]
/// * [`PublishError::HandleContainsInvalidCharacters`]
pub fn validate_handle(handle: &str) -> Result<(), PublishError> {
    if handle.is_empty() || handle.len() > MAX_HANDLE_LENGTH {
        return Err(PublishError::HandleLengthInvalid);
    }
    let valid = handle
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'.' | b'_' | b'-'));
    if !valid {
        return Err(PublishError::HandleContainsInvalidCharacters);
    }
    Ok(())
}

/// Validates a profile image URI length.
///
/// # Errors
///
/// * [`PublishError::ProfileImageUriLengthInvalid`]
pub fn validate_profile_image_uri(uri: &str) -> Result<(), PublishError> {
    if uri.len() > MAX_PROFILE_IMAGE_URI_LENGTH {
        return Err(PublishError::ProfileImageUriLengthInvalid);
    }
    Ok(())
}

// =============================================================================
// HASHING
// =============================================================================

/// Computes the Keccak-256 hash of a handle.
///
/// Case-preserving: validation already restricts handles to lowercase, so
/// no folding happens here.
#[must_use]
pub fn handle_hash(handle: &str) -> HandleHash {
    let mut hasher = Keccak256::new();
    hasher.update(handle.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    HandleHash::new(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
