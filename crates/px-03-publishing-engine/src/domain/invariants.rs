//! # Domain Invariants
//!
//! Critical invariants that MUST hold for every committed publication
//! record. Checked in tests and available to embedders auditing a store.
//!
//! - INVARIANT-1: Committed Records Are Classifiable
//! - INVARIANT-2: Mirrors Carry No Content
//! - INVARIANT-3: Depth-1 Chains (a mirror's pointed slot is a leaf)

use shared_types::{PublicationKind, PublicationRecord};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: Committed Records Are Classifiable
///
/// Every committed record is a post or comment carrying a collect module,
/// or a forwarding mirror carrying none. A record with neither pointer nor
/// collect module is a partially written slot and must never be visible
/// after the enclosing request completes.
#[must_use]
pub fn check_classification_invariant(record: &PublicationRecord) -> bool {
    record.is_mirror() || record.collect_module.is_some()
}

/// INVARIANT-2: Mirrors Carry No Content
///
/// A forwarding mirror stores no content URI and no collect module of its
/// own; that is exactly what makes it a mirror.
#[must_use]
pub fn check_mirror_content_invariant(record: &PublicationRecord) -> bool {
    if record.is_mirror() {
        record.content_uri.is_empty()
    } else {
        true
    }
}

/// INVARIANT-3: Depth-1 Chains
///
/// A mirror's pointed slot is a leaf (post or comment). Mirror creation
/// resolves the target before writing, so a mirror pointing at another
/// mirror can only appear through store corruption.
#[must_use]
pub fn check_depth_one_invariant(
    record: &PublicationRecord,
    pointed: Option<&PublicationRecord>,
) -> bool {
    if !record.is_mirror() {
        return true;
    }
    match pointed {
        Some(target) => target.kind() != PublicationKind::Mirror,
        None => false,
    }
}

/// Check all record invariants at once.
///
/// `pointed` is the record at the mirror's pointed slot, if the record is
/// a mirror and the slot exists.
#[must_use]
pub fn check_all_invariants(
    record: &PublicationRecord,
    pointed: Option<&PublicationRecord>,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_classification_invariant(record) {
        violations.push(InvariantViolation::Unclassifiable);
    }

    if !check_mirror_content_invariant(record) {
        violations.push(InvariantViolation::MirrorWithContent);
    }

    if !check_depth_one_invariant(record, pointed) {
        violations.push(InvariantViolation::MirrorChainTooDeep);
    }

    InvariantCheckResult { violations }
}

// =============================================================================
// CHECK RESULT
// =============================================================================

/// A single invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Record carries neither a pointer nor a collect module.
    Unclassifiable,
    /// A mirror stores a content URI.
    MirrorWithContent,
    /// A mirror points at another mirror (or a missing slot).
    MirrorChainTooDeep,
}

/// Result of checking all invariants on a record.
#[derive(Clone, Debug, Default)]
pub struct InvariantCheckResult {
    /// Violations found; empty means the record is sound.
    pub violations: Vec<InvariantViolation>,
}

impl InvariantCheckResult {
    /// Returns true if no invariant was violated.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
