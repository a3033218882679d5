use std::collections::HashSet;

use blockworld_common::{BlockPos, SectorKey};
use blockworld_kernel::World;
use blockworld_render::Renderer;

/// One broken world invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{0} is shown but not stored")]
    ShownWithoutBlock(BlockPos),
    #[error("{0} is shown but fully enclosed")]
    ShownWhileEnclosed(BlockPos),
    #[error("{pos} is missing from {expected}")]
    MissingFromSector { pos: BlockPos, expected: SectorKey },
    #[error("{pos} is indexed under {found}")]
    WrongSector { pos: BlockPos, found: SectorKey },
    #[error("{0} is indexed but not stored")]
    IndexedWithoutBlock(BlockPos),
    #[error("{0} has an empty bucket")]
    EmptySector(SectorKey),
    #[error("{0} owns a primitive but is not shown")]
    PrimitiveWithoutShow(BlockPos),
    #[error("{0} is shown but owns no primitive")]
    ShowWithoutPrimitive(BlockPos),
}

/// Check the structural invariants of `world`.
///
/// Primitive ownership is only compared with the shown set once the command
/// queue has drained; while work is pending the two are allowed to differ.
pub fn check_invariants<R: Renderer>(world: &World<R>) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let store = world.store();

    for &pos in world.shown().keys() {
        if !store.contains(pos) {
            violations.push(InvariantViolation::ShownWithoutBlock(pos));
        } else if !store.exposed(pos) {
            violations.push(InvariantViolation::ShownWhileEnclosed(pos));
        }
    }

    for &pos in store.blocks().keys() {
        let expected = store.sector_of(pos);
        let indexed = store.sector(expected).is_some_and(|b| b.contains(&pos));
        if !indexed {
            violations.push(InvariantViolation::MissingFromSector { pos, expected });
        }
    }

    for (&key, bucket) in store.sectors() {
        if bucket.is_empty() {
            violations.push(InvariantViolation::EmptySector(key));
        }
        for &pos in bucket {
            if !store.contains(pos) {
                violations.push(InvariantViolation::IndexedWithoutBlock(pos));
            } else if store.sector_of(pos) != key {
                violations.push(InvariantViolation::WrongSector { pos, found: key });
            }
        }
    }

    if world.pending().is_empty() {
        let owned: HashSet<BlockPos> = world.primitive_positions().copied().collect();
        for &pos in &owned {
            if !world.is_shown(pos) {
                violations.push(InvariantViolation::PrimitiveWithoutShow(pos));
            }
        }
        for pos in world.shown().keys() {
            if !owned.contains(pos) {
                violations.push(InvariantViolation::ShowWithoutPrimitive(*pos));
            }
        }
    }

    if !violations.is_empty() {
        tracing::warn!(count = violations.len(), "world invariants violated");
    }
    violations
}
