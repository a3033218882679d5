use blockworld_common::BlockPos;

/// Errors from block and visibility operations.
///
/// Both variants are caller errors; nothing in the kernel retries them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("no block at {0}")]
    BlockNotFound(BlockPos),
    /// Double show, double hide and similar bookkeeping violations.
    #[error("illegal state at {pos}: {reason}")]
    IllegalState {
        pos: BlockPos,
        reason: &'static str,
    },
}
