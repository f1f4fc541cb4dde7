use thiserror::Error;

/// Errors surfaced by the cuboid scheduler.
///
/// Per the scheduler's error model, `OutOfRange` is the only recoverable
/// kind — callers may retry with a different argument. Every other variant
/// signals a fatal invariant violation: the descriptor or the build itself
/// is broken and the scheduler must not be reused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("cuboid {0} out of range for dimension count {1}")]
    OutOfRange(u64, u32),

    #[error("combinatorial explosion: holder reached {observed} cuboids, limit is {limit}")]
    CombinatorialExplosion { observed: usize, limit: usize },

    #[error("no valid on-tree parent found for cuboid {0:#x}")]
    NoValidParent(u64),

    #[error("layer count mismatch: layers summed to {summed}, materialized set has {total}")]
    LayerCountMismatch { summed: usize, total: usize },

    #[error("translated cuboid {0:#x} is not on-tree for its aggregation group")]
    AssertOnTree(u64),

    #[error("invalid descriptor: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
