// Public scheduler surface (C7).
//
// Holds the materialized cuboid set and the parent->children map computed
// eagerly at construction time, and serves every read-only query over them.
// Construction is single-threaded and cooperative; once built the scheduler
// is immutable and safe to share across any number of concurrent readers.
// `by_layer` is the only post-construction computation, and it is memoized
// behind a `OnceCell` so repeated or racing callers see the same result.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::OnceCell;

use crate::cuboid::bestmatch;
use crate::cuboid::bitmask;
use crate::cuboid::descriptor::CubeDescriptor;
use crate::cuboid::layers;
use crate::cuboid::tree;
use crate::error::{DbError, Result};

/// The materialized cuboid set and spanning tree for one cube descriptor.
pub struct CuboidScheduler {
    descriptor: CubeDescriptor,
    cuboids: BTreeSet<u64>,
    parent2child: BTreeMap<u64, Vec<u64>>,
    layers: OnceCell<Vec<Vec<u64>>>,
}

impl CuboidScheduler {
    /// Builds the scheduler from an immutable descriptor: layer expansion,
    /// blacklist filtering, and padding all run here, eagerly.
    pub fn new(descriptor: CubeDescriptor) -> Result<Self> {
        bitmask::validate_range(descriptor.base_cuboid_id, descriptor.dimension_count)?;

        let pre_holder = layers::expand_layers(&descriptor)?;
        let (cuboids, parent2child) =
            tree::assemble_tree(&descriptor, &pre_holder, &descriptor.aggregation_groups);

        Ok(Self {
            descriptor,
            cuboids,
            parent2child,
            layers: OnceCell::new(),
        })
    }

    /// Cardinality of the materialized set.
    pub fn count(&self) -> usize {
        self.cuboids.len()
    }

    /// Read-only view of the materialized set.
    pub fn all_cuboid_ids(&self) -> &BTreeSet<u64> {
        &self.cuboids
    }

    /// Popcount of `c`, after validating it against the cube's dimension
    /// count.
    pub fn cardinality(&self, c: u64) -> Result<u32> {
        bitmask::validate_range(c, self.descriptor.dimension_count)?;
        Ok(bitmask::popcount(c))
    }

    /// `c`'s children in the spanning tree, possibly empty.
    pub fn spanning(&self, c: u64) -> Result<&[u64]> {
        bitmask::validate_range(c, self.descriptor.dimension_count)?;
        Ok(self.parent2child.get(&c).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Layer 0 is `[base]`; layer `i+1` is the union of `spanning` over
    /// layer `i`. Computed lazily on first call and memoized; the total
    /// element count across all layers is checked against
    /// [`Self::count`] and surfaced as a fatal error on mismatch.
    pub fn by_layer(&self) -> Result<&Vec<Vec<u64>>> {
        if let Some(layers) = self.layers.get() {
            return Ok(layers);
        }
        let computed = self.compute_layers()?;
        // Benign race: if another thread won the initialization, we simply
        // discard our own (pure-function) result and read theirs back.
        let _ = self.layers.set(computed);
        Ok(self.layers.get().expect("layers were just initialized"))
    }

    fn compute_layers(&self) -> Result<Vec<Vec<u64>>> {
        let mut layers = vec![vec![self.descriptor.base_cuboid_id]];
        let mut total = layers[0].len();

        loop {
            let previous = layers.last().expect("layers always has at least layer 0");
            let mut next: BTreeSet<u64> = BTreeSet::new();
            for &parent in previous {
                next.extend(self.spanning(parent)?.iter().copied());
            }
            if next.is_empty() {
                break;
            }
            total += next.len();
            layers.push(next.into_iter().collect());
        }

        if total != self.cuboids.len() {
            return Err(DbError::LayerCountMismatch {
                summed: total,
                total: self.cuboids.len(),
            });
        }
        Ok(layers)
    }

    /// Snaps an arbitrary requested projection onto a materialized,
    /// on-tree cuboid that can derive it.
    pub fn best_match(&self, q: u64) -> Result<u64> {
        bestmatch::resolve_best_match(q, &self.descriptor, &self.cuboids)
    }
}
