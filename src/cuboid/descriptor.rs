// The cube descriptor: the input the scheduler consumes.
//
// Parsing a descriptor out of SQL/DSL/JSON is an external collaborator's
// job; what the scheduler needs is this plain, already-validated data
// contract. `CubeDescriptorBuilder` exists for tests and callers assembling
// one in code, the same shape as the rest of the analytics layer builds its
// declarative objects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cuboid::group::AggregationGroup;

/// Default parent-forward lookahead used when padding the tree for
/// connectivity (see [`crate::cuboid::CuboidScheduler`]).
pub const DEFAULT_PARENT_FORWARD: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeDescriptor {
    pub dimension_count: u32,
    pub base_cuboid_id: u64,
    pub aggregation_groups: Vec<AggregationGroup>,
    pub parent_forward: u32,
    pub blacklist: BTreeSet<u64>,
    /// `cubeAggrGroupMaxCombination`; negative is the "unbounded" sentinel.
    pub cube_aggr_group_max_combination: i64,
}

impl CubeDescriptor {
    pub fn is_blacklisted(&self, c: u64) -> bool {
        self.blacklist.contains(&c)
    }

    /// The hard safety limit the layer builder aborts beyond:
    /// `10 * cubeAggrGroupMaxCombination`, or effectively unbounded when the
    /// configured value is negative. The multiplication intentionally
    /// preserves the source's exact "check before add, then ×10" semantics
    /// rather than "fixing" a limit external configuration may already be
    /// calibrated to.
    pub fn effective_max_combination(&self) -> usize {
        if self.cube_aggr_group_max_combination < 0 {
            usize::MAX
        } else {
            (self.cube_aggr_group_max_combination as u64).saturating_mul(10) as usize
        }
    }
}

pub struct CubeDescriptorBuilder {
    dimension_count: u32,
    base_cuboid_id: Option<u64>,
    aggregation_groups: Vec<AggregationGroup>,
    parent_forward: u32,
    blacklist: BTreeSet<u64>,
    cube_aggr_group_max_combination: i64,
}

impl CubeDescriptorBuilder {
    pub fn new(dimension_count: u32) -> Self {
        Self {
            dimension_count,
            base_cuboid_id: None,
            aggregation_groups: Vec::new(),
            parent_forward: DEFAULT_PARENT_FORWARD,
            blacklist: BTreeSet::new(),
            cube_aggr_group_max_combination: -1,
        }
    }

    /// Defaults to `(1 << dimension_count) - 1` if never called.
    pub fn base_cuboid_id(mut self, id: u64) -> Self {
        self.base_cuboid_id = Some(id);
        self
    }

    pub fn group(mut self, group: AggregationGroup) -> Self {
        self.aggregation_groups.push(group);
        self
    }

    pub fn parent_forward(mut self, hops: u32) -> Self {
        self.parent_forward = hops;
        self
    }

    pub fn blacklist(mut self, cuboid: u64) -> Self {
        self.blacklist.insert(cuboid);
        self
    }

    pub fn max_combination(mut self, limit: i64) -> Self {
        self.cube_aggr_group_max_combination = limit;
        self
    }

    pub fn build(self) -> CubeDescriptor {
        let base_cuboid_id = self
            .base_cuboid_id
            .unwrap_or_else(|| (1u64 << self.dimension_count) - 1);
        CubeDescriptor {
            dimension_count: self.dimension_count,
            base_cuboid_id,
            aggregation_groups: self.aggregation_groups,
            parent_forward: self.parent_forward,
            blacklist: self.blacklist,
            cube_aggr_group_max_combination: self.cube_aggr_group_max_combination,
        }
    }
}
