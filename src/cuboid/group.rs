// Aggregation group model.
//
// An aggregation group is a declarative constraint bundle: which dimensions
// it touches, which of those are mandatory, which must travel together as a
// joint, and which form an ordered hierarchy ladder. `is_on_tree` decides
// membership; `check_dim_cap` decides whether a member is still small
// enough to materialize, where a joint or hierarchy counts as a single
// "effective dimension" regardless of how many raw columns it bundles.

use serde::{Deserialize, Serialize};

use crate::cuboid::bitmask;

/// An ordered dimension ladder, e.g. `d0 -> d1 -> d2` for `Year -> Quarter ->
/// Month`. Presence of level `i` forces presence of every level `j < i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    /// `levels[i]` is the bitmask contributed by ladder level `i`. A level
    /// may itself span more than one raw dimension.
    pub levels: Vec<u64>,
    /// `levels[0] | levels[1] | ... | levels[last]`.
    pub full_mask: u64,
    /// `all_masks[i] = levels[0] | ... | levels[i]`, the prefix mask through
    /// level `i` inclusive.
    pub all_masks: Vec<u64>,
}

impl Hierarchy {
    pub fn new(levels: Vec<u64>) -> Self {
        let mut all_masks = Vec::with_capacity(levels.len());
        let mut acc = 0u64;
        for &level in &levels {
            acc |= level;
            all_masks.push(acc);
        }
        let full_mask = acc;
        Self {
            levels,
            full_mask,
            all_masks,
        }
    }
}

/// A declarative constraint set defining which cuboids are valid within a
/// partial cube (a subset of the overall dimension space).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationGroup {
    /// Mask of dimensions this group touches; a cuboid is "in" the group
    /// only if it is a subset of this mask.
    pub partial_cube_full_mask: u64,
    /// Bits every member of this group must include.
    pub mandatory_column_mask: u64,
    /// Dimensions that must appear together: all or none.
    pub joints: Vec<u64>,
    /// Ordered dimension ladders.
    pub hierarchies: Vec<Hierarchy>,
    /// Union of all joint masks, precomputed for the dim-cap count.
    pub joint_dims_mask: u64,
    /// Maximum number of effective dimensions a member may carry.
    pub dim_cap: usize,
}

impl AggregationGroup {
    pub fn new(
        partial_cube_full_mask: u64,
        mandatory_column_mask: u64,
        joints: Vec<u64>,
        hierarchies: Vec<Hierarchy>,
        dim_cap: usize,
    ) -> Self {
        let joint_dims_mask = joints.iter().fold(0u64, |acc, j| acc | j);
        Self {
            partial_cube_full_mask,
            mandatory_column_mask,
            joints,
            hierarchies,
            joint_dims_mask,
            dim_cap,
        }
    }

    /// Union of every hierarchy's `full_mask` in this group.
    pub fn hierarchy_union(&self) -> u64 {
        self.hierarchies.iter().fold(0u64, |acc, h| acc | h.full_mask)
    }

    /// `c` is on this group's tree iff it lies within `partial_cube_full_mask`,
    /// contains `mandatory_column_mask`, respects every joint (all-or-none),
    /// and respects every hierarchy (a level present implies every lower
    /// level is present too).
    pub fn is_on_tree(&self, c: u64) -> bool {
        if !bitmask::is_subset(c, self.partial_cube_full_mask) {
            return false;
        }
        if c & self.mandatory_column_mask != self.mandatory_column_mask {
            return false;
        }
        for joint in &self.joints {
            let intersect = c & joint;
            if intersect != 0 && intersect != *joint {
                return false;
            }
        }
        for hierarchy in &self.hierarchies {
            for (i, level) in hierarchy.levels.iter().enumerate() {
                if c & level == 0 {
                    continue;
                }
                if i > 0 {
                    let required_prefix = hierarchy.all_masks[i - 1];
                    if c & required_prefix != required_prefix {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// `true` iff `c`'s effective dimension count does not exceed `dim_cap`.
    pub fn check_dim_cap(&self, c: u64) -> bool {
        self.effective_dim_count(c) <= self.dim_cap
    }

    /// Joints and hierarchies each count as a single effective dimension
    /// regardless of how many raw columns they bundle; everything else
    /// counts one dimension per set bit.
    fn effective_dim_count(&self, c: u64) -> usize {
        let mut count = 0usize;
        let mut accounted = 0u64;

        for joint in &self.joints {
            if *joint != 0 && c & joint == *joint {
                count += 1;
                accounted |= joint;
            }
        }
        for hierarchy in &self.hierarchies {
            if c & hierarchy.full_mask != 0 {
                count += 1;
                accounted |= hierarchy.full_mask;
            }
        }

        let remaining = c & !accounted;
        count + bitmask::popcount(remaining) as usize
    }
}

/// Fluent builder mirroring the way the rest of the codebase assembles
/// declarative analytics objects piece by piece before freezing them.
pub struct AggregationGroupBuilder {
    partial_cube_full_mask: u64,
    mandatory_column_mask: u64,
    joints: Vec<u64>,
    hierarchies: Vec<Hierarchy>,
    dim_cap: usize,
}

impl AggregationGroupBuilder {
    pub fn new(partial_cube_full_mask: u64) -> Self {
        Self {
            partial_cube_full_mask,
            mandatory_column_mask: 0,
            joints: Vec::new(),
            hierarchies: Vec::new(),
            dim_cap: bitmask::popcount(partial_cube_full_mask) as usize,
        }
    }

    pub fn mandatory(mut self, mask: u64) -> Self {
        self.mandatory_column_mask = mask;
        self
    }

    pub fn joint(mut self, mask: u64) -> Self {
        self.joints.push(mask);
        self
    }

    pub fn hierarchy(mut self, levels: Vec<u64>) -> Self {
        self.hierarchies.push(Hierarchy::new(levels));
        self
    }

    pub fn dim_cap(mut self, cap: usize) -> Self {
        self.dim_cap = cap;
        self
    }

    pub fn build(self) -> AggregationGroup {
        AggregationGroup::new(
            self.partial_cube_full_mask,
            self.mandatory_column_mask,
            self.joints,
            self.hierarchies,
            self.dim_cap,
        )
    }
}
