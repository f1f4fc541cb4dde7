// Per-group parent enumeration (C3).
//
// `on_tree_parents` is the one genuinely polymorphic seam the source's
// scheduler/default-scheduler split existed to support; this crate folds
// that split back into a single concrete algorithm rather than reproducing
// the inheritance, per the design notes. Three independent axes can add
// content to a child: plain dimensions, joints, and hierarchy ladders.

use std::collections::BTreeSet;

use crate::cuboid::bitmask;
use crate::cuboid::group::AggregationGroup;

/// Returns every on-tree cuboid that is a minimal superset of `child` within
/// `group`. `base_cuboid` is the scheduler's global base (all dimensions),
/// returned as the sole parent once `child` already equals the group's full
/// mask. The empty child is special-cased to seed layer 0: the minimal
/// on-tree cuboids built from the group's mandatory columns.
pub fn on_tree_parents(child: u64, group: &AggregationGroup, base_cuboid: u64) -> BTreeSet<u64> {
    if child == group.partial_cube_full_mask {
        return BTreeSet::from([base_cuboid]);
    }
    if child == 0 {
        return lowest_on_tree_cuboids(group);
    }
    axis_candidates(child, group)
        .into_iter()
        .filter(|&c| group.is_on_tree(c))
        .collect()
}

/// The minimal on-tree cuboids a group seeds layer 0 with. A non-empty
/// mandatory mask, once closed under the group's joints and hierarchies, is
/// itself the smallest on-tree member and is returned as-is: there is no
/// smaller on-tree cuboid to reach it through, so it is its own seed. Only
/// when the mandatory mask is empty — closure of `0` is `0`, which is never
/// a materialized cuboid — do we instead walk one step up via the same
/// three axes used for every other parent.
fn lowest_on_tree_cuboids(group: &AggregationGroup) -> BTreeSet<u64> {
    let seed = close_under_constraints(group, group.mandatory_column_mask);
    if !group.is_on_tree(seed) {
        // A malformed descriptor (mandatory columns that can never close
        // under the group's own joints/hierarchies) contributes nothing.
        return BTreeSet::new();
    }
    if seed != 0 {
        return BTreeSet::from([seed]);
    }
    axis_candidates(seed, group)
        .into_iter()
        .filter(|&c| group.is_on_tree(c))
        .collect()
}

/// Repeatedly absorbs whole joints and hierarchy prefixes into `r` until no
/// further bits are pulled in. Used both to seed layer 0 from a group's
/// mandatory columns and, in [`crate::cuboid::bestmatch`], to promote an
/// arbitrary query onto a group's structural constraints.
pub(crate) fn close_under_constraints(group: &AggregationGroup, mut r: u64) -> u64 {
    loop {
        let before = r;
        for hierarchy in &group.hierarchies {
            let intersect = r & hierarchy.full_mask;
            if intersect == 0 || intersect == hierarchy.full_mask {
                continue;
            }
            let mut fill = false;
            for i in (0..hierarchy.levels.len()).rev() {
                if r & hierarchy.levels[i] != 0 {
                    fill = true;
                }
                if fill {
                    r |= hierarchy.levels[i];
                }
            }
        }
        for joint in &group.joints {
            let intersect = r & joint;
            if intersect != 0 && intersect != *joint {
                r |= joint;
            }
        }
        if r == before {
            return r;
        }
    }
}

/// The three independent axes along which a parent may add content to a
/// non-empty, non-full child: a plain dimension bit, a whole joint, or the
/// next hierarchy prefix. Candidates are not yet filtered by `is_on_tree`.
fn axis_candidates(child: u64, group: &AggregationGroup) -> BTreeSet<u64> {
    let mut candidates = BTreeSet::new();
    let hierarchy_union = group.hierarchy_union();

    for dim in 0..bitmask::MAX_DIMENSIONS {
        let bit = 1u64 << dim;
        if bit & group.partial_cube_full_mask == 0 {
            continue;
        }
        if bit & group.joint_dims_mask != 0 || bit & hierarchy_union != 0 {
            continue;
        }
        if bit & child != 0 {
            continue;
        }
        candidates.insert(child | bit);
    }

    for joint in &group.joints {
        if child & joint == 0 {
            candidates.insert(child | joint);
        }
    }

    for hierarchy in &group.hierarchies {
        if let Some(i) = hierarchy
            .all_masks
            .iter()
            .position(|&prefix| child & prefix != prefix)
        {
            candidates.insert(child | hierarchy.all_masks[i]);
        }
    }

    candidates
}

/// The unique on-tree parent of `child` across every group, under the
/// canonical `(cardinality asc, mask asc)` tie-break. `None` means `child`
/// has no on-tree parent in any group.
pub fn on_tree_parent_global(child: u64, groups: &[AggregationGroup], base_cuboid: u64) -> Option<u64> {
    bitmask::select_min(
        groups
            .iter()
            .flat_map(|group| on_tree_parents(child, group, base_cuboid)),
    )
}
