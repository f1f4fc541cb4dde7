// Tree assembler (C5).
//
// Takes the layer builder's pre-pad holder, drops blacklisted cuboids, then
// pads the survivors back into connectivity: every cuboid needs a parent
// already in the holder (or reachable within `forward` ancestor hops), and
// padding grows the holder until that closure is reached.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::cuboid::descriptor::CubeDescriptor;
use crate::cuboid::enumerate::on_tree_parent_global;
use crate::cuboid::group::AggregationGroup;

/// Assembles `(materialized cuboids, parent -> children)` from the layer
/// builder's pre-pad holder. The base cuboid is guaranteed present with no
/// parent recorded above it.
pub fn assemble_tree(
    descriptor: &CubeDescriptor,
    pre_holder: &BTreeSet<u64>,
    groups: &[AggregationGroup],
) -> (BTreeSet<u64>, BTreeMap<u64, Vec<u64>>) {
    let mut holder: BTreeSet<u64> = pre_holder
        .iter()
        .copied()
        .filter(|c| !descriptor.is_blacklisted(*c))
        .collect();

    // Sorted holder order gives a deterministic initial queue; everything
    // padding discovers afterward is appended in discovery order.
    let mut queue: VecDeque<u64> = holder.iter().copied().collect();
    let mut parent2child: BTreeMap<u64, Vec<u64>> = BTreeMap::new();

    while let Some(current) = queue.pop_front() {
        if current == descriptor.base_cuboid_id {
            continue;
        }
        let Some(parent) = parent_on_promise(
            current,
            &holder,
            descriptor.parent_forward,
            groups,
            descriptor.base_cuboid_id,
        ) else {
            continue;
        };

        if holder.insert(parent) {
            queue.push_back(parent);
        }
        let children = parent2child.entry(parent).or_default();
        if !children.contains(&current) {
            children.push(current);
        }
    }

    (holder, parent2child)
}

/// Walks up from `c` accepting an ancestor up to `forward` hops above the
/// direct parent, provided the direct parent is not already in `holder`.
/// Terminates because each step strictly increases cardinality, bounded by
/// the dimension count.
fn parent_on_promise(
    c: u64,
    holder: &BTreeSet<u64>,
    forward: u32,
    groups: &[AggregationGroup],
    base_cuboid: u64,
) -> Option<u64> {
    let mut current = c;
    let mut hops_left = forward;
    loop {
        let parent = on_tree_parent_global(current, groups, base_cuboid)?;
        if holder.contains(&parent) || hops_left == 0 {
            return Some(parent);
        }
        current = parent;
        hops_left -= 1;
    }
}
