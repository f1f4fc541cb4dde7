// Layer builder (C4).
//
// Expands the cuboid lattice breadth-first from each group's seed cuboids,
// re-checking the dim-cap filter at every layer so the combinatorial blowup
// is pruned before blacklist filtering and padding ever see it.

use std::collections::BTreeSet;

use crate::cuboid::descriptor::CubeDescriptor;
use crate::cuboid::enumerate::on_tree_parents;
use crate::error::{DbError, Result};

/// Builds the pre-pad holder: every cuboid reachable by repeated parent
/// expansion from the groups' seed cuboids, filtered at each layer by
/// dim-cap, plus the base cuboid (exempt from the dim-cap filter).
pub fn expand_layers(descriptor: &CubeDescriptor) -> Result<BTreeSet<u64>> {
    let max_combination = descriptor.effective_max_combination();

    let mut children: BTreeSet<u64> = BTreeSet::new();
    for group in &descriptor.aggregation_groups {
        children.extend(on_tree_parents(0, group, descriptor.base_cuboid_id));
    }

    let mut holder: BTreeSet<u64> = BTreeSet::new();
    loop {
        // Checked before the layer is folded in: this is the source's exact
        // off-by-one, preserved because external configuration may already
        // be calibrated to it (see the scheduler's design notes).
        if holder.len() > max_combination {
            return Err(DbError::CombinatorialExplosion {
                observed: holder.len(),
                limit: max_combination,
            });
        }
        holder.extend(children.iter().copied());

        let mut next: BTreeSet<u64> = BTreeSet::new();
        for &child in &children {
            for group in &descriptor.aggregation_groups {
                next.extend(on_tree_parents(child, group, descriptor.base_cuboid_id));
            }
        }
        next.retain(|&candidate| {
            candidate == descriptor.base_cuboid_id
                || descriptor
                    .aggregation_groups
                    .iter()
                    .any(|group| group.is_on_tree(candidate) && group.check_dim_cap(candidate))
        });

        if next.is_empty() {
            break;
        }
        children = next;
    }

    holder.insert(descriptor.base_cuboid_id);
    Ok(holder)
}
