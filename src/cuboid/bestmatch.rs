// Best-match resolver (C6).
//
// Snaps an arbitrary requested projection onto a materialized, on-tree
// cuboid in three stages: translate the request through each group's
// structural constraints, pick the tightest translation across groups, then
// walk up the lattice until a materialized ancestor is found.

use std::collections::BTreeSet;

use crate::cuboid::bitmask;
use crate::cuboid::descriptor::CubeDescriptor;
use crate::cuboid::enumerate::{close_under_constraints, on_tree_parent_global};
use crate::cuboid::group::AggregationGroup;
use crate::error::{DbError, Result};

/// Stage 1: promotes `q` onto `group`'s structural constraints. Returns
/// `Ok(None)` if `q` reaches outside the group's universe (the group simply
/// cannot serve this request). Returns `Err(AssertOnTree)` if the promoted
/// result still fails `is_on_tree` after every fallback — a descriptor bug,
/// not a recoverable condition.
pub fn translate_to_on_tree(group: &AggregationGroup, q: u64) -> Result<Option<u64>> {
    if !bitmask::is_subset(q, group.partial_cube_full_mask) {
        return Ok(None);
    }

    let mut r = close_under_constraints(group, q | group.mandatory_column_mask);
    if group.is_on_tree(r) {
        return Ok(Some(r));
    }

    // `r` carries no non-mandatory bits yet; force in at least one. Prefer a
    // plain dimension, then an untouched hierarchy's first level, then the
    // smallest joint.
    let hierarchy_union = group.hierarchy_union();
    let non_joint_dims = (group.partial_cube_full_mask & !group.mandatory_column_mask) & !group.joint_dims_mask;
    let non_joint_non_hierarchy = non_joint_dims & !hierarchy_union;

    if non_joint_non_hierarchy != 0 {
        r |= bitmask::lowest_set_bit(non_joint_non_hierarchy);
    } else if let Some(hierarchy) = group
        .hierarchies
        .iter()
        .find(|h| h.all_masks[0] & group.joint_dims_mask == 0)
    {
        r |= hierarchy.all_masks[0];
    } else if let Some(joint) = bitmask::select_min(group.joints.iter().copied()) {
        r |= joint;
    }

    if !group.is_on_tree(r) {
        return Err(DbError::AssertOnTree(r));
    }
    Ok(Some(r))
}

/// The full Stage-1/2/3 pipeline: translate across every group, take the
/// tightest translation, then walk ancestors until a materialized cuboid is
/// reached.
pub fn resolve_best_match(q: u64, descriptor: &CubeDescriptor, materialized: &BTreeSet<u64>) -> Result<u64> {
    bitmask::validate_range(q, descriptor.dimension_count)?;

    let mut translations = Vec::new();
    for group in &descriptor.aggregation_groups {
        if let Some(candidate) = translate_to_on_tree(group, q)? {
            translations.push(candidate);
        }
    }

    let mut candidate = bitmask::select_min(translations).unwrap_or(descriptor.base_cuboid_id);

    loop {
        if materialized.contains(&candidate) {
            return Ok(candidate);
        }
        candidate = on_tree_parent_global(candidate, &descriptor.aggregation_groups, descriptor.base_cuboid_id)
            .ok_or(DbError::NoValidParent(candidate))?;
    }
}
