// Property tests over randomly generated cube descriptors.
//
// Rather than hand-picking fixed descriptors, these generate a mandatory
// mask, an optional joint, and a dim-cap at random and check the
// invariants that must hold for any legal descriptor: the spanning tree's
// shrink-by-child-bits relation, unique on-tree parents, base cuboid
// presence, dim-cap-or-on-tree membership, randomized blacklist exclusion,
// the layer-sum/prior-layer invariant (including that each layer's members
// actually parent into the preceding layer), and best-match's subset,
// idempotency, and determinism properties.

use std::collections::BTreeSet;

use proptest::prelude::*;

use rusty_cuboid_scheduler::{AggregationGroupBuilder, CubeDescriptorBuilder, CuboidScheduler};

const DIMS: u32 = 6;
const FULL_MASK: u64 = (1u64 << DIMS) - 1;

fn arb_mask() -> impl Strategy<Value = u64> {
    0..=FULL_MASK
}

/// Builds an aggregation group from a random mandatory mask, an optional
/// joint over two more dimensions, and a dim cap. The joint is deliberately
/// kept disjoint from the mandatory mask so the descriptor stays
/// satisfiable.
fn group_for(mandatory: u64, joint: u64, dim_cap: usize) -> rusty_cuboid_scheduler::AggregationGroup {
    let joint = joint & !mandatory;
    let mut builder = AggregationGroupBuilder::new(FULL_MASK)
        .mandatory(mandatory)
        .dim_cap(dim_cap.max(1));
    if joint.count_ones() >= 2 {
        builder = builder.joint(joint);
    }
    builder.build()
}

fn scheduler_for(mandatory: u64, joint: u64, dim_cap: usize) -> Option<CuboidScheduler> {
    let descriptor = CubeDescriptorBuilder::new(DIMS)
        .group(group_for(mandatory, joint, dim_cap))
        .build();
    CuboidScheduler::new(descriptor).ok()
}

/// Same as [`scheduler_for`] but blacklists the given cuboid.
fn scheduler_for_with_blacklist(mandatory: u64, joint: u64, dim_cap: usize, blacklisted: u64) -> Option<CuboidScheduler> {
    let descriptor = CubeDescriptorBuilder::new(DIMS)
        .group(group_for(mandatory, joint, dim_cap))
        .blacklist(blacklisted)
        .build();
    CuboidScheduler::new(descriptor).ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_child_is_a_strict_subset_of_its_parent(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        for &parent in scheduler.all_cuboid_ids() {
            for &child in scheduler.spanning(parent).unwrap() {
                prop_assert_eq!(child & !parent, 0);
                prop_assert!(child.count_ones() < parent.count_ones());
            }
        }
    }

    #[test]
    fn every_materialized_non_base_member_has_exactly_one_parent(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        let base = *scheduler.all_cuboid_ids().iter().max_by_key(|c| c.count_ones()).unwrap();

        let mut parent_count: std::collections::BTreeMap<u64, usize> = Default::default();
        for &parent in scheduler.all_cuboid_ids() {
            for &child in scheduler.spanning(parent).unwrap() {
                *parent_count.entry(child).or_default() += 1;
            }
        }
        for &member in scheduler.all_cuboid_ids() {
            if member == base {
                continue;
            }
            prop_assert_eq!(parent_count.get(&member).copied().unwrap_or(0), 1);
        }
    }

    #[test]
    fn base_cuboid_is_always_present_with_no_parent(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        prop_assert!(scheduler.all_cuboid_ids().contains(&FULL_MASK));
        prop_assert!(scheduler
            .all_cuboid_ids()
            .iter()
            .all(|&c| !scheduler.spanning(c).unwrap().contains(&FULL_MASK)));
    }

    #[test]
    fn layer_sum_matches_materialized_count_and_parents_precede_children(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        let layers = scheduler.by_layer().unwrap();
        let total: usize = layers.iter().map(Vec::len).sum();
        prop_assert_eq!(total, scheduler.count());

        let mut seen: BTreeSet<u64> = BTreeSet::new();
        for layer in layers {
            for &c in layer {
                seen.insert(c);
            }
        }
        prop_assert_eq!(seen.len(), scheduler.count());

        for window in layers.windows(2) {
            let (previous, next) = (&window[0], &window[1]);
            for &child in next {
                let parent_in_previous_layer = previous
                    .iter()
                    .any(|&parent| scheduler.spanning(parent).unwrap().contains(&child));
                prop_assert!(
                    parent_in_previous_layer,
                    "cuboid {child:#x} has no spanning-parent in the preceding layer"
                );
            }
        }
    }

    #[test]
    fn best_match_result_is_a_subset_of_the_query_closure_and_idempotent(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
        query in arb_mask(),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        let matched = scheduler.best_match(query).unwrap();
        prop_assert!(scheduler.all_cuboid_ids().contains(&matched));
        prop_assert_eq!(query & !matched, 0);
        prop_assert_eq!(matched & mandatory, mandatory);

        let again = scheduler.best_match(matched).unwrap();
        prop_assert_eq!(matched, again);
    }

    #[test]
    fn best_match_is_deterministic_across_rebuilds(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
        query in arb_mask(),
    ) {
        let build = || {
            let descriptor = CubeDescriptorBuilder::new(DIMS)
                .group(group_for(mandatory, joint, dim_cap))
                .build();
            CuboidScheduler::new(descriptor)
        };
        let Ok(first) = build() else { return Ok(()); };
        let Ok(second) = build() else { return Ok(()); };

        prop_assert_eq!(first.all_cuboid_ids(), second.all_cuboid_ids());
        prop_assert_eq!(first.best_match(query).unwrap(), second.best_match(query).unwrap());

        // §6/§8 invariant 9 require identical children-lists including
        // order, not just an identical cuboid set.
        for &c in first.all_cuboid_ids() {
            prop_assert_eq!(first.spanning(c).unwrap(), second.spanning(c).unwrap());
        }
    }

    #[test]
    fn every_non_base_member_is_on_tree_and_within_dim_cap(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
    ) {
        let Some(scheduler) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        let group = group_for(mandatory, joint, dim_cap);
        for &c in scheduler.all_cuboid_ids() {
            if c == FULL_MASK {
                continue;
            }
            prop_assert!(group.is_on_tree(c) && group.check_dim_cap(c));
        }
    }

    #[test]
    fn blacklisted_cuboid_is_never_materialized(
        mandatory in arb_mask(),
        joint in arb_mask(),
        dim_cap in 1usize..=(DIMS as usize),
        pick in 0usize..1000,
    ) {
        let Some(dry_run) = scheduler_for(mandatory, joint, dim_cap) else { return Ok(()); };
        let non_base: Vec<u64> = dry_run
            .all_cuboid_ids()
            .iter()
            .copied()
            .filter(|&c| c != FULL_MASK)
            .collect();
        if non_base.is_empty() {
            return Ok(());
        }
        let blacklisted = non_base[pick % non_base.len()];

        let Some(scheduler) = scheduler_for_with_blacklist(mandatory, joint, dim_cap, blacklisted) else {
            return Ok(());
        };
        prop_assert!(!scheduler.all_cuboid_ids().contains(&blacklisted));
    }
}
