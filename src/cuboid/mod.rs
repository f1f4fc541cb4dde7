// Cuboid Scheduler
//
// This module provides the planner that, given a declarative OLAP cube
// descriptor, materializes the set of cuboids (aggregation projections over
// a dimension set) the cube engine should pre-compute, and organizes them
// into a spanning tree describing how each cuboid is derived from a parent
// by further aggregation:
// - Bitmask primitives over cuboid ids
// - Aggregation groups: mandatory columns, joints, hierarchies, dim caps
// - Bottom-up tree construction with a combinatorial explosion guard
// - Blacklist filtering and parent-padding for connectivity
// - Query-time best-match resolution from an arbitrary projection

mod bestmatch;
mod bitmask;
mod descriptor;
mod enumerate;
mod group;
mod layers;
mod scheduler;
mod tree;

pub use bitmask::{cuboid_select_key, is_subset, is_superset, lowest_set_bit, popcount};
pub use descriptor::{CubeDescriptor, CubeDescriptorBuilder};
pub use enumerate::on_tree_parents;
pub use group::{AggregationGroup, AggregationGroupBuilder, Hierarchy};
pub use scheduler::CuboidScheduler;
