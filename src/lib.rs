// RustyDB Cuboid Scheduler
//
// Given a declarative OLAP cube descriptor, plans the set of cuboids
// (aggregation projections over a dimension set) the cube engine should
// pre-compute, and the spanning tree describing how each is derived from a
// parent by further aggregation. At query time, resolves an arbitrary
// requested projection to the materialized cuboid that best serves it.
//
// Parsing and validating a descriptor from SQL/DSL/JSON, the build executor
// that consumes the tree to write cuboid data to storage, and persistence
// of the result are all external collaborators' concerns; this crate is a
// pure, offline planning function from descriptor to `(cuboids, parent2child)`.

pub mod cuboid;
pub mod error;

pub use cuboid::{
    AggregationGroup, AggregationGroupBuilder, CubeDescriptor, CubeDescriptorBuilder,
    CuboidScheduler, Hierarchy,
};
pub use error::{DbError, Result};
