// Cuboid Scheduler Demo
//
// This example demonstrates planning the materialized cuboid set and
// spanning tree for a small sales cube: four dimensions, one mandatory
// column, and a joint pairing two dimensions that must always travel
// together.

use rusty_cuboid_scheduler::{AggregationGroupBuilder, CubeDescriptorBuilder, CuboidScheduler};

fn main() {
    println!("=== Cuboid Scheduler Demo ===\n");

    // region(0), product(1), customer(2), date(3); region is mandatory,
    // product+customer must travel together as a joint.
    let group = AggregationGroupBuilder::new(0b1111)
        .mandatory(0b0001)
        .joint(0b0110)
        .build();

    let descriptor = CubeDescriptorBuilder::new(4).group(group).build();

    println!("1. Building scheduler from descriptor");
    let scheduler = CuboidScheduler::new(descriptor).expect("descriptor should be buildable");
    println!("   - Materialized cuboids: {}", scheduler.count());

    println!("\n2. Spanning tree from the base cuboid");
    for &child in scheduler.spanning(0b1111).unwrap() {
        println!("   base -> {child:#06b}");
    }

    println!("\n3. Layer-by-layer breakdown");
    for (depth, layer) in scheduler.by_layer().unwrap().iter().enumerate() {
        println!("   layer {depth}: {layer:?}", layer = layer.iter().map(|c| format!("{c:#06b}")).collect::<Vec<_>>());
    }

    println!("\n4. Best-match resolution");
    for query in [0b0010u64, 0b1000, 0b0101] {
        let matched = scheduler.best_match(query).unwrap();
        println!("   query {query:#06b} -> materialized {matched:#06b}");
    }
}
