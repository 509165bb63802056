//! Property-based tests for allocator correctness
//!
//! Uses proptest to verify the address space invariants hold across random
//! sequences of allocations, deallocations and resets

use media_alloc::{AddressSpace, BlockInfo, Strategy as Placement};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate(u64, Placement),
    /// Free the n-th allocated block (modulo the allocated count)
    FreeAllocated(usize),
    /// Free an arbitrary address
    FreeAddress(u64),
    Reset,
}

fn placement() -> impl Strategy<Value = Placement> {
    prop_oneof![
        Just(Placement::FirstFit),
        Just(Placement::BestFit),
        Just(Placement::WorstFit),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..300, placement()).prop_map(|(size, s)| Op::Allocate(size, s)),
        4 => any::<usize>().prop_map(Op::FreeAllocated),
        2 => (0u64..1100).prop_map(Op::FreeAddress),
        1 => Just(Op::Reset),
    ]
}

fn apply(space: &mut AddressSpace<u64>, op: &Op, id: u64) {
    match *op {
        Op::Allocate(size, s) => {
            space.allocate(size, id, s);
        }
        Op::FreeAllocated(n) => {
            let allocated: Vec<u64> = space
                .list_blocks()
                .iter()
                .filter(|b| b.allocated)
                .map(|b| b.start)
                .collect();
            if !allocated.is_empty() {
                space.deallocate(allocated[n % allocated.len()]);
            }
        }
        Op::FreeAddress(address) => space.deallocate(address),
        Op::Reset => space.reset(),
    }
}

fn assert_layout(blocks: &[BlockInfo], total: u64) -> Result<(), TestCaseError> {
    prop_assert!(!blocks.is_empty());
    prop_assert_eq!(blocks[0].start, 0);
    prop_assert_eq!(blocks.last().unwrap().end(), total);
    prop_assert!(blocks.iter().all(|b| b.size > 0));
    prop_assert_eq!(blocks.iter().map(|b| b.size).sum::<u64>(), total);

    for pair in blocks.windows(2) {
        prop_assert_eq!(pair[0].end(), pair[1].start, "gap or overlap: {:?}", pair);
        prop_assert!(
            pair[0].allocated || pair[1].allocated,
            "neighbouring free blocks: {:?}",
            pair
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_coverage_and_coalescing_hold(
        total in 1u64..1000,
        ops in prop::collection::vec(op(), 1..80)
    ) {
        let mut space = AddressSpace::new(total).unwrap();

        for (id, op) in ops.iter().enumerate() {
            apply(&mut space, op, id as u64);
            assert_layout(&space.list_blocks(), total)?;
            prop_assert!(space.is_consistent());
        }
    }

    #[test]
    fn prop_allocation_reports_match_layout(
        sizes in prop::collection::vec((1u64..200, placement()), 1..40)
    ) {
        let mut space = AddressSpace::new(1000).unwrap();

        for (id, (size, s)) in sizes.iter().enumerate() {
            let before = space.list_blocks();
            match space.try_allocate(*size, id as u64, *s) {
                Ok(start) => {
                    let block = space
                        .list_blocks()
                        .into_iter()
                        .find(|b| b.start == start)
                        .unwrap();
                    prop_assert!(block.allocated);
                    prop_assert_eq!(block.size, *size);
                    prop_assert_eq!(space.payload_at(start), Some(&(id as u64)));
                }
                Err(_) => {
                    prop_assert_eq!(space.list_blocks(), before);
                }
            }
        }
    }

    #[test]
    fn prop_allocation_fails_only_without_candidate(
        ops in prop::collection::vec(op(), 1..60),
        size in 1u64..400,
        s in placement()
    ) {
        let mut space = AddressSpace::new(1000).unwrap();
        for (id, op) in ops.iter().enumerate() {
            apply(&mut space, op, id as u64);
        }

        let has_candidate = space
            .list_blocks()
            .iter()
            .any(|b| !b.allocated && b.size >= size);
        prop_assert_eq!(space.allocate(size, u64::MAX, s), has_candidate);
    }

    #[test]
    fn prop_round_trip_restores_layout(
        ops in prop::collection::vec(op(), 0..60),
        size in 1u64..300,
        s in placement()
    ) {
        let mut space = AddressSpace::new(1000).unwrap();
        for (id, op) in ops.iter().enumerate() {
            apply(&mut space, op, id as u64);
        }

        let before = space.list_blocks();
        if let Ok(start) = space.try_allocate(size, u64::MAX, s) {
            prop_assert_eq!(space.try_deallocate(start).unwrap(), u64::MAX);
        }
        prop_assert_eq!(space.list_blocks(), before);
    }

    #[test]
    fn prop_reset_is_idempotent(
        ops in prop::collection::vec(op(), 0..60)
    ) {
        let mut space = AddressSpace::new(777).unwrap();
        for (id, op) in ops.iter().enumerate() {
            apply(&mut space, op, id as u64);
        }

        space.reset();
        let once = space.list_blocks();
        space.reset();

        prop_assert_eq!(&once, &space.list_blocks());
        prop_assert_eq!(
            once,
            vec![BlockInfo { start: 0, size: 777, allocated: false }]
        );
    }

    #[test]
    fn prop_strategy_choice(
        holes in prop::collection::vec(1u64..100, 1..10),
        size in 1u64..100
    ) {
        // Free holes separated by one-unit allocations
        let total: u64 = holes.iter().map(|h| h + 1).sum();
        let mut space = AddressSpace::new(total).unwrap();
        let mut starts = Vec::new();
        for hole in &holes {
            starts.push(space.try_allocate(*hole, 0u64, Placement::FirstFit).unwrap());
            space.try_allocate(1, 1u64, Placement::FirstFit).unwrap();
        }
        for start in &starts {
            space.deallocate(*start);
        }

        let candidates: Vec<(u64, u64)> = starts
            .iter()
            .zip(&holes)
            .filter(|(_, h)| **h >= size)
            .map(|(s, h)| (*s, *h))
            .collect();

        let first = candidates.first().map(|c| c.0);
        let best = candidates.iter().min_by_key(|c| c.1).map(|c| c.0);
        let worst = candidates
            .iter()
            .fold(None::<(u64, u64)>, |acc, c| match acc {
                Some(a) if a.1 >= c.1 => Some(a),
                _ => Some(*c),
            })
            .map(|c| c.0);

        for (s, expected) in [
            (Placement::FirstFit, first),
            (Placement::BestFit, best),
            (Placement::WorstFit, worst),
        ] {
            let mut trial = space.clone();
            prop_assert_eq!(trial.try_allocate(size, 2, s).ok(), expected);
        }
    }
}
