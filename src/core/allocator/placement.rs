//! Placement search
//!
//! A block is a candidate when it is free and at least as large as the
//! request. Blocks are scanned in ascending address order, so on equal sizes
//! the lower address always wins.

use crate::allocator::block::Block;
use crate::allocator::Strategy;

/// Index of the block chosen by `strategy` for a request of `size` units
pub fn find_candidate<P>(blocks: &[Block<P>], size: u64, strategy: Strategy) -> Option<usize> {
    let mut candidates = blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| block.is_candidate(size));

    let chosen = match strategy {
        Strategy::FirstFit => candidates.next(),
        // reduce keeps the accumulator on ties, unlike max_by_key
        Strategy::BestFit => {
            candidates.reduce(|best, next| if next.1.size < best.1.size { next } else { best })
        }
        Strategy::WorstFit => {
            candidates.reduce(|best, next| if next.1.size > best.1.size { next } else { best })
        }
    };

    chosen.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Free blocks of the given sizes laid out back to back, separated by
    /// one-unit allocated barriers
    fn layout(sizes: &[u64]) -> Vec<Block<()>> {
        let mut blocks = Vec::new();
        let mut start = 0;
        for &size in sizes {
            blocks.push(Block::free(start, size));
            start += size;
            let mut barrier = Block::free(start, 1);
            barrier.occupy(());
            blocks.push(barrier);
            start += 1;
        }
        blocks
    }

    fn chosen_size(blocks: &[Block<()>], size: u64, strategy: Strategy) -> Option<u64> {
        find_candidate(blocks, size, strategy).map(|i| blocks[i].size())
    }

    #[test]
    fn test_strategies_on_mixed_layout() {
        let blocks = layout(&[10, 30, 20]);

        assert_eq!(chosen_size(&blocks, 15, Strategy::FirstFit), Some(30));
        assert_eq!(chosen_size(&blocks, 15, Strategy::BestFit), Some(20));
        assert_eq!(chosen_size(&blocks, 15, Strategy::WorstFit), Some(30));
    }

    #[test]
    fn test_first_fit_takes_lowest_address() {
        let blocks = layout(&[10, 30, 20]);
        assert_eq!(find_candidate(&blocks, 5, Strategy::FirstFit), Some(0));
    }

    #[test]
    fn test_ties_go_to_lowest_address() {
        let blocks = layout(&[20, 40, 20, 40]);

        let best = find_candidate(&blocks, 15, Strategy::BestFit).unwrap();
        assert_eq!(blocks[best].start(), 0);

        let worst = find_candidate(&blocks, 15, Strategy::WorstFit).unwrap();
        assert_eq!(blocks[worst].start(), 21);
    }

    #[test]
    fn test_exact_size_is_a_candidate() {
        let blocks = layout(&[10, 15]);
        assert_eq!(chosen_size(&blocks, 15, Strategy::FirstFit), Some(15));
        assert_eq!(chosen_size(&blocks, 15, Strategy::BestFit), Some(15));
    }

    #[test]
    fn test_no_candidate() {
        let blocks = layout(&[10, 30, 20]);
        for strategy in Strategy::ALL {
            assert_eq!(find_candidate(&blocks, 31, strategy), None);
        }
    }

    #[test]
    fn test_allocated_blocks_are_skipped() {
        let mut blocks = layout(&[50, 10]);
        blocks[0].occupy(());
        assert_eq!(chosen_size(&blocks, 5, Strategy::WorstFit), Some(10));
    }
}
