//! Partitioning of the target file into overlapping search blocks.

/// One contiguous file region handed to a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchBlock {
    /// Byte offset of the block in the file.
    pub offset: u64,
    /// Byte length, including the overlap into the next block.
    pub len: u32,
}

/// Splits a file of `file_size` bytes into blocks of `base_block_size`
/// bytes, each extended by `(pattern_len - 1) * unit_width` bytes of
/// overlap so a match straddling a block boundary is fully contained in at
/// least one block.
pub(crate) fn plan_blocks(
    file_size: u64,
    pattern_len: usize,
    unit_width: usize,
    base_block_size: u32,
) -> Vec<SearchBlock> {
    let overlap = (pattern_len.saturating_sub(1) * unit_width) as u64;
    let base = u64::from(base_block_size);
    let full = base + overlap;

    let num_blocks = file_size.div_ceil(base);
    (0..num_blocks)
        .map(|i| {
            let offset = i * base;
            let len = full.min(file_size - offset) as u32;
            SearchBlock { offset, len }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_cover_the_file_with_keyword_overlap() {
        // 100-byte file, 5-unit pattern over 8-bit units, 32-byte base.
        let blocks = plan_blocks(100, 5, 1, 32);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], SearchBlock { offset: 0, len: 36 });
        assert_eq!(blocks[1], SearchBlock { offset: 32, len: 36 });
        assert_eq!(blocks[2], SearchBlock { offset: 64, len: 36 });
        assert_eq!(blocks[3], SearchBlock { offset: 96, len: 4 });
    }

    #[test]
    fn overlap_scales_with_unit_width() {
        let blocks = plan_blocks(64, 4, 2, 16);
        assert_eq!(blocks.len(), 4);
        // (4 - 1) * 2 = 6 bytes of overlap.
        assert_eq!(blocks[0].len, 22);
        assert_eq!(blocks[3], SearchBlock { offset: 48, len: 16 });
    }

    #[test]
    fn single_oversized_block_for_small_files() {
        let blocks = plan_blocks(10, 4, 1, 128);
        assert_eq!(blocks, vec![SearchBlock { offset: 0, len: 10 }]);
    }

    #[test]
    fn empty_file_plans_no_blocks() {
        assert!(plan_blocks(0, 4, 1, 128).is_empty());
    }
}
