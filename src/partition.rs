//! Row-count partitioning.
//!
//! Splits `total_rows` into at most `num_splits` contiguous ranges of
//! `ceil(total_rows / num_splits)` rows each. Only the last range may be
//! shorter, and ranges that would start past the end are never produced.

use std::num::NonZeroUsize;
use std::ops::Range;

/// Partition of a dataset's rows into contiguous chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    total_rows: usize,
    num_splits: NonZeroUsize,
    rows_per_chunk: usize,
}

impl PartitionPlan {
    /// Computes the plan for `total_rows` rows split `num_splits` ways.
    pub fn new(total_rows: usize, num_splits: NonZeroUsize) -> Self {
        Self {
            total_rows,
            num_splits,
            rows_per_chunk: total_rows.div_ceil(num_splits.get()),
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn num_splits(&self) -> usize {
        self.num_splits.get()
    }

    /// Maximum number of rows in any chunk.
    pub fn rows_per_chunk(&self) -> usize {
        self.rows_per_chunk
    }

    /// Row range of chunk `index`, or `None` once the chunk would start at or
    /// past the last row.
    pub fn chunk(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.num_splits.get() {
            return None;
        }

        let start = index * self.rows_per_chunk;
        if start >= self.total_rows {
            return None;
        }

        let end = ((index + 1) * self.rows_per_chunk).min(self.total_rows);
        Some(start..end)
    }

    /// Iterates over the non-empty chunk ranges in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.num_splits.get()).map_while(move |i| self.chunk(i))
    }

    /// Number of non-empty chunks the plan produces.
    pub fn chunk_count(&self) -> usize {
        if self.rows_per_chunk == 0 {
            return 0;
        }
        self.total_rows
            .div_ceil(self.rows_per_chunk)
            .min(self.num_splits.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(total_rows: usize, num_splits: usize) -> PartitionPlan {
        PartitionPlan::new(total_rows, NonZeroUsize::new(num_splits).unwrap())
    }

    #[test]
    fn ten_rows_three_ways() {
        let p = plan(10, 3);
        assert_eq!(p.rows_per_chunk(), 4);
        assert_eq!(p.ranges().collect::<Vec<_>>(), vec![0..4, 4..8, 8..10]);
        assert_eq!(p.chunk_count(), 3);
    }

    #[test]
    fn more_splits_than_rows_stops_early() {
        let p = plan(2, 5);
        assert_eq!(p.rows_per_chunk(), 1);
        assert_eq!(p.ranges().collect::<Vec<_>>(), vec![0..1, 1..2]);
        assert_eq!(p.chunk_count(), 2);
        assert_eq!(p.chunk(2), None);
    }

    #[test]
    fn zero_rows_produces_no_chunks() {
        let p = plan(0, 4);
        assert_eq!(p.rows_per_chunk(), 0);
        assert_eq!(p.ranges().count(), 0);
        assert_eq!(p.chunk_count(), 0);
    }

    #[test]
    fn single_split_covers_everything() {
        let p = plan(7, 1);
        assert_eq!(p.ranges().collect::<Vec<_>>(), vec![0..7]);
    }

    #[test]
    fn ceiling_can_leave_trailing_splits_unused() {
        // ceil(10 / 4) = 3 -> [0,3) [3,6) [6,9) [9,10)
        let p = plan(10, 4);
        assert_eq!(p.ranges().collect::<Vec<_>>(), vec![0..3, 3..6, 6..9, 9..10]);

        // ceil(6 / 4) = 2 -> only three chunks fit
        let p = plan(6, 4);
        assert_eq!(p.ranges().collect::<Vec<_>>(), vec![0..2, 2..4, 4..6]);
        assert_eq!(p.chunk_count(), 3);
    }

    #[test]
    fn chunk_index_past_num_splits_is_none() {
        let p = plan(100, 3);
        assert!(p.chunk(2).is_some());
        assert_eq!(p.chunk(3), None);
    }

    #[test]
    fn ranges_cover_every_row_exactly_once() {
        for total_rows in 0..60 {
            for num_splits in 1..15 {
                let p = plan(total_rows, num_splits);
                let ranges: Vec<_> = p.ranges().collect();

                assert!(ranges.len() <= num_splits);
                assert_eq!(ranges.len(), p.chunk_count());

                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next, "gap or overlap in {:?}", ranges);
                    assert!(!range.is_empty(), "empty chunk in {:?}", ranges);
                    assert!(range.len() <= p.rows_per_chunk());
                    next = range.end;
                }
                assert_eq!(next, total_rows);
            }
        }
    }
}
