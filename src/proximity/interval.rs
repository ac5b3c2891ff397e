//! Merged sets of closed integer intervals.

/// A set of disjoint closed intervals over `i64`, kept sorted.
///
/// Inserting an interval merges it with every existing interval it overlaps
/// or touches: over the integers, `[9, 13]` and `[14, 20]` cover the
/// contiguous range `[9, 20]`, so adjacency merges too. The invariant after
/// every insert is that intervals are sorted, non-overlapping and separated
/// by at least one uncovered point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    intervals: Vec<(i64, i64)>,
}

impl IntervalSet {
    /// Create an empty interval set.
    pub fn new() -> Self {
        IntervalSet::default()
    }

    /// Insert the closed interval `[lo, hi]`, merging as needed.
    pub fn insert(&mut self, lo: i64, hi: i64) {
        debug_assert!(lo <= hi, "inverted interval [{lo}, {hi}]");

        // Everything ending before lo - 1 stays untouched on the left;
        // everything starting after hi + 1 stays untouched on the right.
        let start = self.intervals.partition_point(|&(_, end)| end < lo - 1);
        let end = self.intervals.partition_point(|&(begin, _)| begin <= hi + 1);

        if start == end {
            self.intervals.insert(start, (lo, hi));
            return;
        }

        let merged_lo = lo.min(self.intervals[start].0);
        let merged_hi = hi.max(self.intervals[end - 1].1);
        self.intervals[start] = (merged_lo, merged_hi);
        self.intervals.drain(start + 1..end);
    }

    /// Whether `point` lies inside any interval.
    pub fn contains(&self, point: i64) -> bool {
        let idx = self.intervals.partition_point(|&(begin, _)| begin <= point);
        idx > 0 && self.intervals[idx - 1].1 >= point
    }

    /// Number of disjoint intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the set covers nothing.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Iterate over the disjoint intervals in order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.intervals.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_inserts_stay_sorted() {
        let mut set = IntervalSet::new();
        set.insert(30, 40);
        set.insert(0, 5);
        set.insert(10, 20);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(0, 5), (10, 20), (30, 40)]);
        assert!(set.contains(0));
        assert!(set.contains(15));
        assert!(set.contains(40));
        assert!(!set.contains(7));
        assert!(!set.contains(41));
    }

    #[test]
    fn test_overlapping_windows_merge() {
        // Query mentions at 10 and 12 with distance 1 produce [9, 11] and
        // [11, 13], which must collapse to a single [9, 13].
        let mut set = IntervalSet::new();
        set.insert(9, 11);
        set.insert(11, 13);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(9, 13)]);
        assert!(set.contains(13));
        assert!(!set.contains(14));
    }

    #[test]
    fn test_adjacent_intervals_merge() {
        let mut set = IntervalSet::new();
        set.insert(9, 13);
        set.insert(14, 20);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(9, 20)]);
    }

    #[test]
    fn test_insert_spanning_several_intervals() {
        let mut set = IntervalSet::new();
        set.insert(0, 2);
        set.insert(10, 12);
        set.insert(20, 22);
        set.insert(1, 21);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(0, 22)]);
    }

    #[test]
    fn test_contained_insert_is_absorbed() {
        let mut set = IntervalSet::new();
        set.insert(0, 100);
        set.insert(40, 60);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some((0, 100)));
    }

    #[test]
    fn test_point_interval() {
        let mut set = IntervalSet::new();
        set.insert(5, 5);
        assert!(set.contains(5));
        assert!(!set.contains(4));
        assert!(!set.contains(6));
    }

    #[test]
    fn test_negative_bounds() {
        // Windows around small positions dip below zero.
        let mut set = IntervalSet::new();
        set.insert(-1, 1);
        assert!(set.contains(-1));
        assert!(set.contains(0));
        assert!(!set.contains(2));
    }

    #[test]
    fn test_empty_set_contains_nothing() {
        let set = IntervalSet::new();
        assert!(set.is_empty());
        assert!(!set.contains(0));
    }
}
