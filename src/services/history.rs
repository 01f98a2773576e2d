/// Bounded undo/redo list over opaque snapshots. The manager never looks
/// inside `S`; it only stores deep copies handed to it at each commit.
///
/// Invariant: `0 <= cursor < snapshots.len()` whenever the list is
/// non-empty. Undo is available iff the cursor is past the front, redo iff
/// it is before the end. Navigation at a boundary is a no-op, never an
/// error.
#[derive(Debug, Clone)]
pub struct History<S> {
    snapshots: Vec<S>,
    cursor: usize,
    limit: usize,
}

impl<S> History<S> {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot: any redo branch past the cursor is discarded,
    /// the snapshot is appended, and the oldest entries are evicted once
    /// the list exceeds the limit.
    pub fn commit(&mut self, snapshot: S) {
        if !self.snapshots.is_empty() && self.cursor + 1 < self.snapshots.len() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
        while self.snapshots.len() > self.limit {
            self.snapshots.remove(0);
            self.cursor -= 1;
        }
    }

    pub fn undo(&mut self) -> Option<&S> {
        if self.cursor == 0 || self.snapshots.is_empty() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&S> {
        if self.snapshots.is_empty() || self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walks_the_list() {
        let mut history = History::new(10);
        for i in 0..4 {
            history.commit(i);
        }

        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut history: History<i32> = History::new(10);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);

        history.commit(1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_commit_truncates_the_redo_branch() {
        let mut history = History::new(10);
        for i in 0..4 {
            history.commit(i);
        }
        history.undo();
        history.undo();

        history.commit(99);
        assert_eq!(history.len(), 3); // 0, 1, 99
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_eviction_keeps_the_newest_entries() {
        let mut history = History::new(3);
        for i in 0..6 {
            history.commit(i);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }
}
