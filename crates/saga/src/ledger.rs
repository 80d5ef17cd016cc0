//! Execution ledger of committed steps.

/// Append-only record of steps whose action has committed.
///
/// Entries are indices into the saga's step sequence, appended strictly in
/// execution order. Compensation pops from the tail, so unwinding always runs
/// in reverse commit order. The ledger is owned by the engine for the
/// duration of a run and is never mutated by anything else.
#[derive(Debug, Default)]
pub struct Ledger {
    committed: Vec<usize>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a committed step.
    pub fn commit(&mut self, step_index: usize) {
        self.committed.push(step_index);
    }

    /// Removes and returns the most recently committed step.
    pub fn pop(&mut self) -> Option<usize> {
        self.committed.pop()
    }

    /// Returns the committed step indices in commit order.
    pub fn entries(&self) -> &[usize] {
        &self.committed
    }

    /// Returns the number of committed steps.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Returns true if no steps have committed (or all were popped).
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_preserves_order() {
        let mut ledger = Ledger::new();
        ledger.commit(0);
        ledger.commit(1);
        ledger.commit(2);

        assert_eq!(ledger.entries(), &[0, 1, 2]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut ledger = Ledger::new();
        ledger.commit(0);
        ledger.commit(1);
        ledger.commit(2);

        assert_eq!(ledger.pop(), Some(2));
        assert_eq!(ledger.pop(), Some(1));
        assert_eq!(ledger.pop(), Some(0));
        assert_eq!(ledger.pop(), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_empty_ledger() {
        let mut ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.pop(), None);
    }
}
