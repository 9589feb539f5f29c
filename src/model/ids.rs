//! Autoincrement id allocation.
//!
//! Each entity kind gets its own allocator, owned by the catalog session.
//! Ids start at 1 and only ever grow.

/// Monotonic id source for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose next id is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Hands out the next id.
    pub fn allocate(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Raises the counter so that `id` can never be handed out again.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }

    /// Highest id handed out or observed so far (0 when none).
    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_starts_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_observe_never_lowers_counter() {
        let mut ids = IdAllocator::starting_after(10);
        ids.observe(4);
        assert_eq!(ids.last(), 10);
        ids.observe(25);
        assert_eq!(ids.allocate(), 26);
    }

    #[test]
    fn test_reset() {
        let mut ids = IdAllocator::starting_after(7);
        ids.reset();
        assert_eq!(ids.allocate(), 1);
    }
}
