//! Monotonic ID allocation.
//!
//! Each generator owns its own allocator, so IDs are unique per generator
//! and a fresh generator with the same seed reproduces the same IDs.

use std::collections::HashMap;

/// Per-prefix counters producing `"{prefix}_{n}"` with `n` starting at 1.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    counters: HashMap<&'static str, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next ID for `prefix`.
    pub fn next(&mut self, prefix: &'static str) -> String {
        let n = self.counters.entry(prefix).or_insert(0);
        *n += 1;
        format!("{}_{}", prefix, n)
    }

    /// How many IDs have been handed out for `prefix`.
    pub fn issued(&self, prefix: &str) -> u64 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_per_prefix() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next("trap"), "trap_1");
        assert_eq!(ids.next("trap"), "trap_2");
        assert_eq!(ids.next("item"), "item_1");
        assert_eq!(ids.next("trap"), "trap_3");
        assert_eq!(ids.issued("trap"), 3);
        assert_eq!(ids.issued("item"), 1);
        assert_eq!(ids.issued("status"), 0);
    }

    #[test]
    fn test_allocators_independent() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next("spawn");
        a.next("spawn");
        assert_eq!(b.next("spawn"), "spawn_1");
    }
}
