// src/trim.rs
//! Front-trimming with a hysteresis band

use serde::{Deserialize, Serialize};

/// Once a collection grows past `cap`, the oldest entries are dropped until
/// `target` remain. `target < cap` keeps trimming from firing on every push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimPolicy {
    pub cap: usize,
    pub target: usize,
}

impl TrimPolicy {
    pub const fn new(cap: usize, target: usize) -> Self {
        Self { cap, target }
    }

    /// Trim `items` from the front, returning how many were removed
    pub fn apply<T>(&self, items: &mut Vec<T>) -> usize {
        if items.len() <= self.cap {
            return 0;
        }
        let excess = items.len() - self.target.min(items.len());
        items.drain(..excess);
        excess
    }

    pub fn is_valid(&self) -> bool {
        self.target < self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_cap_untouched() {
        let policy = TrimPolicy::new(5, 3);
        let mut items: Vec<u32> = (0..5).collect();
        assert_eq!(policy.apply(&mut items), 0);
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn test_over_cap_keeps_newest() {
        let policy = TrimPolicy::new(5, 3);
        let mut items: Vec<u32> = (0..6).collect();
        assert_eq!(policy.apply(&mut items), 3);
        assert_eq!(items, vec![3, 4, 5]);
    }

    #[test]
    fn test_validity() {
        assert!(TrimPolicy::new(100, 80).is_valid());
        assert!(!TrimPolicy::new(50, 50).is_valid());
    }
}
