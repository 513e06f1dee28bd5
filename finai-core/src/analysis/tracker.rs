//! Checked-key bookkeeping for the polling loops

use std::collections::HashSet;

use parking_lot::RwLock;

/// Keys a poller has already processed since its last reset
#[derive(Debug, Default)]
pub struct CheckedSet {
    checked: RwLock<HashSet<String>>,
}

impl CheckedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the first item whose key is not yet checked, marking it checked.
    ///
    /// Items for which `key` returns `None` are never claimed. The scan and
    /// the mark happen under one write lock, so concurrent callers never claim
    /// the same key.
    pub fn claim_next<'a, T, F>(&self, items: &'a [T], key: F) -> Option<&'a T>
    where
        F: Fn(&T) -> Option<String>,
    {
        let mut checked = self.checked.write();
        items.iter().find_map(|item| {
            let k = key(item)?;
            if checked.contains(&k) {
                None
            } else {
                checked.insert(k);
                Some(item)
            }
        })
    }

    /// Whether a key has been claimed
    pub fn contains(&self, key: &str) -> bool {
        self.checked.read().contains(key)
    }

    /// Number of claimed keys
    pub fn len(&self) -> usize {
        self.checked.read().len()
    }

    /// Check if nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.checked.read().is_empty()
    }

    /// Forget every claimed key
    pub fn reset(&self) {
        self.checked.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &&str) -> Option<String> {
        (!s.is_empty()).then(|| s.to_string())
    }

    #[test]
    fn test_claims_in_order_then_exhausts() {
        let set = CheckedSet::new();
        let items = ["echo", "", "kindle", "echo", "airpods"];

        let claimed: Vec<_> = std::iter::from_fn(|| set.claim_next(&items, key).copied()).collect();
        assert_eq!(claimed, vec!["echo", "kindle", "airpods"]);
        assert_eq!(set.len(), 3);
        assert!(set.claim_next(&items, key).is_none());

        set.reset();
        assert!(set.is_empty());
        assert_eq!(set.claim_next(&items, key), Some(&"echo"));
    }

    #[test]
    fn test_same_order_same_result() {
        let items = ["b", "a", "c"];
        let first = CheckedSet::new();
        let second = CheckedSet::new();
        for _ in 0..items.len() {
            assert_eq!(first.claim_next(&items, key), second.claim_next(&items, key));
        }
    }

    #[test]
    fn test_new_items_after_exhaustion() {
        let set = CheckedSet::new();
        assert!(set.claim_next(&["a"], key).is_some());
        assert!(set.claim_next(&["a"], key).is_none());
        assert_eq!(set.claim_next(&["a", "b"], key), Some(&"b"));
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn test_concurrent_claims_are_disjoint() {
        let set = std::sync::Arc::new(CheckedSet::new());
        let items: Vec<String> = (0..64).map(|i| format!("item-{}", i)).collect();
        let items = std::sync::Arc::new(items);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let set = set.clone();
                let items = items.clone();
                std::thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(item) = set.claim_next(items.as_slice(), |s| Some(s.clone())) {
                        mine.push(item.clone());
                    }
                    mine
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread"))
            .collect();
        all.sort();
        let total = all.len();
        all.dedup();
        assert_eq!(total, 64);
        assert_eq!(all.len(), 64);
    }
}
