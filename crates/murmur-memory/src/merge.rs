use std::collections::{HashSet, VecDeque};

use crate::store::evict_to;

/// Reconcile an externally fetched batch with an existing buffer.
///
/// `external` is history older than anything observed live, so its lines
/// go in front of `existing`. A line of `external` is skipped when the exact
/// same text is already in `existing`; duplicates within `external` itself
/// are kept. The result is cut from the head down to `capacity`.
pub fn merge_external(
    existing: &VecDeque<String>,
    external: &[String],
    capacity: usize,
) -> VecDeque<String> {
    if external.is_empty() {
        return existing.clone();
    }

    let seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut merged: VecDeque<String> = external
        .iter()
        .filter(|line| !seen.contains(line.as_str()))
        .cloned()
        .collect();
    merged.extend(existing.iter().cloned());
    evict_to(&mut merged, capacity);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn deque(items: &[&str]) -> VecDeque<String> {
        lines(items).into_iter().collect()
    }

    #[test]
    fn disjoint_batch_is_prepended() {
        let merged = merge_external(&deque(&["c", "d"]), &lines(&["a", "b"]), 99);
        assert_eq!(merged, deque(&["a", "b", "c", "d"]));
    }

    #[test]
    fn overlap_keeps_the_existing_copy() {
        let merged = merge_external(&deque(&["c", "d"]), &lines(&["a", "b", "c"]), 99);
        assert_eq!(merged, deque(&["a", "b", "c", "d"]));
    }

    #[test]
    fn capacity_drops_the_oldest() {
        let merged = merge_external(&deque(&["c", "d"]), &lines(&["a", "b"]), 3);
        assert_eq!(merged, deque(&["b", "c", "d"]));
    }

    #[test]
    fn empty_batch_changes_nothing() {
        let existing = deque(&["x", "y"]);
        assert_eq!(merge_external(&existing, &[], 99), existing);
    }
}
