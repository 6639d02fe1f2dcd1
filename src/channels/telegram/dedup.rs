//! Telegram update de-duplication
//!
//! `getUpdates` offsets normally prevent replays, but a failed acknowledgement
//! or a restart of the loop can hand back updates that were already relayed.

use std::collections::{HashSet, VecDeque};

/// Default number of remembered update ids
const DEDUP_MAX_ENTRIES: usize = 2000;

/// Bounded window of recently seen update ids
#[derive(Debug)]
pub struct UpdateDedup {
    seen: HashSet<i64>,
    order: VecDeque<i64>,
    max_entries: usize,
}

impl Default for UpdateDedup {
    fn default() -> Self {
        Self::with_capacity(DEDUP_MAX_ENTRIES)
    }
}

impl UpdateDedup {
    /// Remember at most `max_entries` ids
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(max_entries),
            order: VecDeque::with_capacity(max_entries),
            max_entries: max_entries.max(1),
        }
    }

    /// Returns `true` if `update_id` was already seen, otherwise records it
    pub fn is_duplicate(&mut self, update_id: i64) -> bool {
        if self.seen.contains(&update_id) {
            return true;
        }

        if self.order.len() >= self.max_entries
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }

        self.seen.insert(update_id);
        self.order.push_back(update_id);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_repeat() {
        let mut dedup = UpdateDedup::default();
        assert!(!dedup.is_duplicate(1));
        assert!(dedup.is_duplicate(1));
        assert!(!dedup.is_duplicate(2));
    }

    #[test]
    fn test_window_forgets_oldest() {
        let mut dedup = UpdateDedup::with_capacity(2);
        assert!(!dedup.is_duplicate(1));
        assert!(!dedup.is_duplicate(2));
        assert!(!dedup.is_duplicate(3));
        // 1 fell out of the window
        assert!(!dedup.is_duplicate(1));
        assert!(dedup.is_duplicate(3));
    }
}
