// crates/npxl-core/src/queue.rs
//
// C1 — Timed Media Queue. An ordered, contiguous FIFO of time-ranged items.
// Every operation is total; `first`/`last` on an empty queue must be guarded
// by `is_empty` at the call site (there is no failure mode here to encode in
// a `Result`).

use crate::duration::Duration;

/// One item tagged with the `[start, start + length)` range it occupies in
/// the seek timeline. Never mutated after insertion — `TimedMediaQueue` only
/// ever appends and evicts whole items.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedItem<T> {
    pub payload: T,
    pub start: Duration,
    pub length: Duration,
}

impl<T> TimedItem<T> {
    pub fn end(&self) -> Duration {
        self.start + self.length
    }

    /// Half-open range containment: `seek == end` belongs to the *next* item.
    pub fn contains(&self, seek: Duration) -> bool {
        self.start <= seek && seek < self.end()
    }

    /// Whether `[self.start, self.end())` overlaps `[lo, hi)`.
    pub fn overlaps(&self, lo: Duration, hi: Duration) -> bool {
        self.start < hi && lo < self.end()
    }
}

/// Ordered, contiguous FIFO: for all adjacent items `i, i+1`,
/// `items[i].end() == items[i+1].start`. Callers are trusted to preserve
/// this on `push_back` — the queue does not re-validate it.
#[derive(Clone, Debug)]
pub struct TimedMediaQueue<T> {
    items: Vec<TimedItem<T>>,
}

impl<T> Default for TimedMediaQueue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> TimedMediaQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn first(&self) -> Option<&TimedItem<T>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&TimedItem<T>> {
        self.items.last()
    }

    /// Append to the back. Caller is responsible for contiguity; the queue
    /// trusts `start` lines up with the current last item's `end()`.
    pub fn push_back(&mut self, payload: T, start: Duration, length: Duration) {
        self.items.push(TimedItem { payload, start, length });
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Locate the item whose `[start, end)` contains `seek`, via binary
    /// search on `start` (items are ordered and contiguous, so this is the
    /// reference algorithm). Half-open: `seek == end` is a miss for that
    /// item.
    pub fn get_at(&self, seek: Duration) -> Option<&T> {
        self.index_at(seek).map(|i| &self.items[i].payload)
    }

    fn index_at(&self, seek: Duration) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        // Find the last item whose `start <= seek`.
        let mut lo = 0usize;
        let mut hi = self.items.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.items[mid].start <= seek {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == 0 {
            return None; // seek is before the first item's start
        }
        let candidate = lo - 1;
        if self.items[candidate].contains(seek) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Every item whose `[start, end)` overlaps `[inclusive_start,
    /// exclusive_end)`. A page straddling either boundary is included.
    ///
    /// Binary-searches for a lower and an upper index; if the lower index is
    /// not found but the upper is, returns the prefix up to the upper; if
    /// neither is found, returns empty.
    pub fn get_in_range(&self, inclusive_start: Duration, exclusive_end: Duration) -> Vec<&T> {
        if self.items.is_empty() || inclusive_start >= exclusive_end {
            return Vec::new();
        }

        let lower = self.items.iter().position(|it| it.overlaps(inclusive_start, exclusive_end));
        let upper = self.items.iter().rposition(|it| it.overlaps(inclusive_start, exclusive_end));

        match (lower, upper) {
            (Some(lo), Some(hi)) => self.items[lo..=hi].iter().map(|it| &it.payload).collect(),
            _ => Vec::new(),
        }
    }

    /// Total length of all queued items.
    pub fn total_length(&self) -> Duration {
        self.items.iter().fold(Duration::ZERO, |acc, it| acc + it.length)
    }

    /// Remove items from the front while the cumulative length of
    /// already-removed items plus the next candidate stays `<= limit`. Never
    /// removes an item that would push the cumulative total over `limit`.
    pub fn pop_front_by_length(&mut self, limit: Duration) {
        let mut removed = Duration::ZERO;
        let mut count = 0usize;
        for item in &self.items {
            let next_total = removed + item.length;
            if next_total > limit {
                break;
            }
            removed = next_total;
            count += 1;
        }
        self.items.drain(0..count);
    }

    /// Symmetric to [`Self::pop_front_by_length`], removing from the back.
    pub fn pop_back_by_length(&mut self, limit: Duration) {
        let mut removed = Duration::ZERO;
        let mut count = 0usize;
        for item in self.items.iter().rev() {
            let next_total = removed + item.length;
            if next_total > limit {
                break;
            }
            removed = next_total;
            count += 1;
        }
        let new_len = self.items.len() - count;
        self.items.truncate(new_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> TimedMediaQueue<&'static str> {
        let mut q = TimedMediaQueue::new();
        q.push_back("a", Duration::from_secs(0), Duration::from_secs(2));
        q.push_back("b", Duration::from_secs(2), Duration::from_secs(1));
        q.push_back("c", Duration::from_secs(3), Duration::from_secs(3));
        q
    }

    #[test]
    fn get_at_is_half_open_on_the_end_boundary() {
        let q = seeded();
        assert_eq!(q.get_at(Duration::from_secs(0)), Some(&"a"));
        assert_eq!(q.get_at(Duration::from_millis(1999)), Some(&"a"));
        assert_eq!(q.get_at(Duration::from_secs(2)), Some(&"b")); // boundary -> next item
        assert_eq!(q.get_at(Duration::from_secs(6)), None); // past the end
    }

    #[test]
    fn get_at_before_first_item_is_a_miss() {
        let mut q = TimedMediaQueue::new();
        q.push_back("a", Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(q.get_at(Duration::from_secs(1)), None);
    }

    #[test]
    fn get_in_range_includes_straddling_items() {
        let q = seeded();
        let got = q.get_in_range(Duration::from_secs(1), Duration::from_millis(2500));
        assert_eq!(got, vec![&"a", &"b"]);
    }

    #[test]
    fn get_in_range_empty_when_before_everything() {
        let mut q = TimedMediaQueue::new();
        q.push_back("a", Duration::from_secs(5), Duration::from_secs(1));
        assert!(q.get_in_range(Duration::from_secs(0), Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn pop_front_by_length_never_overshoots() {
        let mut q = seeded();
        // "a" (2s) fits in 2.5s budget; "b" (1s) would push to 3s, so it stays.
        q.pop_front_by_length(Duration::from_millis(2500));
        assert_eq!(q.first().unwrap().payload, "b");
    }

    #[test]
    fn pop_back_by_length_never_overshoots() {
        let mut q = seeded();
        q.pop_back_by_length(Duration::from_millis(3500));
        assert_eq!(q.last().unwrap().payload, "b");
    }

    #[test]
    fn total_length_sums_all_items() {
        let q = seeded();
        assert_eq!(q.total_length(), Duration::from_secs(6));
    }
}
