//! Cooperative, cancelable timeline of scheduled updates.
//!
//! Updates are keyed by time since the current generation began and come
//! out of [`Timeline::advance`] once due, in time order. Starting a new
//! generation drops everything still pending, so updates scheduled for an
//! abandoned transition never fire.

#[derive(Debug, Clone)]
struct Scheduled<T> {
    at: f32,
    seq: u64,
    value: T,
}

#[derive(Debug, Clone)]
pub struct Timeline<T> {
    generation: u64,
    elapsed: f32,
    next_seq: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            elapsed: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, cancelling every pending update.
    pub fn begin(&mut self) -> u64 {
        if !self.pending.is_empty() {
            log::debug!(
                "Timeline gen {}: cancelled {} pending updates",
                self.generation,
                self.pending.len()
            );
        }
        self.pending.clear();
        self.elapsed = 0.0;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Schedule `value` at `at` seconds into the current generation.
    pub fn schedule(&mut self, at: f32, value: T) {
        let at = if at.is_finite() { at.max(0.0) } else { 0.0 };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled { at, seq, value });
    }

    /// Schedule only if `generation` is still the current one.
    pub fn schedule_for(&mut self, generation: u64, at: f32, value: T) -> bool {
        if generation != self.generation {
            return false;
        }
        self.schedule(at, value);
        true
    }

    /// Move time forward by `dt` and drain every update now due.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        let now = self.elapsed;
        if self.pending.iter().all(|s| s.at > now) {
            return Vec::new();
        }

        let (mut due, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|s| s.at <= now);
        self.pending = rest;
        // equal times keep scheduling order
        due.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_time_order() {
        let mut tl = Timeline::new();
        tl.begin();
        tl.schedule(0.3, "c");
        tl.schedule(0.1, "a");
        tl.schedule(0.2, "b");
        assert!(tl.advance(0.05).is_empty());
        assert_eq!(tl.advance(0.2), vec!["a", "b"]);
        assert_eq!(tl.advance(1.0), vec!["c"]);
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn test_equal_times_keep_order() {
        let mut tl = Timeline::new();
        tl.schedule(0.0, 1);
        tl.schedule(0.0, 2);
        tl.schedule(0.0, 3);
        assert_eq!(tl.advance(0.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_begin_cancels_pending() {
        let mut tl = Timeline::new();
        let old = tl.begin();
        tl.schedule(0.5, "stale");
        let new = tl.begin();
        assert_ne!(old, new);
        tl.schedule(0.5, "fresh");
        assert_eq!(tl.advance(1.0), vec!["fresh"]);
    }

    #[test]
    fn test_schedule_for_rejects_old_generation() {
        let mut tl: Timeline<i32> = Timeline::new();
        let old = tl.begin();
        tl.begin();
        assert!(!tl.schedule_for(old, 0.1, 7));
        assert_eq!(tl.pending(), 0);
        let cur = tl.generation();
        assert!(tl.schedule_for(cur, 0.1, 7));
    }

    #[test]
    fn test_elapsed_resets_per_generation() {
        let mut tl: Timeline<()> = Timeline::new();
        tl.advance(2.0);
        assert_eq!(tl.elapsed(), 2.0);
        tl.begin();
        assert_eq!(tl.elapsed(), 0.0);
        tl.advance(f32::NAN);
        assert_eq!(tl.elapsed(), 0.0);
    }
}
