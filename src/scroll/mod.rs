//! Scroll Tracking
//!
//! Maps a continuous vertical scroll offset onto a discrete section index.
//! The offset is pushed forward by half a viewport before dividing, so the
//! next section takes over as soon as its top edge crosses the middle of the
//! screen instead of when it reaches the top.
//!
//! Subscribers hear about a section only when the index actually changes;
//! feeding the same offset twice is a no-op.

/// Fraction of a viewport added to the offset before picking the section.
pub const EARLY_TRIGGER: f32 = 0.5;

/// Scroll reading and the section it maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    pub scroll_offset_y: f32,
    pub viewport_height: f32,
    pub section_index: usize,
}

/// A change of the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionChange {
    pub previous: usize,
    pub current: usize,
}

/// Section index for a scroll offset.
///
/// Negative or non-finite offsets count as 0. A non-positive viewport height
/// or an empty section list maps everything to section 0.
pub fn section_for_offset(scroll_offset: f32, viewport_height: f32, section_count: usize) -> usize {
    if section_count == 0 || viewport_height.is_nan() || viewport_height <= 0.0 || viewport_height.is_infinite() {
        return 0;
    }
    let offset = if scroll_offset.is_finite() {
        scroll_offset.max(0.0)
    } else if scroll_offset == f32::INFINITY {
        return section_count - 1;
    } else {
        0.0
    };

    let adjusted = offset + EARLY_TRIGGER * viewport_height;
    let raw = (adjusted / viewport_height).floor();
    // float → usize saturates, so huge offsets land on the last section
    (raw as usize).min(section_count - 1)
}

/// Scroll offset at which `index` sits flush with the top of the viewport.
pub fn offset_for_section(index: usize, viewport_height: f32) -> f32 {
    index as f32 * viewport_height.max(0.0)
}

type Subscriber = Box<dyn FnMut(SectionChange)>;

/// Stateful tracker with change notification.
pub struct ScrollTracker {
    section_count: usize,
    state: ViewportState,
    subscribers: Vec<Subscriber>,
}

impl ScrollTracker {
    /// `section_count` is clamped to at least 1.
    pub fn new(section_count: usize) -> Self {
        Self {
            section_count: section_count.max(1),
            state: ViewportState::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn current(&self) -> usize {
        self.state.section_index
    }

    /// Register a callback invoked on every section change.
    pub fn subscribe<F>(&mut self, f: F)
    where
        F: FnMut(SectionChange) + 'static,
    {
        self.subscribers.push(Box::new(f));
    }

    /// Feed a scroll reading. Returns the change, if the section moved.
    pub fn update(&mut self, scroll_offset: f32, viewport_height: f32) -> Option<SectionChange> {
        let index = section_for_offset(scroll_offset, viewport_height, self.section_count);
        self.state.scroll_offset_y = if scroll_offset.is_finite() {
            scroll_offset.max(0.0)
        } else {
            0.0
        };
        self.state.viewport_height = viewport_height;

        let previous = self.state.section_index;
        if index == previous {
            return None;
        }

        self.state.section_index = index;
        let change = SectionChange {
            previous,
            current: index,
        };
        log::debug!("Section {} -> {}", previous, index);
        for sub in self.subscribers.iter_mut() {
            sub(change);
        }
        Some(change)
    }

    /// Progress through the story in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.section_count <= 1 {
            return 0.0;
        }
        self.state.section_index as f32 / (self.section_count - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_early_trigger() {
        // 800px viewport: section 1 takes over at 400px, not 800px
        assert_eq!(section_for_offset(0.0, 800.0, 5), 0);
        assert_eq!(section_for_offset(399.0, 800.0, 5), 0);
        assert_eq!(section_for_offset(400.0, 800.0, 5), 1);
        assert_eq!(section_for_offset(1199.0, 800.0, 5), 1);
        assert_eq!(section_for_offset(1200.0, 800.0, 5), 2);
    }

    #[test]
    fn test_clamped_to_last_section() {
        assert_eq!(section_for_offset(1.0e9, 800.0, 5), 4);
        assert_eq!(section_for_offset(f32::MAX, 800.0, 5), 4);
        assert_eq!(section_for_offset(f32::INFINITY, 800.0, 5), 4);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(section_for_offset(-500.0, 800.0, 5), 0);
        assert_eq!(section_for_offset(f32::NAN, 800.0, 5), 0);
        assert_eq!(section_for_offset(1000.0, 0.0, 5), 0);
        assert_eq!(section_for_offset(1000.0, -1.0, 5), 0);
        assert_eq!(section_for_offset(1000.0, 800.0, 0), 0);
    }

    #[test]
    fn test_notifies_only_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut tracker = ScrollTracker::new(4);
        tracker.subscribe(move |c| sink.borrow_mut().push(c));

        assert_eq!(tracker.update(0.0, 800.0), None);
        assert_eq!(tracker.update(100.0, 800.0), None);
        let change = tracker.update(500.0, 800.0);
        assert_eq!(change, Some(SectionChange { previous: 0, current: 1 }));
        // same offset again: idempotent, no notification
        assert_eq!(tracker.update(500.0, 800.0), None);
        assert_eq!(tracker.update(600.0, 800.0), None);
        tracker.update(0.0, 800.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], SectionChange { previous: 1, current: 0 });
    }

    #[test]
    fn test_progress() {
        let mut tracker = ScrollTracker::new(5);
        assert_eq!(tracker.progress(), 0.0);
        tracker.update(offset_for_section(2, 800.0), 800.0);
        assert_eq!(tracker.current(), 2);
        assert!((tracker.progress() - 0.5).abs() < 1e-6);
        tracker.update(offset_for_section(4, 800.0), 800.0);
        assert!((tracker.progress() - 1.0).abs() < 1e-6);

        let single = ScrollTracker::new(1);
        assert_eq!(single.progress(), 0.0);
    }

    #[test]
    fn test_jump_offset_lands_on_section() {
        for i in 0..15 {
            let off = offset_for_section(i, 720.0);
            assert_eq!(section_for_offset(off, 720.0, 15), i);
        }
    }

    proptest! {
        #[test]
        fn section_index_in_range(
            offset in 0.0f32..1.0e7,
            height in 1.0f32..4000.0,
            n in 1usize..64,
        ) {
            let idx = section_for_offset(offset, height, n);
            prop_assert!(idx < n);
        }

        #[test]
        fn section_index_monotonic(
            a in 0.0f32..1.0e6,
            b in 0.0f32..1.0e6,
            height in 1.0f32..4000.0,
            n in 1usize..64,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(section_for_offset(lo, height, n) <= section_for_offset(hi, height, n));
        }
    }
}
