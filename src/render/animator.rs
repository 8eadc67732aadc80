//! Chart animation curves.
//!
//! Everything here is a pure function of elapsed time so the director can
//! evaluate it on any frame without keeping per-dot state.
//! - Count tween: displayed count walks from the old value to the new one in
//!   whole steps
//! - Shake: short horizontal wobble of the whole chart on a section change
//! - Dot fades: staggered per group and per dot

use serde::{Deserialize, Serialize};

use crate::fast_math::{ease_in_out, ease_out, lerp};

/// Animation timings, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Time for a count to walk from its old value to its new one
    pub count_duration: f32,
    /// Extra delay per group index before its count starts moving
    pub group_delay: f32,
    /// Old dots fade out over this long before the new layout is built
    pub fade_out: f32,
    /// Each new dot fades in over this long
    pub fade_in: f32,
    /// Fade-in delay per group index
    pub group_stagger: f32,
    /// Fade-in delay per dot ordinal
    pub dot_stagger: f32,
    pub shake_duration: f32,
    /// One grow-and-settle of a dot whose color is flipping
    pub pulse_duration: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            count_duration: 0.05,
            group_delay: 0.0,
            fade_out: 0.25,
            fade_in: 0.6,
            group_stagger: 0.1,
            dot_stagger: 0.005,
            shake_duration: 0.5,
            pulse_duration: 0.3,
        }
    }
}

impl AnimationConfig {
    /// Time until the last of `dots_per_group` dots in `group_count` groups
    /// has fully faded in.
    pub fn fade_in_total(&self, group_count: usize, dots_per_group: usize) -> f32 {
        let last_group = group_count.saturating_sub(1) as f32;
        let last_dot = dots_per_group.saturating_sub(1) as f32;
        self.fade_in + last_group * self.group_stagger + last_dot * self.dot_stagger
    }
}

// ── Count tween ──

/// Step schedule for one group's count: `(time, value)` pairs.
///
/// `|end - start|` steps are spread evenly over `duration`, offset by
/// `delay`. Step *k* shows `round(start + (end - start) * k / steps)`, so the
/// last entry is always `end`. Equal counts need no steps.
pub fn count_steps(start: i32, end: i32, duration: f32, delay: f32) -> Vec<(f32, i32)> {
    if start == end {
        return Vec::new();
    }
    let steps = (end as i64 - start as i64).unsigned_abs() as usize;
    let step_duration = duration.max(0.0) / steps as f32;
    (0..=steps)
        .map(|k| {
            let progress = k as f32 / steps as f32;
            let value = lerp(start as f32, end as f32, progress).round() as i32;
            (k as f32 * step_duration + delay.max(0.0), value)
        })
        .collect()
}

// ── Shake ──

/// Horizontal offset keyframes of the change wobble, in pixels.
pub const SHAKE_KEYFRAMES: [f32; 6] = [0.0, -1.0, 1.0, -1.0, 1.0, 0.0];

/// Shake offset at `t` seconds into a wobble lasting `duration`.
pub fn shake_offset(t: f32, duration: f32) -> f32 {
    if t <= 0.0 || t >= duration {
        return 0.0;
    }
    keyframe_at(&SHAKE_KEYFRAMES, t / duration)
}

// ── Pulse ──

/// Scale keyframes of a dot changing color.
pub const PULSE_KEYFRAMES: [f32; 3] = [1.0, 1.2, 1.0];

/// Pulse scale at `t` seconds, repeating every `duration`.
pub fn pulse_scale(t: f32, duration: f32) -> f32 {
    if duration <= 0.0 || !t.is_finite() {
        return 1.0;
    }
    keyframe_at(&PULSE_KEYFRAMES, t.max(0.0).rem_euclid(duration) / duration)
}

/// Ease-in-out interpolation through evenly spaced keyframes, `progress`
/// in `[0, 1]`.
fn keyframe_at(frames: &[f32], progress: f32) -> f32 {
    match frames.len() {
        0 => return 0.0,
        1 => return frames[0],
        _ => {}
    }
    if !progress.is_finite() {
        return frames[0];
    }
    let segments = (frames.len() - 1) as f32;
    let pos = progress.clamp(0.0, 1.0) * segments;
    let i = (pos.floor() as usize).min(frames.len() - 2);
    let local = ease_in_out(pos - i as f32);
    lerp(frames[i], frames[i + 1], local)
}

// ── Fades ──

/// Where the chart is in its change animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Old dots going away; progress in `[0, 1]`
    Out(f32),
    /// New dots arriving; seconds since the new layout appeared
    In(f32),
    Steady,
}

/// Opacity of dot `ordinal` of group `group_index` under `fade`.
pub fn dot_opacity(fade: Fade, group_index: usize, ordinal: usize, timing: &AnimationConfig) -> f32 {
    match fade {
        Fade::Steady => 1.0,
        Fade::Out(progress) => 1.0 - ease_out(progress),
        Fade::In(elapsed) => {
            let start = group_index as f32 * timing.group_stagger + ordinal as f32 * timing.dot_stagger;
            if timing.fade_in <= 0.0 {
                return if elapsed >= start { 1.0 } else { 0.0 };
            }
            ease_out((elapsed - start) / timing.fade_in)
        }
    }
}

/// Scale of an arriving dot: grows from 0 with its opacity.
pub fn dot_scale(fade: Fade, group_index: usize, ordinal: usize, timing: &AnimationConfig) -> f32 {
    match fade {
        Fade::In(_) => dot_opacity(fade, group_index, ordinal, timing),
        Fade::Out(progress) => lerp(1.0, 0.8, progress.clamp(0.0, 1.0)),
        Fade::Steady => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_steps_endpoints() {
        let steps = count_steps(32, 87, 0.8, 0.1);
        assert_eq!(steps.len(), 56);
        assert_eq!(steps.first(), Some(&(0.1, 32)));
        let last = steps.last().unwrap();
        assert_eq!(last.1, 87);
        assert!((last.0 - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_count_steps_monotonic_down() {
        let steps = count_steps(63, 40, 1.0, 0.0);
        for w in steps.windows(2) {
            assert!(w[1].1 <= w[0].1);
            assert!(w[1].0 >= w[0].0);
        }
        assert_eq!(steps.last().unwrap().1, 40);
    }

    #[test]
    fn test_count_steps_equal_counts() {
        assert!(count_steps(62, 62, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_shake_bounds() {
        assert_eq!(shake_offset(0.0, 0.5), 0.0);
        assert_eq!(shake_offset(0.5, 0.5), 0.0);
        assert_eq!(shake_offset(0.1, 0.0), 0.0);
        for i in 0..100 {
            let t = i as f32 * 0.005;
            assert!(shake_offset(t, 0.5).abs() <= 1.0 + 1e-6);
        }
        // second keyframe is hit exactly at 1/5 of the way
        assert!((shake_offset(0.1, 0.5) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_pulse_peaks_mid_cycle() {
        assert_eq!(pulse_scale(0.0, 0.3), 1.0);
        assert!((pulse_scale(0.15, 0.3) - 1.2).abs() < 1e-4);
        // repeats
        assert!((pulse_scale(0.45, 0.3) - 1.2).abs() < 1e-4);
        for i in 0..60 {
            let v = pulse_scale(i as f32 * 0.01, 0.3);
            assert!((1.0..=1.2 + 1e-6).contains(&v));
        }
        assert_eq!(pulse_scale(0.1, 0.0), 1.0);
        assert_eq!(pulse_scale(f32::NAN, 0.3), 1.0);
    }

    #[test]
    fn test_fade_in_stagger() {
        let timing = AnimationConfig::default();
        // group 2 starts 0.2s later than group 0
        assert_eq!(dot_opacity(Fade::In(0.1), 2, 0, &timing), 0.0);
        assert!(dot_opacity(Fade::In(0.1), 0, 0, &timing) > 0.0);
        let total = timing.fade_in_total(3, 100);
        assert!((dot_opacity(Fade::In(total), 2, 99, &timing) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fade_out() {
        let timing = AnimationConfig::default();
        assert_eq!(dot_opacity(Fade::Out(0.0), 0, 0, &timing), 1.0);
        assert!(dot_opacity(Fade::Out(1.0), 0, 0, &timing).abs() < 1e-6);
        assert_eq!(dot_opacity(Fade::Steady, 5, 5, &timing), 1.0);
    }
}
