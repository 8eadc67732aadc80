//! Section Transition State Machine
//!
//! ```text
//! Idle ─SectionChanged─▶ TransitionOut ─(fade done)─▶ Recompute
//!   ▲                                                    │
//!   └──(fade done)── TransitionIn ◀──LayoutReady(gen)────┘
//! ```
//!
//! The machine is a pure function over an explicit two-slot record
//! (`previous`, `current`). A section change in any phase restarts the
//! fade-out for the newest section and bumps the generation, so a layout
//! that finishes for an abandoned section is ignored (last section wins).

pub mod timeline;

pub use timeline::Timeline;

/// Phase of the chart between two sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// Old dots fading; seconds elapsed
    TransitionOut { elapsed: f32 },
    /// Waiting for the layout of `current`
    Recompute,
    /// New dots appearing; seconds elapsed of `duration`
    TransitionIn { elapsed: f32, duration: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    SectionChanged(usize),
    Tick(f32),
    /// Layout for transition `generation` is ready and takes `duration`
    /// seconds to fade in
    LayoutReady { generation: u64, duration: f32 },
}

/// Two-slot transition record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub previous: Option<usize>,
    pub current: usize,
    pub phase: Phase,
    pub generation: u64,
}

impl TransitionState {
    pub fn new(current: usize) -> Self {
        Self {
            previous: None,
            current,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Fade-out progress in `[0, 1]` while in `TransitionOut`.
    pub fn fade_out_progress(&self, fade_out: f32) -> Option<f32> {
        match self.phase {
            Phase::TransitionOut { elapsed } if fade_out > 0.0 => Some((elapsed / fade_out).min(1.0)),
            Phase::TransitionOut { .. } => Some(1.0),
            _ => None,
        }
    }
}

/// Advance the machine by one event.
///
/// `fade_out` is the TransitionOut duration in seconds.
pub fn transition(state: TransitionState, event: Event, fade_out: f32) -> TransitionState {
    match event {
        Event::SectionChanged(to) => {
            if to == state.current {
                return state;
            }
            TransitionState {
                previous: Some(state.current),
                current: to,
                phase: Phase::TransitionOut { elapsed: 0.0 },
                generation: state.generation.wrapping_add(1),
            }
        }

        Event::Tick(dt) => {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            let phase = match state.phase {
                Phase::TransitionOut { elapsed } => {
                    let elapsed = elapsed + dt;
                    if elapsed >= fade_out {
                        Phase::Recompute
                    } else {
                        Phase::TransitionOut { elapsed }
                    }
                }
                Phase::TransitionIn { elapsed, duration } => {
                    let elapsed = elapsed + dt;
                    if elapsed >= duration {
                        Phase::Idle
                    } else {
                        Phase::TransitionIn { elapsed, duration }
                    }
                }
                other => other,
            };
            TransitionState { phase, ..state }
        }

        Event::LayoutReady {
            generation,
            duration,
        } => {
            if state.phase != Phase::Recompute || generation != state.generation {
                log::debug!(
                    "Dropping stale layout (gen {}, current gen {})",
                    generation,
                    state.generation
                );
                return state;
            }
            TransitionState {
                phase: Phase::TransitionIn {
                    elapsed: 0.0,
                    duration: duration.max(0.0),
                },
                ..state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE_OUT: f32 = 0.25;

    fn run(state: TransitionState, events: &[Event]) -> TransitionState {
        events
            .iter()
            .fold(state, |s, &e| transition(s, e, FADE_OUT))
    }

    #[test]
    fn test_full_cycle() {
        let s = TransitionState::new(0);
        let s = transition(s, Event::SectionChanged(1), FADE_OUT);
        assert_eq!(s.phase, Phase::TransitionOut { elapsed: 0.0 });
        assert_eq!(s.previous, Some(0));
        assert_eq!(s.current, 1);
        assert_eq!(s.generation, 1);

        let s = transition(s, Event::Tick(0.1), FADE_OUT);
        assert!(matches!(s.phase, Phase::TransitionOut { .. }));
        let s = transition(s, Event::Tick(0.2), FADE_OUT);
        assert_eq!(s.phase, Phase::Recompute);

        let s = transition(
            s,
            Event::LayoutReady {
                generation: 1,
                duration: 0.5,
            },
            FADE_OUT,
        );
        assert!(matches!(s.phase, Phase::TransitionIn { .. }));
        let s = transition(s, Event::Tick(0.6), FADE_OUT);
        assert!(s.is_idle());
    }

    #[test]
    fn test_same_section_is_noop() {
        let s = TransitionState::new(3);
        assert_eq!(transition(s, Event::SectionChanged(3), FADE_OUT), s);

        let mid = run(s, &[Event::SectionChanged(4), Event::Tick(0.1)]);
        assert_eq!(transition(mid, Event::SectionChanged(4), FADE_OUT), mid);
    }

    #[test]
    fn test_stale_layout_ignored() {
        let s = run(
            TransitionState::new(0),
            &[
                Event::SectionChanged(1),
                Event::Tick(1.0),
                // user scrolled on before the layout for section 1 landed
                Event::SectionChanged(2),
                Event::LayoutReady {
                    generation: 1,
                    duration: 0.5,
                },
            ],
        );
        assert_eq!(s.current, 2);
        assert_eq!(s.generation, 2);
        assert_eq!(s.phase, Phase::TransitionOut { elapsed: 0.0 });
    }

    #[test]
    fn test_layout_ready_outside_recompute_ignored() {
        let s = TransitionState::new(0);
        let after = transition(
            s,
            Event::LayoutReady {
                generation: 0,
                duration: 1.0,
            },
            FADE_OUT,
        );
        assert_eq!(after, s);
    }

    #[test]
    fn test_idle_ignores_ticks() {
        let s = TransitionState::new(2);
        assert_eq!(transition(s, Event::Tick(5.0), FADE_OUT), s);
        assert_eq!(transition(s, Event::Tick(f32::NAN), FADE_OUT), s);
    }

    #[test]
    fn test_fade_out_progress() {
        let s = run(TransitionState::new(0), &[Event::SectionChanged(1), Event::Tick(0.125)]);
        assert!((s.fade_out_progress(FADE_OUT).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(TransitionState::new(0).fade_out_progress(FADE_OUT), None);
    }
}
