//! `StoryDirector`: scroll in, frames out.
//!
//! Wires the tracker, the layout cache, the transition machine and the
//! count timeline together. The host calls [`StoryDirector::on_scroll`]
//! whenever it has a scroll reading and [`StoryDirector::tick`] once per
//! rendered frame, then draws whatever [`StoryDirector::frame`] returns.

use std::sync::Arc;

use crate::config::StoryConfig;
use crate::layout::cache::LayoutCache;
use crate::layout::{ChartLayout, DotClass, LayoutStrategy};
use crate::particles::ParticleField;
use crate::render::animator::{count_steps, pulse_scale, shake_offset, Fade};
use crate::scroll::{ScrollTracker, SectionChange};
use crate::story::{Group, Story};
use crate::transition::{transition, Event, Phase, Timeline, TransitionState};

/// One displayed-count step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CountUpdate {
    group_index: usize,
    value: i32,
}

/// Everything the render sink needs for one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub section_index: usize,
    pub section_count: usize,
    pub title: String,
    pub progress: f32,
    pub chart_visible: bool,
    /// Layout to draw (the outgoing one while fading out)
    pub layout: Option<Arc<ChartLayout>>,
    pub fade: Fade,
    /// Groups behind `layout`, for colors
    pub groups: Vec<Group>,
    /// Animated count per label, in label order
    pub counts: Vec<i32>,
    /// True while counts are still walking towards their targets
    pub animating: bool,
    /// Scale of dots whose color has yet to flip
    pub pulse: f32,
    pub shake_x: f32,
    /// Normalized particle positions
    pub particles: Vec<[f32; 2]>,
}

impl Frame {
    /// Class of dot `ordinal` in group `group_index` under the displayed
    /// count: the leading `count` dots are approved.
    pub fn dot_class(&self, group_index: usize, ordinal: usize) -> Option<DotClass> {
        let count = *self.counts.get(group_index)?;
        Some(if (ordinal as i64) < count as i64 {
            DotClass::Approved
        } else {
            DotClass::Disapproved
        })
    }

    /// Scale factor for a dot that ends up as `target`.
    pub fn dot_pulse(&self, group_index: usize, ordinal: usize, target: DotClass) -> f32 {
        match self.dot_class(group_index, ordinal) {
            Some(shown) if self.animating && shown != target => self.pulse,
            _ => 1.0,
        }
    }
}

pub struct StoryDirector {
    story: Story,
    config: StoryConfig,
    tracker: ScrollTracker,
    cache: LayoutCache,
    state: TransitionState,
    /// Layout currently on screen
    shown: Option<Arc<ChartLayout>>,
    /// Groups behind `shown`
    groups: Vec<Group>,
    /// Counts on screen; the previous slot for count tweens
    counts: Vec<i32>,
    timeline: Timeline<CountUpdate>,
    shake_elapsed: Option<f32>,
    particles: ParticleField,
    clock: f32,
}

impl StoryDirector {
    pub fn new(story: Story, config: StoryConfig) -> Self {
        let tracker = ScrollTracker::new(story.len());
        let particles = ParticleField::for_section(&config.particles, 0);
        let mut director = Self {
            story,
            config,
            tracker,
            cache: LayoutCache::new(),
            state: TransitionState::new(0),
            shown: None,
            groups: Vec::new(),
            counts: Vec::new(),
            timeline: Timeline::new(),
            shake_elapsed: None,
            particles,
            clock: 0.0,
        };
        director.show_current();
        director
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn current_section(&self) -> usize {
        self.state.current
    }

    pub fn transition_state(&self) -> TransitionState {
        self.state
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Switch layout strategy and rebuild the current chart.
    pub fn set_layout(&mut self, layout: LayoutStrategy) {
        if self.config.layout != layout {
            self.config.layout = layout;
            self.cache.invalidate();
            self.show_current();
        }
    }

    /// Feed a scroll reading from the host.
    pub fn on_scroll(&mut self, scroll_offset: f32, viewport_height: f32) -> Option<SectionChange> {
        let change = self.tracker.update(scroll_offset, viewport_height)?;
        self.begin_transition(change.current);
        Some(change)
    }

    /// Advance all animations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;

        for update in self.timeline.advance(dt) {
            if let Some(c) = self.counts.get_mut(update.group_index) {
                *c = update.value;
            }
        }

        // steps queued here start firing on the next tick
        self.state = transition(self.state, Event::Tick(dt), self.config.animation.fade_out);
        if self.state.phase == Phase::Recompute {
            self.recompute();
        }

        if let Some(ref mut t) = self.shake_elapsed {
            *t += dt;
            if *t >= self.config.animation.shake_duration {
                self.shake_elapsed = None;
            }
        }
    }

    pub fn frame(&self) -> Frame {
        let index = self.state.current;
        let timing = &self.config.animation;
        let fade = match self.state.phase {
            Phase::TransitionOut { .. } => Fade::Out(self.state.fade_out_progress(timing.fade_out).unwrap_or(1.0)),
            // old dots are gone, new ones not built yet
            Phase::Recompute => Fade::Out(1.0),
            Phase::TransitionIn { elapsed, .. } => Fade::In(elapsed),
            Phase::Idle => Fade::Steady,
        };

        let animating = self.timeline.pending() > 0;
        Frame {
            section_index: index,
            section_count: self.story.len(),
            title: self
                .story
                .section(index)
                .map(|s| s.title.clone())
                .unwrap_or_default(),
            progress: self.tracker.progress(),
            chart_visible: self.shown.is_some(),
            layout: self.shown.clone(),
            fade,
            groups: self.groups.clone(),
            counts: self.counts.clone(),
            animating,
            pulse: if animating {
                pulse_scale(self.timeline.elapsed(), timing.pulse_duration)
            } else {
                1.0
            },
            shake_x: self
                .shake_elapsed
                .map(|t| shake_offset(t, timing.shake_duration))
                .unwrap_or(0.0),
            particles: self.particles.positions_at(self.clock).collect(),
        }
    }

    // ── internals ──

    fn begin_transition(&mut self, to: usize) {
        let before = self.state.generation;
        self.state = transition(self.state, Event::SectionChanged(to), self.config.animation.fade_out);
        if self.state.generation == before {
            return;
        }
        log::debug!(
            "Transition gen {}: {:?} -> {}",
            self.state.generation,
            self.state.previous,
            to
        );

        // last section wins: drop count steps still queued for the old one
        self.timeline.begin();
        self.shake_elapsed = Some(0.0);
        self.particles = ParticleField::for_section(&self.config.particles, to);
    }

    fn recompute(&mut self) {
        let index = self.state.current;
        let generation = self.state.generation;
        let groups = self.visible_groups(index);

        let layout = groups
            .as_ref()
            .map(|g| self.cache.get_or_compute(g, &self.config.layout));
        let new_groups = groups.unwrap_or_default();
        self.schedule_counts(&new_groups);

        let duration = match layout.as_deref() {
            Some(ChartLayout::Cluster(l)) => {
                let widest = (0..l.labels.len())
                    .map(|g| l.group_points(g).count())
                    .max()
                    .unwrap_or(0);
                self.config.animation.fade_in_total(l.labels.len(), widest)
            }
            Some(ChartLayout::Packed(l)) => {
                let widest = l.grids.iter().map(|g| g.dots.len()).max().unwrap_or(0);
                self.config.animation.fade_in_total(l.grids.len(), widest)
            }
            None => 0.0,
        };

        self.shown = layout;
        self.groups = new_groups;
        self.state = transition(
            self.state,
            Event::LayoutReady {
                generation,
                duration,
            },
            self.config.animation.fade_out,
        );
    }

    /// Queue count steps from the counts on screen to `groups`' counts.
    fn schedule_counts(&mut self, groups: &[Group]) {
        let timing = &self.config.animation;
        let generation = self.timeline.generation();
        let now = self.timeline.elapsed();
        let cap = self.cap();

        let mut counts = Vec::with_capacity(groups.len());
        let mut last_at: f32 = 0.0;
        for (i, group) in groups.iter().enumerate() {
            // groups without a counterpart start from zero
            let start = self.counts.get(i).copied().unwrap_or(0);
            let end = group.clamped_count(cap) as i32;
            counts.push(start);

            let delay = now + i as f32 * timing.group_delay;
            for (at, value) in count_steps(start, end, timing.count_duration, delay) {
                last_at = last_at.max(at);
                self.timeline.schedule_for(
                    generation,
                    at,
                    CountUpdate {
                        group_index: i,
                        value,
                    },
                );
            }
        }
        self.counts = counts;
        if self.timeline.pending() > 0 {
            log::debug!(
                "Scheduled {} count steps until t={:.3}s",
                self.timeline.pending(),
                last_at
            );
        }
    }

    fn visible_groups(&self, index: usize) -> Option<Vec<Group>> {
        if !self.story.chart_visible(index) {
            return None;
        }
        self.story.section(index).map(|s| s.groups.clone())
    }

    fn cap(&self) -> u32 {
        match &self.config.layout {
            LayoutStrategy::Cluster(c) => c.dot_cap(),
            LayoutStrategy::Packed(p) => p.dot_cap(),
        }
    }

    /// Show the current section immediately, without animation.
    fn show_current(&mut self) {
        let index = self.state.current;
        let groups = self.visible_groups(index);
        self.shown = groups
            .as_ref()
            .map(|g| self.cache.get_or_compute(g, &self.config.layout));
        let cap = self.cap();
        self.groups = groups.unwrap_or_default();
        self.counts = self
            .groups
            .iter()
            .map(|g| g.clamped_count(cap) as i32)
            .collect();
    }
}
