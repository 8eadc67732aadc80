//! Packed circle layout: approval / disapproval dot grids.
//!
//! Each group gets its own bounding circle, filled by rejection sampling:
//! a candidate is kept only if it is at least `dot_radius * 2.5` away from
//! every dot already placed. Candidates come from a sine hash of
//! `(group_index, attempt)`, never from a system RNG, so a group always
//! packs to the same dots in the same order.
//!
//! The leading `count` dots of a grid are "approved", the rest are
//! "disapproved".

use std::f64::consts::TAU;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{finite_or_zero, sanitize, vertical_shift, LabelPosition, PointEntity, MAX_DOTS};
use crate::error::LayoutError;
use crate::fast_math::{distance_squared, sine_hash};
use crate::story::Group;

/// Minimum dot spacing as a multiple of the dot radius.
pub const SPACING_FACTOR: f32 = 2.5;

/// Seed stride between groups.
const GROUP_SEED_STRIDE: f64 = 9999.0;

/// Parameters for the packed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    /// Side of the square each circle is drawn in
    pub size: f32,
    pub dot_radius: f32,
    /// Dots per circle, itself capped at [`MAX_DOTS`]
    pub total_dots: u32,
    /// Gap between neighbouring circles
    pub horizontal_spacing: f32,
    pub max_vertical_shift: f32,
    /// Rejection sampling budget per circle
    pub max_attempts: u32,
    /// Room reserved above each circle for its labels
    pub label_gap: f32,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            dot_radius: 3.0,
            total_dots: MAX_DOTS,
            horizontal_spacing: 40.0,
            max_vertical_shift: 60.0,
            max_attempts: 1000,
            label_gap: 60.0,
        }
    }
}

impl PackingConfig {
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_dot_radius(mut self, dot_radius: f32) -> Self {
        self.dot_radius = dot_radius;
        self
    }

    pub fn with_total_dots(mut self, total_dots: u32) -> Self {
        self.total_dots = total_dots;
        self
    }

    pub fn with_spacing(mut self, horizontal_spacing: f32) -> Self {
        self.horizontal_spacing = horizontal_spacing;
        self
    }

    pub fn with_vertical_shift(mut self, max_vertical_shift: f32) -> Self {
        self.max_vertical_shift = max_vertical_shift;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Radius of the dashed boundary circle.
    pub fn circle_radius(&self) -> f32 {
        sanitize((sanitize(self.size) - sanitize(self.dot_radius) * 4.0) * 0.5)
    }

    /// Furthest a dot center may sit from the circle center.
    pub fn placement_radius(&self) -> f32 {
        sanitize(self.circle_radius() - sanitize(self.dot_radius))
    }

    pub fn min_distance(&self) -> f32 {
        sanitize(self.dot_radius) * SPACING_FACTOR
    }

    pub fn dot_cap(&self) -> u32 {
        self.total_dots.min(MAX_DOTS)
    }

    /// Canvas size needed for `group_count` circles plus labels.
    pub fn canvas_size(&self, group_count: usize) -> [f32; 2] {
        let size = sanitize(self.size);
        let spacing = finite_or_zero(self.horizontal_spacing);
        let width = (group_count as f32 * (size + spacing) - spacing).max(600.0);
        let height = size + sanitize(self.max_vertical_shift) * 2.0 + 180.0;
        [width, height]
    }
}

// ── Output ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotClass {
    Approved,
    Disapproved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackedDot {
    pub point: PointEntity,
    pub class: DotClass,
}

/// One group's circle.
#[derive(Debug, Clone, PartialEq)]
pub struct DotGrid {
    pub group_index: usize,
    pub center: [f32; 2],
    pub circle_radius: f32,
    pub dots: Vec<PackedDot>,
    /// Set when fewer than the requested dots fit in the attempt budget
    pub shortfall: Option<LayoutError>,
}

impl DotGrid {
    pub fn approved(&self) -> usize {
        self.dots
            .iter()
            .filter(|d| d.class == DotClass::Approved)
            .count()
    }
}

/// Result of [`compute_packed_layout`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackedLayout {
    pub grids: Vec<DotGrid>,
    pub labels: Vec<LabelPosition>,
    pub canvas: [f32; 2],
}

impl PackedLayout {
    /// All dots across grids, in group order.
    pub fn points(&self) -> impl Iterator<Item = &PointEntity> {
        self.grids.iter().flat_map(|g| g.dots.iter().map(|d| &d.point))
    }
}

// ── Packing ──

/// Outcome of packing one circle.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOutcome {
    /// Positions relative to the circle center, in placement order
    pub positions: Vec<[f32; 2]>,
    pub attempts: u32,
}

/// Rejection-sample up to `target` dots inside a disc of radius `max_radius`
/// around the origin, keeping `min_distance` between any two.
///
/// Candidate *k* of group *g* is a pure function of `(g, k)`.
pub fn pack_circle(
    group_index: usize,
    max_radius: f32,
    min_distance: f32,
    target: usize,
    max_attempts: u32,
) -> PackOutcome {
    let seed_base = group_index as f64 * GROUP_SEED_STRIDE;
    let min_d2 = min_distance * min_distance;
    let max_radius = max_radius as f64;

    let mut positions: Vec<[f32; 2]> = Vec::with_capacity(target);
    let mut attempts = 0u32;

    while positions.len() < target && attempts < max_attempts {
        attempts += 1;
        let k = attempts as f64;

        let angle = sine_hash(seed_base + k) * TAU;
        // sqrt keeps the density uniform over the disc
        let radius = sine_hash(seed_base + k * 2.0).sqrt() * max_radius;

        let x = (radius * angle.cos()) as f32;
        let y = (radius * angle.sin()) as f32;

        let clear = positions
            .iter()
            .all(|p| distance_squared(x, y, p[0], p[1]) >= min_d2);
        if clear {
            positions.push([x, y]);
        }
    }

    PackOutcome {
        positions,
        attempts,
    }
}

/// Lay out `groups` as packed dot circles, one per group.
///
/// Circles are computed in parallel; the result keeps group order.
pub fn compute_packed_layout(groups: &[Group], config: &PackingConfig) -> PackedLayout {
    let cap = config.dot_cap();
    let size = sanitize(config.size);
    let spacing = finite_or_zero(config.horizontal_spacing);
    let max_shift = sanitize(config.max_vertical_shift);
    let label_gap = finite_or_zero(config.label_gap);
    let circle_radius = config.circle_radius();
    let placement_radius = config.placement_radius();
    let min_distance = config.min_distance();

    let grids: Vec<DotGrid> = groups
        .par_iter()
        .enumerate()
        .map(|(i, group)| {
            let offset_x = i as f32 * (size + spacing);
            let offset_y = vertical_shift(group, i, max_shift) + max_shift + label_gap;
            let center = [size * 0.5 + offset_x, size * 0.5 + offset_y];

            let target = cap as usize;
            let outcome = pack_circle(i, placement_radius, min_distance, target, config.max_attempts);

            let shortfall = if outcome.positions.len() < target {
                let err = LayoutError::PackingBudgetExhausted {
                    placed: outcome.positions.len(),
                    requested: target,
                    attempts: outcome.attempts,
                };
                log::debug!("Group {} (`{}`): {}", i, group.name, err);
                Some(err)
            } else {
                None
            };

            let approved = group.check_count(cap).unwrap_or_else(|e| {
                log::debug!("Clamping: {}", e);
                group.clamped_count(cap)
            }) as usize;
            let dots = outcome
                .positions
                .iter()
                .enumerate()
                .map(|(ordinal, p)| PackedDot {
                    point: PointEntity::new(center[0] + p[0], center[1] + p[1], i, ordinal),
                    class: if ordinal < approved {
                        DotClass::Approved
                    } else {
                        DotClass::Disapproved
                    },
                })
                .collect();

            DotGrid {
                group_index: i,
                center,
                circle_radius,
                dots,
                shortfall,
            }
        })
        .collect();

    let labels = groups
        .iter()
        .zip(grids.iter())
        .map(|(group, grid)| LabelPosition {
            x: grid.center[0],
            // name line; the sink draws the approval headline above it
            y: grid.center[1] - size * 0.5 - 30.0,
            text: group.name.clone(),
            count: group.clamped_count(cap),
        })
        .collect();

    PackedLayout {
        grids,
        labels,
        canvas: config.canvas_size(groups.len()),
    }
}
