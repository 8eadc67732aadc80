//! Group Layout Engine
//!
//! Turns a section's ordered group list into 2D dot positions and labels.
//!
//! Two strategies:
//! - [`cluster`]: a loose cloud of dots per group around a centroid on a
//!   horizontal axis, with seeded angle/distance sampling and jitter.
//!   The dot cap is global: counts over the cap are re-partitioned.
//! - [`packing`]: one bounded circle per group filled by rejection sampling
//!   with a minimum spacing; dots split into approved / disapproved. The
//!   dot cap applies per circle.
//!
//! Neither strategy fails. Counts are clamped, and a packing shortfall
//! comes back as a shorter dot list.
//!
//! [`cache::LayoutCache`] memoizes the last result so an unchanged group
//! list never re-randomizes.

pub mod cache;
pub mod cluster;
pub mod packing;

use serde::{Deserialize, Serialize};

use crate::fast_math::{fnv1a, fnv1a_bytes, sine_hash};
use crate::story::Group;

pub use cluster::compute_layout;
pub use packing::{compute_packed_layout, DotClass, DotGrid, PackedDot, PackedLayout, PackingConfig};

/// Hard ceiling on rendered dots per chart.
pub const MAX_DOTS: u32 = 100;

// ── Output types ──

/// One dot. `id` stays the same for the same group/ordinal pair across
/// re-renders so animations can follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEntity {
    pub x: f32,
    pub y: f32,
    pub group_index: usize,
    pub id: String,
}

impl PointEntity {
    pub fn new(x: f32, y: f32, group_index: usize, ordinal: usize) -> Self {
        Self {
            x,
            y,
            group_index,
            id: point_id(group_index, ordinal),
        }
    }
}

/// Stable identity for the `ordinal`-th dot of a group.
pub fn point_id(group_index: usize, ordinal: usize) -> String {
    format!("{}-{}", group_index, ordinal)
}

/// Label above a group's cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPosition {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub count: u32,
}

/// Result of [`compute_layout`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub points: Vec<PointEntity>,
    pub labels: Vec<LabelPosition>,
    /// Per-group centroid, in group order
    pub centroids: Vec<[f32; 2]>,
}

impl Layout {
    /// Dots belonging to `group_index`.
    pub fn group_points(&self, group_index: usize) -> impl Iterator<Item = &PointEntity> {
        self.points.iter().filter(move |p| p.group_index == group_index)
    }
}

// ── Config ──

/// Parameters for the cluster layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Global dot cap, itself capped at [`MAX_DOTS`]
    pub total_dots: u32,
    /// X of the first centroid
    pub base_offset: f32,
    pub horizontal_spacing: f32,
    pub vertical_center: f32,
    /// Cluster radius = sqrt(count) * scale
    pub cluster_radius_scale: f32,
    /// Full width of the jitter band; each dot moves at most half of it
    pub jitter_magnitude: f32,
    /// Centroids are shifted vertically by up to this much (0 = aligned)
    pub max_vertical_shift: f32,
    /// Distance from centroid up to the label baseline
    pub label_offset: f32,
    /// Mixed into the sampling seed
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            total_dots: MAX_DOTS,
            base_offset: 120.0,
            horizontal_spacing: 240.0,
            vertical_center: 220.0,
            cluster_radius_scale: 10.0,
            jitter_magnitude: 8.0,
            max_vertical_shift: 60.0,
            label_offset: 130.0,
            seed: 0x10A5,
        }
    }
}

impl LayoutConfig {
    pub fn with_total_dots(mut self, total_dots: u32) -> Self {
        self.total_dots = total_dots;
        self
    }

    pub fn with_spacing(mut self, horizontal_spacing: f32) -> Self {
        self.horizontal_spacing = horizontal_spacing;
        self
    }

    pub fn with_cluster_radius_scale(mut self, scale: f32) -> Self {
        self.cluster_radius_scale = scale;
        self
    }

    pub fn with_jitter(mut self, jitter_magnitude: f32) -> Self {
        self.jitter_magnitude = jitter_magnitude;
        self
    }

    pub fn with_vertical_shift(mut self, max_vertical_shift: f32) -> Self {
        self.max_vertical_shift = max_vertical_shift;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Effective global cap.
    #[inline]
    pub fn dot_cap(&self) -> u32 {
        self.total_dots.min(MAX_DOTS)
    }
}

// ── Strategy ──

/// Which layout a chart uses, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutStrategy {
    Cluster(LayoutConfig),
    Packed(PackingConfig),
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::Packed(PackingConfig::default())
    }
}

impl LayoutStrategy {
    pub fn compute(&self, groups: &[Group]) -> ChartLayout {
        match self {
            Self::Cluster(config) => ChartLayout::Cluster(compute_layout(groups, config)),
            Self::Packed(config) => ChartLayout::Packed(compute_packed_layout(groups, config)),
        }
    }
}

/// Output of either strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartLayout {
    Cluster(Layout),
    Packed(PackedLayout),
}

impl ChartLayout {
    pub fn labels(&self) -> &[LabelPosition] {
        match self {
            Self::Cluster(l) => &l.labels,
            Self::Packed(l) => &l.labels,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Self::Cluster(l) => l.points.len(),
            Self::Packed(l) => l.points().count(),
        }
    }
}

// ── Shared helpers ──

/// Finite, non-negative version of a config value (NaN/inf/negative → 0).
#[inline]
pub(crate) fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Finite version of a config value (NaN/inf → 0).
#[inline]
pub(crate) fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Vertical offset of a group's centroid in `[-max_shift, max_shift]`.
///
/// Seeded from the group's name hash, count and index, so it only moves
/// when the group itself changes.
pub fn vertical_shift(group: &Group, index: usize, max_shift: f32) -> f32 {
    let max_shift = sanitize(max_shift);
    if max_shift == 0.0 {
        return 0.0;
    }
    let name_key = (fnv1a(&group.name) & 0xFFFF) as f64;
    let seed = name_key * 12345.0 + group.count as f64 * 789.0 + index as f64 * 456.0;
    let r = sine_hash(seed) as f32;
    r * max_shift * 2.0 - max_shift
}

/// Structural fingerprint of a group list.
pub fn groups_fingerprint(groups: &[Group]) -> u64 {
    let mut h = fnv1a_bytes(0xcbf2_9ce4_8422_2325, &(groups.len() as u64).to_le_bytes());
    for g in groups {
        h = fnv1a_bytes(h, g.name.as_bytes());
        h = fnv1a_bytes(h, &[0xFF]);
        h = fnv1a_bytes(h, &g.count.to_le_bytes());
        if let Some(ref c) = g.color_token {
            h = fnv1a_bytes(h, c.as_bytes());
        }
        h = fnv1a_bytes(h, &[0xFE]);
    }
    h
}

/// Clamp every count to `[0, cap]`, then scale down proportionally
/// (largest remainder) if the total still exceeds `cap`.
///
/// The result always sums to at most `cap`, and equals `cap` whenever the
/// clamped total was larger.
pub fn partition_counts(groups: &[Group], cap: u32) -> Vec<u32> {
    let clamped: Vec<u32> = groups
        .iter()
        .map(|g| {
            g.check_count(cap).unwrap_or_else(|e| {
                log::debug!("Clamping: {}", e);
                g.clamped_count(cap)
            })
        })
        .collect();
    let total: u64 = clamped.iter().map(|&c| c as u64).sum();
    if total <= cap as u64 {
        return clamped;
    }

    let cap = cap as u64;
    let mut shares: Vec<u32> = Vec::with_capacity(clamped.len());
    let mut remainders: Vec<(u64, usize)> = Vec::with_capacity(clamped.len());
    for (i, &c) in clamped.iter().enumerate() {
        let scaled = c as u64 * cap;
        shares.push((scaled / total) as u32);
        remainders.push((scaled % total, i));
    }

    let assigned: u64 = shares.iter().map(|&s| s as u64).sum();
    let mut leftover = cap - assigned;
    // Largest remainder first; ties go to the earlier group
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, i) in &remainders {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_under_cap_is_identity() {
        let groups = vec![Group::new("a", 10), Group::new("b", 30)];
        assert_eq!(partition_counts(&groups, 100), vec![10, 30]);
    }

    #[test]
    fn test_partition_over_cap_sums_to_cap() {
        let groups = vec![
            Group::new("a", 100),
            Group::new("b", 100),
            Group::new("c", 50),
        ];
        let shares = partition_counts(&groups, 100);
        assert_eq!(shares.iter().sum::<u32>(), 100);
        assert_eq!(shares, vec![40, 40, 20]);
    }

    #[test]
    fn test_partition_largest_remainder() {
        // 3 equal groups into 100: 33/33/33 + 1 leftover to the first
        let groups = vec![Group::new("a", 90), Group::new("b", 90), Group::new("c", 90)];
        assert_eq!(partition_counts(&groups, 100), vec![34, 33, 33]);
    }

    #[test]
    fn test_partition_clamps_negative_and_oversized() {
        let groups = vec![Group::new("neg", -20), Group::new("big", 500)];
        assert_eq!(partition_counts(&groups, 100), vec![0, 100]);
    }

    #[test]
    fn test_vertical_shift_bounds_and_stability() {
        let g = Group::new("30-44", 87);
        let a = vertical_shift(&g, 1, 60.0);
        let b = vertical_shift(&g, 1, 60.0);
        assert_eq!(a, b);
        assert!((-60.0..=60.0).contains(&a));
        assert_eq!(vertical_shift(&g, 1, 0.0), 0.0);
        assert_eq!(vertical_shift(&g, 1, f32::NAN), 0.0);
    }

    #[test]
    fn test_fingerprint_distinguishes_counts_and_order() {
        let a = vec![Group::new("x", 5), Group::new("y", 3)];
        let b = vec![Group::new("x", 5), Group::new("y", 4)];
        let c = vec![Group::new("y", 3), Group::new("x", 5)];
        assert_eq!(groups_fingerprint(&a), groups_fingerprint(&a.clone()));
        assert_ne!(groups_fingerprint(&a), groups_fingerprint(&b));
        assert_ne!(groups_fingerprint(&a), groups_fingerprint(&c));
    }

    #[test]
    fn test_config_cap() {
        assert_eq!(LayoutConfig::default().with_total_dots(250).dot_cap(), 100);
        assert_eq!(LayoutConfig::default().with_total_dots(40).dot_cap(), 40);
    }
}
