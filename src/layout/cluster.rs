//! Cluster ("puddle") layout: loose dot clouds around per-group centroids.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    finite_or_zero, groups_fingerprint, partition_counts, sanitize, vertical_shift,
    LabelPosition, Layout, LayoutConfig, PointEntity,
};
use crate::story::Group;

/// Lay out `groups` as jittered clusters.
///
/// Group *i* is centered at `base_offset + i * horizontal_spacing`. Each dot
/// sits at a uniformly sampled angle and distance (up to
/// `sqrt(count) * cluster_radius_scale`) from the centroid, then moves by at
/// most `jitter_magnitude / 2`. Sampling is seeded from the config seed and
/// the group list, so equal inputs give equal layouts.
pub fn compute_layout(groups: &[Group], config: &LayoutConfig) -> Layout {
    let cap = config.dot_cap();
    let shares = partition_counts(groups, cap);

    let spacing = finite_or_zero(config.horizontal_spacing);
    let base_x = finite_or_zero(config.base_offset);
    let center_y = finite_or_zero(config.vertical_center);
    let radius_scale = sanitize(config.cluster_radius_scale);
    // Halved before sanitizing so the sampling range width stays finite
    let half_jitter = sanitize(config.jitter_magnitude * 0.5);
    let label_offset = finite_or_zero(config.label_offset);

    let mut rng = StdRng::seed_from_u64(config.seed ^ groups_fingerprint(groups));

    let mut points = Vec::with_capacity(shares.iter().map(|&s| s as usize).sum());
    let mut labels = Vec::with_capacity(groups.len());
    let mut centroids = Vec::with_capacity(groups.len());

    for (i, (group, &share)) in groups.iter().zip(shares.iter()).enumerate() {
        let cx = base_x + i as f32 * spacing;
        let cy = center_y + vertical_shift(group, i, config.max_vertical_shift);
        centroids.push([cx, cy]);

        // Radius follows the group's own size, not its re-partitioned share
        let count = group.clamped_count(cap);
        let radius = sanitize((count as f32).sqrt() * radius_scale);

        for ordinal in 0..share as usize {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(0.0..=radius);
            let (jx, jy) = sample_jitter(&mut rng, half_jitter);

            let x = cx + angle.cos() * distance + jx;
            let y = cy + angle.sin() * distance + jy;
            points.push(PointEntity::new(x, y, i, ordinal));
        }

        labels.push(LabelPosition {
            x: cx,
            y: cy - label_offset,
            text: group.name.clone(),
            count,
        });
    }

    log::debug!(
        "Cluster layout: {} groups, {} dots (cap {})",
        groups.len(),
        points.len(),
        cap
    );

    Layout {
        points,
        labels,
        centroids,
    }
}

/// Independent uniform offsets on both axes in `[-half, half]`, pulled in to
/// length `half` when the corner of the square overshoots it.
fn sample_jitter(rng: &mut StdRng, half: f32) -> (f32, f32) {
    if half == 0.0 {
        return (0.0, 0.0);
    }
    let jx = rng.gen_range(-half..=half);
    let jy = rng.gen_range(-half..=half);
    let len = (jx * jx + jy * jy).sqrt();
    if len > half {
        let k = half / len;
        (jx * k, jy * k)
    } else {
        (jx, jy)
    }
}
