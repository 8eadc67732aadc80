//! Viewer / engine configuration.
//!
//! Defaults reproduce the published page: 200px circles, 3px dots, 100 dots
//! per circle, 40px spacing, 60px vertical shuffle, 50ms count animation.
//! A JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::LayoutStrategy;
use crate::particles::ParticleConfig;
use crate::render::animator::AnimationConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub layout: LayoutStrategy,
    pub animation: AnimationConfig,
    pub particles: ParticleConfig,
}

impl StoryConfig {
    pub fn with_layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: StoryConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine would silently clamp to nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.layout {
            LayoutStrategy::Packed(p) => {
                positive("layout.size", p.size)?;
                non_negative("layout.dot_radius", p.dot_radius)?;
                non_negative("layout.max_vertical_shift", p.max_vertical_shift)?;
                if p.circle_radius() <= 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "layout.size {} leaves no room for dots of radius {}",
                        p.size, p.dot_radius
                    )));
                }
            }
            LayoutStrategy::Cluster(c) => {
                non_negative("layout.cluster_radius_scale", c.cluster_radius_scale)?;
                non_negative("layout.jitter_magnitude", c.jitter_magnitude)?;
                non_negative("layout.max_vertical_shift", c.max_vertical_shift)?;
                finite("layout.horizontal_spacing", c.horizontal_spacing)?;
            }
        }

        let a = &self.animation;
        for (name, v) in [
            ("animation.count_duration", a.count_duration),
            ("animation.group_delay", a.group_delay),
            ("animation.fade_out", a.fade_out),
            ("animation.fade_in", a.fade_in),
            ("animation.group_stagger", a.group_stagger),
            ("animation.dot_stagger", a.dot_stagger),
            ("animation.shake_duration", a.shake_duration),
            ("animation.pulse_duration", a.pulse_duration),
        ] {
            non_negative(name, v)?;
        }

        non_negative("particles.min_period", self.particles.min_period)?;
        if self.particles.max_period < self.particles.min_period {
            return Err(ConfigError::Invalid(
                "particles.max_period is below particles.min_period".into(),
            ));
        }
        Ok(())
    }
}

fn finite(name: &str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be finite, got {}", name, v)))
    }
}

fn non_negative(name: &str, v: f32) -> Result<(), ConfigError> {
    finite(name, v)?;
    if v < 0.0 {
        return Err(ConfigError::Invalid(format!("{} must be >= 0, got {}", name, v)));
    }
    Ok(())
}

fn positive(name: &str, v: f32) -> Result<(), ConfigError> {
    finite(name, v)?;
    if v <= 0.0 {
        return Err(ConfigError::Invalid(format!("{} must be > 0, got {}", name, v)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PackingConfig;

    #[test]
    fn test_default_is_valid() {
        assert!(StoryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = StoryConfig::from_json(
            r#"{ "layout": { "kind": "packed", "size": 300.0 }, "animation": { "fade_in": 1.0 } }"#,
        )
        .unwrap();
        match config.layout {
            LayoutStrategy::Packed(ref p) => {
                assert_eq!(p.size, 300.0);
                assert_eq!(p.dot_radius, 3.0);
            }
            _ => panic!("expected packed layout"),
        }
        assert_eq!(config.animation.fade_in, 1.0);
        assert_eq!(config.animation.fade_out, 0.25);
    }

    #[test]
    fn test_cluster_override() {
        let config = StoryConfig::from_json(
            r#"{ "layout": { "kind": "cluster", "jitter_magnitude": 2.0 } }"#,
        )
        .unwrap();
        assert!(matches!(config.layout, LayoutStrategy::Cluster(ref c) if c.jitter_magnitude == 2.0));
    }

    #[test]
    fn test_rejects_negative_duration() {
        let err = StoryConfig::from_json(r#"{ "animation": { "fade_out": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("fade_out")));
    }

    #[test]
    fn test_rejects_crowded_circle() {
        let config = StoryConfig::default().with_layout(LayoutStrategy::Packed(
            PackingConfig::default().with_size(10.0).with_dot_radius(3.0),
        ));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            StoryConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
