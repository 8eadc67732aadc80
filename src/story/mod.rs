//! Story data: the ordered narrative sections and the groups each one charts.
//!
//! A story is a load-time constant. The built-in table lives in [`loan`];
//! other tables can be read from JSON with the same field names.

pub mod loan;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, StoryError};

/// A labeled sub-population rendered as one cluster of dots.
///
/// `count` is the number of dots to render for the group. In the packed
/// layout it is also the number of leading dots drawn as "approved".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub count: i32,
    /// Optional color hint for the render sink
    #[serde(default, rename = "color", skip_serializing_if = "Option::is_none")]
    pub color_token: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, count: i32) -> Self {
        Self {
            name: name.into(),
            count,
            color_token: None,
        }
    }

    pub fn with_color(mut self, token: impl Into<String>) -> Self {
        self.color_token = Some(token.into());
        self
    }

    /// Count clamped to `[0, cap]`.
    #[inline]
    pub fn clamped_count(&self, cap: u32) -> u32 {
        self.count.clamp(0, cap.min(i32::MAX as u32) as i32) as u32
    }

    /// The count if it already lies in `[0, cap]`.
    pub fn check_count(&self, cap: u32) -> Result<u32, LayoutError> {
        let clamped = self.clamped_count(cap);
        if clamped as i64 == self.count as i64 {
            Ok(clamped)
        } else {
            Err(LayoutError::InvalidGroupData {
                name: self.name.clone(),
                count: self.count,
                cap,
            })
        }
    }
}

/// One full-viewport-height scroll page of the story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub title: String,
    pub groups: Vec<Group>,
}

impl NarrativeSection {
    pub fn new(title: impl Into<String>, groups: Vec<Group>) -> Self {
        Self {
            title: title.into(),
            groups,
        }
    }
}

/// The ordered list of sections driving the tracker and the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub sections: Vec<NarrativeSection>,
    /// Leading sections that show no chart (title pages)
    #[serde(default)]
    pub lead_in: usize,
    /// Trailing sections that show no chart (closing copy)
    #[serde(default)]
    pub trailing: usize,
}

impl Story {
    pub fn new(sections: Vec<NarrativeSection>) -> Self {
        Self {
            sections,
            lead_in: 0,
            trailing: 0,
        }
    }

    /// Mark `lead_in` leading and `trailing` trailing sections as chart-free.
    pub fn with_chart_window(mut self, lead_in: usize, trailing: usize) -> Self {
        self.lead_in = lead_in;
        self.trailing = trailing;
        self
    }

    /// Parse a story from JSON text.
    pub fn from_json(text: &str) -> Result<Self, StoryError> {
        let story: Story = serde_json::from_str(text)?;
        if story.sections.is_empty() {
            return Err(StoryError::Empty);
        }
        Ok(story)
    }

    /// Read and parse a story file.
    pub fn load(path: &Path) -> Result<Self, StoryError> {
        let text = std::fs::read_to_string(path)?;
        let story = Self::from_json(&text)?;
        log::info!(
            "Loaded story from {} ({} sections)",
            path.display(),
            story.sections.len()
        );
        Ok(story)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, index: usize) -> Option<&NarrativeSection> {
        self.sections.get(index)
    }

    /// Whether the dot chart is shown while `index` is the current section.
    pub fn chart_visible(&self, index: usize) -> bool {
        index >= self.lead_in && index + self.trailing < self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_count() {
        assert_eq!(Group::new("a", -5).clamped_count(100), 0);
        assert_eq!(Group::new("a", 42).clamped_count(100), 42);
        assert_eq!(Group::new("a", 250).clamped_count(100), 100);
        assert_eq!(Group::new("a", 7).clamped_count(0), 0);
    }

    #[test]
    fn test_check_count() {
        assert_eq!(Group::new("a", 42).check_count(100), Ok(42));
        assert_eq!(Group::new("a", 0).check_count(100), Ok(0));
        assert_eq!(
            Group::new("a", -1).check_count(100),
            Err(LayoutError::InvalidGroupData {
                name: "a".into(),
                count: -1,
                cap: 100
            })
        );
        assert!(Group::new("a", 101).check_count(100).is_err());
    }

    #[test]
    fn test_from_json() {
        let text = r#"{
            "sections": [
                { "title": "Age", "groups": [
                    { "name": "15-29", "count": 32 },
                    { "name": "30-44", "count": 87, "color": "green" }
                ] }
            ],
            "lead_in": 0
        }"#;
        let story = Story::from_json(text).unwrap();
        assert_eq!(story.len(), 1);
        assert_eq!(story.sections[0].groups[1].color_token.as_deref(), Some("green"));
        assert_eq!(story.trailing, 0);
    }

    #[test]
    fn test_from_json_rejects_empty() {
        let err = Story::from_json(r#"{ "sections": [] }"#).unwrap_err();
        assert!(matches!(err, StoryError::Empty));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Story::from_json("[1, 2"),
            Err(StoryError::Parse(_))
        ));
    }

    #[test]
    fn test_chart_window() {
        let sections = (0..6)
            .map(|i| NarrativeSection::new(format!("s{i}"), vec![]))
            .collect();
        let story = Story::new(sections).with_chart_window(1, 2);
        let visible: Vec<bool> = (0..6).map(|i| story.chart_visible(i)).collect();
        assert_eq!(visible, vec![false, true, true, true, false, false]);
        assert!(!story.chart_visible(99));
    }
}
