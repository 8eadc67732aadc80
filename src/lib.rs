pub mod config;
pub mod director;
pub mod error;
pub mod fast_math;
pub mod layout;
pub mod particles;
pub mod render;
pub mod scroll;
pub mod story;
pub mod transition;

pub use config::StoryConfig;
pub use director::{Frame, StoryDirector};
pub use story::{Group, NarrativeSection, Story};
