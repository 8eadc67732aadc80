pub mod animator;
pub mod paint;

pub use paint::Theme;
