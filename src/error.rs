//! Error types.
//!
//! The layout engine itself never fails: bad group data is clamped and a
//! packing shortfall is returned as a best-effort result. The variants below
//! exist so that those soft failures can be inspected and logged, and so
//! the viewer's file loaders have something to return.

use thiserror::Error;

/// Soft failures inside the layout engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A group count outside `[0, cap]`. Clamped before layout, never raised.
    #[error("invalid group data for `{name}`: count {count} outside [0, {cap}]")]
    InvalidGroupData { name: String, count: i32, cap: u32 },

    /// Rejection sampling ran out of attempts before placing every dot.
    #[error("packing budget exhausted: placed {placed} of {requested} dots in {attempts} attempts")]
    PackingBudgetExhausted {
        placed: usize,
        requested: usize,
        attempts: u32,
    },
}

/// Errors from loading a story table.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("story parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A story needs at least one section for the tracker to map onto.
    #[error("story has no sections")]
    Empty,
}

/// Errors from loading or validating a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
