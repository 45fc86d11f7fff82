//! Output rendering.

pub mod generator;

pub use generator::{render_analysis_markdown, render_history_markdown, render_json};
