//! CLI library for testing purposes

pub mod check;

pub use check::{CheckOptions, render_json, render_text, run_check};
pub use reslint::{Engine, LintConfig, Report};
