//! Shared utilities for nbnorm-cli
//!
//! Flag parsing and option resolution kept out of `main.rs` so they stay
//! unit-testable.

pub mod parsers;

// Re-export commonly used items at the crate root for convenience
pub use parsers::{parse_lightness, parse_output_mode, parse_switch, resolve_options};
