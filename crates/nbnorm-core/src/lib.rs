//! Nbnorm Core Library
//!
//! Core functionality for converting three-plane narrowband exposures
//! (Hα / OIII / SII) into perceptually balanced color composites.

pub mod color;
pub mod config;
pub mod decoders;
pub mod error;
pub mod exporters;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod stats;

// Re-export commonly used types
pub use decoders::RasterCube;
pub use error::ProcessError;
pub use models::{ChannelRole, LightnessSource, OutputMode, ProcessOptions};
pub use pipeline::CompositeImage;
pub use stats::CubeStatistics;
