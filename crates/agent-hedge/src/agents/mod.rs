//! Pipeline agents that fan the relays out over tickers

pub mod image_analysis;
pub mod visual_generation;

pub use image_analysis::ImageAnalysisAgent;
pub use visual_generation::VisualGenerationAgent;
