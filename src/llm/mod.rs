//! Hosted text generation: skill-gap extraction and bullet rewriting

pub mod client;
pub mod prompts;
pub mod analyzer;

pub use analyzer::{SkillGapAnalyzer, SkillGaps};
pub use client::{GroqClient, TextGenerator};
