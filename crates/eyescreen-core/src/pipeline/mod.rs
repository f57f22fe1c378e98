//! The screening pipeline.
//!
//! Normalizer, detection stage, condition stage and the orchestrator that
//! gates one on the other.

mod condition;
mod detection;
mod normalize;
mod orchestrator;

pub use condition::{classify_condition, decide_condition, CONFIDENCE_THRESHOLD, MARGIN_THRESHOLD};
pub use detection::{decide_detection, detect};
pub use normalize::normalize;
pub use orchestrator::{should_analyze_condition, Orchestrator};
