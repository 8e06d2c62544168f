pub mod detection;
pub mod source;

pub use detection::{ConfidenceFilter, Detection, DetectionFrame};
pub use source::{DetectionSource, JsonLinesSource};
