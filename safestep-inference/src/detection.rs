use serde::{Deserialize, Serialize};

/// A single detector output in frame pixel coordinates.
///
/// Boxes are corner-based (`x1 < x2`, `y1 < y2` for well-formed output). Inverted
/// or zero-width boxes are tolerated downstream and never cause a division by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRecord")]
pub struct Detection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub confidence: f64,
    pub class_id: u32,
    pub class_name: String,
}

impl Detection {
    pub fn new(
        (x1, y1, x2, y2): (i32, i32, i32, i32),
        confidence: f64,
        class_id: u32,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
            class_name: class_name.into(),
        }
    }

    /// Horizontal extent of the box, floored at one pixel.
    pub fn box_width(&self) -> i64 {
        (self.x2 as i64 - self.x1 as i64).max(1)
    }
}

/// Detectors emit either named records or the positional
/// `(x1, y1, x2, y2, confidence, class_id, class_name)` tuple.
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionRecord {
    Tuple(i32, i32, i32, i32, f64, u32, String),
    Named {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        confidence: f64,
        class_id: u32,
        class_name: String,
    },
}

impl From<DetectionRecord> for Detection {
    fn from(record: DetectionRecord) -> Self {
        match record {
            DetectionRecord::Tuple(x1, y1, x2, y2, confidence, class_id, class_name)
            | DetectionRecord::Named {
                x1,
                y1,
                x2,
                y2,
                confidence,
                class_id,
                class_name,
            } => Detection::new((x1, y1, x2, y2), confidence, class_id, class_name),
        }
    }
}

/// Everything the detector reported for one captured frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionFrame {
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
}

impl DetectionFrame {
    pub fn new(width: u32, height: u32, detections: Vec<Detection>) -> Self {
        Self {
            width,
            height,
            detections,
        }
    }

    pub fn get_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub trait ConfidenceFilter {
    /// Drops every detection scoring below `threshold`.
    fn retain_confident(self, threshold: f64) -> Vec<Detection>;
}

impl ConfidenceFilter for Vec<Detection> {
    fn retain_confident(self, threshold: f64) -> Vec<Detection> {
        self.into_iter()
            .filter(|d| d.confidence >= threshold)
            .collect()
    }
}
