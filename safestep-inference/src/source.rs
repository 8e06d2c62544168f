use crate::detection::{ConfidenceFilter, Detection, DetectionFrame};
use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::io::BufRead;

pub const DEFAULT_FRAME_WIDTH: u32 = 960;
pub const DEFAULT_FRAME_HEIGHT: u32 = 540;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.35;

/// Produces detector output one frame at a time.
///
/// `Ok(None)` marks the end of the stream.
pub trait DetectionSource {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>>;
}

/// `detections` is required and unknown keys are rejected, so a misspelled
/// field cannot pass as an empty frame.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameRecord {
    width: Option<u32>,
    height: Option<u32>,
    detections: Vec<Detection>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameLine {
    Frame(FrameRecord),
    Detections(Vec<Detection>),
}

/// Reads newline-delimited JSON frames written by an external detector process.
///
/// A line is either `{"width":..,"height":..,"detections":[..]}` or a bare
/// detection list. Missing frame dimensions fall back to the capture size.
pub struct JsonLinesSource<R> {
    reader: R,
    line_number: usize,
    buffer: String,
    default_size: (u32, u32),
    confidence_threshold: f64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
            default_size: (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_size = (width, height);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    fn parse_line(&self, line: &str) -> Result<DetectionFrame> {
        let parsed: FrameLine = serde_json::from_str(line)
            .with_context(|| format!("Malformed detection frame on line {}", self.line_number))?;

        let (default_width, default_height) = self.default_size;
        let frame = match parsed {
            FrameLine::Frame(FrameRecord {
                width,
                height,
                detections,
            }) => DetectionFrame::new(
                width.unwrap_or(default_width),
                height.unwrap_or(default_height),
                detections,
            ),
            FrameLine::Detections(detections) => {
                DetectionFrame::new(default_width, default_height, detections)
            }
        };

        let total = frame.detections.len();
        let detections = frame.detections.retain_confident(self.confidence_threshold);
        debug!(
            "Line {}: kept {} of {} detections at confidence >= {}",
            self.line_number,
            detections.len(),
            total,
            self.confidence_threshold
        );

        Ok(DetectionFrame {
            detections,
            ..frame
        })
    }
}

impl<R: BufRead> DetectionSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        loop {
            self.buffer.clear();
            let read = self
                .reader
                .read_line(&mut self.buffer)
                .context("Failed to read from detection source")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() {
                continue;
            }
            return self.parse_line(line).map(Some);
        }
    }
}

impl<S: DetectionSource + ?Sized> DetectionSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        (**self).next_frame()
    }
}
