pub mod instruction;
pub mod lane;
pub mod obstacle;
pub mod occupancy;

use crate::navigate::instruction::Instruction;
use crate::navigate::obstacle::ObstacleClassSet;
use crate::navigate::occupancy::{OccupancyVector, RegionOccupancyAnalyzer};
use log::debug;
use safestep_inference::DetectionFrame;
use serde::Serialize;

pub(crate) const LANE_COUNT: usize = 3;
/// Minimum share of a detection's own width that must fall inside a lane to block it.
pub const DEFAULT_MIN_HORIZONTAL_INTERSECTION: f64 = 0.33;

/// Occupancy and the resulting instruction for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub occupancy: OccupancyVector,
    pub instruction: Instruction,
}

/// Runs the occupancy analyzer and the instruction policy over a frame.
#[derive(Debug, Clone)]
pub struct Navigator {
    analyzer: RegionOccupancyAnalyzer,
}

impl Navigator {
    pub fn new(obstacle_classes: ObstacleClassSet, min_horizontal_intersection: f64) -> Self {
        Self {
            analyzer: RegionOccupancyAnalyzer::new(obstacle_classes, min_horizontal_intersection),
        }
    }

    pub fn analyzer(&self) -> &RegionOccupancyAnalyzer {
        &self.analyzer
    }

    pub fn navigate(&self, frame: &DetectionFrame) -> Navigation {
        let occupancy = self
            .analyzer
            .analyze(frame.width, frame.height, &frame.detections);
        let instruction = Instruction::decide(occupancy);
        let blocked: Vec<_> = occupancy.blocked_lanes().map(|lane| lane.to_string()).collect();
        debug!(
            "{}x{} frame, {} detections: occupancy {} (blocked: {}) -> {}",
            frame.width,
            frame.height,
            frame.detections.len(),
            occupancy,
            if blocked.is_empty() { "none".to_string() } else { blocked.join(", ") },
            instruction
        );

        Navigation {
            occupancy,
            instruction,
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(
            ObstacleClassSet::default(),
            DEFAULT_MIN_HORIZONTAL_INTERSECTION,
        )
    }
}
