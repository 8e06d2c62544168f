use crate::navigate::lane::{Lane, LaneBounds};
use crate::navigate::obstacle::ObstacleClassSet;
use crate::navigate::DEFAULT_MIN_HORIZONTAL_INTERSECTION;
use bitvec::prelude::*;
use log::trace;
use safestep_inference::Detection;
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type LaneBits = BitArr!(for 3, in u8, Lsb0);

/// Which lanes are blocked in a single frame. Lanes are independent of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct OccupancyVector {
    pub left_blocked: bool,
    pub center_blocked: bool,
    pub right_blocked: bool,
}

impl OccupancyVector {
    pub const CLEAR: OccupancyVector = OccupancyVector {
        left_blocked: false,
        center_blocked: false,
        right_blocked: false,
    };

    pub fn new(left_blocked: bool, center_blocked: bool, right_blocked: bool) -> Self {
        Self {
            left_blocked,
            center_blocked,
            right_blocked,
        }
    }

    /// Lane bits indexed by [`Lane::index`].
    pub fn from_bits(bits: &LaneBits) -> Self {
        Self::new(
            bits[Lane::Left.index()],
            bits[Lane::Center.index()],
            bits[Lane::Right.index()],
        )
    }

    pub fn is_blocked(&self, lane: Lane) -> bool {
        match lane {
            Lane::Left => self.left_blocked,
            Lane::Center => self.center_blocked,
            Lane::Right => self.right_blocked,
        }
    }

    pub fn blocked_lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        Lane::ALL
            .into_iter()
            .filter(move |lane| self.is_blocked(*lane))
    }
}

impl Display for OccupancyVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mark = |blocked: bool| if blocked { 'X' } else { '_' };
        write!(
            f,
            "[{}{}{}]",
            mark(self.left_blocked),
            mark(self.center_blocked),
            mark(self.right_blocked)
        )
    }
}

/// Share of the detection's own width that falls inside `lane`.
///
/// Normalised by the box width, not the lane width, so a narrow box fully
/// inside a lane scores 1.0. Zero-width and inverted boxes score 0.0.
pub fn intersection_fraction(detection: &Detection, lane: LaneBounds) -> f64 {
    let x1 = detection.x1 as i64;
    let x2 = detection.x2 as i64;
    let overlap = (x2.min(lane.x2) - x1.max(lane.x1)).max(0);
    overlap as f64 / detection.box_width() as f64
}

/// Marks each lane blocked when any obstacle-class detection has at least
/// `min_horizontal_intersection` of its width inside it.
///
/// Vertical position is ignored: every lane spans the full frame height.
pub fn compute_occupancy(
    frame_width: u32,
    frame_height: u32,
    detections: &[Detection],
    obstacle_classes: &ObstacleClassSet,
    min_horizontal_intersection: f64,
) -> OccupancyVector {
    let lanes = Lane::ALL.map(|lane| (lane, lane.bounds(frame_width)));
    let mut blocked = LaneBits::ZERO;

    for detection in detections {
        if !obstacle_classes.contains(&detection.class_name) {
            continue;
        }
        for (lane, bounds) in lanes {
            let fraction = intersection_fraction(detection, bounds);
            if fraction >= min_horizontal_intersection {
                trace!(
                    "{} ({}, {})-({}, {}) blocks {} lane of {}x{} frame ({:.2})",
                    detection.class_name,
                    detection.x1,
                    detection.y1,
                    detection.x2,
                    detection.y2,
                    lane,
                    frame_width,
                    frame_height,
                    fraction
                );
                blocked.set(lane.index(), true);
            }
        }
    }

    OccupancyVector::from_bits(&blocked)
}

/// [`compute_occupancy`] bound to a fixed obstacle class set and threshold.
#[derive(Debug, Clone)]
pub struct RegionOccupancyAnalyzer {
    obstacle_classes: ObstacleClassSet,
    min_horizontal_intersection: f64,
}

impl RegionOccupancyAnalyzer {
    pub fn new(obstacle_classes: ObstacleClassSet, min_horizontal_intersection: f64) -> Self {
        Self {
            obstacle_classes,
            min_horizontal_intersection,
        }
    }

    pub fn obstacle_classes(&self) -> &ObstacleClassSet {
        &self.obstacle_classes
    }

    pub fn min_horizontal_intersection(&self) -> f64 {
        self.min_horizontal_intersection
    }

    pub fn analyze(
        &self,
        frame_width: u32,
        frame_height: u32,
        detections: &[Detection],
    ) -> OccupancyVector {
        compute_occupancy(
            frame_width,
            frame_height,
            detections,
            &self.obstacle_classes,
            self.min_horizontal_intersection,
        )
    }
}

impl Default for RegionOccupancyAnalyzer {
    fn default() -> Self {
        Self::new(
            ObstacleClassSet::default(),
            DEFAULT_MIN_HORIZONTAL_INTERSECTION,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigate::lane::lane_bounds;

    fn person(x1: i32, x2: i32) -> Detection {
        Detection::new((x1, 100, x2, 400), 0.9, 0, "person")
    }

    #[test]
    fn box_inside_one_lane_scores_full_fraction() {
        let [left, center, right] = lane_bounds(960);
        let detection = person(400, 560);

        assert_eq!(intersection_fraction(&detection, center), 1.0);
        assert_eq!(intersection_fraction(&detection, left), 0.0);
        assert_eq!(intersection_fraction(&detection, right), 0.0);
    }

    #[test]
    fn straddling_box_splits_evenly() {
        let [left, center, _] = lane_bounds(960);
        let detection = person(220, 420);

        assert_eq!(intersection_fraction(&detection, left), 0.5);
        assert_eq!(intersection_fraction(&detection, center), 0.5);
    }

    #[test]
    fn degenerate_boxes_never_block() {
        let classes = ObstacleClassSet::default();
        let detections = [person(500, 500), person(600, 400)];

        let occupancy = compute_occupancy(960, 540, &detections, &classes, 0.01);
        assert_eq!(occupancy, OccupancyVector::CLEAR);
    }

    #[test]
    fn wide_box_blocks_every_lane_it_mostly_covers() {
        let classes = ObstacleClassSet::default();
        // 900px wide: 320 / 900 = 0.356 in left and center, 260 / 900 = 0.289 in right.
        let detections = [person(0, 900)];

        let occupancy = compute_occupancy(960, 540, &detections, &classes, 0.33);
        assert_eq!(occupancy, OccupancyVector::new(true, true, false));
    }

    #[test]
    fn threshold_is_inclusive() {
        let classes = ObstacleClassSet::default();
        let detections = [person(220, 420)];

        let occupancy = compute_occupancy(960, 540, &detections, &classes, 0.5);
        assert_eq!(occupancy, OccupancyVector::new(true, true, false));
    }

    #[test]
    fn reads_lanes_from_bits() {
        let mut bits = LaneBits::ZERO;
        bits.set(Lane::Left.index(), true);
        bits.set(Lane::Right.index(), true);

        let occupancy = OccupancyVector::from_bits(&bits);
        assert_eq!(occupancy, OccupancyVector::new(true, false, true));
        assert_eq!(
            occupancy.blocked_lanes().collect::<Vec<_>>(),
            [Lane::Left, Lane::Right]
        );
        assert_eq!(occupancy.to_string(), "[X_X]");
    }
}
