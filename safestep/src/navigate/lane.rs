use crate::navigate::LANE_COUNT;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One of the three vertical strips the frame is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Left,
    Center,
    Right,
}

/// Half-open horizontal pixel range `[x1, x2)`; lanes span the full frame height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneBounds {
    pub x1: i64,
    pub x2: i64,
}

impl LaneBounds {
    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }
}

impl Display for Lane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Lane::Left => write!(f, "left"),
            Lane::Center => write!(f, "center"),
            Lane::Right => write!(f, "right"),
        }
    }
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Pixel range of this lane in a frame `frame_width` pixels wide.
    ///
    /// Lanes are `frame_width / 3` wide; the right lane ends at `frame_width`
    /// and so absorbs the division remainder.
    pub fn bounds(self, frame_width: u32) -> LaneBounds {
        let region_width = (frame_width / LANE_COUNT as u32) as i64;
        match self {
            Lane::Left => LaneBounds {
                x1: 0,
                x2: region_width,
            },
            Lane::Center => LaneBounds {
                x1: region_width,
                x2: region_width * 2,
            },
            Lane::Right => LaneBounds {
                x1: region_width * 2,
                x2: frame_width as i64,
            },
        }
    }
}

/// Bounds of all three lanes, left to right.
pub fn lane_bounds(frame_width: u32) -> [LaneBounds; LANE_COUNT] {
    Lane::ALL.map(|lane| lane.bounds(frame_width))
}
