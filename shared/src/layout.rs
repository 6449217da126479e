//! Seat layout geometry
//!
//! Pure functions deriving how many seat slots fit around a rectangular
//! table and how they are spread over its sides and corners.
//!
//! Slot indices are assigned by walking [`SeatZone::ALL`] clockwise,
//! starting at the transition into the top side. The walk order is part of
//! the persisted format: a chair's slot is stored remotely as the label
//! `chair-position-{index}`, so reordering the zones would move every seated
//! guest.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Minimum footprint of one seat along a table edge, in plan units
pub const CHAIR_SPACING: f64 = 45.0;

/// Default top-left corner of a bulk-placed grid
pub const GRID_ORIGIN: Point = Point { x: 50.0, y: 50.0 };

/// Default gap between bulk-placed tables
pub const GRID_SPACING: f64 = 20.0;

/// A point on the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One of the twelve zones a seat slot can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeatZone {
    TopLeftToTop,
    Top,
    TopToTopRight,
    TopRightToRight,
    Right,
    RightToBottomRight,
    BottomRightToBottom,
    Bottom,
    BottomToBottomLeft,
    BottomLeftToLeft,
    Left,
    LeftToTopLeft,
}

impl SeatZone {
    /// All zones in slot-walk order
    pub const ALL: [SeatZone; 12] = [
        SeatZone::TopLeftToTop,
        SeatZone::Top,
        SeatZone::TopToTopRight,
        SeatZone::TopRightToRight,
        SeatZone::Right,
        SeatZone::RightToBottomRight,
        SeatZone::BottomRightToBottom,
        SeatZone::Bottom,
        SeatZone::BottomToBottomLeft,
        SeatZone::BottomLeftToLeft,
        SeatZone::Left,
        SeatZone::LeftToTopLeft,
    ];

    /// Whether this is a corner transition rather than a side
    pub fn is_diagonal(&self) -> bool {
        !matches!(
            self,
            SeatZone::Top | SeatZone::Right | SeatZone::Bottom | SeatZone::Left
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatZone::TopLeftToTop => "topLeftToTop",
            SeatZone::Top => "top",
            SeatZone::TopToTopRight => "topToTopRight",
            SeatZone::TopRightToRight => "topRightToRight",
            SeatZone::Right => "right",
            SeatZone::RightToBottomRight => "rightToBottomRight",
            SeatZone::BottomRightToBottom => "bottomRightToBottom",
            SeatZone::Bottom => "bottom",
            SeatZone::BottomToBottomLeft => "bottomToBottomLeft",
            SeatZone::BottomLeftToLeft => "bottomLeftToLeft",
            SeatZone::Left => "left",
            SeatZone::LeftToTopLeft => "leftToTopLeft",
        }
    }
}

impl std::fmt::Display for SeatZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of seat slots per zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatDistribution {
    pub top_left_to_top: u32,
    pub top: u32,
    pub top_to_top_right: u32,
    pub top_right_to_right: u32,
    pub right: u32,
    pub right_to_bottom_right: u32,
    pub bottom_right_to_bottom: u32,
    pub bottom: u32,
    pub bottom_to_bottom_left: u32,
    pub bottom_left_to_left: u32,
    pub left: u32,
    pub left_to_top_left: u32,
}

/// A single slot produced by the clockwise walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSlot {
    /// Table-wide slot index
    pub index: u32,
    pub zone: SeatZone,
    /// Index within the zone
    pub offset: u32,
}

impl SeatDistribution {
    /// Slots in the given zone
    pub fn count(&self, zone: SeatZone) -> u32 {
        match zone {
            SeatZone::TopLeftToTop => self.top_left_to_top,
            SeatZone::Top => self.top,
            SeatZone::TopToTopRight => self.top_to_top_right,
            SeatZone::TopRightToRight => self.top_right_to_right,
            SeatZone::Right => self.right,
            SeatZone::RightToBottomRight => self.right_to_bottom_right,
            SeatZone::BottomRightToBottom => self.bottom_right_to_bottom,
            SeatZone::Bottom => self.bottom,
            SeatZone::BottomToBottomLeft => self.bottom_to_bottom_left,
            SeatZone::BottomLeftToLeft => self.bottom_left_to_left,
            SeatZone::Left => self.left,
            SeatZone::LeftToTopLeft => self.left_to_top_left,
        }
    }

    /// Total slot count over all zones
    pub fn total(&self) -> u32 {
        SeatZone::ALL.iter().map(|z| self.count(*z)).sum()
    }

    /// Walk every slot clockwise, assigning table-wide indices
    pub fn slots(&self) -> impl Iterator<Item = SeatSlot> + '_ {
        let mut next = 0;
        SeatZone::ALL.into_iter().flat_map(move |zone| {
            let start = next;
            let count = self.count(zone);
            next += count;
            (0..count).map(move |offset| SeatSlot {
                index: start + offset,
                zone,
                offset,
            })
        })
    }

    /// Range of table-wide indices owned by a zone
    pub fn indices(&self, zone: SeatZone) -> Range<u32> {
        let start: u32 = SeatZone::ALL
            .iter()
            .take_while(|z| **z != zone)
            .map(|z| self.count(*z))
            .sum();
        start..start + self.count(zone)
    }

    /// Zone holding a table-wide slot index
    pub fn zone_of(&self, index: u32) -> Option<SeatZone> {
        SeatZone::ALL
            .into_iter()
            .find(|zone| self.indices(*zone).contains(&index))
    }
}

/// Slots that fit along one edge; never below one
fn slots_along(length: f64) -> u32 {
    let n = (length / CHAIR_SPACING).floor();
    // NaN fails the comparison and falls through to the floor of one
    if n >= 1.0 {
        n.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Distribute seat slots over the twelve zones of a `width` x `height` table
///
/// Corner transitions only exist when both the horizontal and the vertical
/// edges hold more than one seat.
pub fn distribute_chair_positions(width: f64, height: f64) -> SeatDistribution {
    let horizontal = slots_along(width);
    let vertical = slots_along(height);
    let diagonal = u32::from(horizontal > 1 && vertical > 1);

    SeatDistribution {
        top_left_to_top: diagonal,
        top: horizontal,
        top_to_top_right: diagonal,
        top_right_to_right: diagonal,
        right: vertical,
        right_to_bottom_right: diagonal,
        bottom_right_to_bottom: diagonal,
        bottom: horizontal,
        bottom_to_bottom_left: diagonal,
        bottom_left_to_left: diagonal,
        left: vertical,
        left_to_top_left: diagonal,
    }
}

/// Maximum number of seat slots around a `width` x `height` table
pub fn calculate_max_chair_positions(width: f64, height: f64) -> u32 {
    distribute_chair_positions(width, height).total()
}

/// Grid positions for `count` tables of equal size, starting at [`GRID_ORIGIN`]
pub fn calculate_table_positions(count: usize, width: f64, height: f64) -> Vec<Point> {
    calculate_table_positions_from(count, width, height, GRID_ORIGIN, GRID_SPACING)
}

/// Grid positions for `count` tables laid out in a near-square grid
pub fn calculate_table_positions_from(
    count: usize,
    width: f64,
    height: f64,
    origin: Point,
    spacing: f64,
) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }

    let cols = (count as f64).sqrt().ceil() as usize;

    (0..count)
        .map(|i| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            Point {
                x: origin.x + col * (width + spacing),
                y: origin.y + row * (height + spacing),
            }
        })
        .collect()
}
