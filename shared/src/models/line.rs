//! Wall line model

use crate::layout::Point;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STROKE: &str = "#374151";
pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;

/// A straight wall segment on the floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    /// `[x1, y1, x2, y2]`
    pub points: [f64; 4],
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_stroke() -> String {
    DEFAULT_STROKE.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

impl Line {
    pub fn new(id: impl Into<String>, start: Point, end: Point) -> Self {
        Self {
            id: id.into(),
            points: [start.x, start.y, end.x, end.y],
            stroke: default_stroke(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.points[0], self.points[1])
    }

    pub fn end(&self) -> Point {
        Point::new(self.points[2], self.points[3])
    }

    pub fn endpoints(&self) -> [Point; 2] {
        [self.start(), self.end()]
    }

    pub fn length(&self) -> f64 {
        self.start().distance(&self.end())
    }
}
