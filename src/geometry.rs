use std::f64::consts::PI;

use crate::defaults::{self, LEVEL_COUNT};
use crate::model::{LadderState, Offset};

/// Scale of the decorative outer boundary that anchors the top labels.
pub const ENCOMPASS_SCALE: f64 = 1.2;
/// Level labels sit at `(level + 1) / max * LEVEL_LABEL_PULL + LEVEL_LABEL_NUDGE`.
pub const LEVEL_LABEL_PULL: f64 = 0.9;
pub const LEVEL_LABEL_NUDGE: f64 = 0.07;
/// Chart radius relative to the surface edge length.
pub const RADIUS_FRACTION: f64 = 0.4;

/// A position in surface space (origin top-left, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Displacement from `origin` to `self`.
    pub fn delta_from(self, origin: Point) -> Offset {
        Offset::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn offset_by(self, offset: Offset) -> Point {
        Point::new(self.x + offset.x, self.y + offset.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub axis_count: usize,
    pub levels: usize,
    pub center: Point,
    pub radius: f64,
}

impl ChartGeometry {
    pub fn new(axis_count: usize, levels: usize, center: Point, radius: f64) -> Self {
        Self {
            axis_count,
            levels,
            center,
            radius,
        }
    }

    /// Geometry for a square surface of edge `size`.
    pub fn for_size(axis_count: usize, levels: usize, size: f64) -> Self {
        Self::new(
            axis_count,
            levels,
            Point::new(size / 2.0, size / 2.0),
            size * RADIUS_FRACTION,
        )
    }

    /// Geometry matching the axis count of `state` with the standard level count.
    pub fn for_state(state: &LadderState, size: f64) -> Self {
        Self::for_size(state.axis_count(), LEVEL_COUNT, size)
    }

    fn max(&self) -> f64 {
        self.levels as f64
    }

    /// Axis 0 points up; the rest follow clockwise at equal spacing.
    pub fn angle(&self, axis: usize) -> f64 {
        (2.0 * PI * axis as f64) / self.axis_count as f64 - PI / 2.0
    }

    pub fn axis_point(&self, axis: usize, scale: f64) -> Point {
        let angle = self.angle(axis);
        let r = self.radius * scale;
        Point::new(
            self.center.x + r * angle.cos(),
            self.center.y + r * angle.sin(),
        )
    }

    fn ring(&self, scale: f64) -> Vec<Point> {
        (0..self.axis_count)
            .map(|i| self.axis_point(i, scale))
            .collect()
    }

    /// Guide polygon for `level` (0 is innermost).
    pub fn level_polygon_points(&self, level: usize) -> Vec<Point> {
        self.ring((level + 1) as f64 / self.max())
    }

    /// The dashed outline at full radius.
    pub fn outline_points(&self) -> Vec<Point> {
        self.ring(1.0)
    }

    pub fn encompassing_polygon_points(&self) -> Vec<Point> {
        self.ring(ENCOMPASS_SCALE)
    }

    /// Spokes from the center to each encompassing tip.
    pub fn radial_lines(&self) -> Vec<(Point, Point)> {
        self.encompassing_polygon_points()
            .into_iter()
            .map(|tip| (self.center, tip))
            .collect()
    }

    /// Vertices of the user polygon; `values` shorter than the axis count read as the floor.
    pub fn value_polygon_points(&self, values: &[f64]) -> Vec<Point> {
        (0..self.axis_count)
            .map(|i| {
                let value = values.get(i).copied().unwrap_or(defaults::MIN_VALUE);
                self.axis_point(i, value / self.max())
            })
            .collect()
    }

    pub fn level_label_scale(&self, level: usize) -> f64 {
        (level + 1) as f64 / self.max() * LEVEL_LABEL_PULL + LEVEL_LABEL_NUDGE
    }

    pub fn level_label_anchor(&self, axis: usize, level: usize, offset: Offset) -> Point {
        self.axis_point(axis, self.level_label_scale(level))
            .offset_by(offset)
    }

    pub fn top_label_anchor(&self, axis: usize, offset: Offset) -> Point {
        self.axis_point(axis, ENCOMPASS_SCALE).offset_by(offset)
    }

    /// Value a handle dragged to `pointer` represents, before clamping.
    pub fn raw_value_at(&self, pointer: Point) -> f64 {
        pointer.distance(self.center) / self.radius * self.max()
    }
}
