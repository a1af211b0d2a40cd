//! Sheet regions in raster pixel space

use egui::{Pos2, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rectangle,
    Polygon,
}

/// Clickable outline of one sheet on the index raster.
///
/// A rectangle is stored as its two opposite corners (in whatever order the
/// catalog gave them); a polygon as its ordered vertex ring, not closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: Shape,
    points: Vec<Pos2>,
}

impl Region {
    pub fn rectangle(a: Pos2, b: Pos2) -> Self {
        Self {
            shape: Shape::Rectangle,
            points: vec![a, b],
        }
    }

    pub fn polygon(points: Vec<Pos2>) -> Self {
        Self {
            shape: Shape::Polygon,
            points,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Point used to recenter the viewport on this sheet.
    ///
    /// Rectangles use the midpoint of their corners. Polygons use the plain
    /// mean of their vertices, not the area-weighted centroid, so a very
    /// irregular outline can put this point outside the shape.
    pub fn centroid(&self) -> Option<Pos2> {
        if self.points.is_empty() {
            return None;
        }
        match self.shape {
            Shape::Rectangle => {
                let a = self.points[0];
                let b = *self.points.last()?;
                Some(Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
            }
            Shape::Polygon => {
                let n = self.points.len() as f32;
                let (sx, sy) = self
                    .points
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
                Some(Pos2::new(sx / n, sy / n))
            }
        }
    }

    pub fn contains(&self, p: Pos2) -> bool {
        match self.shape {
            Shape::Rectangle => self.bounds().contains(p),
            Shape::Polygon => polygon_contains(&self.points, p),
        }
    }

    /// True when a fan fill from the first vertex covers exactly the shape.
    /// Rectangles always are; polygons need every turn in the same direction.
    pub fn is_convex(&self) -> bool {
        match self.shape {
            Shape::Rectangle => true,
            Shape::Polygon => ring_is_convex(&self.points),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self.shape {
            Shape::Rectangle if self.points.len() == 2 => {
                Rect::from_two_pos(self.points[0], self.points[1])
            }
            _ => Rect::from_points(&self.points),
        }
    }
}

fn ring_is_convex(points: &[Pos2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0_f32;
    for i in 0..n {
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let cross = (b - a).x * (c - b).y - (b - a).y * (c - b).x;
        if cross == 0.0 {
            continue;
        }
        if sign != 0.0 && cross.signum() != sign {
            return false;
        }
        sign = cross.signum();
    }
    sign != 0.0
}

/// Even-odd rule: count crossings of a horizontal ray cast to +x.
fn polygon_contains(points: &[Pos2], p: Pos2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
