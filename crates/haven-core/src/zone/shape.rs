//! Zone shapes and point containment
//!
//! All shapes live on the horizontal (x, z) plane; height is ignored.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest radius accepted for circular zones
pub const MAX_RADIUS: f64 = 10_000.0;

/// A point on the horizontal plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0})", self.x, self.z)
    }
}

/// Shape discriminant as written in zone files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    Circle,
    Rect,
    Poly,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Circle => "CIRCLE",
            ShapeType::Rect => "RECT",
            ShapeType::Poly => "POLY",
        }
    }
}

/// Circle with inclusive boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Result<Self> {
        check_point(center)?;
        check_radius(radius)?;
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_center(&mut self, center: Point) -> Result<()> {
        check_point(center)?;
        self.center = center;
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        let dx = x - self.center.x;
        let dz = z - self.center.z;
        dx * dx + dz * dz <= self.radius * self.radius
    }
}

/// Axis-aligned rectangle, inclusive on both axes
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    min: Point,
    max: Point,
}

impl Rect {
    /// Build from two opposite corners in any order
    pub fn from_corners(a: Point, b: Point) -> Result<Self> {
        check_point(a)?;
        check_point(b)?;
        Ok(Self {
            min: Point::new(a.x.min(b.x), a.z.min(b.z)),
            max: Point::new(a.x.max(b.x), a.z.max(b.z)),
        })
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn set_corners(&mut self, a: Point, b: Point) -> Result<()> {
        *self = Self::from_corners(a, b)?;
        Ok(())
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    fn midpoint(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.z + self.max.z) / 2.0)
    }
}

/// Simple polygon treated as a closed ring
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
    centroid: Point,
}

impl Polygon {
    /// Minimum number of vertices
    pub const MIN_POINTS: usize = 3;

    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < Self::MIN_POINTS {
            return Err(Error::InvalidShape(format!(
                "polygon needs at least {} points, got {}",
                Self::MIN_POINTS,
                points.len()
            )));
        }
        for p in &points {
            check_point(*p)?;
        }
        let centroid = mean(&points);
        Ok(Self { points, centroid })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn set_points(&mut self, points: Vec<Point>) -> Result<()> {
        *self = Self::new(points)?;
        Ok(())
    }

    /// Append a vertex at the end of the ring
    pub fn push_point(&mut self, point: Point) -> Result<()> {
        check_point(point)?;
        self.points.push(point);
        self.centroid = mean(&self.points);
        Ok(())
    }

    /// Even-odd ray casting. Horizontal edges never toggle.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let n = self.points.len();
        if n < Self::MIN_POINTS {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if pi.z != pj.z && ((pi.z > z) != (pj.z > z)) {
                let x_cross = (pj.x - pi.x) * (z - pi.z) / (pj.z - pi.z) + pi.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// A zone's footprint
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    pub fn circle(center: Point, radius: f64) -> Result<Self> {
        Ok(Shape::Circle(Circle::new(center, radius)?))
    }

    pub fn rect(a: Point, b: Point) -> Result<Self> {
        Ok(Shape::Rect(Rect::from_corners(a, b)?))
    }

    pub fn polygon(points: Vec<Point>) -> Result<Self> {
        Ok(Shape::Polygon(Polygon::new(points)?))
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Rect(_) => ShapeType::Rect,
            Shape::Polygon(_) => ShapeType::Poly,
        }
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        match self {
            Shape::Circle(c) => c.contains(x, z),
            Shape::Rect(r) => r.contains(x, z),
            Shape::Polygon(p) => p.contains(x, z),
        }
    }

    /// Representative point used for display and default placement
    pub fn centroid(&self) -> Point {
        match self {
            Shape::Circle(c) => c.center(),
            Shape::Rect(r) => r.midpoint(),
            Shape::Polygon(p) => p.centroid(),
        }
    }

    /// Compact description for listings
    pub fn describe(&self) -> String {
        match self {
            Shape::Circle(c) => format!("circle r={:.0} @ {}", c.radius(), c.center()),
            Shape::Rect(r) => format!("rect {}..{}", r.min(), r.max()),
            Shape::Polygon(p) => format!("polygon {} points @ {}", p.points().len(), p.centroid()),
        }
    }
}

fn mean(points: &[Point]) -> Point {
    let n = points.len().max(1) as f64;
    let (sx, sz) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sz), p| (sx + p.x, sz + p.z));
    Point::new(sx / n, sz / n)
}

fn check_point(p: Point) -> Result<()> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidShape(format!("non-finite coordinate {:?}", p)))
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius > 0.0 && radius <= MAX_RADIUS {
        Ok(())
    } else {
        Err(Error::InvalidShape(format!(
            "radius must be in (0, {MAX_RADIUS}], got {radius}"
        )))
    }
}
