//! Geometry kernel: segment intersection, radius tests, and ray occlusion.
//!
//! All inputs are world units; callers convert cell and corner coordinates
//! through [`crate::grid::Grid`] first. The kernel has no knowledge of maps
//! or wall semantics beyond "here is a list of blocking segments".
//!
//! NUMERIC POLICY
//! ==============
//! Ties resolve in favor of visibility: a ray that exactly grazes a segment
//! endpoint is not blocked, and neither is a ray whose origin sits on an
//! endpoint. Without this, sightlines flicker at wall corners as floating
//! point noise flips the intersection test.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use uuid::Uuid;

/// Tolerance for the endpoint-grazing tie-break, in ray/segment parameter
/// space (both parameters are normalized to `[0, 1]`).
const EPS: f64 = 1e-9;

/// A point in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A segment that blocks a ray, tagged with the id of the wall it came from.
#[derive(Debug, Clone, Copy)]
pub struct BlockingSegment {
    pub wall_id: Uuid,
    pub a: Point,
    pub b: Point,
}

/// Whether `p` lies within (or on) the circle of radius `r` around `center`.
#[must_use]
pub fn point_in_circle(p: Point, center: Point, r: f64) -> bool {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    dx * dx + dy * dy <= r * r
}

/// Parametric intersection of segments `a1→a2` and `b1→b2`.
///
/// Returns `(t, u)` where the crossing point is `a1 + t*(a2-a1)` and
/// `b1 + u*(b2-b1)`, or `None` for parallel segments.
fn intersect_params(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<(f64, f64)> {
    let rx = a2.x - a1.x;
    let ry = a2.y - a1.y;
    let sx = b2.x - b1.x;
    let sy = b2.y - b1.y;

    let denom = rx * sy - ry * sx;
    if denom.abs() < 1e-12 {
        return None;
    }

    let qx = b1.x - a1.x;
    let qy = b1.y - a1.y;
    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * ry - qy * rx) / denom;
    Some((t, u))
}

/// Whether segments `a1→a2` and `b1→b2` strictly cross.
///
/// Contact at an endpoint of either segment does not count, per the corner
/// tie-break policy above.
#[must_use]
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    match intersect_params(a1, a2, b1, b2) {
        Some((t, u)) => t > EPS && t < 1.0 - EPS && u > EPS && u < 1.0 - EPS,
        None => false,
    }
}

/// Cast a ray from `origin` to `target` against blocking segments.
///
/// Returns the id of the first blocking wall (nearest crossing along the
/// ray), or `None` when the sightline is clear. Grazing a segment endpoint
/// never blocks.
#[must_use]
pub fn cast_ray<'a, I>(origin: Point, target: Point, walls: I) -> Option<Uuid>
where
    I: IntoIterator<Item = &'a BlockingSegment>,
{
    let mut nearest: Option<(f64, Uuid)> = None;
    for wall in walls {
        let Some((t, u)) = intersect_params(origin, target, wall.a, wall.b) else {
            continue;
        };
        if t <= EPS || t >= 1.0 - EPS || u <= EPS || u >= 1.0 - EPS {
            continue;
        }
        match nearest {
            Some((best, _)) if best <= t => {}
            _ => nearest = Some((t, wall.wall_id)),
        }
    }
    nearest.map(|(_, id)| id)
}
