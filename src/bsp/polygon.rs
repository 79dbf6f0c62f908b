use smallvec::SmallVec;

use crate::foundation::core::Point;
use crate::model::quad::{DrawQuad, QuadF};
use crate::transform::matrix::Transform3d;
use crate::transform::vec3::{Point3, Vec3};

/// Points closer than this to a plane are considered on it.
pub const PLANE_EPSILON: f64 = 0.05;

/// Homogeneous `w` below which a vertex is treated as behind the eye.
const W_EPSILON: f64 = 1e-5;

pub(crate) type PolygonPoints = SmallVec<[Point3; 8]>;

/// A quad's outline in target space, prepared for BSP splitting.
///
/// Holds an index back into the pass quad list instead of a reference so polygons can outlive
/// borrows of the pass while the tree is built.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawPolygon {
    points: PolygonPoints,
    normal: Vec3,
    quad_index: usize,
    sorting_context_id: u32,
    is_split: bool,
}

/// Where a polygon lies relative to another polygon's plane.
#[derive(Debug)]
pub(crate) enum PlaneSide {
    Front,
    Back,
    Coplanar,
    Straddling {
        front: Option<DrawPolygon>,
        back: Option<DrawPolygon>,
    },
}

impl DrawPolygon {
    /// Build the target-space outline of `quad.visible_rect`.
    ///
    /// Corners that land behind the eye are clipped away in homogeneous space. Returns `None`
    /// when fewer than three vertices survive or the outline has no area.
    pub fn from_quad(quad: &DrawQuad, quad_index: usize) -> Option<Self> {
        let r = quad.visible_rect;
        let transform = &quad.shared.quad_to_target_transform;
        let corners = [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ]
        .map(|p| transform.map_homogeneous(Point3::from_2d(p)));

        let points = clip_to_positive_w(&corners);
        Self::from_points(points, quad_index, quad.sorting_context_id())
    }

    /// Build a polygon from target-space points; `None` for degenerate input.
    pub fn from_points(
        points: impl IntoIterator<Item = Point3>,
        quad_index: usize,
        sorting_context_id: u32,
    ) -> Option<Self> {
        let points: PolygonPoints = points.into_iter().collect();
        if points.len() <= 2 {
            return None;
        }
        let normal = newell_normal(&points)?;
        Some(Self {
            points,
            normal,
            quad_index,
            sorting_context_id,
            is_split: false,
        })
    }

    /// Vertices in order.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Unit normal of the polygon plane.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Index of the originating quad in its pass.
    pub fn quad_index(&self) -> usize {
        self.quad_index
    }

    /// Sorting context the polygon was created in.
    pub fn sorting_context_id(&self) -> u32 {
        self.sorting_context_id
    }

    /// `true` for fragments produced by splitting; unsplit polygons draw as their quad.
    pub fn is_split(&self) -> bool {
        self.is_split
    }

    /// Signed distance from this polygon's plane; positive on the normal side.
    pub fn signed_distance(&self, p: Point3) -> f64 {
        self.normal.dot(p - self.points[0])
    }

    /// `true` when the viewer (looking down `-z`) sits on the normal side of the plane.
    pub fn faces_viewer(&self) -> bool {
        self.normal.z > 0.0
    }

    /// Classify `other` against this polygon's plane, splitting it when it straddles.
    pub(crate) fn classify(&self, other: &DrawPolygon) -> PlaneSide {
        let distances: PolygonDistances = other
            .points
            .iter()
            .map(|&p| self.signed_distance(p))
            .collect();
        let any_front = distances.iter().any(|&d| d > PLANE_EPSILON);
        let any_back = distances.iter().any(|&d| d < -PLANE_EPSILON);

        match (any_front, any_back) {
            (false, false) => PlaneSide::Coplanar,
            (true, false) => PlaneSide::Front,
            (false, true) => PlaneSide::Back,
            (true, true) => {
                let (front, back) = other.split_by(&distances);
                PlaneSide::Straddling { front, back }
            }
        }
    }

    fn split_by(&self, distances: &[f64]) -> (Option<DrawPolygon>, Option<DrawPolygon>) {
        let n = self.points.len();
        let mut front = PolygonPoints::new();
        let mut back = PolygonPoints::new();
        for i in 0..n {
            let j = (i + 1) % n;
            let (a, b) = (self.points[i], self.points[j]);
            let (da, db) = (distances[i], distances[j]);

            if da > PLANE_EPSILON {
                front.push(a);
            } else if da < -PLANE_EPSILON {
                back.push(a);
            } else {
                front.push(a);
                back.push(a);
            }

            let crosses = (da > PLANE_EPSILON && db < -PLANE_EPSILON)
                || (da < -PLANE_EPSILON && db > PLANE_EPSILON);
            if crosses {
                let p = a.lerp(b, da / (da - db));
                front.push(p);
                back.push(p);
            }
        }
        (self.fragment(front), self.fragment(back))
    }

    fn fragment(&self, points: PolygonPoints) -> Option<DrawPolygon> {
        if points.len() <= 2 {
            return None;
        }
        Some(DrawPolygon {
            points,
            normal: self.normal,
            quad_index: self.quad_index,
            sorting_context_id: self.sorting_context_id,
            is_split: true,
        })
    }

    /// Map the outline back into quad-local space and fan it into 4-point quads.
    ///
    /// `inverse` is the inverse of the originating quad's transform. Returns `None` when a vertex
    /// cannot be mapped back.
    pub fn to_quads_2d(&self, inverse: &Transform3d) -> Option<Vec<QuadF>> {
        let local: SmallVec<[Point; 8]> = self
            .points
            .iter()
            .map(|&p| inverse.map_point(p).map(Point3::to_2d))
            .collect::<Option<_>>()?;

        let n = local.len();
        let first = local[0];
        let mut quads = Vec::with_capacity(n / 2);
        let mut offset = 1;
        while offset + 1 < n {
            let op1 = offset + 1;
            // Odd vertex counts end in a triangle, expressed as a quad with a repeated vertex.
            let op2 = if offset + 2 >= n { op1 } else { offset + 2 };
            quads.push([first, local[offset], local[op1], local[op2]]);
            offset = op2;
        }
        Some(quads)
    }
}

type PolygonDistances = SmallVec<[f64; 8]>;

fn newell_normal(points: &[Point3]) -> Option<Vec3> {
    let mut n = Vec3::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalize()
}

fn clip_to_positive_w(corners: &[[f64; 4]; 4]) -> PolygonPoints {
    let inside = |v: &[f64; 4]| v[3] > W_EPSILON;
    let divide = |v: [f64; 4]| Point3::new(v[0] / v[3], v[1] / v[3], v[2] / v[3]);

    if corners.iter().all(inside) {
        return corners.iter().map(|&v| divide(v)).collect();
    }

    let mut out = PolygonPoints::new();
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        if inside(&a) {
            out.push(divide(a));
        }
        if inside(&a) != inside(&b) {
            let t = (W_EPSILON - a[3]) / (b[3] - a[3]);
            out.push(divide(core::array::from_fn(|k| a[k] + (b[k] - a[k]) * t)));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/bsp/polygon.rs"]
mod tests;
