//! `Point3` and `BoundingBox`, the 3-D primitives everything else builds on.
//!
//! Points are `nalgebra::Point3<f64>` rather than a hand-rolled triple: the
//! arithmetic, `PartialEq`, and `Debug` impls we'd otherwise write by hand
//! are exactly what `nalgebra` already provides.

use nalgebra::{Point3 as NaPoint3, Vector3};

/// A point (or, where used as a displacement, a vector) in 3-D space.
pub type Point3 = NaPoint3<f64>;

/// Euclidean distance between two points.
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    (a - b).norm()
}

/// Angle between two vectors, each given as a displacement from a common
/// origin. Uses `atan2` of the cross-product magnitude and the dot product
/// so degenerate (near-collinear, near-zero-length) inputs don't get lost
/// to `acos`'s flat derivative near +/-1, then falls back to an unsigned
/// `acos`-equivalent reading: both directions agree for genuinely 3-D
/// inputs since `atan2(norm(cross), dot)` is already unsigned over `[0, pi]`.
pub fn angle(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let cross_norm = u.cross(v).norm();
    let dot = u.dot(v);
    cross_norm.atan2(dot)
}

/// Lexicographic ordering over `(x, y, z)`, used to sort point sequences
/// for order-independent comparison (e.g. parallel-edge equality).
pub fn lex_cmp(a: &Point3, b: &Point3) -> std::cmp::Ordering {
    (a.x, a.y, a.z)
        .partial_cmp(&(b.x, b.y, b.z))
        .unwrap_or(std::cmp::Ordering::Equal)
}

/// Sort a slice of points lexicographically, in place.
pub fn sort_lex(points: &mut [Point3]) {
    points.sort_by(lex_cmp);
}

/// An axis-aligned box `ini <= end`, componentwise.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub ini: Point3,
    pub end: Point3,
}

impl BoundingBox {
    /// Build a box from its two corners, ordering them componentwise so the
    /// invariant `ini <= end` holds regardless of the argument order.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        let ini = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let end = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        BoundingBox { ini, end }
    }

    /// A cube of the given radius centered on `center`.
    pub fn from_center_radius(center: Point3, radius: f64) -> Self {
        let r = Vector3::new(radius, radius, radius);
        BoundingBox {
            ini: center - r,
            end: center + r,
        }
    }

    /// A box centered on `center` with per-axis half-sizes. When
    /// `use_radius` is true the half-sizes are used as-is (radius
    /// semantics); when false they are treated as full sizes and halved,
    /// matching the two constructor variants the specification names.
    pub fn from_center_half_sizes(center: Point3, half_sizes: Vector3<f64>, use_radius: bool) -> Self {
        let r = if use_radius { half_sizes } else { half_sizes / 2.0 };
        BoundingBox {
            ini: center - r,
            end: center + r,
        }
    }

    /// `end - ini`, componentwise.
    pub fn size(&self) -> Vector3<f64> {
        self.end - self.ini
    }

    /// Midpoint of `ini` and `end`.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.ini, &self.end)
    }

    /// Inclusive point-inside test.
    pub fn contains_point(&self, p: &Point3) -> bool {
        p.x >= self.ini.x
            && p.x <= self.end.x
            && p.y >= self.ini.y
            && p.y <= self.end.y
            && p.z >= self.ini.z
            && p.z <= self.end.z
    }

    /// Whether `other` is fully contained within `self`.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains_point(&other.ini) && self.contains_point(&other.end)
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_corners(
            Point3::new(
                self.ini.x.min(other.ini.x),
                self.ini.y.min(other.ini.y),
                self.ini.z.min(other.ini.z),
            ),
            Point3::new(
                self.end.x.max(other.end.x),
                self.end.y.max(other.end.y),
                self.end.z.max(other.end.z),
            ),
        )
    }

    /// The smallest box enclosing a sequence of boxes. `None` for an empty
    /// sequence.
    pub fn enclosing<'a, I: IntoIterator<Item = &'a BoundingBox>>(boxes: I) -> Option<BoundingBox> {
        boxes.into_iter().copied().reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn angle_of_perpendicular_vectors_is_half_pi() {
        let u = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(angle(&u, &v), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn angle_of_parallel_vectors_is_zero() {
        let u = Vector3::new(2.0, 0.0, 0.0);
        let v = Vector3::new(5.0, 0.0, 0.0);
        assert_relative_eq!(angle(&u, &v), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_box_contains_is_inclusive() {
        let bb = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(bb.contains_point(&Point3::new(0.0, 0.0, 0.0)));
        assert!(bb.contains_point(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!bb.contains_point(&Point3::new(1.0001, 0.0, 0.0)));
    }

    #[test]
    fn union_of_boxes_encloses_both() {
        let a = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::from_corners(Point3::new(-1.0, 2.0, 0.0), Point3::new(0.5, 3.0, 0.5));
        let u = a.union(&b);
        assert!(u.contains_box(&a));
        assert!(u.contains_box(&b));
    }
}
