use crate::geometry::surface::{Cylinder, Plane, Sphere};

use super::{Point3, Vector3, TOLERANCE};

/// Relationship between two planes.
#[derive(Debug)]
pub enum PlanePairRelation {
    /// Planes intersect along a line.
    IntersectionLine {
        origin: Point3,
        direction: Vector3,
    },
    /// Planes are parallel but not coincident.
    Parallel { distance: f64 },
    /// Planes are the same (coincident).
    Coincident,
}

/// Computes the intersection of two planes.
///
/// Returns an [`IntersectionLine`](PlanePairRelation::IntersectionLine) with a
/// unit-length `direction` when the planes cross, [`Parallel`](PlanePairRelation::Parallel)
/// when they don't, or [`Coincident`](PlanePairRelation::Coincident) when they overlap.
#[must_use]
pub fn plane_plane_intersect(a: &Plane, b: &Plane, tol: f64) -> PlanePairRelation {
    let na = a.plane_normal();
    let nb = b.plane_normal();

    let dir = na.cross(nb);
    let dir_len = dir.norm();

    if dir_len < TOLERANCE {
        // (anti-)parallel normals
        let diff = b.origin() - a.origin();
        let dist = diff.dot(na).abs();
        if dist < tol {
            PlanePairRelation::Coincident
        } else {
            PlanePairRelation::Parallel { distance: dist }
        }
    } else {
        let dir = dir / dir_len;

        // p = oa + s * na + t * nb lies on both planes:
        //   s + t * (na.nb) = 0
        //   s * (na.nb) + t = nb.(ob - oa)
        let d2 = nb.dot(&(b.origin() - a.origin()));
        let dot_nn = na.dot(nb);
        let denom = 1.0 - dot_nn * dot_nn;
        let s = -dot_nn * d2 / denom;
        let t = d2 / denom;
        let origin = a.origin() + na * s + nb * t;

        PlanePairRelation::IntersectionLine { origin, direction: dir }
    }
}

/// Closed-form relation between a plane or quadric and another quadric.
#[derive(Debug)]
pub enum QuadricPairRelation {
    /// The surfaces do not meet.
    Empty,
    /// The surfaces are the same locus.
    Coincident,
    /// The surfaces touch at a single point.
    Point(Point3),
    /// The surfaces meet along a circle lying in the plane normal to `normal`.
    Circle {
        center: Point3,
        radius: f64,
        normal: Vector3,
    },
    /// The surfaces meet along straight lines, given as `(origin, unit direction)`.
    Lines(Vec<(Point3, Vector3)>),
    /// The pair meets along a curve with no closed form here (ellipse, quartic).
    Unsupported,
}

/// Intersection of a plane and a sphere.
///
/// - Distance > radius → `Empty`
/// - Distance = radius → `Point` (tangent)
/// - Distance < radius → `Circle`
#[must_use]
pub fn plane_sphere_intersect(plane: &Plane, sphere: &Sphere, tol: f64) -> QuadricPairRelation {
    let n = plane.plane_normal();
    let d = (sphere.center() - plane.origin()).dot(n);
    let r = sphere.radius();
    let foot = sphere.center() - n * d;

    if d.abs() > r + tol {
        QuadricPairRelation::Empty
    } else if (d.abs() - r).abs() <= tol {
        QuadricPairRelation::Point(foot)
    } else {
        QuadricPairRelation::Circle {
            center: foot,
            radius: (r * r - d * d).sqrt(),
            normal: *n,
        }
    }
}

/// Intersection of two spheres.
#[must_use]
pub fn sphere_sphere_intersect(a: &Sphere, b: &Sphere, tol: f64) -> QuadricPairRelation {
    let offset = b.center() - a.center();
    let dist = offset.norm();
    let (r1, r2) = (a.radius(), b.radius());

    if dist < tol {
        return if (r1 - r2).abs() < tol {
            QuadricPairRelation::Coincident
        } else {
            QuadricPairRelation::Empty
        };
    }

    if dist > r1 + r2 + tol || dist < (r1 - r2).abs() - tol {
        return QuadricPairRelation::Empty;
    }

    let dir = offset / dist;
    if (dist - (r1 + r2)).abs() <= tol {
        return QuadricPairRelation::Point(a.center() + dir * r1);
    }
    if (dist - (r1 - r2).abs()).abs() <= tol {
        let point = if r1 >= r2 {
            a.center() + dir * r1
        } else {
            a.center() - dir * r1
        };
        return QuadricPairRelation::Point(point);
    }

    // Distance from a's center to the radical plane.
    let along = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    QuadricPairRelation::Circle {
        center: a.center() + dir * along,
        radius: (r1 * r1 - along * along).max(0.0).sqrt(),
        normal: dir,
    }
}

/// Intersection of a plane and a cylinder.
///
/// Only the perpendicular (circle) and parallel (lines) configurations have a
/// closed form here; oblique planes cut an ellipse and yield `Unsupported`.
#[must_use]
pub fn plane_cylinder_intersect(
    plane: &Plane,
    cyl: &Cylinder,
    tol: f64,
) -> QuadricPairRelation {
    let n = plane.plane_normal();
    let axis = cyl.axis();
    let cos = axis.dot(n);
    let r = cyl.radius();

    if (cos.abs() - 1.0).abs() < TOLERANCE {
        let t = (plane.origin() - cyl.center()).dot(n) / cos;
        return QuadricPairRelation::Circle {
            center: cyl.center() + axis * t,
            radius: r,
            normal: *axis,
        };
    }

    if cos.abs() > TOLERANCE {
        return QuadricPairRelation::Unsupported;
    }

    let d = (cyl.center() - plane.origin()).dot(n);
    if d.abs() > r + tol {
        return QuadricPairRelation::Empty;
    }
    let foot = cyl.center() - n * d;
    if (d.abs() - r).abs() <= tol {
        return QuadricPairRelation::Lines(vec![(foot, *axis)]);
    }
    let half_width = (r * r - d * d).sqrt();
    let across = axis.cross(n).normalize();
    QuadricPairRelation::Lines(vec![
        (foot - across * half_width, *axis),
        (foot + across * half_width, *axis),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn sphere(center: Point3, radius: f64) -> Sphere {
        Sphere::new(center, radius, Vector3::z(), Vector3::x()).unwrap()
    }

    // ── plane_plane_intersect ──

    #[test]
    fn perpendicular_planes_intersect() {
        let xy = Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let xz = Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0)).unwrap();

        match plane_plane_intersect(&xy, &xz, 1e-7) {
            PlanePairRelation::IntersectionLine { direction, .. } => {
                assert!(
                    direction.x.abs() > 0.99,
                    "expected X-axis direction, got {direction:?}"
                );
            }
            other => panic!("expected IntersectionLine, got {other:?}"),
        }
    }

    #[test]
    fn parallel_planes() {
        let a = Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let b = Plane::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();

        match plane_plane_intersect(&a, &b, 1e-7) {
            PlanePairRelation::Parallel { distance } => {
                assert!((distance - 5.0).abs() < TOLERANCE);
            }
            other => panic!("expected Parallel, got {other:?}"),
        }
    }

    #[test]
    fn coincident_planes() {
        let a = Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let b = Plane::from_normal(p(1.0, 2.0, 0.0), v(0.0, 0.0, -1.0)).unwrap();

        assert!(matches!(
            plane_plane_intersect(&a, &b, 1e-7),
            PlanePairRelation::Coincident
        ));
    }

    #[test]
    fn intersection_point_lies_on_both_planes() {
        let a = Plane::from_normal(p(1.0, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        let b = Plane::from_normal(p(0.0, 2.0, 0.0), v(0.0, 1.0, 1.0)).unwrap();

        match plane_plane_intersect(&a, &b, 1e-7) {
            PlanePairRelation::IntersectionLine { origin, .. } => {
                let dist_a = (origin - a.origin()).dot(a.plane_normal());
                let dist_b = (origin - b.origin()).dot(b.plane_normal());
                assert!(dist_a.abs() < 1e-9, "origin not on plane A: {dist_a}");
                assert!(dist_b.abs() < 1e-9, "origin not on plane B: {dist_b}");
            }
            other => panic!("expected IntersectionLine, got {other:?}"),
        }
    }

    // ── quadric pairs ──

    #[test]
    fn plane_sphere_small_circle() {
        let plane = Plane::from_normal(p(0.0, 0.0, 3.0), v(0.0, 0.0, 1.0)).unwrap();
        match plane_sphere_intersect(&plane, &sphere(Point3::origin(), 5.0), 1e-7) {
            QuadricPairRelation::Circle { center, radius, .. } => {
                assert!((center - p(0.0, 0.0, 3.0)).norm() < 1e-9);
                assert!((radius - 4.0).abs() < 1e-9);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn plane_sphere_tangent() {
        let plane = Plane::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();
        match plane_sphere_intersect(&plane, &sphere(Point3::origin(), 5.0), 1e-7) {
            QuadricPairRelation::Point(pt) => assert!((pt - p(0.0, 0.0, 5.0)).norm() < 1e-9),
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn plane_sphere_miss() {
        let plane = Plane::from_normal(p(0.0, 0.0, 6.0), v(0.0, 0.0, 1.0)).unwrap();
        assert!(matches!(
            plane_sphere_intersect(&plane, &sphere(Point3::origin(), 5.0), 1e-7),
            QuadricPairRelation::Empty
        ));
    }

    #[test]
    fn sphere_sphere_circle() {
        let a = sphere(Point3::origin(), 5.0);
        let b = sphere(p(6.0, 0.0, 0.0), 5.0);
        match sphere_sphere_intersect(&a, &b, 1e-7) {
            QuadricPairRelation::Circle { center, radius, normal } => {
                assert!((center - p(3.0, 0.0, 0.0)).norm() < 1e-9);
                assert!((radius - 4.0).abs() < 1e-9);
                assert!((normal - Vector3::x()).norm() < 1e-9);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn sphere_sphere_external_touch() {
        let a = sphere(Point3::origin(), 1.0);
        let b = sphere(p(3.0, 0.0, 0.0), 2.0);
        match sphere_sphere_intersect(&a, &b, 1e-7) {
            QuadricPairRelation::Point(pt) => assert!((pt - p(1.0, 0.0, 0.0)).norm() < 1e-9),
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn sphere_sphere_same() {
        let a = sphere(Point3::origin(), 2.0);
        let b = sphere(Point3::origin(), 2.0);
        assert!(matches!(
            sphere_sphere_intersect(&a, &b, 1e-7),
            QuadricPairRelation::Coincident
        ));
    }

    #[test]
    fn plane_cylinder_perpendicular_circle() {
        let cyl = Cylinder::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let plane = Plane::from_normal(p(0.0, 0.0, 1.5), v(0.0, 0.0, 1.0)).unwrap();
        match plane_cylinder_intersect(&plane, &cyl, 1e-7) {
            QuadricPairRelation::Circle { center, radius, .. } => {
                assert!((center - p(0.0, 0.0, 1.5)).norm() < 1e-9);
                assert!((radius - 2.0).abs() < 1e-9);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn plane_cylinder_parallel_two_lines() {
        let cyl = Cylinder::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let plane = Plane::from_normal(p(1.0, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        match plane_cylinder_intersect(&plane, &cyl, 1e-7) {
            QuadricPairRelation::Lines(lines) => {
                assert_eq!(lines.len(), 2);
                for (origin, _) in &lines {
                    assert!((origin.x - 1.0).abs() < 1e-9);
                    assert!((origin.y.abs() - 3.0_f64.sqrt()).abs() < 1e-9);
                }
            }
            other => panic!("expected Lines, got {other:?}"),
        }
    }

    #[test]
    fn plane_cylinder_oblique_is_unsupported() {
        let cyl = Cylinder::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let plane = Plane::from_normal(Point3::origin(), v(0.0, 1.0, 1.0)).unwrap();
        assert!(matches!(
            plane_cylinder_intersect(&plane, &cyl, 1e-7),
            QuadricPairRelation::Unsupported
        ));
    }
}
