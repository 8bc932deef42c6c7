//! Pure analytic kernels used by the reactive entities.
//!
//! Everything here works on plain `DVec2` values in model space and is free of
//! notification concerns. Degenerate inputs yield `None` or an empty `Vec`.

use glam::{DVec2, dvec2};

use crate::config::ModelConfig;

/// Infinite line through two points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line2 {
    pub a: DVec2,
    pub b: DVec2,
}

impl Line2 {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn dir(&self) -> DVec2 {
        self.b - self.a
    }

    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.dir().length_squared() <= eps * eps
    }

    /// General form `A x + B y + C = 0` through both points
    pub fn coefficients(&self) -> (f64, f64, f64) {
        let d = self.dir();
        let a = -d.y;
        let b = d.x;
        let c = -(a * self.a.x + b * self.a.y);
        (a, b, c)
    }
}

/// Closed segment between two points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment2 {
    pub a: DVec2,
    pub b: DVec2,
}

/// Circle by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle2 {
    pub center: DVec2,
    pub radius: f64,
}

/// 2D cross product (z-component of 3D cross product).
#[inline]
pub fn cross(u: DVec2, v: DVec2) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Intersection of two infinite lines; `None` when parallel or coincident.
pub fn intersect_lines(l1: Line2, l2: Line2, cfg: &ModelConfig) -> Option<DVec2> {
    let d1 = l1.dir();
    let d2 = l2.dir();
    let denom = cross(d1, d2);
    let scale = d1.length() * d2.length();
    if scale <= cfg.eps || denom.abs() <= cfg.eps * scale {
        return None;
    }
    let t = cross(l2.a - l1.a, d2) / denom;
    Some(l1.a + d1 * t)
}

/// Intersections of an infinite line with a circle, ordered along the line.
///
/// Tangency (distance within `tangent_eps` of the radius) yields one point.
pub fn intersect_line_circle(line: Line2, circle: Circle2, cfg: &ModelConfig) -> Vec<DVec2> {
    if line.is_degenerate(cfg.eps) || circle.radius <= 0.0 {
        return Vec::new();
    }
    let d = line.dir();
    let len = d.length();
    let u = d / len;
    // Foot of the perpendicular from the center
    let t_foot = (circle.center - line.a).dot(u);
    let foot = line.a + u * t_foot;
    let dist = foot.distance(circle.center);
    let gap = dist - circle.radius;
    if gap > cfg.tangent_eps {
        Vec::new()
    } else if gap.abs() <= cfg.tangent_eps {
        vec![foot]
    } else {
        let half = (circle.radius * circle.radius - dist * dist).max(0.0).sqrt();
        vec![foot - u * half, foot + u * half]
    }
}

/// Intersections of two circles. Concentric circles yield nothing.
pub fn intersect_circles(c1: Circle2, c2: Circle2, cfg: &ModelConfig) -> Vec<DVec2> {
    if c1.radius <= 0.0 || c2.radius <= 0.0 {
        return Vec::new();
    }
    let delta = c2.center - c1.center;
    let d = delta.length();
    if d <= cfg.eps {
        return Vec::new();
    }
    // Same gap rule as line/circle: distance off tangency, not squared chord.
    let outer = d - (c1.radius + c2.radius);
    let inner = d - (c1.radius - c2.radius).abs();
    if outer > cfg.tangent_eps || inner < -cfg.tangent_eps {
        return Vec::new();
    }
    let u = delta / d;
    let a = (c1.radius * c1.radius - c2.radius * c2.radius + d * d) / (2.0 * d);
    let base = c1.center + u * a;
    if outer.abs() <= cfg.tangent_eps || inner.abs() <= cfg.tangent_eps {
        return vec![base];
    }
    let h = (c1.radius * c1.radius - a * a).max(0.0).sqrt();
    let n = u.perp();
    vec![base + n * h, base - n * h]
}

/// Segment/segment intersection.
///
/// A crossing yields one point; collinear overlap yields the overlap's two
/// endpoints (one if the overlap is a single point).
pub fn intersect_segments(s1: Segment2, s2: Segment2, cfg: &ModelConfig) -> Vec<DVec2> {
    let d1 = s1.b - s1.a;
    let d2 = s2.b - s2.a;
    let denom = cross(d1, d2);
    let scale = d1.length() * d2.length();
    if scale <= cfg.eps {
        return Vec::new();
    }
    if denom.abs() > cfg.eps * scale {
        let w = s2.a - s1.a;
        let t = cross(w, d2) / denom;
        let u = cross(w, d1) / denom;
        let slack = cfg.eps.sqrt();
        if (-slack..=1.0 + slack).contains(&t) && (-slack..=1.0 + slack).contains(&u) {
            return vec![s1.a + d1 * t];
        }
        return Vec::new();
    }
    // Parallel: overlapping only if collinear
    if cross(s2.a - s1.a, d1).abs() > cfg.eps.sqrt() * d1.length() {
        return Vec::new();
    }
    let len2 = d1.length_squared();
    let t0 = (s2.a - s1.a).dot(d1) / len2;
    let t1 = (s2.b - s1.a).dot(d1) / len2;
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(1.0);
    if lo > hi + cfg.eps {
        Vec::new()
    } else if (hi - lo).abs() <= cfg.eps {
        vec![s1.a + d1 * lo]
    } else {
        vec![s1.a + d1 * lo, s1.a + d1 * hi]
    }
}

/// Infinite line against a segment; collinear overlap yields the segment ends.
pub fn intersect_line_segment(line: Line2, seg: Segment2, cfg: &ModelConfig) -> Vec<DVec2> {
    let d = line.dir();
    let e = seg.b - seg.a;
    let scale = d.length() * e.length();
    if scale <= cfg.eps {
        return Vec::new();
    }
    let denom = cross(d, e);
    if denom.abs() <= cfg.eps * scale {
        if cross(seg.a - line.a, d).abs() <= cfg.eps.sqrt() * d.length() {
            return vec![seg.a, seg.b];
        }
        return Vec::new();
    }
    let u = cross(seg.a - line.a, d) / denom;
    let slack = cfg.eps.sqrt();
    if (-slack..=1.0 + slack).contains(&u) {
        vec![seg.a + e * u]
    } else {
        Vec::new()
    }
}

/// Orthogonal projection onto an infinite line.
pub fn project(line: Line2, p: DVec2, cfg: &ModelConfig) -> Option<DVec2> {
    if line.is_degenerate(cfg.eps) {
        return None;
    }
    let d = line.dir();
    let t = (p - line.a).dot(d) / d.length_squared();
    Some(line.a + d * t)
}

/// Mirror image across an infinite line.
pub fn reflect(line: Line2, p: DVec2, cfg: &ModelConfig) -> Option<DVec2> {
    project(line, p, cfg).map(|foot| foot * 2.0 - p)
}

/// Perpendicular distance from a point to an infinite line.
pub fn distance_to_line(line: Line2, p: DVec2, cfg: &ModelConfig) -> Option<f64> {
    project(line, p, cfg).map(|foot| foot.distance(p))
}

/// Push `p` into `out` unless a point within `eps` is already there.
pub fn push_unique(out: &mut Vec<DVec2>, p: DVec2, eps: f64) {
    if !out.iter().any(|q| q.distance(p) <= eps) {
        out.push(p);
    }
}

/// Signed shoelace area (positive for counterclockwise vertex order).
pub fn signed_area(vertices: &[DVec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    0.5 * (0..n)
        .map(|i| cross(vertices[i], vertices[(i + 1) % n]))
        .sum::<f64>()
}

/// Point on a closed polyline at `ratio` of its perimeter.
pub fn point_along_closed(vertices: &[DVec2], ratio: f64) -> Option<DVec2> {
    let first = *vertices.first()?;
    let mut ring = vertices.to_vec();
    ring.push(first);
    point_along_open(&ring, ratio.rem_euclid(1.0))
}

/// Point on an open polyline at `ratio` (clamped to `[0, 1]`) of its length.
pub fn point_along_open(vertices: &[DVec2], ratio: f64) -> Option<DVec2> {
    let first = *vertices.first()?;
    let total: f64 = vertices.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total == 0.0 {
        return Some(first);
    }
    let mut remaining = ratio.clamp(0.0, 1.0) * total;
    for w in vertices.windows(2) {
        let len = w[0].distance(w[1]);
        if remaining <= len {
            return Some(w[0].lerp(w[1], if len == 0.0 { 0.0 } else { remaining / len }));
        }
        remaining -= len;
    }
    vertices.last().copied()
}

/// Unit vector at `angle` radians.
#[inline]
pub fn unit(angle: f64) -> DVec2 {
    dvec2(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ModelConfig {
        ModelConfig::default()
    }

    #[test]
    fn perpendicular_lines_meet_at_origin() {
        let l1 = Line2::new(dvec2(-3.0, 0.0), dvec2(3.0, 0.0));
        let l2 = Line2::new(dvec2(0.0, -2.0), dvec2(0.0, 2.0));
        let p = intersect_lines(l1, l2, &cfg()).unwrap();
        assert!(p.length() < 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_meet() {
        let l1 = Line2::new(dvec2(-3.0, 1.0), dvec2(3.0, 1.0));
        let l2 = Line2::new(dvec2(-3.0, -1.0), dvec2(3.0, -1.0));
        assert_eq!(intersect_lines(l1, l2, &cfg()), None);
        // Opposite direction vectors are still parallel
        let l3 = Line2::new(dvec2(3.0, -1.0), dvec2(-3.0, -1.0));
        assert_eq!(intersect_lines(l1, l3, &cfg()), None);
    }

    #[test]
    fn line_circle_counts() {
        let c = Circle2 {
            center: DVec2::ZERO,
            radius: 2.0,
        };
        let secant = Line2::new(dvec2(-3.0, 0.0), dvec2(3.0, 0.0));
        let tangent = Line2::new(dvec2(-3.0, 2.0), dvec2(3.0, 2.0));
        let miss = Line2::new(dvec2(-3.0, 3.0), dvec2(3.0, 3.0));
        let pts = intersect_line_circle(secant, c, &cfg());
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec2(-2.0, 0.0)).length() < 1e-12);
        assert!((pts[1] - dvec2(2.0, 0.0)).length() < 1e-12);
        let pts = intersect_line_circle(tangent, c, &cfg());
        assert_eq!(pts, vec![dvec2(0.0, 2.0)]);
        assert!(intersect_line_circle(miss, c, &cfg()).is_empty());
    }

    #[test]
    fn circles_cross_at_two_points() {
        let c1 = Circle2 {
            center: dvec2(0.0, 0.0),
            radius: 1.0,
        };
        let c2 = Circle2 {
            center: dvec2(1.0, 0.0),
            radius: 1.0,
        };
        let pts = intersect_circles(c1, c2, &cfg());
        assert_eq!(pts.len(), 2);
        for p in pts {
            assert!((p.x - 0.5).abs() < 1e-12);
            assert!((p.y.abs() - 3f64.sqrt() / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn circles_touching_externally_meet_once() {
        let c1 = Circle2 {
            center: dvec2(0.0, 0.0),
            radius: 1.0,
        };
        let c2 = Circle2 {
            center: dvec2(2.0, 0.0),
            radius: 1.0,
        };
        let pts = intersect_circles(c1, c2, &cfg());
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - dvec2(1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn circle_tangency_uses_the_line_circle_tolerance() {
        let c1 = Circle2 {
            center: dvec2(0.0, 0.0),
            radius: 1.0,
        };
        let c = |x: f64, radius: f64| Circle2 {
            center: dvec2(x, 0.0),
            radius,
        };
        // 1e-6 short of external tangency: a real crossing with two points
        assert_eq!(intersect_circles(c1, c(2.0 - 1e-6, 1.0), &cfg()).len(), 2);
        assert_eq!(intersect_circles(c1, c(2.0 - 1e-9, 1.0), &cfg()).len(), 1);
        // Internal tangency at (1, 0)
        let pts = intersect_circles(c1, c(0.5, 0.5), &cfg());
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - dvec2(1.0, 0.0)).length() < 1e-9);
        assert_eq!(intersect_circles(c1, c(0.5 + 1e-6, 0.5), &cfg()).len(), 2);

        // A line 1e-6 inside the circle also crosses twice
        let near = Line2::new(dvec2(-2.0, 1.0 - 1e-6), dvec2(2.0, 1.0 - 1e-6));
        assert_eq!(intersect_line_circle(near, c1, &cfg()).len(), 2);
    }

    #[test]
    fn collinear_segments_yield_overlap_endpoints() {
        let s1 = Segment2 {
            a: dvec2(0.0, 0.0),
            b: dvec2(4.0, 0.0),
        };
        let s2 = Segment2 {
            a: dvec2(2.0, 0.0),
            b: dvec2(6.0, 0.0),
        };
        let pts = intersect_segments(s1, s2, &cfg());
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec2(2.0, 0.0)).length() < 1e-12);
        assert!((pts[1] - dvec2(4.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn disjoint_segments_yield_nothing() {
        let s1 = Segment2 {
            a: dvec2(0.0, 0.0),
            b: dvec2(1.0, 0.0),
        };
        let s2 = Segment2 {
            a: dvec2(2.0, -1.0),
            b: dvec2(2.0, 1.0),
        };
        assert!(intersect_segments(s1, s2, &cfg()).is_empty());
    }

    #[test]
    fn reflection_is_an_involution() {
        let l = Line2::new(dvec2(0.0, 1.0), dvec2(2.0, 3.0));
        let p = dvec2(5.0, -2.0);
        let once = reflect(l, p, &cfg()).unwrap();
        let twice = reflect(l, once, &cfg()).unwrap();
        assert!((twice - p).length() < 1e-9);
    }

    #[test]
    fn degenerate_line_has_no_projection() {
        let l = Line2::new(dvec2(1.0, 1.0), dvec2(1.0, 1.0));
        assert_eq!(project(l, DVec2::ZERO, &cfg()), None);
    }

    #[test]
    fn shoelace_area_of_unit_square() {
        let sq = [
            dvec2(0.0, 0.0),
            dvec2(1.0, 0.0),
            dvec2(1.0, 1.0),
            dvec2(0.0, 1.0),
        ];
        assert!((signed_area(&sq) - 1.0).abs() < 1e-12);
        let p = point_along_closed(&sq, 0.375).unwrap();
        assert!((p - dvec2(1.0, 0.5)).length() < 1e-12);
    }
}
