//! Geometric laws checked over generated inputs.

use std::f64::consts::TAU;

use geomodel::prelude::*;
use glam::{DVec2, DVec3};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -50.0..50.0_f64
}

fn point() -> impl Strategy<Value = DVec2> {
    (coord(), coord()).prop_map(|(x, y)| DVec2::new(x, y))
}

/// Two points at least one unit apart
fn segment() -> impl Strategy<Value = (DVec2, DVec2)> {
    (point(), 0.0..TAU, 1.0..20.0_f64)
        .prop_map(|(a, angle, len)| (a, a + DVec2::from_angle(angle) * len))
}

fn line((a, b): (DVec2, DVec2)) -> std::rc::Rc<Line> {
    Line::from_points(a, b).unwrap()
}

proptest! {
    #[test]
    fn reflecting_twice_is_identity(seg in segment(), p in point()) {
        let l = line(seg);
        let once = l.reflect(p).unwrap();
        let twice = l.reflect(once).unwrap();
        prop_assert!((twice - p).length() < 1e-9, "{p} came back as {twice}");
    }

    #[test]
    fn reactive_reflection_is_an_involution(seg in segment(), p in point(), q in point()) {
        let l = line(seg);
        let source = Point::new(p.x, p.y);
        let mirrored = l.reflect_over_line(&source);
        let back = l.reflect_over_line(&mirrored);
        prop_assert!((back.xy() - p).length() < 1e-9);

        source.set(q.x, q.y).unwrap();
        prop_assert!((back.xy() - q).length() < 1e-9);
    }

    #[test]
    fn line_meets_circle_at_most_twice(seg in segment(), c in point(), r in 0.5..30.0_f64) {
        let circle = Circle::new(c, r).unwrap();
        let ix = Intersection::line_circle(&line(seg), &circle);
        prop_assert!(ix.len() <= 2);
        for p in ix.positions() {
            prop_assert!((p.truncate().distance(c) - r).abs() < 1e-6);
        }
    }

    #[test]
    fn tangent_lines_touch_once(c in point(), r in 0.5..30.0_f64, angle in 0.0..TAU) {
        let circle = Circle::new(c, r).unwrap();
        let tangent = circle.tangent_line(angle);
        let ix = Intersection::line_circle(&tangent, &circle);
        prop_assert_eq!(ix.len(), 1);
        let expected = c + DVec2::from_angle(angle) * r;
        prop_assert!((ix.positions()[0].truncate() - expected).length() < 1e-6);
    }

    #[test]
    fn parallel_lines_never_meet(
        seg in segment(),
        offset in prop_oneof![-20.0..-0.5_f64, 0.5..20.0_f64],
        stretch in 0.5..5.0_f64,
        reversed in any::<bool>(),
    ) {
        let (a, b) = seg;
        let dir = b - a;
        let shift = dir.normalize().perp() * offset;
        let other_dir = if reversed { -dir * stretch } else { dir * stretch };
        let l1 = line(seg);
        let l2 = line((a + shift, a + shift + other_dir));

        prop_assert_eq!(l1.intersection(&l2), None);
        prop_assert!(Intersection::line_line(&l1, &l2).is_empty());
    }

    #[test]
    fn recomputing_without_changes_is_stable(
        c1 in point(), r1 in 1.0..20.0_f64,
        c2 in point(), r2 in 1.0..20.0_f64,
    ) {
        let a = Circle::new(c1, r1).unwrap();
        let b = Circle::new(c2, r2).unwrap();
        let ix = Intersection::circle_circle(&a, &b);
        let first: Vec<DVec3> = ix.positions();
        ix.recompute();
        prop_assert_eq!(&first, &ix.positions());
        ix.recompute();
        prop_assert_eq!(&first, &ix.positions());
    }
}
