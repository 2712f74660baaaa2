//! Swept collision tests: closed-form first time of contact between two
//! shapes moving with constant velocities.
//!
//! Every solver works on relative motion (`dp = p2 - p1`, `dv = v2 - v1`) and
//! returns `None` when the shapes never start touching at some `t >= 0`.
//! Static bodies pass a zero velocity.

use glam::Vec2;

use super::collider::WorldShape;

/// Squared relative speed below which two bodies are considered at rest
/// relative to each other.
const MOTION_EPSILON: f32 = 1e-12;

/// Penetration (in world units) tolerated for a pair that is already
/// touching and still approaching. Such a pair collides at `t = 0` instead of
/// being lost to rounding.
const CONTACT_SLOP: f32 = 1e-5;

/// First contact of two moving shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Time until contact, `>= 0`.
    pub time: f32,
    /// Unit surface normal at contact.
    pub normal: Vec2,
}

/// Real roots of `a t^2 + b t + c = 0`, ascending.
///
/// Uses the cancellation-free form so the small root stays accurate when
/// `b^2` dominates `4ac`.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() <= MOTION_EPSILON {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if !disc.is_finite() || disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let q = -0.5 * (b + root.copysign(b));
    if q == 0.0 {
        return Some((0.0, 0.0));
    }
    let (t0, t1) = (q / a, c / q);
    Some((t0.min(t1), t0.max(t1)))
}

/// Entry time of `|dp + t dv| = distance`, the first moment two round shapes
/// touch. A pair already overlapping by less than [`CONTACT_SLOP`] while
/// approaching touches at `t = 0`.
fn round_contact_time(dp: Vec2, dv: Vec2, distance: f32) -> Option<f32> {
    let a = dv.dot(dv);
    let b = 2.0 * dp.dot(dv);
    let c = dp.dot(dp) - distance * distance;
    let (enter, exit) = solve_quadratic(a, b, c)?;
    if enter >= 0.0 {
        return Some(enter);
    }
    let approaching = b < 0.0 && exit > 0.0;
    if approaching && enter * a.sqrt() >= -CONTACT_SLOP {
        return Some(0.0);
    }
    None
}

/// Circle vs circle.
///
/// The normal points from the first circle toward the second.
pub fn circle_circle(p1: Vec2, v1: Vec2, r1: f32, p2: Vec2, v2: Vec2, r2: f32) -> Option<Sweep> {
    let dp = p2 - p1;
    let dv = v2 - v1;
    let time = round_contact_time(dp, dv, r1 + r2)?;
    Some(Sweep {
        time,
        normal: (dp + time * dv).normalize_or_zero(),
    })
}

/// Circle vs point, i.e. circle-circle with a zero radius. Returns the time
/// of contact only.
pub fn circle_point(p1: Vec2, v1: Vec2, r1: f32, p2: Vec2, v2: Vec2) -> Option<f32> {
    round_contact_time(p2 - p1, v2 - v1, r1)
}

/// Interval during which `|d + t v| <= half` on one axis.
///
/// These are the roots of the squared condition `(d + t v)^2 = half^2`, which
/// is linear in `t` once the square is undone. An axis without relative
/// motion is either always overlapping or never.
fn axis_interval(d: f32, v: f32, half: f32) -> Option<(f32, f32)> {
    if v * v <= MOTION_EPSILON {
        return if d.abs() < half {
            Some((f32::NEG_INFINITY, f32::INFINITY))
        } else {
            None
        };
    }
    let t0 = (-half - d) / v;
    let t1 = (half - d) / v;
    Some((t0.min(t1), t0.max(t1)))
}

/// Axis-aligned rectangle vs rectangle, by centers and full sizes.
///
/// Contact starts when the later of the two axes starts overlapping, provided
/// the other axis has not stopped overlapping by then. The normal is the
/// signed axis of that face, `(sign(dv.x), 0)` or `(0, sign(dv.y))`.
pub fn rect_rect(p1: Vec2, v1: Vec2, wh1: Vec2, p2: Vec2, v2: Vec2, wh2: Vec2) -> Option<Sweep> {
    let dp = p2 - p1;
    let dv = v2 - v1;
    let half = 0.5 * (wh1 + wh2);

    let (enter_x, exit_x) = axis_interval(dp.x, dv.x, half.x)?;
    let (enter_y, exit_y) = axis_interval(dp.y, dv.y, half.y)?;
    let stop = exit_x.min(exit_y);

    let (enter, d, v, normal) = if enter_x >= enter_y {
        (enter_x, dp.x, dv.x, Vec2::new(dv.x.signum(), 0.0))
    } else {
        (enter_y, dp.y, dv.y, Vec2::new(0.0, dv.y.signum()))
    };

    if !enter.is_finite() || enter >= stop {
        return None;
    }
    // Already touching: only a pair still closing in on that axis collides.
    let time = if enter >= 0.0 {
        enter
    } else if d * v < 0.0 && enter * v.abs() >= -CONTACT_SLOP {
        0.0
    } else {
        return None;
    };
    Some(Sweep { time, normal })
}

/// Circle vs axis-aligned rectangle (full size `wh2`).
///
/// Edge contacts behave like a `2r x 2r` square against the rectangle. When
/// that square first touches in one of the rectangle's corner regions, or
/// already overlaps the rectangle while the circle itself is still clear of
/// it, the first contact can only be with a corner, which is tested as a
/// point. A circle overlapping the rectangle by more than the contact slop is
/// not a new contact. The normal is the outward surface normal of the
/// rectangle at the contact.
pub fn circle_rect(p1: Vec2, v1: Vec2, r1: f32, p2: Vec2, v2: Vec2, wh2: Vec2) -> Option<Sweep> {
    let half = 0.5 * wh2;
    let rel = p1 - p2;
    let dv = v1 - v2;

    let gap = (rel - rel.clamp(-half, half)).length();
    if gap < r1 - CONTACT_SLOP {
        return None;
    }

    if let Some(hit) = rect_rect(p1, v1, Vec2::splat(2.0 * r1), p2, v2, wh2) {
        let at = rel + hit.time * dv;
        if at.x.abs() <= half.x || at.y.abs() <= half.y {
            return Some(hit);
        }
    }

    let (time, corner) = [
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(-1.0, 1.0),
        Vec2::ONE,
    ]
    .into_iter()
    .map(|signs| p2 + signs * half)
    .filter_map(|corner| circle_point(p1, v1, r1, corner, v2).map(|time| (time, corner)))
    .min_by(|a, b| a.0.total_cmp(&b.0))?;

    let outward = (p1 - corner) + time * dv;
    Some(Sweep {
        time,
        normal: outward.normalize_or_zero(),
    })
}

/// Dispatch on the shape pair. Rect vs circle is computed in circle-first
/// order with the normal negated.
pub fn sweep(a: &WorldShape, va: Vec2, b: &WorldShape, vb: Vec2) -> Option<Sweep> {
    match (*a, *b) {
        (
            WorldShape::Circle {
                center: p1,
                radius: r1,
            },
            WorldShape::Circle {
                center: p2,
                radius: r2,
            },
        ) => circle_circle(p1, va, r1, p2, vb, r2),
        (
            WorldShape::Rect {
                center: p1,
                size: wh1,
            },
            WorldShape::Rect {
                center: p2,
                size: wh2,
            },
        ) => rect_rect(p1, va, wh1, p2, vb, wh2),
        (
            WorldShape::Circle {
                center: p1,
                radius: r1,
            },
            WorldShape::Rect {
                center: p2,
                size: wh2,
            },
        ) => circle_rect(p1, va, r1, p2, vb, wh2),
        (
            WorldShape::Rect {
                center: p1,
                size: wh1,
            },
            WorldShape::Circle {
                center: p2,
                radius: r2,
            },
        ) => circle_rect(p2, vb, r2, p1, va, wh1).map(|s| Sweep {
            normal: -s.normal,
            ..s
        }),
    }
}
