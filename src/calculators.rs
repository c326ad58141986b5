//! Point and dimension formulas for a frame.
//!
//! Each named value has one or more candidate formulas. Redundant candidates
//! let differently specified frames (reach and stack, wheelbase and fork,
//! seat tube triangle) converge on the same points. The bottom bracket is
//! pinned to the canvas centre and every other point hangs off it.

use crate::definition::{Definition, keys};
use crate::geometry::{angle_between, deg_to_rad, point_at, right_triangle_leg, solve_quadratic};
use crate::journal::{Reconciliation, reconcile};
use crate::resolve::{Candidate, Dep, Entry, Registry, Resolve, Scope};
use crate::settings::Settings;
use crate::store::ValueStore;
use crate::types::{Value, to_int};
use glam::dvec2;

/// Names of the values the calculators produce.
pub mod names {
    pub const BOTTOM_BRACKET: &str = "bottomBracket";
    pub const SEAT_TUBE_END: &str = "seatTubeEnd";
    pub const HEAD_TOP: &str = "headTop";
    pub const TTL_SPOT: &str = "ttlSpot";
    pub const GRAVITY_SPOT: &str = "gravitySpot";
    pub const HEAD_BOTTOM: &str = "headBottom";
    pub const STEERER_TOP: &str = "steererTop";
    pub const REAR_WHEEL_HUB: &str = "rearWheelHub";
    pub const REAR_CONTACT_PATCH: &str = "rearContactPatch";
    pub const FORK_STRAIGHT: &str = "forkStraight";
    pub const FRONT_WHEEL_HUB_OFFSET: &str = "frontWheelHubOffset";
    pub const FRONT_WHEEL_HUB: &str = "frontWheelHub";
    pub const FRONT_CONTACT_PATCH: &str = "frontContactPatch";
    pub const FORK_TRAIL_SPOT: &str = "forkTrailSpot";
}

use names::*;

/// The calculator registry, in evaluation order.
pub fn registry() -> Registry<Value> {
    Registry::<Value>::new("calculators")
        .entry(
            BOTTOM_BRACKET,
            [Candidate::new([Dep::canvas("center")], |s| {
                Some(s.canvas_center().into())
            })],
        )
        .entry(
            SEAT_TUBE_END,
            [Candidate::new(
                [
                    Dep::values(BOTTOM_BRACKET),
                    Dep::def(keys::SEAT_TUBE),
                    Dep::def(keys::SEAT_ANGLE),
                ],
                seat_tube_end,
            )],
        )
        .entry(
            HEAD_TOP,
            [
                Candidate::new(
                    [
                        Dep::values(BOTTOM_BRACKET),
                        Dep::def(keys::REACH),
                        Dep::def(keys::STACK),
                    ],
                    head_top_from_reach_and_stack,
                ),
                Candidate::new(
                    [
                        Dep::values(BOTTOM_BRACKET),
                        Dep::values(FRONT_WHEEL_HUB),
                        Dep::def(keys::HEAD_ANGLE),
                        Dep::def(keys::HEAD_TUBE),
                        Dep::def(keys::SEAT_ANGLE),
                        Dep::def(keys::FORK_LENGTH),
                        Dep::def(keys::TOP_TUBE_LENGTH),
                    ],
                    head_top_from_front_hub,
                ),
            ],
        )
        .entry(
            TTL_SPOT,
            [
                Candidate::new(
                    [
                        Dep::values(HEAD_TOP),
                        Dep::values(BOTTOM_BRACKET),
                        Dep::def(keys::SEAT_ANGLE),
                    ],
                    ttl_spot_on_seat_line,
                )
                .with_write_back(keys::TOP_TUBE_LENGTH, |s, spot| {
                    let head_top = s.point(HEAD_TOP)?;
                    Some(s.zoom().undo(head_top.x - spot.as_point()?.x))
                }),
                Candidate::new(
                    [Dep::values(HEAD_TOP), Dep::def(keys::TOP_TUBE_LENGTH)],
                    |s| {
                        let head_top = s.point(HEAD_TOP)?;
                        Some(dvec2(head_top.x - s.px(keys::TOP_TUBE_LENGTH)?, head_top.y).into())
                    },
                ),
            ],
        )
        .entry(
            GRAVITY_SPOT,
            [Candidate::new(
                [
                    Dep::values(BOTTOM_BRACKET),
                    Dep::def(keys::REACH),
                    Dep::def(keys::STACK),
                ],
                |s| {
                    let bb = s.point(BOTTOM_BRACKET)?;
                    let half_reach = s.zoom().apply(to_int(s.num(keys::REACH)? / 2.0));
                    let half_stack = s.zoom().apply(to_int(s.num(keys::STACK)? / 2.0));
                    Some((bb + dvec2(half_reach, -half_stack)).into())
                },
            )],
        )
        .entry(
            HEAD_BOTTOM,
            [Candidate::new(
                [
                    Dep::values(HEAD_TOP),
                    Dep::def(keys::HEAD_ANGLE),
                    Dep::def(keys::HEAD_TUBE),
                ],
                head_bottom,
            )],
        )
        .entry(
            STEERER_TOP,
            [Candidate::new(
                [
                    Dep::values(HEAD_BOTTOM),
                    Dep::def(keys::FORK_STEERER),
                    Dep::def(keys::HEAD_ANGLE),
                ],
                |s| {
                    let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)? - 180.0);
                    Some(point_at(s.point(HEAD_BOTTOM)?, s.px(keys::FORK_STEERER)?, angle).into())
                },
            )],
        )
        .entry(
            REAR_WHEEL_HUB,
            [Candidate::new(
                [
                    Dep::values(BOTTOM_BRACKET),
                    Dep::def(keys::CHAINSTAY),
                    Dep::def(keys::BB_DROP),
                ],
                rear_wheel_hub,
            )],
        )
        .entry(
            REAR_CONTACT_PATCH,
            [Candidate::new(
                [
                    Dep::values(REAR_WHEEL_HUB),
                    Dep::def(keys::WHEEL),
                    Dep::def(keys::TIRE),
                ],
                |s| contact_patch(s, REAR_WHEEL_HUB),
            )],
        )
        .entry(
            FORK_STRAIGHT,
            [
                Candidate::new(
                    [Dep::def(keys::FORK_LENGTH), Dep::def(keys::FORK_OFFSET)],
                    |s| {
                        let leg = right_triangle_leg(s.num(keys::FORK_LENGTH)?, s.num(keys::FORK_OFFSET)?)?;
                        Some(Value::Dimension(s.zoom().apply(leg)))
                    },
                ),
                Candidate::new(
                    [
                        Dep::values(HEAD_BOTTOM),
                        Dep::values(FRONT_WHEEL_HUB),
                        Dep::def(keys::FORK_LENGTH),
                        Dep::def(keys::HEAD_ANGLE),
                    ],
                    fork_straight_from_front_hub,
                ),
            ],
        )
        .entry(
            FRONT_WHEEL_HUB_OFFSET,
            [
                Candidate::new(
                    [
                        Dep::values(HEAD_BOTTOM),
                        Dep::values(FORK_STRAIGHT),
                        Dep::def(keys::HEAD_ANGLE),
                    ],
                    |s| {
                        let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)?);
                        Some(point_at(s.point(HEAD_BOTTOM)?, s.dim(FORK_STRAIGHT)?, angle).into())
                    },
                ),
                Candidate::new(
                    [
                        Dep::values(FRONT_WHEEL_HUB),
                        Dep::def(keys::FORK_OFFSET),
                        Dep::def(keys::HEAD_ANGLE),
                    ],
                    |s| {
                        let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)? + 90.0);
                        Some(point_at(s.point(FRONT_WHEEL_HUB)?, s.px(keys::FORK_OFFSET)?, angle).into())
                    },
                ),
            ],
        )
        .entry(
            FRONT_WHEEL_HUB,
            [
                Candidate::new(
                    [
                        Dep::values(FRONT_WHEEL_HUB_OFFSET),
                        Dep::def(keys::FORK_OFFSET),
                        Dep::def(keys::HEAD_ANGLE),
                    ],
                    |s| {
                        let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)? - 90.0);
                        let offset = s.point(FRONT_WHEEL_HUB_OFFSET)?;
                        Some(point_at(offset, s.px(keys::FORK_OFFSET)?, angle).into())
                    },
                ),
                Candidate::new(
                    [Dep::values(REAR_WHEEL_HUB), Dep::def(keys::WHEEL_BASE)],
                    |s| {
                        let rear = s.point(REAR_WHEEL_HUB)?;
                        Some((rear + dvec2(s.px(keys::WHEEL_BASE)?, 0.0)).into())
                    },
                ),
            ],
        )
        .entry(
            FRONT_CONTACT_PATCH,
            [Candidate::new(
                [
                    Dep::values(FRONT_WHEEL_HUB),
                    Dep::def(keys::WHEEL),
                    Dep::def(keys::TIRE),
                ],
                |s| contact_patch(s, FRONT_WHEEL_HUB),
            )],
        )
        .entry(
            FORK_TRAIL_SPOT,
            [Candidate::new(
                [
                    Dep::values(HEAD_BOTTOM),
                    Dep::values(FRONT_CONTACT_PATCH),
                    Dep::def(keys::HEAD_ANGLE),
                ],
                fork_trail_spot,
            )],
        )
}

fn seat_tube_end(s: &Scope<'_>) -> Option<Value> {
    let bb = s.point(BOTTOM_BRACKET)?;
    let angle = deg_to_rad(s.num(keys::SEAT_ANGLE)?);
    let length = s.px(keys::SEAT_TUBE)?;
    Some((bb - dvec2(to_int(length * angle.cos()), to_int(length * angle.sin()))).into())
}

fn head_top_from_reach_and_stack(s: &Scope<'_>) -> Option<Value> {
    let bb = s.point(BOTTOM_BRACKET)?;
    Some((bb + dvec2(s.px(keys::REACH)?, -s.px(keys::STACK)?)).into())
}

/// Intersect the circle of fork-length radius around the head tube base seen
/// from the front hub with the seat line through the top tube spot.
fn head_top_from_front_hub(s: &Scope<'_>) -> Option<Value> {
    let bb = s.point(BOTTOM_BRACKET)?;
    let front_hub = s.point(FRONT_WHEEL_HUB)?;
    let head_angle = s.num(keys::HEAD_ANGLE)?;

    let center = point_at(front_hub, s.px(keys::HEAD_TUBE)?, deg_to_rad(head_angle - 180.0));
    let line_point = dvec2(bb.x + s.px(keys::TOP_TUBE_LENGTH)?, bb.y);
    let radius = s.px(keys::FORK_LENGTH)?;
    let tan = deg_to_rad(s.num(keys::SEAT_ANGLE)?).tan();
    if tan == 0.0 {
        return None;
    }

    let d = center - line_point;
    let a = (1.0 / tan).powi(2) + 1.0;
    let b = 2.0 * d.x / tan + 2.0 * d.y;
    let c = d.x * d.x + d.y * d.y - radius * radius;
    let h = solve_quadratic(a, b, c).max()?;
    Some(dvec2(line_point.x - h / tan, line_point.y - h).into())
}

/// Where the horizontal through the head top meets the seat tube line.
fn ttl_spot_on_seat_line(s: &Scope<'_>) -> Option<Value> {
    let bb = s.point(BOTTOM_BRACKET)?;
    let head_top = s.point(HEAD_TOP)?;
    let tan = deg_to_rad(s.num(keys::SEAT_ANGLE)?).tan();
    if tan == 0.0 {
        return None;
    }
    Some(dvec2(bb.x - (bb.y - head_top.y) / tan, head_top.y).into())
}

fn head_bottom(s: &Scope<'_>) -> Option<Value> {
    let head_top = s.point(HEAD_TOP)?;
    let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)?);
    let length = s.px(keys::HEAD_TUBE)?;
    Some((head_top + dvec2(to_int(angle.cos() * length), to_int(angle.sin() * length))).into())
}

fn rear_wheel_hub(s: &Scope<'_>) -> Option<Value> {
    let bb = s.point(BOTTOM_BRACKET)?;
    let drop = s.num(keys::BB_DROP)?;
    let reach = right_triangle_leg(s.num(keys::CHAINSTAY)?, drop)?;
    Some((bb - dvec2(s.zoom().apply(reach), s.zoom().apply(drop))).into())
}

fn contact_patch(s: &Scope<'_>, hub: &str) -> Option<Value> {
    let hub = s.point(hub)?;
    let radius = s.num(keys::WHEEL)? / 2.0 + s.num(keys::TIRE)?;
    Some((hub + dvec2(0.0, s.zoom().apply(radius))).into())
}

/// Straight fork length projected on the steering axis.
fn fork_straight_from_front_hub(s: &Scope<'_>) -> Option<Value> {
    let fork = angle_between(s.point(HEAD_BOTTOM)?, s.point(FRONT_WHEEL_HUB)?)?;
    let steering = deg_to_rad(s.num(keys::HEAD_ANGLE)?);
    Some(Value::Dimension(s.px(keys::FORK_LENGTH)? * (steering - fork).cos()))
}

/// Where the steering axis meets the ground under the front wheel.
fn fork_trail_spot(s: &Scope<'_>) -> Option<Value> {
    let head_bottom = s.point(HEAD_BOTTOM)?;
    let ground = s.point(FRONT_CONTACT_PATCH)?.y;
    let tan = deg_to_rad(s.num(keys::HEAD_ANGLE)?).tan();
    if tan == 0.0 {
        return None;
    }
    Some(dvec2(head_bottom.x + (ground - head_bottom.y) / tan, ground).into())
}

// ============================================================================
// Resolution target
// ============================================================================

/// Stores calculator results in a frame's value store.
///
/// Values are frozen once stored. Candidates with a write-back also update
/// the definition, recording the change in `journal`.
pub struct Calculate<'a> {
    pub def: &'a mut Definition,
    pub values: &'a mut ValueStore,
    pub settings: &'a Settings,
    pub journal: &'a mut Vec<Reconciliation>,
}

impl Resolve<Value> for Calculate<'_> {
    fn skip(&self, name: &str) -> bool {
        self.values.contains(name)
    }

    fn is_available(&self, dep: &Dep) -> bool {
        Scope::new(self.def, self.values, self.settings).is_available(dep)
    }

    fn compute(&self, candidate: &Candidate<Value>) -> Option<Value> {
        (candidate.compute)(&Scope::new(self.def, self.values, self.settings)).filter(Value::is_finite)
    }

    fn satisfy(&mut self, entry: &Entry<Value>, candidate: &Candidate<Value>, value: Value) {
        let scope = Scope::new(self.def, self.values, self.settings);
        let derived = candidate
            .write_back
            .as_ref()
            .and_then(|wb| Some((wb.key, (wb.derive)(&scope, &value)?)))
            .filter(|(_, mm)| mm.is_finite());

        self.values.insert_new(entry.name, value);
        if let Some((key, mm)) = derived {
            reconcile(self.def, key, mm.into(), self.settings.report_threshold, self.journal);
        }
    }

    fn is_done(&self, name: &str) -> bool {
        self.values.contains(name)
    }
}
