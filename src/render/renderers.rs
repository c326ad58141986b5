//! Frame parts to draw, once each, after the frame is positioned.

use super::DrawOp;
use crate::calculators::names::*;
use crate::definition::keys;
use crate::resolve::{Candidate, Dep, Registry, Scope};
use glam::dvec2;

pub fn registry() -> Registry<Vec<DrawOp>> {
    Registry::<Vec<DrawOp>>::new("renderers")
        .entry(
            "gravitySpot",
            [Candidate::new([Dep::values(GRAVITY_SPOT)], |s| {
                Some(vec![DrawOp::disc(s.point(GRAVITY_SPOT)?, s.settings.center_radius)])
            })],
        )
        .entry(
            "seatTube",
            [Candidate::new(
                [Dep::values(BOTTOM_BRACKET), Dep::values(SEAT_TUBE_END)],
                |s| {
                    let thickness = tube_size(s, &[keys::SEAT_SIZE]);
                    Some(vec![DrawOp::tube(
                        s.point(BOTTOM_BRACKET)?,
                        s.point(SEAT_TUBE_END)?,
                        thickness,
                    )])
                },
            )],
        )
        .entry(
            "bottomBracket",
            [Candidate::new(
                [Dep::settings("bb_radius"), Dep::values(BOTTOM_BRACKET)],
                |s| {
                    let radius = s.zoom().apply(s.settings.bb_radius);
                    Some(vec![DrawOp::disc(s.point(BOTTOM_BRACKET)?, radius)])
                },
            )],
        )
        .entry(
            "ttl",
            [Candidate::new(
                [
                    Dep::values(HEAD_TOP),
                    Dep::values(BOTTOM_BRACKET),
                    Dep::values(TTL_SPOT),
                ],
                |s| {
                    let spot = s.point(TTL_SPOT)?;
                    Some(vec![
                        DrawOp::dashed(s.point(BOTTOM_BRACKET)?, spot),
                        DrawOp::dashed(s.point(HEAD_TOP)?, spot),
                    ])
                },
            )],
        )
        .entry(
            "stack",
            [Candidate::new(
                [Dep::values(BOTTOM_BRACKET), Dep::values(HEAD_TOP)],
                |s| {
                    let bb = s.point(BOTTOM_BRACKET)?;
                    let corner = dvec2(bb.x, s.point(HEAD_TOP)?.y);
                    Some(vec![DrawOp::dashed(bb, corner)])
                },
            )],
        )
        .entry(
            "reach",
            [Candidate::new(
                [Dep::values(BOTTOM_BRACKET), Dep::values(HEAD_TOP)],
                |s| {
                    let head_top = s.point(HEAD_TOP)?;
                    let corner = dvec2(s.point(BOTTOM_BRACKET)?.x, head_top.y);
                    Some(vec![DrawOp::dashed(head_top, corner)])
                },
            )],
        )
        .entry(
            "headTop",
            [Candidate::new([Dep::values(HEAD_TOP)], |s| {
                Some(vec![DrawOp::pixel(s.point(HEAD_TOP)?)])
            })],
        )
        .entry(
            "headBottom",
            [Candidate::new([Dep::values(HEAD_BOTTOM)], |s| {
                Some(vec![DrawOp::pixel(s.point(HEAD_BOTTOM)?)])
            })],
        )
        .entry(
            "head",
            [Candidate::new(
                [Dep::values(HEAD_TOP), Dep::values(HEAD_BOTTOM)],
                |s| {
                    let thickness = tube_size(s, &[keys::HEAD_SIZE]);
                    Some(vec![DrawOp::tube(s.point(HEAD_TOP)?, s.point(HEAD_BOTTOM)?, thickness)])
                },
            )],
        )
        .entry(
            "steererTop",
            [Candidate::new(
                [
                    Dep::settings("head_to_steerer"),
                    Dep::values(STEERER_TOP),
                    Dep::values(HEAD_BOTTOM),
                ],
                |s| {
                    let thickness = tube_size(s, &[keys::HEAD_SIZE]) * s.settings.head_to_steerer;
                    Some(vec![DrawOp::tube(
                        s.point(STEERER_TOP)?,
                        s.point(HEAD_BOTTOM)?,
                        thickness,
                    )])
                },
            )],
        )
        .entry(
            "rearWheelHub",
            [Candidate::new(
                [Dep::settings("hub_radius"), Dep::values(REAR_WHEEL_HUB)],
                |s| Some(vec![DrawOp::disc(s.point(REAR_WHEEL_HUB)?, hub_radius(s))]),
            )],
        )
        .entry(
            "chainstay",
            [Candidate::new(
                [Dep::values(BOTTOM_BRACKET), Dep::values(REAR_WHEEL_HUB)],
                |s| {
                    let thickness = tube_size(s, &[keys::SEAT_SIZE, keys::HEAD_SIZE]);
                    Some(vec![DrawOp::tube(
                        s.point(BOTTOM_BRACKET)?,
                        s.point(REAR_WHEEL_HUB)?,
                        thickness,
                    )])
                },
            )],
        )
        .entry(
            "rearWheel",
            [Candidate::new(
                [Dep::def(keys::WHEEL), Dep::values(REAR_WHEEL_HUB)],
                |s| wheel(s, REAR_WHEEL_HUB, 0.0),
            )],
        )
        .entry(
            "rearTire",
            [Candidate::new(
                [Dep::def(keys::WHEEL), Dep::def(keys::TIRE), Dep::values(REAR_WHEEL_HUB)],
                |s| wheel(s, REAR_WHEEL_HUB, s.num(keys::TIRE)?),
            )],
        )
        .entry(
            "frontWheelHubOffset",
            [Candidate::new(
                [
                    Dep::values(HEAD_BOTTOM),
                    Dep::values(FRONT_WHEEL_HUB_OFFSET),
                    Dep::values(FRONT_WHEEL_HUB),
                ],
                |s| {
                    let offset = s.point(FRONT_WHEEL_HUB_OFFSET)?;
                    Some(vec![
                        DrawOp::line(s.point(HEAD_BOTTOM)?, offset),
                        DrawOp::line(offset, s.point(FRONT_WHEEL_HUB)?),
                    ])
                },
            )],
        )
        .entry(
            "fork",
            [Candidate::new(
                [Dep::values(HEAD_BOTTOM), Dep::values(FRONT_WHEEL_HUB)],
                |s| Some(vec![DrawOp::line(s.point(HEAD_BOTTOM)?, s.point(FRONT_WHEEL_HUB)?)]),
            )],
        )
        .entry(
            "forkTrail",
            [Candidate::new(
                [
                    Dep::values(FRONT_WHEEL_HUB),
                    Dep::values(FRONT_WHEEL_HUB_OFFSET),
                    Dep::values(FORK_TRAIL_SPOT),
                    Dep::values(REAR_CONTACT_PATCH),
                ],
                |s| {
                    let hub = s.point(FRONT_WHEEL_HUB)?;
                    let spot = s.point(FORK_TRAIL_SPOT)?;
                    let below_hub = dvec2(hub.x, s.point(REAR_CONTACT_PATCH)?.y);
                    Some(vec![
                        DrawOp::dashed(spot, below_hub),
                        DrawOp::dashed(spot, s.point(FRONT_WHEEL_HUB_OFFSET)?),
                        DrawOp::dashed(hub, below_hub),
                    ])
                },
            )],
        )
        .entry(
            "frontWheelHub",
            [Candidate::new(
                [Dep::settings("hub_radius"), Dep::values(FRONT_WHEEL_HUB)],
                |s| Some(vec![DrawOp::disc(s.point(FRONT_WHEEL_HUB)?, hub_radius(s))]),
            )],
        )
        .entry(
            "frontWheel",
            [Candidate::new(
                [Dep::def(keys::WHEEL), Dep::values(FRONT_WHEEL_HUB)],
                |s| wheel(s, FRONT_WHEEL_HUB, 0.0),
            )],
        )
        .entry(
            "frontTire",
            [Candidate::new(
                [Dep::def(keys::WHEEL), Dep::def(keys::TIRE), Dep::values(FRONT_WHEEL_HUB)],
                |s| wheel(s, FRONT_WHEEL_HUB, s.num(keys::TIRE)?),
            )],
        )
}

/// Tube thickness in pixels from the first size key the definition has.
pub(crate) fn tube_size(s: &Scope<'_>, size_keys: &[&str]) -> f64 {
    let mm = size_keys
        .iter()
        .find_map(|k| s.num(k))
        .unwrap_or(s.settings.fallback_size);
    s.zoom().apply(mm)
}

fn hub_radius(s: &Scope<'_>) -> f64 {
    s.zoom().apply(s.settings.hub_radius)
}

/// Rim circle, or the tyre's outer circle when `tire` is non-zero.
fn wheel(s: &Scope<'_>, hub: &str, tire: f64) -> Option<Vec<DrawOp>> {
    let radius = s.zoom().apply(s.num(keys::WHEEL)? / 2.0 + tire);
    Some(vec![DrawOp::ring(s.point(hub)?, radius)])
}
