//! Measurement labels drawn next to the frame parts.

use super::{Align, DrawOp};
use crate::calculators::names::*;
use crate::definition::keys;
use crate::geometry::{angle_between, deg_to_rad, point_at};
use crate::resolve::{Candidate, Dep, Registry, Scope};
use crate::types::to_int;
use glam::{DVec2, dvec2};
use std::f64::consts::{FRAC_PI_2, PI};

pub fn registry() -> Registry<Vec<DrawOp>> {
    Registry::<Vec<DrawOp>>::new("labels")
        .entry(
            keys::TOP_TUBE_LENGTH,
            [Candidate::new(
                [
                    Dep::def(keys::TOP_TUBE_LENGTH),
                    Dep::values(HEAD_TOP),
                    Dep::values(TTL_SPOT),
                ],
                top_tube_length,
            )],
        )
        .entry(
            keys::STACK,
            [Candidate::new(
                [
                    Dep::settings("bb_radius"),
                    Dep::values(BOTTOM_BRACKET),
                    Dep::def(keys::STACK),
                ],
                |s| {
                    let bb = s.point(BOTTOM_BRACKET)?;
                    let at = dvec2(
                        bb.x + pad_v(s),
                        bb.y - s.zoom().apply(s.settings.bb_radius) - font(s),
                    );
                    Some(vec![label(s, "STACK", keys::STACK, at, FRAC_PI_2, Align::Right)?])
                },
            )],
        )
        .entry(
            keys::REACH,
            [Candidate::new(
                [
                    Dep::def(keys::REACH),
                    Dep::values(BOTTOM_BRACKET),
                    Dep::values(HEAD_TOP),
                ],
                |s| {
                    let at = dvec2(
                        s.point(BOTTOM_BRACKET)?.x + pad_v(s),
                        s.point(HEAD_TOP)?.y + font(s),
                    );
                    Some(vec![label(s, "REACH", keys::REACH, at, 0.0, Align::Left)?])
                },
            )],
        )
        .entry(
            keys::FORK_OFFSET,
            [Candidate::new(
                [
                    Dep::settings("hub_radius"),
                    Dep::def(keys::HEAD_ANGLE),
                    Dep::def(keys::FORK_OFFSET),
                    Dep::values(FRONT_WHEEL_HUB),
                ],
                |s| {
                    let angle = deg_to_rad(s.num(keys::HEAD_ANGLE)? - 90.0);
                    let p = point_at(s.point(FRONT_WHEEL_HUB)?, hub_radius(s) + pad_v(s), angle);
                    let at = p + dvec2(0.0, pad_v(s));
                    Some(vec![label(s, "OFFSET", keys::FORK_OFFSET, at, angle, Align::Left)?])
                },
            )],
        )
        .entry(
            keys::CHAINSTAY,
            [Candidate::new(
                [
                    Dep::def(keys::BB_DROP),
                    Dep::def(keys::CHAINSTAY),
                    Dep::values(REAR_WHEEL_HUB),
                    Dep::settings("hub_radius"),
                ],
                |s| {
                    let ratio = s.num(keys::BB_DROP)? / s.num(keys::CHAINSTAY)?;
                    if !(-1.0..=1.0).contains(&ratio) {
                        return None;
                    }
                    let hub = s.point(REAR_WHEEL_HUB)?;
                    let at = dvec2(hub.x + pad_h(s), hub.y - hub_radius(s));
                    Some(vec![label(s, "CHAINSTAY", keys::CHAINSTAY, at, ratio.asin(), Align::Left)?])
                },
            )],
        )
        .entry(
            keys::TIRE,
            [Candidate::new(
                [Dep::values(REAR_CONTACT_PATCH), Dep::def(keys::TIRE)],
                |s| {
                    let patch = s.point(REAR_CONTACT_PATCH)?;
                    let at = dvec2(patch.x + font(s), patch.y - s.px(keys::TIRE)? - pad_h(s));
                    Some(vec![label(s, "TIRE", keys::TIRE, at, -FRAC_PI_2, Align::Left)?])
                },
            )],
        )
        .entry(
            keys::WHEEL,
            [Candidate::new(
                [
                    Dep::values(REAR_WHEEL_HUB),
                    Dep::values(REAR_CONTACT_PATCH),
                    Dep::def(keys::WHEEL),
                    Dep::settings("hub_radius"),
                ],
                |s| {
                    let at = dvec2(
                        s.point(REAR_CONTACT_PATCH)?.x - pad_v(s),
                        s.point(REAR_WHEEL_HUB)?.y + hub_radius(s) + pad_h(s),
                    );
                    Some(vec![label(s, "WHEEL", keys::WHEEL, at, -FRAC_PI_2, Align::Right)?])
                },
            )],
        )
        .entry(
            keys::FORK_LENGTH,
            [Candidate::new(
                [
                    Dep::values(HEAD_BOTTOM),
                    Dep::values(FRONT_WHEEL_HUB),
                    Dep::settings("hub_radius"),
                    Dep::def(keys::FORK_LENGTH),
                ],
                |s| {
                    let hub = s.point(FRONT_WHEEL_HUB)?;
                    let angle = angle_between(s.point(HEAD_BOTTOM)?, hub)?;
                    let p = point_at(hub, hub_radius(s) + pad_h(s), PI + angle);
                    let at = p + dvec2(pad_h(s), pad_v(s));
                    Some(vec![label(s, "AXLE TO CROWN", keys::FORK_LENGTH, at, angle, Align::Right)?])
                },
            )],
        )
        .entry(
            keys::FORK_TRAIL,
            [Candidate::new(
                [Dep::def(keys::FORK_TRAIL), Dep::values(FRONT_CONTACT_PATCH)],
                |s| {
                    let at = s.point(FRONT_CONTACT_PATCH)? + dvec2(0.0, font(s));
                    Some(vec![label(s, "TRAIL", keys::FORK_TRAIL, at, 0.0, Align::Left)?])
                },
            )],
        )
        .entry(
            keys::SEAT_TUBE,
            [Candidate::new(
                [
                    Dep::def(keys::SEAT_TUBE),
                    Dep::def(keys::SEAT_ANGLE),
                    Dep::values(SEAT_TUBE_END),
                    Dep::values(TTL_SPOT),
                ],
                seat_tube,
            )],
        )
        .entry(
            keys::SEAT_ANGLE,
            [Candidate::new(
                [
                    Dep::def(keys::SEAT_ANGLE),
                    Dep::values(SEAT_TUBE_END),
                    Dep::values(TTL_SPOT),
                ],
                |s| {
                    let seat_angle = s.num(keys::SEAT_ANGLE)?;
                    let distance = font(s) + seat_half_width(s);
                    let at = point_at(s.point(SEAT_TUBE_END)?, distance, deg_to_rad(seat_angle + 90.0));
                    Some(vec![DrawOp::text(
                        angle_text(seat_angle),
                        at,
                        deg_to_rad(seat_angle),
                        Align::Left,
                    )])
                },
            )],
        )
        .entry(
            keys::HEAD_TUBE,
            [Candidate::new(
                [
                    Dep::def(keys::HEAD_TUBE),
                    Dep::def(keys::HEAD_ANGLE),
                    Dep::values(HEAD_TOP),
                ],
                |s| {
                    let head_top = s.point(HEAD_TOP)?;
                    let head_angle = s.num(keys::HEAD_ANGLE)?;
                    let rotation = deg_to_rad(head_angle);
                    let length_at = head_top + dvec2(font(s), 0.0);
                    let angle_at = head_top + dvec2(-font(s) - pad_h(s), font(s));
                    Some(vec![
                        label(s, "HEAD", keys::HEAD_TUBE, length_at, rotation, Align::Left)?,
                        DrawOp::text(angle_text(head_angle), angle_at, rotation, Align::Left),
                    ])
                },
            )],
        )
        .entry(
            keys::WHEEL_BASE,
            [Candidate::new(
                [Dep::def(keys::WHEEL_BASE), Dep::values(REAR_CONTACT_PATCH)],
                |s| {
                    let at = s.point(REAR_CONTACT_PATCH)? + dvec2(0.0, font(s));
                    Some(vec![label(s, "WHEEL BASE", keys::WHEEL_BASE, at, 0.0, Align::Left)?])
                },
            )],
        )
}

fn top_tube_length(s: &Scope<'_>) -> Option<Vec<DrawOp>> {
    let head_top = s.point(HEAD_TOP)?;
    // clear the seat tube when it rises above the top tube
    let shift = match s.point(SEAT_TUBE_END) {
        Some(end) if end.y < head_top.y => seat_half_width(s),
        _ => 0.0,
    };
    let at = dvec2(
        s.point(TTL_SPOT)?.x + pad_v(s) + shift,
        head_top.y - pad_v(s),
    );
    Some(vec![label(s, "TOP TUBE LENGTH", keys::TOP_TUBE_LENGTH, at, 0.0, Align::Left)?])
}

/// Seat tube label, pushed down the tube when it would run into the top
/// tube label.
fn seat_tube(s: &Scope<'_>) -> Option<Vec<DrawOp>> {
    let seat_angle = s.num(keys::SEAT_ANGLE)?;
    let end = s.point(SEAT_TUBE_END)?;
    let across = deg_to_rad(seat_angle - 90.0);
    let along = deg_to_rad(seat_angle);

    let padding = pad_v(s) + seat_half_width(s);
    let mut at = point_at(end, padding, across);
    let clash = point_at(end, padding + font(s) + pad_v(s), across);
    let ttl_y = s.point(TTL_SPOT)?.y;
    if clash.y < ttl_y {
        at = point_at(at, ttl_y - clash.y, along);
    }
    Some(vec![label(s, "SEAT TUBE", keys::SEAT_TUBE, at, along, Align::Left)?])
}

/// `"<TITLE> <mm>mm"` for definition entry `key`.
fn label(s: &Scope<'_>, title: &str, key: &str, at: DVec2, angle: f64, align: Align) -> Option<DrawOp> {
    let mm = to_int(s.num(key)?);
    Some(DrawOp::text(format!("{title} {mm}mm"), at, angle, align))
}

fn angle_text(degrees: f64) -> String {
    format!("\u{2222} {degrees:.2}\u{b0}")
}

fn font(s: &Scope<'_>) -> f64 {
    s.settings.labels_font_size
}

fn pad_h(s: &Scope<'_>) -> f64 {
    s.settings.labels_pad_horizontal
}

fn pad_v(s: &Scope<'_>) -> f64 {
    s.settings.labels_pad_vertical
}

fn hub_radius(s: &Scope<'_>) -> f64 {
    s.zoom().apply(s.settings.hub_radius)
}

fn seat_half_width(s: &Scope<'_>) -> f64 {
    match s.num(keys::SEAT_SIZE) {
        Some(size) => s.zoom().apply(size) / 2.0,
        None => pad_v(s),
    }
}
