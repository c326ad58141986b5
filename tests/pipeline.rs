//! End-to-end properties of the frame pipeline.

use bgv::calculators::names::*;
use bgv::calculators::{self, Calculate};
use bgv::definition::keys;
use bgv::level::level;
use bgv::resolve::{Scope, resolve_to_fixed_point};
use bgv::store::ValueStore;
use bgv::{AlignTarget, Definition, Frame, Placement, ReconcileKind, Settings, Zoom};
use glam::{DVec2, dvec2};

fn scenario() -> Definition {
    Definition::from_pairs([
        (keys::REACH, 380.0),
        (keys::STACK, 610.0),
        (keys::HEAD_TUBE, 137.0),
        (keys::HEAD_ANGLE, 70.5),
        (keys::BB_DROP, 55.0),
        (keys::CHAINSTAY, 440.0),
        (keys::WHEEL, 622.0),
        (keys::TIRE, 55.0),
        (keys::FORK_LENGTH, 468.0),
        (keys::FORK_OFFSET, 43.0),
        (keys::FORK_STEERER, 260.0),
    ])
}

fn seeded() -> Settings {
    Settings::default().with_color_seed(42)
}

#[track_caller]
fn assert_near(actual: DVec2, expected: DVec2) {
    assert!(
        (actual - expected).length() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn scenario_golden_values() {
    let mut frame = Frame::new(scenario(), seeded()).unwrap();
    assert_eq!(frame.resolve_calculators().unwrap(), 1);

    let p = |name| frame.point(name).unwrap();
    assert_eq!(p(BOTTOM_BRACKET), dvec2(400.0, 300.0));
    assert_eq!(p(HEAD_TOP), dvec2(613.0, -42.0));
    assert_eq!(p(HEAD_BOTTOM), dvec2(639.0, 31.0));
    assert_eq!(p(REAR_WHEEL_HUB), dvec2(156.0, 269.0));
    assert_eq!(p(REAR_CONTACT_PATCH), dvec2(156.0, 474.0));
    assert_eq!(p(GRAVITY_SPOT), dvec2(506.0, 129.0));
    assert_near(p(STEERER_TOP), dvec2(590.2641985518694, -106.62565769945803));
    assert_near(p(FRONT_WHEEL_HUB_OFFSET), dvec2(726.1235902600142, 277.02942917505857));
    assert_near(p(FRONT_WHEEL_HUB), dvec2(748.7469860462265, 269.0180645534481));
    assert_near(p(FRONT_CONTACT_PATCH), dvec2(748.7469860462265, 474.0180645534481));
    assert_near(p(FORK_TRAIL_SPOT), dvec2(795.8809246249798, 474.0180645534481));
    assert_eq!(frame.values().dimension(FORK_STRAIGHT), Some(261.0));
}

#[test]
fn calculator_resolution_is_idempotent() {
    let mut frame = Frame::new(scenario(), seeded()).unwrap();
    frame.resolve_calculators().unwrap();
    let values = frame.values().clone();
    let def = frame.def().clone();

    assert_eq!(frame.resolve_calculators().unwrap(), 0);
    assert_eq!(frame.values(), &values);
    assert_eq!(frame.def(), &def);
}

#[test]
fn seeded_pipeline_is_deterministic() {
    let a = Frame::build(scenario(), seeded(), Placement::Centered).unwrap();
    let b = Frame::build(scenario(), seeded(), Placement::Centered).unwrap();
    assert_eq!(a.values(), b.values());
    assert_eq!(a.def(), b.def());
    assert_eq!(a.color(), b.color());
}

#[test]
fn first_eligible_head_top_candidate_wins() {
    let mut def = scenario();
    def.set(keys::SEAT_ANGLE, 73.0);
    def.set(keys::TOP_TUBE_LENGTH, 565.0);
    let settings = Settings::default();

    // Front hub placed where the circle intersection would land elsewhere.
    let mut values = ValueStore::new();
    values.insert_new(BOTTOM_BRACKET, dvec2(400.0, 300.0).into());
    values.insert_new(FRONT_WHEEL_HUB, dvec2(760.0, 280.0).into());

    let registry = calculators::registry();
    let head_top = registry.get(HEAD_TOP).unwrap();
    let scope = Scope::new(&def, &values, &settings);
    assert_eq!(head_top.candidates.len(), 2);
    assert!(
        head_top
            .candidates
            .iter()
            .all(|c| c.deps.iter().all(|d| scope.is_available(d)))
    );

    let mut journal = Vec::new();
    let mut target = Calculate {
        def: &mut def,
        values: &mut values,
        settings: &settings,
        journal: &mut journal,
    };
    resolve_to_fixed_point(&registry, &mut target).unwrap();
    assert_eq!(values.point(HEAD_TOP), Some(dvec2(613.0, -42.0)));
}

#[test]
fn second_head_top_candidate_used_when_first_is_ineligible() {
    let mut def = scenario();
    def.remove(keys::REACH);
    def.remove(keys::STACK);
    def.set(keys::SEAT_ANGLE, 73.0);
    def.set(keys::TOP_TUBE_LENGTH, 565.0);
    let settings = Settings::default();

    let mut values = ValueStore::new();
    values.insert_new(BOTTOM_BRACKET, dvec2(400.0, 300.0).into());
    values.insert_new(FRONT_WHEEL_HUB, dvec2(748.0, 269.0).into());

    let mut journal = Vec::new();
    let mut target = Calculate {
        def: &mut def,
        values: &mut values,
        settings: &settings,
        journal: &mut journal,
    };
    resolve_to_fixed_point(&calculators::registry(), &mut target).unwrap();

    let head_top = values.point(HEAD_TOP).expect("head top from the front hub");
    assert_ne!(head_top, dvec2(613.0, -42.0));
    assert!(head_top.y < 300.0);
}

#[test]
fn leveling_rotates_about_the_rear_contact_patch() {
    let mut values = ValueStore::new();
    let rear = dvec2(0.0, 100.0);
    values.insert_new(REAR_CONTACT_PATCH, rear.into());
    values.insert_new(FRONT_CONTACT_PATCH, dvec2(1000.0, 110.0).into());
    values.insert_new(BOTTOM_BRACKET, dvec2(430.0, 60.0).into());
    values.insert_new(HEAD_TOP, dvec2(640.0, -280.0).into());
    values.insert_new(FORK_STRAIGHT, 261.0.into());

    let before: Vec<(String, f64)> = values
        .points()
        .map(|(name, p)| (name.to_string(), p.distance(rear)))
        .collect();

    let leveling = level(&mut values).unwrap();
    assert_eq!(leveling.pixel_delta, 10.0);

    let front = values.point(FRONT_CONTACT_PATCH).unwrap();
    assert!((front.y - 100.0).abs() <= 1.0, "{front:?}");
    assert_eq!(values.point(REAR_CONTACT_PATCH), Some(rear));
    for (name, distance) in before {
        let after = values.point(&name).unwrap().distance(rear);
        assert!((after - distance).abs() < 1e-9, "{name}: {distance} -> {after}");
    }
    assert_eq!(values.dimension(FORK_STRAIGHT), Some(261.0));
}

#[test]
fn zoom_round_trip_stays_within_a_millimetre() {
    for factor in [0.5, 0.56] {
        let zoom = Zoom::try_new(factor).unwrap();
        for mm in 0..2000 {
            let x = mm as f64;
            let back = zoom.undo(zoom.apply(x));
            assert!((back - x).abs() <= 1.0, "factor {factor}: {x} -> {back}");
        }
    }
    let half = Zoom::try_new(0.5).unwrap();
    assert_eq!(half.undo(half.apply(380.0)), 380.0);
}

#[test]
fn top_tube_length_is_calculated_not_overwritten() {
    let def = Definition::from_pairs([
        (keys::REACH, 380.0),
        (keys::STACK, 610.0),
        (keys::HEAD_TUBE, 137.0),
        (keys::HEAD_ANGLE, 70.5),
        (keys::BB_DROP, 55.0),
        (keys::CHAINSTAY, 440.0),
        (keys::WHEEL, 622.0),
        (keys::TIRE, 55.0),
        (keys::FORK_LENGTH, 468.0),
        (keys::FORK_OFFSET, 43.0),
    ]);
    let frame = Frame::build(def, seeded(), Placement::Centered).unwrap();

    assert!(frame.def().number(keys::TOP_TUBE_LENGTH).is_some());
    let kinds: Vec<_> = frame
        .reconciliations()
        .iter()
        .filter(|r| r.key == keys::TOP_TUBE_LENGTH)
        .map(|r| r.kind)
        .collect();
    assert_eq!(kinds, [ReconcileKind::Calculated]);
    assert!(
        frame
            .reconciliations()
            .iter()
            .any(|r| r.key == keys::SEAT_ANGLE && r.kind == ReconcileKind::Calculated)
    );
}

#[test]
fn cosmetic_differences_do_not_move_aligned_frames() {
    let mut red = scenario();
    red.set(keys::COLOR, "rgba(255, 0, 0, 0.75)");
    red.set(keys::DESCRIPTION, "red one");
    let mut blue = scenario();
    blue.set(keys::COLOR, "rgba(0, 0, 255, 0.75)");
    blue.set(keys::DESCRIPTION, "blue one");

    let reference = Frame::build(red, seeded(), Placement::Centered).unwrap();
    let aligned = Frame::build(
        blue,
        seeded(),
        Placement::AlignedTo {
            reference: &reference,
            target: AlignTarget::BottomBracket,
        },
    )
    .unwrap();

    assert_eq!(aligned.point(BOTTOM_BRACKET), reference.point(BOTTOM_BRACKET));
    assert_eq!(
        aligned.point(REAR_CONTACT_PATCH).map(|p| p.y),
        reference.point(REAR_CONTACT_PATCH).map(|p| p.y)
    );
    assert_eq!(aligned.color(), "rgba(0, 0, 255, 0.75)");
}
