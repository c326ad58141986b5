//! Definition back-fill from resolved geometry.
//!
//! Correctors run once, after leveling. Each entry is named after the
//! definition key it writes. Unlike calculators they overwrite what the
//! caller gave; every write goes through [`reconcile`] so the difference is
//! recorded.

use crate::calculators::names::*;
use crate::definition::{DefValue, Definition, keys};
use crate::geometry::{absolute_distance, angle_between, rad_to_deg};
use crate::journal::{Reconciliation, reconcile};
use crate::resolve::{Candidate, Dep, Entry, Registry, Resolve, Scope};
use crate::settings::Settings;
use crate::store::ValueStore;
use glam::dvec2;
use rand::rngs::StdRng;
use std::cell::RefCell;

/// The corrector registry, in evaluation order.
pub fn registry() -> Registry<DefValue> {
    Registry::<DefValue>::new("correctors")
        .entry(
            keys::NAME,
            [Candidate::new([], |s| default_text(s, keys::NAME, "NO_NAME"))],
        )
        .entry(
            keys::DESCRIPTION,
            [Candidate::new([], |s| {
                default_text(s, keys::DESCRIPTION, "NO DESCRIPTION")
            })],
        )
        .entry(keys::COLOR, [Candidate::new([], random_color)])
        .entry(
            keys::STACK,
            [Candidate::new(
                [Dep::values(HEAD_TOP), Dep::values(BOTTOM_BRACKET)],
                |s| {
                    let bb = s.point(BOTTOM_BRACKET)?;
                    let head_top = s.point(HEAD_TOP)?;
                    mm(s, absolute_distance(bb, dvec2(bb.x, head_top.y)))
                },
            )],
        )
        .entry(
            keys::REACH,
            [Candidate::new(
                [Dep::values(HEAD_TOP), Dep::values(BOTTOM_BRACKET)],
                |s| {
                    let bb = s.point(BOTTOM_BRACKET)?;
                    let head_top = s.point(HEAD_TOP)?;
                    mm(s, absolute_distance(head_top, dvec2(bb.x, head_top.y)))
                },
            )],
        )
        .entry(
            keys::HEAD_TUBE,
            [Candidate::new(
                [Dep::values(HEAD_TOP), Dep::values(HEAD_BOTTOM)],
                |s| distance_mm(s, HEAD_TOP, HEAD_BOTTOM),
            )],
        )
        .entry(
            keys::HEAD_ANGLE,
            [Candidate::new(
                [Dep::values(HEAD_TOP), Dep::values(HEAD_BOTTOM)],
                |s| degrees(s, HEAD_TOP, HEAD_BOTTOM),
            )],
        )
        .entry(
            keys::BB_DROP,
            [
                Candidate::new(
                    [Dep::values(REAR_WHEEL_HUB), Dep::values(BOTTOM_BRACKET)],
                    |s| mm(s, s.point(BOTTOM_BRACKET)?.y - s.point(REAR_WHEEL_HUB)?.y),
                ),
                Candidate::new(
                    [Dep::values(FRONT_WHEEL_HUB), Dep::values(BOTTOM_BRACKET)],
                    |s| mm(s, s.point(BOTTOM_BRACKET)?.y - s.point(FRONT_WHEEL_HUB)?.y),
                ),
                Candidate::new(
                    [Dep::def(keys::BB_HEIGHT), Dep::def(keys::WHEEL), Dep::def(keys::TIRE)],
                    |s| {
                        crate::log::warn!(
                            "BB drop derived from BB height, only correct with the stock tyres"
                        );
                        let drop = s.num(keys::TIRE)? + s.num(keys::WHEEL)? / 2.0
                            - s.num(keys::BB_HEIGHT)?;
                        Some(drop.into())
                    },
                ),
            ],
        )
        .entry(
            keys::CHAINSTAY,
            [Candidate::new(
                [Dep::values(REAR_WHEEL_HUB), Dep::values(BOTTOM_BRACKET)],
                |s| distance_mm(s, REAR_WHEEL_HUB, BOTTOM_BRACKET),
            )],
        )
        .entry(
            keys::SEAT_TUBE,
            [Candidate::new(
                [Dep::values(SEAT_TUBE_END), Dep::values(BOTTOM_BRACKET)],
                |s| distance_mm(s, BOTTOM_BRACKET, SEAT_TUBE_END),
            )],
        )
        .entry(
            keys::SEAT_ANGLE,
            [
                Candidate::new(
                    [Dep::values(SEAT_TUBE_END), Dep::values(BOTTOM_BRACKET)],
                    |s| degrees(s, SEAT_TUBE_END, BOTTOM_BRACKET),
                ),
                Candidate::new([Dep::settings("default_seat_angle")], |s| {
                    if s.def.contains(keys::SEAT_ANGLE) {
                        return None;
                    }
                    Some(s.settings.default_seat_angle.into())
                }),
            ],
        )
        .entry(
            keys::TOP_TUBE_LENGTH,
            [Candidate::new(
                [Dep::values(TTL_SPOT), Dep::values(HEAD_TOP)],
                |s| mm(s, s.point(HEAD_TOP)?.x - s.point(TTL_SPOT)?.x),
            )],
        )
        .entry(
            keys::WHEEL_BASE,
            [Candidate::new(
                [Dep::values(FRONT_WHEEL_HUB), Dep::values(REAR_WHEEL_HUB)],
                |s| mm(s, s.point(FRONT_WHEEL_HUB)?.x - s.point(REAR_WHEEL_HUB)?.x),
            )],
        )
        .entry(
            keys::FORK_LENGTH,
            [Candidate::new(
                [Dep::values(FRONT_WHEEL_HUB), Dep::values(HEAD_BOTTOM)],
                |s| distance_mm(s, FRONT_WHEEL_HUB, HEAD_BOTTOM),
            )],
        )
        .entry(
            keys::FORK_OFFSET,
            [Candidate::new(
                [Dep::values(FRONT_WHEEL_HUB), Dep::values(FRONT_WHEEL_HUB_OFFSET)],
                |s| distance_mm(s, FRONT_WHEEL_HUB, FRONT_WHEEL_HUB_OFFSET),
            )],
        )
        .entry(
            keys::FORK_TRAIL,
            [Candidate::new(
                [Dep::values(FORK_TRAIL_SPOT), Dep::values(FRONT_WHEEL_HUB)],
                |s| mm(s, s.point(FORK_TRAIL_SPOT)?.x - s.point(FRONT_WHEEL_HUB)?.x),
            )],
        )
        .entry(
            keys::FORK_STEERER,
            [Candidate::new([Dep::settings("default_fork_steerer")], |s| {
                if s.def.contains(keys::FORK_STEERER) {
                    return None;
                }
                Some(s.settings.default_fork_steerer.into())
            })],
        )
}

fn default_text(s: &Scope<'_>, key: &str, fallback: &str) -> Option<DefValue> {
    if s.def.contains(key) {
        return None;
    }
    Some(fallback.into())
}

/// A translucent colour with random channels.
fn random_color(s: &Scope<'_>) -> Option<DefValue> {
    if s.def.contains(keys::COLOR) {
        return None;
    }
    let (r, g, b) = (s.random_channel(), s.random_channel(), s.random_channel());
    Some(format!("rgba({r}, {g}, {b}, 0.75)").into())
}

/// Pixels back to millimetres.
fn mm(s: &Scope<'_>, px: f64) -> Option<DefValue> {
    Some(s.zoom().undo(px).into())
}

fn distance_mm(s: &Scope<'_>, a: &str, b: &str) -> Option<DefValue> {
    mm(s, absolute_distance(s.point(a)?, s.point(b)?))
}

fn degrees(s: &Scope<'_>, from: &str, to: &str) -> Option<DefValue> {
    let angle = angle_between(s.point(from)?, s.point(to)?)?;
    Some(rad_to_deg(angle).into())
}

// ============================================================================
// Resolution target
// ============================================================================

/// Writes corrector results into a frame's definition.
pub struct Correct<'a> {
    pub def: &'a mut Definition,
    pub values: &'a ValueStore,
    pub settings: &'a Settings,
    pub rng: &'a RefCell<StdRng>,
    pub journal: &'a mut Vec<Reconciliation>,
}

impl Resolve<DefValue> for Correct<'_> {
    fn skip(&self, _: &str) -> bool {
        false
    }

    fn is_available(&self, dep: &Dep) -> bool {
        Scope::new(self.def, self.values, self.settings).is_available(dep)
    }

    fn compute(&self, candidate: &Candidate<DefValue>) -> Option<DefValue> {
        let scope = Scope::new(self.def, self.values, self.settings).with_rng(self.rng);
        match (candidate.compute)(&scope) {
            Some(DefValue::Number(n)) if !n.is_finite() => None,
            other => other,
        }
    }

    fn satisfy(&mut self, entry: &Entry<DefValue>, _: &Candidate<DefValue>, value: DefValue) {
        reconcile(self.def, entry.name, value, self.settings.report_threshold, self.journal);
    }

    fn is_done(&self, name: &str) -> bool {
        self.def.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::ReconcileKind;
    use crate::resolve::resolve_all;
    use rand::SeedableRng;

    fn correct(def: &mut Definition, values: &ValueStore) -> Vec<Reconciliation> {
        let settings = Settings::default();
        let rng = RefCell::new(StdRng::seed_from_u64(1));
        let mut journal = Vec::new();
        let mut target = Correct {
            def,
            values,
            settings: &settings,
            rng: &rng,
            journal: &mut journal,
        };
        resolve_all(&registry(), &mut target);
        journal
    }

    fn find<'a>(journal: &'a [Reconciliation], key: &str) -> Option<&'a Reconciliation> {
        journal.iter().find(|r| r.key == key)
    }

    #[test]
    fn descriptive_defaults_fill_only_missing_keys() {
        let mut def = Definition::from_pairs([(keys::NAME, "KTM")]);
        let journal = correct(&mut def, &ValueStore::new());

        assert_eq!(def.text(keys::NAME), Some("KTM"));
        assert_eq!(def.text(keys::DESCRIPTION), Some("NO DESCRIPTION"));
        assert!(def.text(keys::COLOR).unwrap().starts_with("rgba("));
        assert!(def.text(keys::COLOR).unwrap().ends_with(", 0.75)"));
        assert_eq!(def.number(keys::FORK_STEERER), Some(260.0));
        assert_eq!(def.number(keys::SEAT_ANGLE), Some(73.0));
        assert!(find(&journal, keys::NAME).is_none());
    }

    #[test]
    fn head_tube_is_measured_back_in_millimetres() {
        let mut values = ValueStore::new();
        values.insert_new(BOTTOM_BRACKET, dvec2(400.0, 300.0).into());
        values.insert_new(HEAD_TOP, dvec2(613.0, -42.0).into());
        values.insert_new(HEAD_BOTTOM, dvec2(639.0, 31.0).into());

        let mut def = Definition::from_pairs([(keys::REACH, 380.0), (keys::HEAD_ANGLE, 70.5)]);
        let journal = correct(&mut def, &values);

        assert_eq!(def.number(keys::STACK), Some(611.0));
        assert_eq!(def.number(keys::REACH), Some(380.0));
        assert_eq!(find(&journal, keys::REACH).unwrap().kind, ReconcileKind::Confirmed);
        assert_eq!(find(&journal, keys::STACK).unwrap().kind, ReconcileKind::Calculated);
        assert_eq!(def.number(keys::HEAD_TUBE), Some(138.0));

        let angle = def.number(keys::HEAD_ANGLE).unwrap();
        assert!((angle - 70.39).abs() < 0.01, "{angle}");
        assert_eq!(find(&journal, keys::HEAD_ANGLE).unwrap().kind, ReconcileKind::Overwritten);
    }

    #[test]
    fn bb_drop_prefers_the_rear_hub() {
        let mut values = ValueStore::new();
        values.insert_new(BOTTOM_BRACKET, dvec2(400.0, 300.0).into());
        values.insert_new(FRONT_WHEEL_HUB, dvec2(748.0, 280.0).into());
        let mut def = Definition::from_pairs([
            (keys::BB_HEIGHT, 300.0),
            (keys::WHEEL, 622.0),
            (keys::TIRE, 55.0),
        ]);
        correct(&mut def, &values);
        assert_eq!(def.number(keys::BB_DROP), Some(36.0));

        values.insert_new(REAR_WHEEL_HUB, dvec2(156.0, 269.0).into());
        correct(&mut def, &values);
        assert_eq!(def.number(keys::BB_DROP), Some(55.0));
    }

    #[test]
    fn bb_drop_from_bb_height() {
        let mut def = Definition::from_pairs([
            (keys::BB_HEIGHT, 330.0),
            (keys::WHEEL, 622.0),
            (keys::TIRE, 55.0),
        ]);
        correct(&mut def, &ValueStore::new());
        assert_eq!(def.number(keys::BB_DROP), Some(36.0));
    }

    #[test]
    fn same_seed_same_colour() {
        let mut a = Definition::new();
        let mut b = Definition::new();
        correct(&mut a, &ValueStore::new());
        correct(&mut b, &ValueStore::new());
        assert_eq!(a.text(keys::COLOR), b.text(keys::COLOR));
    }
}
