//! Dependency-driven resolution of named formula registries.
//!
//! A [`Registry`] is an ordered list of named entries, each holding ordered
//! candidate formulas. A candidate declares the values it reads as [`Dep`]s;
//! it is eligible once every one of them is available. Within one pass the
//! first eligible candidate of an entry is the only one tried, even when it
//! yields nothing.
//!
//! What "available", "already done" and "store the result" mean is up to the
//! [`Resolve`] implementation driving the pass, so the same engine serves
//! calculators (writing frame values), correctors (writing definition
//! entries) and renderers (emitting draw operations).

use crate::definition::Definition;
use crate::errors::FrameError;
use crate::settings::Settings;
use crate::store::ValueStore;
use crate::types::Zoom;
use glam::DVec2;
use rand::Rng;
use rand::rngs::StdRng;
use std::cell::RefCell;

// ============================================================================
// Dependencies
// ============================================================================

/// Where a dependency is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// The frame's raw measurements
    Def,
    /// The frame's resolved values
    Values,
    /// The shared canvas (`center`, `width`, `height`)
    Canvas,
    /// Application settings
    Settings,
}

/// A single dependency path: a root and a key below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dep {
    pub root: Root,
    pub key: &'static str,
}

impl Dep {
    pub const fn def(key: &'static str) -> Self {
        Self { root: Root::Def, key }
    }

    pub const fn values(key: &'static str) -> Self {
        Self { root: Root::Values, key }
    }

    pub const fn canvas(key: &'static str) -> Self {
        Self { root: Root::Canvas, key }
    }

    pub const fn settings(key: &'static str) -> Self {
        Self { root: Root::Settings, key }
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Read-only view of one frame handed to every formula.
///
/// The lookup helpers return `Option` so formulas can use `?` on anything
/// their dependency list does not already guarantee.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub def: &'a Definition,
    pub values: &'a ValueStore,
    pub settings: &'a Settings,
    rng: Option<&'a RefCell<StdRng>>,
}

impl<'a> Scope<'a> {
    pub fn new(def: &'a Definition, values: &'a ValueStore, settings: &'a Settings) -> Self {
        Self {
            def,
            values,
            settings,
            rng: None,
        }
    }

    /// Draw random numbers from `rng` instead of the thread-local generator.
    pub fn with_rng(mut self, rng: &'a RefCell<StdRng>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Whether `dep` resolves to a defined value.
    pub fn is_available(&self, dep: &Dep) -> bool {
        match dep.root {
            Root::Def => self.def.contains(dep.key),
            Root::Values => self.values.contains(dep.key),
            Root::Canvas => matches!(dep.key, "center" | "width" | "height"),
            Root::Settings => self.setting(dep.key).is_some(),
        }
    }

    #[inline]
    pub fn zoom(&self) -> Zoom {
        self.settings.zoom
    }

    /// A definition number.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.def.number(key)
    }

    /// A definition number in pixels.
    pub fn px(&self, key: &str) -> Option<f64> {
        self.num(key).map(|mm| self.zoom().apply(mm))
    }

    pub fn point(&self, name: &str) -> Option<DVec2> {
        self.values.point(name)
    }

    pub fn dim(&self, name: &str) -> Option<f64> {
        self.values.dimension(name)
    }

    pub fn canvas_center(&self) -> DVec2 {
        self.settings.canvas_center()
    }

    /// A numeric setting by name.
    pub fn setting(&self, key: &str) -> Option<f64> {
        let s = self.settings;
        let value = match key {
            "zoom" => s.zoom.factor(),
            "bb_radius" => s.bb_radius,
            "center_radius" => s.center_radius,
            "hub_radius" => s.hub_radius,
            "fallback_size" => s.fallback_size,
            "head_to_steerer" => s.head_to_steerer,
            "labels_font_size" => s.labels_font_size,
            "labels_pad_horizontal" => s.labels_pad_horizontal,
            "labels_pad_vertical" => s.labels_pad_vertical,
            "default_fork_steerer" => s.default_fork_steerer,
            "default_seat_angle" => s.default_seat_angle,
            _ => return None,
        };
        Some(value)
    }

    /// A random value in `0..255`, from the frame's generator when it has one.
    pub fn random_channel(&self) -> u8 {
        match self.rng {
            Some(cell) => cell.borrow_mut().random_range(0..255),
            None => rand::rng().random_range(0..255),
        }
    }
}

// ============================================================================
// Registries
// ============================================================================

/// A formula computing a value from a [`Scope`], or `None` when the geometry
/// has no solution.
pub type Compute<T> = fn(&Scope<'_>) -> Option<T>;

/// One formula and the values it reads.
pub struct Candidate<T> {
    pub deps: Vec<Dep>,
    pub compute: Compute<T>,
    pub write_back: Option<WriteBack<T>>,
}

impl<T> Candidate<T> {
    pub fn new(deps: impl IntoIterator<Item = Dep>, compute: Compute<T>) -> Self {
        Self {
            deps: deps.into_iter().collect(),
            compute,
            write_back: None,
        }
    }

    /// Also derive definition entry `key` whenever this formula stores a
    /// value.
    pub fn with_write_back(mut self, key: &'static str, derive: fn(&Scope<'_>, &T) -> Option<f64>) -> Self {
        self.write_back = Some(WriteBack { key, derive });
        self
    }

    /// Check every dependency against `target`, then run the formula.
    pub fn evaluate<R: Resolve<T> + ?Sized>(&self, target: &R) -> Eligibility<T> {
        if self.deps.iter().all(|d| target.is_available(d)) {
            Eligibility::Eligible(target.compute(self))
        } else {
            Eligibility::Ineligible
        }
    }
}

/// Outcome of trying a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility<T> {
    /// Some dependency is missing
    Ineligible,
    /// All dependencies were present; the formula may still have found no
    /// solution
    Eligible(Option<T>),
}

/// A definition value derived as a side effect of storing a candidate's result.
pub struct WriteBack<T> {
    pub key: &'static str,
    pub derive: fn(&Scope<'_>, &T) -> Option<f64>,
}

/// A named list of candidates.
pub struct Entry<T> {
    pub name: &'static str,
    pub candidates: Vec<Candidate<T>>,
}

/// Ordered collection of entries. Declaration order is evaluation order.
pub struct Registry<T> {
    label: &'static str,
    entries: Vec<Entry<T>>,
}

impl<T> Registry<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn entry(mut self, name: &'static str, candidates: impl IntoIterator<Item = Candidate<T>>) -> Self {
        self.entries.push(Entry {
            name,
            candidates: candidates.into_iter().collect(),
        });
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Entry<T>> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// The side of a resolution pass that owns the data.
pub trait Resolve<T> {
    /// Entries for which this returns `true` are not evaluated this pass.
    fn skip(&self, name: &str) -> bool;

    /// Whether a dependency currently resolves to a defined value.
    fn is_available(&self, dep: &Dep) -> bool;

    /// Run the formula of `candidate` against the current data.
    fn compute(&self, candidate: &Candidate<T>) -> Option<T>;

    /// Store the value `candidate` produced for `entry`.
    fn satisfy(&mut self, entry: &Entry<T>, candidate: &Candidate<T>, value: T);

    /// Whether `name` counts as resolved.
    fn is_done(&self, name: &str) -> bool;
}

/// What one pass over a registry did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pass {
    /// Entries that stored a value
    pub produced: Vec<&'static str>,
    /// Entries whose first eligible candidate found no solution
    pub no_solution: Vec<&'static str>,
    /// Entries with no eligible candidate
    pub ineligible: Vec<&'static str>,
    /// Entries reported done at the end of their turn
    pub done: Vec<&'static str>,
}

impl Pass {
    pub fn any_produced(&self) -> bool {
        !self.produced.is_empty()
    }
}

/// Run one pass over `registry`.
pub fn resolve_all<T, R: Resolve<T>>(registry: &Registry<T>, target: &mut R) -> Pass {
    let mut pass = Pass::default();

    for entry in registry.entries() {
        if target.skip(entry.name) {
            continue;
        }

        let outcome = entry
            .candidates
            .iter()
            .find_map(|candidate| match candidate.evaluate(&*target) {
                Eligibility::Ineligible => None,
                Eligibility::Eligible(value) => Some((candidate, value)),
            });

        match outcome {
            Some((candidate, Some(value))) => {
                target.satisfy(entry, candidate, value);
                crate::log::debug!(registry = registry.label(), name = entry.name, "satisfied");
                pass.produced.push(entry.name);
            }
            Some((_, None)) => {
                crate::log::debug!(registry = registry.label(), name = entry.name, "no solution");
                pass.no_solution.push(entry.name);
            }
            None => {
                crate::log::debug!(registry = registry.label(), name = entry.name, "missing dependencies");
                pass.ineligible.push(entry.name);
            }
        }

        if target.is_done(entry.name) {
            pass.done.push(entry.name);
        }
    }

    pass
}

/// Repeat [`resolve_all`] until a pass produces nothing.
///
/// Returns the number of passes that produced something. A registry whose
/// passes keep producing beyond one pass per entry is reported as
/// [`FrameError::NonConvergence`].
pub fn resolve_to_fixed_point<T, R: Resolve<T>>(
    registry: &Registry<T>,
    target: &mut R,
) -> Result<usize, FrameError> {
    let cap = registry.len().max(1);
    let mut passes = 0;
    loop {
        let pass = resolve_all(registry, target);
        crate::log::debug!(
            registry = registry.label(),
            pass = passes + 1,
            produced = ?pass.produced,
            unresolved = ?pass.ineligible,
            "pass finished"
        );
        if !pass.any_produced() {
            crate::log::debug!(
                registry = registry.label(),
                passes,
                unresolved = ?pass.ineligible,
                "fixed point reached"
            );
            return Ok(passes);
        }
        passes += 1;
        if passes > cap {
            return Err(FrameError::NonConvergence {
                registry: registry.label(),
                passes,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use glam::dvec2;
    use std::collections::BTreeMap;

    /// A bare target over a map of numbers, for exercising the engine alone.
    #[derive(Default)]
    struct Slots {
        inputs: BTreeMap<&'static str, f64>,
        out: BTreeMap<&'static str, f64>,
        calls: Vec<&'static str>,
    }

    impl Resolve<f64> for Slots {
        fn skip(&self, name: &str) -> bool {
            self.out.contains_key(name)
        }

        fn is_available(&self, dep: &Dep) -> bool {
            match dep.root {
                Root::Def => self.inputs.contains_key(dep.key),
                Root::Values => self.out.contains_key(dep.key),
                _ => false,
            }
        }

        fn compute(&self, candidate: &Candidate<f64>) -> Option<f64> {
            let def = Definition::from_pairs(self.inputs.iter().map(|(k, v)| (*k, *v)));
            let mut values = ValueStore::new();
            for (k, v) in &self.out {
                values.insert_new(k, Value::Dimension(*v));
            }
            let settings = Settings::default();
            let scope = Scope::new(&def, &values, &settings);
            (candidate.compute)(&scope)
        }

        fn satisfy(&mut self, entry: &Entry<f64>, _: &Candidate<f64>, value: f64) {
            self.calls.push(entry.name);
            self.out.insert(entry.name, value);
        }

        fn is_done(&self, name: &str) -> bool {
            self.out.contains_key(name)
        }
    }

    fn chain() -> Registry<f64> {
        // Declared out of dependency order on purpose: `c` needs `b`.
        Registry::new("test")
            .entry(
                "c",
                [Candidate::new([Dep::values("b")], |s| Some(s.dim("b")? * 10.0))],
            )
            .entry("a", [Candidate::new([Dep::def("x")], |s| s.num("x"))])
            .entry(
                "b",
                [Candidate::new([Dep::values("a")], |s| Some(s.dim("a")? + 1.0))],
            )
    }

    #[test]
    fn later_entries_see_earlier_results_in_the_same_pass() {
        let mut slots = Slots::default();
        slots.inputs.insert("x", 2.0);

        let pass = resolve_all(&chain(), &mut slots);
        assert_eq!(pass.produced, ["a", "b"]);
        assert_eq!(pass.ineligible, ["c"]);

        let passes = resolve_to_fixed_point(&chain(), &mut slots).unwrap();
        assert_eq!(passes, 1);
        assert_eq!(slots.out["c"], 30.0);
    }

    #[test]
    fn fixed_point_is_idempotent() {
        let mut slots = Slots::default();
        slots.inputs.insert("x", 2.0);
        let registry = chain();
        assert_eq!(resolve_to_fixed_point(&registry, &mut slots).unwrap(), 2);
        let before = slots.out.clone();
        assert_eq!(resolve_to_fixed_point(&registry, &mut slots).unwrap(), 0);
        assert_eq!(slots.out, before);
    }

    #[test]
    fn missing_inputs_leave_entries_unresolved() {
        let mut slots = Slots::default();
        assert_eq!(resolve_to_fixed_point(&chain(), &mut slots).unwrap(), 0);
        assert!(slots.out.is_empty());
        assert!(slots.calls.is_empty());
    }

    #[test]
    fn first_eligible_candidate_wins_even_without_a_value() {
        let registry = Registry::new("test").entry(
            "v",
            [
                Candidate::new([Dep::def("x")], |_| None),
                Candidate::new([Dep::def("y")], |s| s.num("y")),
            ],
        );

        let mut both = Slots::default();
        both.inputs.insert("x", 1.0);
        both.inputs.insert("y", 5.0);
        let pass = resolve_all(&registry, &mut both);
        assert_eq!(pass.no_solution, ["v"]);
        assert!(!both.out.contains_key("v"));

        let mut second_only = Slots::default();
        second_only.inputs.insert("y", 5.0);
        resolve_all(&registry, &mut second_only);
        assert_eq!(second_only.out["v"], 5.0);
    }

    #[test]
    fn endless_progress_is_non_convergence() {
        struct Restless(usize);
        impl Resolve<f64> for Restless {
            fn skip(&self, _: &str) -> bool {
                false
            }
            fn is_available(&self, _: &Dep) -> bool {
                true
            }
            fn compute(&self, _: &Candidate<f64>) -> Option<f64> {
                Some(1.0)
            }
            fn satisfy(&mut self, _: &Entry<f64>, _: &Candidate<f64>, _: f64) {
                self.0 += 1;
            }
            fn is_done(&self, _: &str) -> bool {
                false
            }
        }

        let registry = Registry::new("restless").entry("v", [Candidate::new([], |_| Some(1.0))]);
        let err = resolve_to_fixed_point(&registry, &mut Restless(0)).unwrap_err();
        assert_eq!(
            err,
            FrameError::NonConvergence {
                registry: "restless",
                passes: 2
            }
        );
    }

    #[test]
    fn candidate_eligibility_is_explicit() {
        let def = Definition::from_pairs([("reach", 380.0)]);
        let mut values = ValueStore::new();
        values.insert_new("bottomBracket", Value::Point(dvec2(400.0, 300.0)));
        let settings = Settings::default();
        let scope = Scope::new(&def, &values, &settings);

        let ok: Candidate<f64> = Candidate::new(
            [Dep::def("reach"), Dep::values("bottomBracket"), Dep::canvas("center")],
            |s| s.px("reach"),
        );
        assert!(ok.deps.iter().all(|d| scope.is_available(d)));

        let mut slots = Slots::default();
        slots.inputs.insert("reach", 380.0);
        let from_def: Candidate<f64> = Candidate::new([Dep::def("reach")], |s| s.px("reach"));
        assert_eq!(from_def.evaluate(&slots), Eligibility::Eligible(Some(213.0)));

        let none: Candidate<f64> = Candidate::new([Dep::def("reach")], |_| None);
        assert_eq!(none.evaluate(&slots), Eligibility::Eligible(None));

        let missing: Candidate<f64> = Candidate::new([Dep::def("stack")], |s| s.px("stack"));
        assert_eq!(missing.evaluate(&slots), Eligibility::Ineligible);

        assert!(scope.is_available(&Dep::settings("hub_radius")));
        assert!(!scope.is_available(&Dep::settings("nope")));
    }

    #[test]
    fn seeded_scopes_draw_the_same_channels() {
        use rand::SeedableRng;

        let def = Definition::new();
        let values = ValueStore::new();
        let settings = Settings::default();
        let a = RefCell::new(StdRng::seed_from_u64(7));
        let b = RefCell::new(StdRng::seed_from_u64(7));
        let draw = |rng: &RefCell<StdRng>| {
            let scope = Scope::new(&def, &values, &settings).with_rng(rng);
            [scope.random_channel(), scope.random_channel(), scope.random_channel()]
        };
        assert_eq!(draw(&a), draw(&b));
    }
}
