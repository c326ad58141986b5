//! Resolved values of one frame.

use crate::types::{Axis, BBox, Value};
use glam::DVec2;
use std::collections::BTreeMap;

/// Named render-space values, filled in monotonically by the calculators.
///
/// A name, once stored, is never recomputed. Only whole-frame transforms
/// (leveling, alignment, centering) move stored points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    values: BTreeMap<String, Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn point(&self, name: &str) -> Option<DVec2> {
        self.get(name).and_then(|v| v.as_point())
    }

    pub fn dimension(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_dimension())
    }

    /// Store `value` under `name` unless something is already there.
    ///
    /// Returns whether the value was stored.
    pub fn insert_new(&mut self, name: &str, value: Value) -> bool {
        if self.values.contains_key(name) {
            return false;
        }
        self.values.insert(name.to_string(), value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Every coordinate-valued entry.
    pub fn points(&self) -> impl Iterator<Item = (&str, DVec2)> {
        self.iter().filter_map(|(k, v)| v.as_point().map(|p| (k, p)))
    }

    /// Mutable access to every coordinate-valued entry.
    pub fn points_mut(&mut self) -> impl Iterator<Item = (&str, &mut DVec2)> {
        self.values.iter_mut().filter_map(|(k, v)| match v {
            Value::Point(p) => Some((k.as_str(), p)),
            Value::Dimension(_) => None,
        })
    }

    /// Translate every point by `delta` along `axis`.
    pub fn delta_map(&mut self, delta: f64, axis: Axis) {
        if delta == 0.0 {
            return;
        }
        let offset = axis.offset(delta);
        for (_, p) in self.points_mut() {
            *p += offset;
        }
    }

    /// Bounding box of all points.
    pub fn bbox(&self) -> BBox {
        self.points().map(|(_, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn sample() -> ValueStore {
        let mut store = ValueStore::new();
        store.insert_new("bottomBracket", Value::Point(dvec2(400.0, 300.0)));
        store.insert_new("headTop", Value::Point(dvec2(613.0, -42.0)));
        store.insert_new("forkStraight", Value::Dimension(261.0));
        store
    }

    #[test]
    fn values_are_frozen_once_set() {
        let mut store = sample();
        assert!(!store.insert_new("headTop", Value::Point(dvec2(0.0, 0.0))));
        assert_eq!(store.point("headTop"), Some(dvec2(613.0, -42.0)));
        assert_eq!(store.dimension("forkStraight"), Some(261.0));
        assert_eq!(store.point("forkStraight"), None);
    }

    #[test]
    fn delta_map_moves_points_only() {
        let mut store = sample();
        store.delta_map(10.0, Axis::Horizontal);
        store.delta_map(-5.0, Axis::Vertical);
        assert_eq!(store.point("bottomBracket"), Some(dvec2(410.0, 295.0)));
        assert_eq!(store.point("headTop"), Some(dvec2(623.0, -47.0)));
        assert_eq!(store.dimension("forkStraight"), Some(261.0));

        let before = store.clone();
        store.delta_map(0.0, Axis::Vertical);
        assert_eq!(store, before);
    }

    #[test]
    fn bbox_spans_points() {
        let bbox = sample().bbox();
        assert_eq!(bbox.min, dvec2(400.0, -42.0));
        assert_eq!(bbox.max, dvec2(613.0, 300.0));
    }
}
