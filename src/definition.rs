//! Raw frame measurements and the fragment catalog they are composed from.
//!
//! A [`Definition`] maps measurement names to millimetres, degrees or text.
//! Definitions are usually built by merging several partial fragments (a head
//! tube standard, a wheel size, a bike), later fragments winning on
//! collisions.

use crate::errors::{DefinitionError, FrameError};
use std::collections::BTreeMap;
use std::fmt;

/// Recognized definition keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const COLOR: &str = "color";
    pub const LABELS: &str = "labels";

    pub const REACH: &str = "reach";
    pub const STACK: &str = "stack";
    pub const HEAD_TUBE: &str = "head_tube";
    pub const HEAD_ANGLE: &str = "head_angle";
    pub const HEAD_SIZE: &str = "head_size";
    pub const BB_DROP: &str = "bb_drop";
    pub const BB_HEIGHT: &str = "bb_height";
    pub const CHAINSTAY: &str = "chainstay";
    pub const SEAT_TUBE: &str = "seat_tube";
    pub const SEAT_ANGLE: &str = "seat_angle";
    pub const SEAT_SIZE: &str = "seat_size";
    pub const TOP_TUBE_LENGTH: &str = "top_tube_length";
    pub const WHEEL_BASE: &str = "wheel_base";
    pub const WHEEL: &str = "wheel";
    pub const TIRE: &str = "tire";
    pub const FORK_LENGTH: &str = "fork_length";
    pub const FORK_OFFSET: &str = "fork_offset";
    pub const FORK_TRAIL: &str = "fork_trail";
    pub const FORK_STEERER: &str = "fork_steerer";
    pub const CRANK_ARM: &str = "crank_arm";
    pub const HANDLE_RISE: &str = "handle_rise";
    pub const HANDLE_PULL: &str = "handle_pull";

    /// Keys that are angles rather than lengths.
    pub const ANGLES: &[&str] = &[HEAD_ANGLE, SEAT_ANGLE];
}

/// One definition entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DefValue {
    Number(f64),
    Text(String),
}

impl DefValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DefValue::Number(n) => Some(*n),
            DefValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DefValue::Text(s) => Some(s),
            DefValue::Number(_) => None,
        }
    }
}

impl fmt::Display for DefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefValue::Number(n) => write!(f, "{n}"),
            DefValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for DefValue {
    fn from(n: f64) -> Self {
        DefValue::Number(n)
    }
}

impl From<&str> for DefValue {
    fn from(s: &str) -> Self {
        DefValue::Text(s.to_string())
    }
}

impl From<String> for DefValue {
    fn from(s: String) -> Self {
        DefValue::Text(s)
    }
}

/// Raw measurements of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    entries: BTreeMap<String, DefValue>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a definition from `(key, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<DefValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DefValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(DefValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(DefValue::as_text)
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DefValue>) -> Option<DefValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<DefValue> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` on top of this definition; its keys win.
    pub fn merge(&mut self, other: &Definition) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Chainable form of [`Definition::merge`].
    pub fn combine(mut self, other: &Definition) -> Self {
        self.merge(other);
        self
    }

    /// Whether labels should be drawn for this frame. Defaults to on.
    pub fn labels_enabled(&self) -> bool {
        self.number(keys::LABELS).is_none_or(|n| n != 0.0)
    }

    /// Reject values that no geometry can be built from.
    pub fn validate(&self) -> Result<(), FrameError> {
        for (key, value) in &self.entries {
            let DefValue::Number(n) = value else {
                continue;
            };
            if !n.is_finite() {
                return Err(FrameError::InvalidInput {
                    key: key.clone(),
                    reason: format!("{n} is not a finite number"),
                });
            }
            if *n < 0.0 && !keys::ANGLES.contains(&key.as_str()) {
                return Err(FrameError::InvalidInput {
                    key: key.clone(),
                    reason: format!("length {n} is negative"),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Named definition fragments, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fragments: Vec<(String, Definition)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of frames and components shipped with the crate.
    pub fn builtin() -> Result<Catalog, DefinitionError> {
        crate::parse::parse_catalog("catalog.bgv", include_str!("../data/catalog.bgv"))
    }

    /// Add a fragment. Returns `false` if the name was already taken.
    pub fn insert(&mut self, name: impl Into<String>, fragment: Definition) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.fragments.push((name, fragment));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.fragments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Merge the named fragments in order into one definition.
    pub fn compose<S: AsRef<str>>(&self, names: &[S]) -> Result<Definition, DefinitionError> {
        let mut def = Definition::new();
        for name in names {
            let name = name.as_ref();
            let fragment = self.get(name).ok_or_else(|| DefinitionError::UnknownFragment {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })?;
            def.merge(fragment);
        }
        Ok(def)
    }
}
