//! Core value types shared by the resolver, the correctors and the renderer.
//!
//! Everything stored by a frame is either a scalar [`Value::Dimension`] or a
//! render-space [`Value::Point`]. Only points take part in rigid transforms.

use glam::DVec2;
use std::fmt;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
pub fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject anything that is not a finite, strictly positive number.
pub fn check_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Round half up to the nearest integer, the way browsers round canvas
/// coordinates (`-2.5` becomes `-2`, `2.5` becomes `3`).
#[inline]
pub fn to_int(x: f64) -> f64 {
    (x + 0.5).floor()
}

// ============================================================================
// Zoom
// ============================================================================

/// Pixels-per-millimetre factor between definition space and render space.
///
/// Both directions quantize to whole units, so `undo(apply(x))` lands within
/// one millimetre of `x` rather than on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom(f64);

impl Zoom {
    /// Create a zoom factor with validation (must be finite and positive)
    pub fn try_new(factor: f64) -> Result<Zoom, NumericError> {
        check_positive(factor).map(Zoom)
    }

    #[inline]
    pub fn factor(self) -> f64 {
        self.0
    }

    /// Millimetres to whole pixels.
    #[inline]
    pub fn apply(self, mm: f64) -> f64 {
        to_int(mm * self.0)
    }

    /// Pixels back to whole millimetres.
    #[inline]
    pub fn undo(self, px: f64) -> f64 {
        to_int(px / self.0)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom(0.56)
    }
}

// ============================================================================
// Values
// ============================================================================

/// A resolved frame value in render space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// A length or angle
    Dimension(f64),
    /// A canvas coordinate
    Point(DVec2),
}

impl Value {
    /// Whether this value takes part in translations and rotations.
    #[inline]
    pub fn is_coordinate(&self) -> bool {
        matches!(self, Value::Point(_))
    }

    pub fn as_point(&self) -> Option<DVec2> {
        match *self {
            Value::Point(p) => Some(p),
            Value::Dimension(_) => None,
        }
    }

    pub fn as_dimension(&self) -> Option<f64> {
        match *self {
            Value::Dimension(d) => Some(d),
            Value::Point(_) => None,
        }
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Dimension(d) => d.is_finite(),
            Value::Point(p) => p.is_finite(),
        }
    }
}

impl From<DVec2> for Value {
    fn from(p: DVec2) -> Self {
        Value::Point(p)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Dimension(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Dimension(d) => write!(f, "{d}"),
            Value::Point(p) => write!(f, "({}, {})", p.x, p.y),
        }
    }
}

// ============================================================================
// Axis
// ============================================================================

/// Coordinate axis selector for translations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Index into a `[x, y]` pair.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// Component of `p` along this axis.
    #[inline]
    pub fn of(self, p: DVec2) -> f64 {
        p[self.index()]
    }

    /// Unit vector along this axis scaled by `delta`.
    #[inline]
    pub fn offset(self, delta: f64) -> DVec2 {
        match self {
            Axis::Horizontal => DVec2::new(delta, 0.0),
            Axis::Vertical => DVec2::new(0.0, delta),
        }
    }
}

// ============================================================================
// Bounding box
// ============================================================================

/// Axis-aligned bounding box in render space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    /// An empty box that any point will expand.
    pub fn new() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> DVec2 {
        if self.is_empty() {
            DVec2::ZERO
        } else {
            self.max - self.min
        }
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<DVec2> for BBox {
    fn from_iter<I: IntoIterator<Item = DVec2>>(iter: I) -> Self {
        let mut bbox = BBox::new();
        for p in iter {
            bbox.expand_point(p);
        }
        bbox
    }
}
