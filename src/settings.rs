//! Drawing and resolution settings.

use crate::errors::FrameError;
use crate::types::{NumericError, Zoom, check_finite, check_positive, to_int};
use glam::{DVec2, dvec2};

/// Application-wide settings, mostly drawing defaults.
///
/// Lengths are millimetres unless the field says pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Pixels per millimetre
    pub zoom: Zoom,
    /// Canvas width in pixels
    pub canvas_width: f64,
    /// Canvas height in pixels
    pub canvas_height: f64,
    /// Canvas background
    pub background: String,
    /// Colour of the centre marker and the legend
    pub base_color: String,
    /// Bottom bracket shell radius, 68mm is the typical diameter
    pub bb_radius: f64,
    /// Centre marker radius in pixels
    pub center_radius: f64,
    pub hub_radius: f64,
    /// Tube thickness used when a frame gives no head or seat size
    pub fallback_size: f64,
    /// Steerer thickness as a fraction of the head tube thickness
    pub head_to_steerer: f64,
    /// Label font size in pixels
    pub labels_font_size: f64,
    pub labels_pad_horizontal: f64,
    pub labels_pad_vertical: f64,
    /// `fork_steerer` used when a frame does not give one
    pub default_fork_steerer: f64,
    /// `seat_angle` in degrees used when a frame gives neither the angle nor
    /// a seat tube to measure it from
    pub default_seat_angle: f64,
    /// Seed for generated frame colours; `None` draws from OS entropy
    pub color_seed: Option<u64>,
    /// Corrections smaller than this (mm or degrees) are recorded as
    /// confirmations rather than overwrites
    pub report_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom: Zoom::default(),
            canvas_width: 800.0,
            canvas_height: 600.0,
            background: "rgba(255, 255, 255, 1)".to_string(),
            base_color: "rgba(0, 0, 0, 0.5)".to_string(),
            bb_radius: 34.0,
            center_radius: 5.0,
            hub_radius: 20.0,
            fallback_size: 22.2,
            head_to_steerer: 0.60,
            labels_font_size: 12.0,
            labels_pad_horizontal: 5.0,
            labels_pad_vertical: 3.0,
            default_fork_steerer: 260.0,
            default_seat_angle: 73.0,
            color_seed: None,
            report_threshold: 0.0,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zoom factor, rejecting non-positive values.
    pub fn with_zoom(mut self, factor: f64) -> Result<Self, NumericError> {
        self.zoom = Zoom::try_new(factor)?;
        Ok(self)
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Result<Self, NumericError> {
        self.canvas_width = check_positive(width)?;
        self.canvas_height = check_positive(height)?;
        Ok(self)
    }

    pub fn with_color_seed(mut self, seed: u64) -> Self {
        self.color_seed = Some(seed);
        self
    }

    pub fn with_report_threshold(mut self, threshold: f64) -> Result<Self, NumericError> {
        self.report_threshold = check_finite(threshold)?.abs();
        Ok(self)
    }

    /// The fixed point every frame's bottom bracket starts from.
    pub fn canvas_center(&self) -> DVec2 {
        dvec2(to_int(self.canvas_width / 2.0), to_int(self.canvas_height / 2.0))
    }

    /// Check every numeric field once, before any frame is built.
    pub fn validate(&self) -> Result<(), FrameError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("labels_font_size", self.labels_font_size),
        ];
        for (key, value) in positive {
            check_positive(value).map_err(|e| invalid(key, e))?;
        }

        let non_negative = [
            ("bb_radius", self.bb_radius),
            ("center_radius", self.center_radius),
            ("hub_radius", self.hub_radius),
            ("fallback_size", self.fallback_size),
            ("head_to_steerer", self.head_to_steerer),
            ("labels_pad_horizontal", self.labels_pad_horizontal),
            ("labels_pad_vertical", self.labels_pad_vertical),
            ("default_fork_steerer", self.default_fork_steerer),
            ("report_threshold", self.report_threshold),
        ];
        for (key, value) in non_negative {
            let value = check_finite(value).map_err(|e| invalid(key, e))?;
            if value < 0.0 {
                return Err(invalid(key, NumericError::Negative));
            }
        }

        check_finite(self.default_seat_angle).map_err(|e| invalid("default_seat_angle", e))?;
        Zoom::try_new(self.zoom.factor()).map_err(|e| invalid("zoom", e))?;
        Ok(())
    }
}

fn invalid(key: &str, e: NumericError) -> FrameError {
    FrameError::InvalidInput {
        key: key.to_string(),
        reason: e.to_string(),
    }
}
