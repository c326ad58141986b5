//! Drawing resolved frames.
//!
//! Rendering is read-only: renderer and label registries turn a frame's
//! values into [`DrawOp`]s, which are then painted on any [`Surface`].

pub mod labels;
pub mod renderers;
pub mod shapes;
pub mod svg;

pub use shapes::{DrawOp, Paint};

use crate::definition::Definition;
use crate::errors::RenderError;
use crate::frame::Frame;
use crate::resolve::{Candidate, Dep, Entry, Registry, Resolve, Scope, resolve_all};
use crate::settings::Settings;
use crate::store::ValueStore;
use glam::DVec2;

/// Title line of every legend.
pub const LEGEND_TITLE: &str = "Bicycle Geometry Visualiser";

/// Horizontal anchoring of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A 2D drawing surface in canvas pixels, y pointing down.
pub trait Surface {
    /// Colour used by every following call until changed.
    fn set_color(&mut self, color: &str);

    fn disc(&mut self, center: DVec2, radius: f64);

    /// An unfilled circle.
    fn circle(&mut self, center: DVec2, radius: f64);

    fn filled_rect(&mut self, corner: DVec2, width: f64, height: f64);

    fn pixel(&mut self, at: DVec2) {
        self.filled_rect(at, 1.0, 1.0);
    }

    fn line(&mut self, a: DVec2, b: DVec2);

    fn dashed_line(&mut self, a: DVec2, b: DVec2);

    /// A filled rectangle whose long axis joins `a` and `b`.
    fn thick_segment(&mut self, a: DVec2, b: DVec2, thickness: f64);

    /// Text at `at`, rotated by `angle` radians around it.
    fn label(&mut self, text: &str, at: DVec2, angle: f64, align: Align);

    /// Paint the whole canvas with the background.
    fn clear(&mut self);

    fn append_legend_line(&mut self, text: &str);
}

// ============================================================================
// Draw registries
// ============================================================================

/// Collects the draw operations of one frame.
struct Collect<'a> {
    def: &'a Definition,
    values: &'a ValueStore,
    settings: &'a Settings,
    ops: Vec<DrawOp>,
}

impl Resolve<Vec<DrawOp>> for Collect<'_> {
    fn skip(&self, _: &str) -> bool {
        false
    }

    fn is_available(&self, dep: &Dep) -> bool {
        Scope::new(self.def, self.values, self.settings).is_available(dep)
    }

    fn compute(&self, candidate: &Candidate<Vec<DrawOp>>) -> Option<Vec<DrawOp>> {
        (candidate.compute)(&Scope::new(self.def, self.values, self.settings))
    }

    fn satisfy(&mut self, _: &Entry<Vec<DrawOp>>, _: &Candidate<Vec<DrawOp>>, ops: Vec<DrawOp>) {
        self.ops.extend(ops);
    }

    fn is_done(&self, _: &str) -> bool {
        true
    }
}

fn collect(registry: &Registry<Vec<DrawOp>>, frame: &Frame) -> Vec<DrawOp> {
    let mut target = Collect {
        def: frame.def(),
        values: frame.values(),
        settings: frame.settings(),
        ops: Vec::new(),
    };
    resolve_all(registry, &mut target);
    target.ops
}

/// Every draw operation for `frame`: parts first, then labels unless the
/// definition turns them off.
pub fn frame_ops(frame: &Frame) -> Vec<DrawOp> {
    let mut ops = collect(&renderers::registry(), frame);
    if frame.def().labels_enabled() {
        ops.extend(collect(&labels::registry(), frame));
    }
    ops
}

/// Draw `frames` on `surface`, each in its own colour.
///
/// The canvas is cleared, its centre marked and a legend written with one
/// line per frame.
pub fn draw_frames(frames: &[Frame], settings: &Settings, surface: &mut dyn Surface) -> Result<(), RenderError> {
    if frames.iter().all(|f| f.values().points().next().is_none()) {
        return Err(RenderError::EmptyCanvas);
    }

    surface.clear();
    surface.set_color(&settings.base_color);
    surface.disc(settings.canvas_center(), settings.center_radius);
    surface.append_legend_line(LEGEND_TITLE);

    for frame in frames {
        surface.set_color(frame.color());
        surface.append_legend_line(&legend_line(frame));
        for op in frame_ops(frame) {
            op.paint(surface);
        }
    }
    Ok(())
}

fn legend_line(frame: &Frame) -> String {
    let mut line = frame.name().to_string();
    if !frame.description().is_empty() {
        line.push_str(&format!(": {}", frame.description()));
    }
    line
}

// ============================================================================
// Trace surface
// ============================================================================

/// A surface that records every call as a line of text.
///
/// Coordinates are printed with two decimals, which keeps traces stable
/// across platforms.
#[derive(Debug, Default, Clone)]
pub struct TraceSurface {
    lines: Vec<String>,
}

impl TraceSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_trace(self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

fn p(v: DVec2) -> String {
    format!("({:.2}, {:.2})", v.x, v.y)
}

impl Surface for TraceSurface {
    fn set_color(&mut self, color: &str) {
        self.push(format!("color {color}"));
    }

    fn disc(&mut self, center: DVec2, radius: f64) {
        self.push(format!("disc {} r={radius:.2}", p(center)));
    }

    fn circle(&mut self, center: DVec2, radius: f64) {
        self.push(format!("circle {} r={radius:.2}", p(center)));
    }

    fn filled_rect(&mut self, corner: DVec2, width: f64, height: f64) {
        self.push(format!("rect {} {width:.2}x{height:.2}", p(corner)));
    }

    fn line(&mut self, a: DVec2, b: DVec2) {
        self.push(format!("line {} {}", p(a), p(b)));
    }

    fn dashed_line(&mut self, a: DVec2, b: DVec2) {
        self.push(format!("dashed {} {}", p(a), p(b)));
    }

    fn thick_segment(&mut self, a: DVec2, b: DVec2, thickness: f64) {
        self.push(format!("segment {} {} w={thickness:.2}", p(a), p(b)));
    }

    fn label(&mut self, text: &str, at: DVec2, angle: f64, align: Align) {
        self.push(format!("label {text:?} {} a={angle:.2} {align:?}", p(at)));
    }

    fn clear(&mut self) {
        self.push("clear".to_string());
    }

    fn append_legend_line(&mut self, text: &str) {
        self.push(format!("legend {text:?}"));
    }
}
