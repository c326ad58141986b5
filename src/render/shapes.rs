//! Draw operations.
//!
//! Each operation is its own type that knows how to paint itself on a
//! [`Surface`]. [`DrawOp`] dispatches over all of them.

use super::{Align, Surface};
use enum_dispatch::enum_dispatch;
use glam::DVec2;

/// Common behavior for all draw operations
#[enum_dispatch]
pub trait Paint {
    fn paint(&self, surface: &mut dyn Surface);
}

/// Any draw operation a renderer or label can emit
#[enum_dispatch(Paint)]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Disc(Disc),
    Ring(Ring),
    Pixel(Pixel),
    Segment(Segment),
    Dashed(Dashed),
    Tube(Tube),
    Text(Text),
}

/// A filled disc
#[derive(Debug, Clone, PartialEq)]
pub struct Disc {
    pub center: DVec2,
    pub radius: f64,
}

impl Paint for Disc {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.disc(self.center, self.radius);
    }
}

/// An unfilled circle
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub center: DVec2,
    pub radius: f64,
}

impl Paint for Ring {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.circle(self.center, self.radius);
    }
}

/// A point marker
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    pub at: DVec2,
}

impl Paint for Pixel {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.pixel(self.at);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub a: DVec2,
    pub b: DVec2,
}

impl Paint for Segment {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.line(self.a, self.b);
    }
}

/// A dashed guide line
#[derive(Debug, Clone, PartialEq)]
pub struct Dashed {
    pub a: DVec2,
    pub b: DVec2,
}

impl Paint for Dashed {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.dashed_line(self.a, self.b);
    }
}

/// A frame tube between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Tube {
    pub a: DVec2,
    pub b: DVec2,
    pub thickness: f64,
}

impl Paint for Tube {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.thick_segment(self.a, self.b, self.thickness);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub at: DVec2,
    /// Rotation in radians
    pub angle: f64,
    pub align: Align,
}

impl Paint for Text {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.label(&self.text, self.at, self.angle, self.align);
    }
}

/// Shorthand constructors used by the registries.
impl DrawOp {
    pub fn disc(center: DVec2, radius: f64) -> Self {
        Disc { center, radius }.into()
    }

    pub fn ring(center: DVec2, radius: f64) -> Self {
        Ring { center, radius }.into()
    }

    pub fn pixel(at: DVec2) -> Self {
        Pixel { at }.into()
    }

    pub fn line(a: DVec2, b: DVec2) -> Self {
        Segment { a, b }.into()
    }

    pub fn dashed(a: DVec2, b: DVec2) -> Self {
        Dashed { a, b }.into()
    }

    pub fn tube(a: DVec2, b: DVec2, thickness: f64) -> Self {
        Tube { a, b, thickness }.into()
    }

    pub fn text(text: impl Into<String>, at: DVec2, angle: f64, align: Align) -> Self {
        Text {
            text: text.into(),
            at,
            angle,
            align,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TraceSurface;
    use glam::dvec2;

    #[test]
    fn ops_paint_through_the_surface() {
        let ops = [
            DrawOp::disc(dvec2(1.0, 2.0), 3.0),
            DrawOp::pixel(dvec2(4.0, 5.0)),
            DrawOp::tube(dvec2(0.0, 0.0), dvec2(10.0, 0.0), 2.5),
            DrawOp::text("STACK 610mm", dvec2(7.0, 8.0), 0.0, Align::Right),
        ];
        let mut surface = TraceSurface::new();
        for op in &ops {
            op.paint(&mut surface);
        }
        assert_eq!(
            surface.lines(),
            [
                "disc (1.00, 2.00) r=3.00",
                "rect (4.00, 5.00) 1.00x1.00",
                "segment (0.00, 0.00) (10.00, 0.00) w=2.50",
                "label \"STACK 610mm\" (7.00, 8.00) a=0.00 Right",
            ]
        );
    }
}
