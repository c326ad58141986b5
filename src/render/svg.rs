//! SVG generation

use super::{Align, Surface, draw_frames};
use crate::errors::RenderError;
use crate::frame::Frame;
use crate::geometry::{angle_between, point_at, rad_to_deg};
use crate::settings::Settings;
use facet_svg::{Circle, Group, Line, Polygon, Rect, SVG_NS, Svg, SvgNode, Text, facet_xml};
use glam::DVec2;
use std::f64::consts::FRAC_PI_2;

/// Dash pattern of guide lines: 3px on, 5px off.
const DASH: &str = "3 5";
const LABEL_FONT: &str = "Arial";
const LEGEND_FONT: &str = "Courier New";
const LEGEND_FONT_SIZE: f64 = 12.0;
const LEGEND_X: f64 = 5.0;

/// Round to hundredths of a pixel so documents stay small and stable.
fn px(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds an SVG document.
///
/// Every colour change opens a new `<g>` carrying the colour as fill and
/// stroke, so shapes inherit it.
pub struct SvgSurface {
    width: f64,
    height: f64,
    background: String,
    font_size: f64,
    root: Vec<SvgNode>,
    group: Option<Group>,
    legend_y: f64,
}

impl SvgSurface {
    pub fn new(settings: &Settings) -> Self {
        Self {
            width: settings.canvas_width,
            height: settings.canvas_height,
            background: settings.background.clone(),
            font_size: settings.labels_font_size,
            root: Vec::new(),
            group: None,
            legend_y: 0.0,
        }
    }

    fn push(&mut self, node: SvgNode) {
        match &mut self.group {
            Some(group) => group.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_group(&mut self) {
        if let Some(group) = self.group.take() {
            if !group.children.is_empty() {
                self.root.push(SvgNode::G(group));
            }
        }
    }

    /// Finish the document.
    pub fn finish(mut self) -> Svg {
        self.close_group();
        Svg {
            xmlns: Some(SVG_NS.to_string()),
            width: Some(self.width.to_string()),
            height: Some(self.height.to_string()),
            view_box: Some(format!("0 0 {} {}", self.width, self.height)),
            children: self.root,
        }
    }

    pub fn to_svg_string(self) -> Result<String, RenderError> {
        let svg = self.finish();
        facet_xml::to_string(&svg).map_err(|e| RenderError::Serialize(e.to_string()))
    }
}

impl Surface for SvgSurface {
    fn set_color(&mut self, color: &str) {
        self.close_group();
        self.group = Some(Group {
            fill: Some(color.to_string()),
            stroke: Some(color.to_string()),
            ..Default::default()
        });
    }

    fn disc(&mut self, center: DVec2, radius: f64) {
        self.push(SvgNode::Circle(Circle {
            cx: Some(px(center.x)),
            cy: Some(px(center.y)),
            r: Some(px(radius)),
            stroke: Some("none".to_string()),
            ..Default::default()
        }));
    }

    fn circle(&mut self, center: DVec2, radius: f64) {
        self.push(SvgNode::Circle(Circle {
            cx: Some(px(center.x)),
            cy: Some(px(center.y)),
            r: Some(px(radius)),
            fill: Some("none".to_string()),
            ..Default::default()
        }));
    }

    fn filled_rect(&mut self, corner: DVec2, width: f64, height: f64) {
        self.push(SvgNode::Rect(Rect {
            x: Some(px(corner.x)),
            y: Some(px(corner.y)),
            width: Some(px(width)),
            height: Some(px(height)),
            stroke: Some("none".to_string()),
            ..Default::default()
        }));
    }

    fn line(&mut self, a: DVec2, b: DVec2) {
        self.push(SvgNode::Line(Line {
            x1: Some(px(a.x)),
            y1: Some(px(a.y)),
            x2: Some(px(b.x)),
            y2: Some(px(b.y)),
            ..Default::default()
        }));
    }

    fn dashed_line(&mut self, a: DVec2, b: DVec2) {
        if a == b {
            return;
        }
        self.push(SvgNode::Line(Line {
            x1: Some(px(a.x)),
            y1: Some(px(a.y)),
            x2: Some(px(b.x)),
            y2: Some(px(b.y)),
            stroke_dasharray: Some(DASH.to_string()),
            ..Default::default()
        }));
    }

    fn thick_segment(&mut self, a: DVec2, b: DVec2, thickness: f64) {
        let Some(angle) = angle_between(a, b) else {
            return;
        };
        let half = thickness / 2.0;
        let corners = [
            point_at(a, half, angle - FRAC_PI_2),
            point_at(a, half, angle + FRAC_PI_2),
            point_at(b, half, angle + FRAC_PI_2),
            point_at(b, half, angle - FRAC_PI_2),
        ];
        let points = corners
            .iter()
            .map(|c| format!("{},{}", px(c.x), px(c.y)))
            .collect::<Vec<_>>()
            .join(" ");
        self.push(SvgNode::Polygon(Polygon {
            points: Some(points),
            stroke: Some("none".to_string()),
            ..Default::default()
        }));
    }

    fn label(&mut self, text: &str, at: DVec2, angle: f64, align: Align) {
        let (x, y, transform) = if angle == 0.0 {
            (px(at.x), px(at.y), None)
        } else {
            let transform = format!(
                "translate({} {}) rotate({})",
                px(at.x),
                px(at.y),
                px(rad_to_deg(angle))
            );
            (0.0, 0.0, Some(transform))
        };
        self.push(SvgNode::Text(Text {
            x: Some(x),
            y: Some(y),
            stroke: Some("none".to_string()),
            transform,
            font_family: Some(LABEL_FONT.to_string()),
            font_size: Some(self.font_size),
            text_anchor: Some(
                match align {
                    Align::Left => "start",
                    Align::Right => "end",
                }
                .to_string(),
            ),
            content: text.to_string(),
            ..Default::default()
        }));
    }

    fn clear(&mut self) {
        self.group = None;
        self.root.clear();
        self.legend_y = 0.0;
        self.root.push(SvgNode::Rect(Rect {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(self.width),
            height: Some(self.height),
            fill: Some(self.background.clone()),
            ..Default::default()
        }));
    }

    fn append_legend_line(&mut self, text: &str) {
        self.legend_y += LEGEND_FONT_SIZE;
        self.push(SvgNode::Text(Text {
            x: Some(LEGEND_X),
            y: Some(self.legend_y),
            stroke: Some("none".to_string()),
            font_family: Some(LEGEND_FONT.to_string()),
            font_size: Some(LEGEND_FONT_SIZE),
            font_weight: Some("bold".to_string()),
            text_anchor: Some("start".to_string()),
            content: text.to_string(),
            ..Default::default()
        }));
    }
}

/// Draw `frames` into a standalone SVG document.
pub fn render_svg(frames: &[Frame], settings: &Settings) -> Result<String, RenderError> {
    let mut surface = SvgSurface::new(settings);
    draw_frames(frames, settings, &mut surface)?;
    surface.to_svg_string()
}
