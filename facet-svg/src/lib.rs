//! Facet-derived types for SVG serialization.
//!
//! This crate provides the strongly-typed subset of SVG elements the bgv
//! renderer emits. Every element round-trips through `facet-xml`.
//!
//! # Example
//!
//! ```rust
//! use facet_svg::{Circle, Svg, SvgNode};
//!
//! let svg = Svg {
//!     xmlns: Some(facet_svg::SVG_NS.to_string()),
//!     width: Some("100".to_string()),
//!     height: Some("100".to_string()),
//!     children: vec![SvgNode::Circle(Circle {
//!         cx: Some(50.0),
//!         cy: Some(50.0),
//!         r: Some(10.0),
//!         ..Default::default()
//!     })],
//!     ..Default::default()
//! };
//!
//! let xml = facet_xml::to_string(&svg).unwrap();
//! assert!(xml.contains("circle"));
//! ```

use facet::Facet;
use facet_xml as xml;

/// SVG namespace URI
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Root SVG element
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Svg {
    #[facet(xml::attribute)]
    pub xmlns: Option<String>,
    #[facet(xml::attribute)]
    pub width: Option<String>,
    #[facet(xml::attribute)]
    pub height: Option<String>,
    #[facet(xml::attribute, rename = "viewBox")]
    pub view_box: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// Any SVG node the renderer emits
#[derive(Facet, Debug, Clone)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
#[repr(u8)]
pub enum SvgNode {
    #[facet(rename = "g")]
    G(Group),
    #[facet(rename = "rect")]
    Rect(Rect),
    #[facet(rename = "circle")]
    Circle(Circle),
    #[facet(rename = "line")]
    Line(Line),
    #[facet(rename = "polygon")]
    Polygon(Polygon),
    #[facet(rename = "text")]
    Text(Text),
}

impl SvgNode {
    /// Element name as it appears in the serialized document.
    pub fn tag(&self) -> &'static str {
        match self {
            SvgNode::G(_) => "g",
            SvgNode::Rect(_) => "rect",
            SvgNode::Circle(_) => "circle",
            SvgNode::Line(_) => "line",
            SvgNode::Polygon(_) => "polygon",
            SvgNode::Text(_) => "text",
        }
    }
}

/// SVG group element (`<g>`)
///
/// Presentation attributes set here are inherited by the children, which is
/// how a whole frame gets its colour.
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Group {
    #[facet(xml::attribute)]
    pub id: Option<String>,
    #[facet(xml::attribute)]
    pub class: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// SVG rect element (`<rect>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Rect {
    #[facet(xml::attribute)]
    pub x: Option<f64>,
    #[facet(xml::attribute)]
    pub y: Option<f64>,
    #[facet(xml::attribute)]
    pub width: Option<f64>,
    #[facet(xml::attribute)]
    pub height: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
}

/// SVG circle element (`<circle>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Circle {
    #[facet(xml::attribute)]
    pub cx: Option<f64>,
    #[facet(xml::attribute)]
    pub cy: Option<f64>,
    #[facet(xml::attribute)]
    pub r: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
}

/// SVG line element (`<line>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Line {
    #[facet(xml::attribute)]
    pub x1: Option<f64>,
    #[facet(xml::attribute)]
    pub y1: Option<f64>,
    #[facet(xml::attribute)]
    pub x2: Option<f64>,
    #[facet(xml::attribute)]
    pub y2: Option<f64>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
}

/// SVG polygon element (`<polygon>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Polygon {
    #[facet(xml::attribute)]
    pub points: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
}

/// SVG text element (`<text>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Text {
    #[facet(xml::attribute)]
    pub x: Option<f64>,
    #[facet(xml::attribute)]
    pub y: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute)]
    pub transform: Option<String>,
    #[facet(xml::attribute, rename = "font-family")]
    pub font_family: Option<String>,
    #[facet(xml::attribute, rename = "font-size")]
    pub font_size: Option<f64>,
    #[facet(xml::attribute, rename = "font-weight")]
    pub font_weight: Option<String>,
    #[facet(xml::attribute, rename = "text-anchor")]
    pub text_anchor: Option<String>,
    #[facet(xml::text)]
    pub content: String,
}

// Re-export facet_xml for convenience
pub use facet_xml;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_group_with_children() {
        let svg = Svg {
            xmlns: Some(SVG_NS.to_string()),
            children: vec![SvgNode::G(Group {
                fill: Some("red".to_string()),
                children: vec![SvgNode::Line(Line {
                    x1: Some(0.0),
                    y1: Some(0.0),
                    x2: Some(10.0),
                    y2: Some(5.0),
                    stroke_dasharray: Some("3 5".to_string()),
                    ..Default::default()
                })],
                ..Default::default()
            })],
            ..Default::default()
        };

        let xml = facet_xml::to_string(&svg).unwrap();
        assert!(xml.contains("<g"), "missing group: {xml}");
        assert!(xml.contains("stroke-dasharray"), "missing dash pattern: {xml}");
    }

    #[test]
    fn tags_match_element_names() {
        assert_eq!(SvgNode::Text(Text::default()).tag(), "text");
        assert_eq!(SvgNode::Polygon(Polygon::default()).tag(), "polygon");
    }
}
