//! Bicycle geometry visualiser.
//!
//! A frame is described by a sparse set of manufacturer measurements. The
//! missing points and lengths are derived by running registries of
//! candidate formulas to a fixed point, the frame is levelled on its wheels,
//! derived measurements are written back, and the result is drawn.
//!
//! ```no_run
//! use bgv::{AlignTarget, Catalog, Settings};
//!
//! let catalog = Catalog::builtin()?;
//! let svg = bgv::visualise(
//!     &catalog,
//!     &[&["ktm_lc_w51", "seat318", "head118"], &["commencal_up29"]],
//!     &Settings::default(),
//!     AlignTarget::BottomBracket,
//! )?;
//! # Ok::<(), miette::Report>(())
//! ```

use pest_derive::Parser;

pub mod calculators;
pub mod correctors;
pub mod definition;
pub mod errors;
pub mod frame;
pub mod geometry;
pub mod journal;
pub mod level;
pub mod log;
pub mod parse;
pub mod render;
pub mod resolve;
pub mod settings;
pub mod store;
pub mod types;

pub use definition::{Catalog, DefValue, Definition};
pub use errors::{DefinitionError, FrameError, RenderError};
pub use frame::{AlignTarget, Frame, Placement, Stage};
pub use journal::{ReconcileKind, Reconciliation};
pub use settings::Settings;
pub use types::{Value, Zoom};

#[derive(Parser)]
#[grammar = "definition.pest"]
pub struct CatalogParser;

/// Build one frame per composition and draw them all as an SVG document.
///
/// The first frame is centred on the canvas, every following frame is
/// aligned to it at `target`.
pub fn visualise(
    catalog: &Catalog,
    compositions: &[&[&str]],
    settings: &Settings,
    target: AlignTarget,
) -> Result<String, miette::Report> {
    let mut frames: Vec<Frame> = Vec::with_capacity(compositions.len());
    for names in compositions {
        let def = catalog.compose(names)?;
        let placement = match frames.first() {
            Some(reference) => Placement::AlignedTo { reference, target },
            None => Placement::Centered,
        };
        let frame = Frame::build(def, settings.clone(), placement)?;
        frames.push(frame);
    }
    Ok(render::svg::render_svg(&frames, settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fragments_are_reported() {
        let catalog = Catalog::builtin().unwrap();
        let err = visualise(&catalog, &[&["no_such_bike"]], &Settings::default(), AlignTarget::default())
            .unwrap_err();
        assert!(err.to_string().contains("no_such_bike"), "{err}");
    }

    #[test]
    fn builtin_compositions_render() {
        let catalog = Catalog::builtin().unwrap();
        let settings = Settings::default().with_color_seed(1);
        let svg = visualise(
            &catalog,
            &[&["ktm_lc_w51", "seat318", "head118"], &["commencal_up29", "wheel29er"]],
            &settings,
            AlignTarget::BottomBracket,
        )
        .unwrap();
        assert!(svg.contains("<svg"), "{svg}");
        assert!(svg.contains("KTM: KTM Leggero Cross Women 51 2011"), "{svg}");
    }
}
