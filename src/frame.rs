//! One bicycle frame and the pipeline that lays it out.
//!
//! ```text
//! Created → CalculatorsResolved → Leveled → Corrected → Recalculated → Positioned
//! ```
//!
//! [`Frame::build`] runs every stage in order. The stages are public so they
//! can be driven and inspected one at a time.

use crate::calculators::{self, Calculate, names};
use crate::correctors::{self, Correct};
use crate::definition::{Definition, keys};
use crate::errors::FrameError;
use crate::journal::Reconciliation;
use crate::level::{self, Leveling};
use crate::resolve::{Pass, resolve_all, resolve_to_fixed_point};
use crate::settings::Settings;
use crate::store::ValueStore;
use crate::types::Axis;
use glam::DVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;

/// Where a frame is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Created,
    CalculatorsResolved,
    Leveled,
    Corrected,
    Recalculated,
    Positioned,
}

/// The point two frames are lined up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignTarget {
    FrontHub,
    RearHub,
    HeadTop,
    #[default]
    BottomBracket,
}

impl AlignTarget {
    /// The point shared horizontally.
    pub fn horizontal(self) -> &'static str {
        match self {
            AlignTarget::FrontHub => names::FRONT_WHEEL_HUB,
            AlignTarget::RearHub => names::REAR_WHEEL_HUB,
            AlignTarget::HeadTop => names::HEAD_TOP,
            AlignTarget::BottomBracket => names::BOTTOM_BRACKET,
        }
    }

    /// The point shared vertically. Wheel and bottom bracket targets keep
    /// both frames on the same ground line.
    pub fn vertical(self) -> &'static str {
        match self {
            AlignTarget::HeadTop => names::HEAD_TOP,
            _ => names::REAR_CONTACT_PATCH,
        }
    }
}

/// How a frame is placed on the canvas once resolved.
#[derive(Clone, Copy)]
pub enum Placement<'a> {
    /// Centre the frame's bounding box on the canvas centre
    Centered,
    /// Translate so `target` coincides with the same point of `reference`
    AlignedTo {
        reference: &'a Frame,
        target: AlignTarget,
    },
}

/// A frame definition together with its resolved geometry.
#[derive(Debug)]
pub struct Frame {
    def: Definition,
    values: ValueStore,
    settings: Settings,
    rng: RefCell<StdRng>,
    journal: Vec<Reconciliation>,
    stage: Stage,
    leveling: Option<Leveling>,
}

impl Frame {
    /// Validate `def` and `settings` and create an unresolved frame.
    pub fn new(def: Definition, settings: Settings) -> Result<Self, FrameError> {
        settings.validate()?;
        def.validate()?;
        let rng = match settings.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            def,
            values: ValueStore::new(),
            settings,
            rng: RefCell::new(rng),
            journal: Vec::new(),
            stage: Stage::Created,
            leveling: None,
        })
    }

    /// Run the whole pipeline.
    pub fn build(def: Definition, settings: Settings, placement: Placement<'_>) -> Result<Self, FrameError> {
        let mut frame = Self::new(def, settings)?;
        frame.resolve_calculators()?;
        frame.level();
        frame.correct();
        frame.resolve_calculators()?;
        frame.position(placement);
        Ok(frame)
    }

    /// Resolve calculators to a fixed point. Returns the number of passes
    /// that stored something.
    pub fn resolve_calculators(&mut self) -> Result<usize, FrameError> {
        let mut target = Calculate {
            def: &mut self.def,
            values: &mut self.values,
            settings: &self.settings,
            journal: &mut self.journal,
        };
        let passes = resolve_to_fixed_point(&calculators::registry(), &mut target)?;
        self.advance(if self.stage >= Stage::Corrected {
            Stage::Recalculated
        } else {
            Stage::CalculatorsResolved
        });
        Ok(passes)
    }

    /// Rotate the frame level on its contact patches.
    pub fn level(&mut self) -> Option<Leveling> {
        let leveling = level::level(&mut self.values);
        if leveling.is_some() {
            self.leveling = leveling;
        }
        self.advance(Stage::Leveled);
        leveling
    }

    /// Run every corrector once against the current geometry.
    pub fn correct(&mut self) -> Pass {
        let mut target = Correct {
            def: &mut self.def,
            values: &self.values,
            settings: &self.settings,
            rng: &self.rng,
            journal: &mut self.journal,
        };
        let pass = resolve_all(&correctors::registry(), &mut target);
        self.advance(Stage::Corrected);
        pass
    }

    /// Move the frame to its place on the canvas.
    pub fn position(&mut self, placement: Placement<'_>) {
        match placement {
            Placement::Centered => self.center(),
            Placement::AlignedTo { reference, target } => {
                self.align(reference, target.horizontal(), Axis::Horizontal);
                let vertical = target.vertical();
                if self.values.contains(vertical) && reference.values.contains(vertical) {
                    self.align(reference, vertical, Axis::Vertical);
                } else {
                    self.align(reference, target.horizontal(), Axis::Vertical);
                }
            }
        }
        self.advance(Stage::Positioned);
    }

    /// Translate so the bounding box centre lands on the canvas centre.
    fn center(&mut self) {
        let bbox = self.values.bbox();
        if bbox.is_empty() {
            return;
        }
        let delta = self.settings.canvas_center() - bbox.center();
        self.values.delta_map(delta.x, Axis::Horizontal);
        self.values.delta_map(delta.y, Axis::Vertical);
    }

    fn align(&mut self, reference: &Frame, name: &str, axis: Axis) {
        let (Some(ours), Some(theirs)) = (self.values.point(name), reference.values.point(name)) else {
            crate::log::warn!(name, ?axis, "alignment point missing, frame left in place");
            return;
        };
        self.values.delta_map(axis.of(theirs) - axis.of(ours), axis);
    }

    fn advance(&mut self, stage: Stage) {
        crate::log::debug!(name = self.name(), ?stage, "stage");
        self.stage = self.stage.max(stage);
    }

    pub fn def(&self) -> &Definition {
        &self.def
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The rotation applied by [`Frame::level`], if the frame was tilted.
    pub fn leveling(&self) -> Option<Leveling> {
        self.leveling
    }

    /// Every definition entry the pipeline set or replaced, in order.
    pub fn reconciliations(&self) -> &[Reconciliation] {
        &self.journal
    }

    pub fn point(&self, name: &str) -> Option<DVec2> {
        self.values.point(name)
    }

    pub fn name(&self) -> &str {
        self.def.text(keys::NAME).unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.def.text(keys::DESCRIPTION).unwrap_or_default()
    }

    /// Drawing colour; the base colour until the correctors assign one.
    pub fn color(&self) -> &str {
        self.def.text(keys::COLOR).unwrap_or(&self.settings.base_color)
    }
}
