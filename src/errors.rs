//! Error types with rich diagnostics using miette
//!
//! Catalog errors carry source spans; frame errors name the offending
//! definition key or registry.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Span covering `len` bytes starting at `offset`.
    pub fn span(&self, offset: usize, len: usize) -> SourceSpan {
        SourceSpan::new(offset.into(), len)
    }
}

// ============================================================================
// Definition Errors
// ============================================================================

/// Errors that occur while reading a definition catalog
#[derive(Error, Diagnostic, Debug)]
pub enum DefinitionError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(bgv::definition::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("entry `{key}` appears before any [fragment] header")]
    #[diagnostic(
        code(bgv::definition::orphan_entry),
        help("start the file with a header such as `[wheel29er]`")
    )]
    OrphanEntry {
        key: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this entry has no fragment")]
        span: SourceSpan,
    },

    #[error("fragment `{name}` is defined twice")]
    #[diagnostic(code(bgv::definition::duplicate_fragment))]
    DuplicateFragment {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("second definition")]
        span: SourceSpan,
    },

    #[error("invalid number: {message}")]
    #[diagnostic(code(bgv::definition::invalid_number))]
    InvalidNumber {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid number")]
        span: SourceSpan,
    },

    #[error("unknown fragment `{name}`")]
    #[diagnostic(
        code(bgv::definition::unknown_fragment),
        help("available fragments: {available}")
    )]
    UnknownFragment { name: String, available: String },
}

// ============================================================================
// Frame Errors
// ============================================================================

/// Errors that abort the pipeline of a single frame
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("invalid value for `{key}`: {reason}")]
    #[diagnostic(
        code(bgv::frame::invalid_input),
        help("lengths are millimetres and must be finite and non-negative")
    )]
    InvalidInput { key: String, reason: String },

    #[error("{registry} did not settle after {passes} passes")]
    #[diagnostic(
        code(bgv::frame::non_convergence),
        help("an entry keeps reporting progress without storing a new value")
    )]
    NonConvergence { registry: &'static str, passes: usize },
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that occur while producing output
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("failed to serialize SVG: {0}")]
    #[diagnostic(code(bgv::render::serialize))]
    Serialize(String),

    #[error("nothing to draw: no frame has resolved points")]
    #[diagnostic(code(bgv::render::empty_canvas))]
    EmptyCanvas,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Frame(#[from] FrameError),
}
