//! The drawing API the engine calls into.
//!
//! Implementations wrap whatever actually fetches and paints pixels (a
//! Leaflet map over wasm-bindgen, a native renderer, a recorder in tests).
//! Every call is short and non-blocking; network activity started by
//! [`MapCanvas::set_bounds`] or [`MapCanvas::update_source`] is owned by the
//! canvas, not awaited by the engine.

pub mod recording;

use crate::core::viewport::BoundsParams;
use crate::layers::descriptor::{LayerKind, LayerSource};
use crate::layers::pane::Pane;
use crate::Result;

pub use recording::{CanvasCall, RecordingCanvas};

/// Opaque handle to a drawable living on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub u64);

impl std::fmt::Display for DrawableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "drawable#{}", self.0)
    }
}

/// Everything the canvas needs to build a drawable
#[derive(Debug, Clone, Copy)]
pub struct DrawableSpec<'a> {
    pub layer_id: &'a str,
    pub kind: LayerKind,
    pub source: &'a LayerSource,
    pub pane: Pane,
}

pub trait MapCanvas {
    /// Creates a named drawing surface stacked at `z_index`
    fn create_pane(&mut self, pane: Pane, z_index: i32) -> Result<()>;

    /// Builds a drawable in its pane, detached and fully transparent
    fn create_drawable(&mut self, spec: &DrawableSpec<'_>) -> Result<DrawableId>;

    /// Applies changed connection info (e.g. a new filter) in place
    fn update_source(&mut self, drawable: DrawableId, source: &LayerSource) -> Result<()>;

    fn set_opacity(&mut self, drawable: DrawableId, opacity: f32) -> Result<()>;

    /// Puts the drawable back into the paint tree
    fn attach(&mut self, drawable: DrawableId) -> Result<()>;

    /// Removes the drawable from the paint tree without freeing it
    fn detach(&mut self, drawable: DrawableId) -> Result<()>;

    /// Points a bounds-sensitive drawable at a new extent
    fn set_bounds(&mut self, drawable: DrawableId, params: &BoundsParams) -> Result<()>;

    /// Frees the drawable; only used when the map itself goes away
    fn remove_drawable(&mut self, drawable: DrawableId) -> Result<()>;
}
