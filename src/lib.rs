//! # Overlayer
//!
//! Keeps the overlays on a web map in step with a declarative layer list.
//!
//! Each store change is reconciled against the live drawables: missing ones
//! are built lazily and once, and every layer fades toward its effective
//! opacity instead of popping. Bounds-sensitive imagery is only refreshed when
//! the viewport moves far enough to matter. The drawing itself happens behind
//! the [`MapCanvas`] trait.

pub mod animation;
pub mod canvas;
pub mod core;
pub mod engine;
pub mod layers;
pub mod prelude;
#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
pub mod runtime;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{EngineOptions, EngineProfile},
    geo::{LatLng, LatLngBounds},
    viewport::{BoundsParams, ViewportGate, ViewportSnapshot},
};

pub use layers::{
    descriptor::{DescriptorSnapshot, LayerDescriptor, LayerGroup, LayerKind, LayerSource},
    pane::Pane,
    reconciler::reconcile,
    registry::{ResourceHandle, ResourceRegistry},
};

pub use animation::{fade::OpacityScheduler, tweening::SteppedTween};

pub use canvas::{DrawableId, MapCanvas, RecordingCanvas};

pub use engine::{OverlayEngine, ReconcileReport};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("Invalid source for layer {layer_id}: {reason}")]
    InvalidSource { layer_id: String, reason: String },

    #[error("Unknown pane: {0}")]
    UnknownPane(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Engine has been torn down")]
    TornDown,
}

/// Error type alias for convenience
pub type Error = OverlayError;

/// Installs an `env_logger` reading `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
