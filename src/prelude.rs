//! Prelude module for common overlayer types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use overlayer::prelude::*;`

pub use crate::core::{
    config::{EngineOptions, EngineProfile, FadeConfig, ViewportGateConfig},
    geo::{LatLng, LatLngBounds},
    viewport::{BoundsParams, GateDecision, ViewportGate, ViewportSnapshot},
};

pub use crate::layers::{
    descriptor::{
        DescriptorSnapshot, LayerDescriptor, LayerGroup, LayerKind, LayerSource, ResolvedLayer,
    },
    pane::{Pane, PANE_ORDER},
    reconciler::{reconcile, ReconcileAction, ReconcilePlan},
    registry::{ResourceHandle, ResourceRegistry},
};

pub use crate::animation::{
    fade::{FadeStart, FadeUpdate, OpacityScheduler},
    tweening::{SteppedTween, TweenStep},
};

pub use crate::canvas::{CanvasCall, DrawableId, DrawableSpec, MapCanvas, RecordingCanvas};

pub use crate::engine::{OverlayEngine, ReconcileReport};

#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
pub use crate::runtime::{drive, event_channel, EngineEvent, EventReceiver, EventSender};

pub use crate::{Error as OverlayError, Result};

pub use instant::Instant;
pub use std::time::Duration;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
