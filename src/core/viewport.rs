//! Viewport change gate
//!
//! Bounds-sensitive layers (high resolution imagery that is fetched for an
//! explicit bounding box) are expensive to refresh, so they only hear about a
//! new viewport when the map has moved far enough to matter. Small pans are
//! absorbed by the padding added around the last refreshed bounds.

use crate::core::config::ViewportGateConfig;
use crate::core::geo::LatLngBounds;
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Visible map extent and zoom as read from the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub bounds: LatLngBounds,
    pub zoom: f64,
}

impl ViewportSnapshot {
    pub fn new(bounds: LatLngBounds, zoom: f64) -> Self {
        Self { bounds, zoom }
    }
}

/// Source parameters pushed to a bounds-sensitive drawable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsParams {
    /// Padded geographic bounds
    pub bounds: LatLngBounds,
    /// The padded bounds in Web Mercator, `[min_x, min_y, max_x, max_y]`
    pub bbox_3857: [f64; 4],
    pub zoom: f64,
}

impl BoundsParams {
    pub fn padded(viewport: &ViewportSnapshot, padding_ratio: f64) -> Self {
        let bounds = viewport.bounds.pad(padding_ratio);
        Self {
            bbox_3857: bounds.to_mercator_bbox(),
            bounds,
            zoom: viewport.zoom,
        }
    }
}

/// Returns true when the center moved further than `ratio` of the old
/// viewport's ground width.
pub fn is_significant_move(old: &LatLngBounds, new: &LatLngBounds, ratio: f64) -> bool {
    let center_distance = old.center().distance_to(&new.center());
    center_distance > ratio * old.ground_width()
}

/// What the gate did with an observed viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Move too small (or bounds unusable); nothing was touched
    Ignored,
    /// Zoomed out past the refresh limit; any pending refresh was dropped
    BelowMinZoom,
    /// Snapshot advanced and a refresh is due at the given instant
    Scheduled { due_at: Instant },
}

#[derive(Debug, Clone)]
struct PendingRefresh {
    params: BoundsParams,
    due_at: Instant,
    /// Applied snapshot from before the move, restored if the refresh is dropped
    superseded: Option<ViewportSnapshot>,
}

pub struct ViewportGate {
    config: ViewportGateConfig,
    /// Last bounds judged significant
    applied: Option<ViewportSnapshot>,
    pending: Option<PendingRefresh>,
}

impl ViewportGate {
    pub fn new(config: ViewportGateConfig) -> Self {
        Self {
            config,
            applied: None,
            pending: None,
        }
    }

    pub fn config(&self) -> &ViewportGateConfig {
        &self.config
    }

    pub fn applied(&self) -> Option<&ViewportSnapshot> {
        self.applied.as_ref()
    }

    /// Padded parameters for the currently applied snapshot
    pub fn applied_params(&self) -> Option<BoundsParams> {
        self.applied
            .as_ref()
            .map(|viewport| BoundsParams::padded(viewport, self.config.padding_ratio))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    /// Feeds a viewport move through the gate.
    ///
    /// A significant move replaces any pending refresh and restarts the
    /// debounce, so a burst of moves collapses into a single refresh.
    pub fn observe(&mut self, viewport: ViewportSnapshot, now: Instant) -> GateDecision {
        if !viewport.bounds.is_valid() {
            log::debug!("ignoring viewport with invalid bounds {:?}", viewport.bounds);
            return GateDecision::Ignored;
        }

        if let Some(min_zoom) = self.config.min_refresh_zoom {
            if viewport.zoom < min_zoom {
                if let Some(pending) = self.pending.take() {
                    log::debug!("zoomed out to {}; dropping pending refresh", viewport.zoom);
                    self.applied = pending.superseded;
                }
                return GateDecision::BelowMinZoom;
            }
        }

        let significant = match &self.applied {
            None => true,
            Some(applied) => is_significant_move(
                &applied.bounds,
                &viewport.bounds,
                self.config.significance_ratio,
            ),
        };
        if !significant {
            return GateDecision::Ignored;
        }

        let due_at = now + self.config.debounce();
        log::debug!(
            "significant viewport move to {:?}, refresh due in {}ms",
            viewport.bounds.center(),
            self.config.debounce_ms
        );
        let superseded = match self.pending.take() {
            Some(pending) => pending.superseded,
            None => self.applied.take(),
        };
        self.pending = Some(PendingRefresh {
            params: BoundsParams::padded(&viewport, self.config.padding_ratio),
            due_at,
            superseded,
        });
        self.applied = Some(viewport);
        GateDecision::Scheduled { due_at }
    }

    /// Takes the pending refresh once its debounce has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<BoundsParams> {
        match &self.pending {
            Some(pending) if pending.due_at <= now => self.pending.take().map(|p| p.params),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
