//! The imperative shell around reconciliation.
//!
//! [`OverlayEngine`] owns the resource registry, the fade scheduler and the
//! viewport gate, and is the only thing that calls into the canvas. It never
//! blocks: the host calls [`OverlayEngine::apply_snapshot`] when the layer
//! store changes, [`OverlayEngine::viewport_changed`] on map moves, and
//! [`OverlayEngine::advance`] whenever [`OverlayEngine::next_deadline`] comes
//! due. Failures are contained per layer and logged.

use crate::animation::fade::OpacityScheduler;
use crate::canvas::{DrawableSpec, MapCanvas};
use crate::core::config::{EngineOptions, EngineProfile};
use crate::core::viewport::{BoundsParams, GateDecision, ViewportGate, ViewportSnapshot};
use crate::layers::descriptor::{DescriptorSnapshot, LayerDescriptor};
use crate::layers::pane::{Pane, PANE_ORDER};
use crate::layers::reconciler::{reconcile, ReconcileAction};
use crate::layers::registry::{ResourceHandle, ResourceRegistry};
use crate::{OverlayError, Result};
use instant::Instant;

/// What one reconciliation pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated_sources: Vec<String>,
    pub retargeted: Vec<String>,
    /// Layers whose drawable could not be built; retried on the next pass
    pub failed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.updated_sources.is_empty()
            && self.retargeted.is_empty()
            && self.failed.is_empty()
    }
}

pub struct OverlayEngine<C: MapCanvas> {
    canvas: C,
    options: EngineOptions,
    registry: ResourceRegistry,
    scheduler: OpacityScheduler,
    gate: ViewportGate,
    torn_down: bool,
}

impl<C: MapCanvas> OverlayEngine<C> {
    /// Creates the engine and the fixed pane stack on `canvas`.
    pub fn new(mut canvas: C, options: EngineOptions) -> Result<Self> {
        options.validate()?;

        for pane in PANE_ORDER {
            canvas.create_pane(pane, pane.z_index())?;
        }

        Ok(Self {
            scheduler: OpacityScheduler::new(options.fade.clone()),
            gate: ViewportGate::new(options.viewport.clone()),
            registry: ResourceRegistry::new(),
            canvas,
            options,
            torn_down: false,
        })
    }

    pub fn with_profile(canvas: C, profile: EngineProfile) -> Result<Self> {
        Self::new(canvas, profile.resolve())
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &OpacityScheduler {
        &self.scheduler
    }

    pub fn gate(&self) -> &ViewportGate {
        &self.gate
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Brings the canvas in line with a fresh store snapshot.
    ///
    /// A layer that fails to build is logged and left out; the rest of the
    /// pass carries on.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &DescriptorSnapshot,
        now: Instant,
    ) -> Result<ReconcileReport> {
        self.ensure_live()?;

        let plan = reconcile(&self.registry, snapshot);
        let mut report = ReconcileReport::default();

        for action in plan.actions {
            match action {
                ReconcileAction::Create {
                    descriptor,
                    pane,
                    target,
                } => match self.create(descriptor, pane) {
                    Ok(()) => {
                        report.created.push(descriptor.id.clone());
                        self.retarget(&descriptor.id, target, now);
                    }
                    Err(e) => {
                        log::warn!("failed to build layer {}: {}", descriptor.id, e);
                        report.failed.push(descriptor.id.clone());
                    }
                },
                ReconcileAction::UpdateSource { descriptor } => {
                    if self.update_source(descriptor) {
                        report.updated_sources.push(descriptor.id.clone());
                    }
                }
                ReconcileAction::Retarget { layer_id, target } => {
                    self.retarget(layer_id, target, now);
                    report.retargeted.push(layer_id.to_string());
                }
                ReconcileAction::KindChanged { layer_id, kind } => {
                    if let Some(handle) = self.registry.get_mut(layer_id) {
                        log::debug!(
                            "layer {} changed kind {} -> {}; keeping the existing drawable",
                            layer_id,
                            handle.kind,
                            kind
                        );
                        handle.set_declared_kind(kind);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Feeds a map move through the viewport gate.
    pub fn viewport_changed(
        &mut self,
        viewport: ViewportSnapshot,
        now: Instant,
    ) -> Result<GateDecision> {
        self.ensure_live()?;
        Ok(self.gate.observe(viewport, now))
    }

    /// Runs fade ticks and the debounced bounds refresh that are due by `now`.
    pub fn advance(&mut self, now: Instant) -> Result<()> {
        self.ensure_live()?;

        for update in self.scheduler.advance(&mut self.registry, now) {
            let Some(handle) = self.registry.get_mut(&update.layer_id) else {
                continue;
            };
            if let Err(e) = self.canvas.set_opacity(handle.drawable, update.opacity) {
                log::warn!("failed to set opacity on {}: {}", handle.layer_id, e);
            }
            if update.detach {
                match self.canvas.detach(handle.drawable) {
                    Ok(()) => handle.set_attached(false),
                    Err(e) => log::warn!("failed to detach {}: {}", handle.layer_id, e),
                }
            }
        }

        if let Some(params) = self.gate.take_due(now) {
            self.refresh_bounds(&params);
        }
        Ok(())
    }

    /// Earliest instant at which [`Self::advance`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        match (self.scheduler.next_deadline(), self.gate.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.next_deadline().is_none()
    }

    /// Cancels every fade and the pending refresh and frees every drawable.
    /// Nothing fires afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel_all();
        self.gate.cancel();

        let handles = self.registry.drain();
        log::debug!("tearing down overlay engine with {} drawables", handles.len());
        for handle in handles {
            if let Err(e) = self.canvas.remove_drawable(handle.drawable) {
                log::warn!("failed to remove {}: {}", handle.layer_id, e);
            }
        }
        self.torn_down = true;
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            Err(OverlayError::TornDown)
        } else {
            Ok(())
        }
    }

    fn create(&mut self, descriptor: &LayerDescriptor, pane: Pane) -> Result<()> {
        descriptor.source.validate(&descriptor.id, descriptor.kind)?;

        let drawable = self.canvas.create_drawable(&DrawableSpec {
            layer_id: &descriptor.id,
            kind: descriptor.kind,
            source: &descriptor.source,
            pane,
        })?;
        log::debug!(
            "built {} layer {} as {} in {}",
            descriptor.kind,
            descriptor.id,
            drawable,
            pane
        );
        self.registry.insert(ResourceHandle::new(descriptor, drawable, pane));
        Ok(())
    }

    fn update_source(&mut self, descriptor: &LayerDescriptor) -> bool {
        let Some(handle) = self.registry.get_mut(&descriptor.id) else {
            return false;
        };
        match self.canvas.update_source(handle.drawable, &descriptor.source) {
            Ok(()) => {
                handle.source = descriptor.source.clone();
                true
            }
            Err(e) => {
                log::warn!("failed to update source of {}: {}", descriptor.id, e);
                false
            }
        }
    }

    fn retarget(&mut self, layer_id: &str, target: f32, now: Instant) {
        let Some(handle) = self.registry.get_mut(layer_id) else {
            return;
        };
        let start = self.scheduler.start(handle, target, now);

        // Bounds that moved on while the layer was heading out are caught up
        // before it shows again, whether or not it was detached yet
        if handle.is_showing() && handle.bounds_sensitive && handle.is_bounds_stale() {
            if let Some(params) = self.gate.applied_params() {
                push_bounds(&mut self.canvas, handle, &params);
            }
        }

        if start.attach {
            match self.canvas.attach(handle.drawable) {
                Ok(()) => handle.set_attached(true),
                Err(e) => log::warn!("failed to attach {}: {}", layer_id, e),
            }
        }

        if start.detach {
            match self.canvas.detach(handle.drawable) {
                Ok(()) => handle.set_attached(false),
                Err(e) => log::warn!("failed to detach {}: {}", layer_id, e),
            }
        }
    }

    fn refresh_bounds(&mut self, params: &BoundsParams) {
        for layer_id in self.registry.bounds_sensitive_ids() {
            let Some(handle) = self.registry.get_mut(&layer_id) else {
                continue;
            };
            if handle.is_showing() {
                push_bounds(&mut self.canvas, handle, params);
            } else {
                log::debug!("{} hidden; deferring bounds refresh", layer_id);
                handle.mark_bounds_stale(true);
            }
        }
    }
}

/// Sends bounds to one drawable. A rejected update leaves the drawable on its
/// last good bounds and marks it stale so the next fade-in tries again.
fn push_bounds<C: MapCanvas>(canvas: &mut C, handle: &mut ResourceHandle, params: &BoundsParams) {
    match canvas.set_bounds(handle.drawable, params) {
        Ok(()) => handle.mark_bounds_stale(false),
        Err(e) => {
            log::warn!("bounds update rejected for {}: {}", handle.layer_id, e);
            handle.mark_bounds_stale(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasCall, RecordingCanvas};
    use crate::layers::descriptor::{LayerGroup, LayerKind, LayerSource};
    use std::time::Duration;

    fn engine() -> OverlayEngine<RecordingCanvas> {
        OverlayEngine::new(RecordingCanvas::new(), EngineOptions::default()).unwrap()
    }

    fn snapshot(enabled: bool) -> DescriptorSnapshot {
        DescriptorSnapshot::new(vec![LayerGroup::new(
            "base",
            vec![LayerDescriptor::new(
                "imagery",
                LayerKind::TiledRaster,
                LayerSource::url("https://tiles.example.com/{z}/{y}/{x}"),
            )
            .enabled(enabled)],
        )])
    }

    #[test]
    fn test_panes_created_back_to_front() {
        let engine = engine();
        assert_eq!(engine.canvas().panes(), &PANE_ORDER);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut options = EngineOptions::default();
        options.fade.step = 2.0;
        assert!(OverlayEngine::new(RecordingCanvas::new(), options).is_err());
    }

    #[test]
    fn test_deadline_tracks_fades() {
        let mut engine = engine();
        let now = Instant::now();
        assert!(engine.is_idle());

        engine.apply_snapshot(&snapshot(true), now).unwrap();
        assert_eq!(engine.next_deadline(), Some(now + Duration::from_millis(16)));
    }

    #[test]
    fn test_teardown_frees_everything() {
        let mut engine = engine();
        let now = Instant::now();
        engine.apply_snapshot(&snapshot(true), now).unwrap();
        assert_eq!(engine.canvas().live_drawables(), 1);

        engine.teardown();
        assert!(engine.is_torn_down());
        assert!(engine.registry().is_empty());
        assert_eq!(engine.canvas().live_drawables(), 0);
        assert_eq!(engine.next_deadline(), None);

        let calls = engine.canvas().calls().len();
        assert!(matches!(
            engine.advance(now + Duration::from_secs(1)),
            Err(OverlayError::TornDown)
        ));
        assert!(matches!(
            engine.apply_snapshot(&snapshot(false), now),
            Err(OverlayError::TornDown)
        ));
        assert_eq!(engine.canvas().calls().len(), calls);

        // A second teardown is harmless
        engine.teardown();
        assert_eq!(
            engine
                .canvas()
                .count_calls(|c| matches!(c, CanvasCall::Remove { .. })),
            1
        );
    }
}
