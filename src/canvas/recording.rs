use crate::core::viewport::BoundsParams;
use crate::layers::descriptor::{LayerKind, LayerSource};
use crate::layers::pane::Pane;
use crate::prelude::{HashMap, HashSet};
use crate::{OverlayError, Result};

use super::{DrawableId, DrawableSpec, MapCanvas};

/// One call made into the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    CreatePane {
        pane: Pane,
        z_index: i32,
    },
    Create {
        layer_id: String,
        kind: LayerKind,
        pane: Pane,
        drawable: DrawableId,
    },
    UpdateSource {
        drawable: DrawableId,
        source: LayerSource,
    },
    SetOpacity {
        drawable: DrawableId,
        opacity: f32,
    },
    Attach {
        drawable: DrawableId,
    },
    Detach {
        drawable: DrawableId,
    },
    SetBounds {
        drawable: DrawableId,
        params: BoundsParams,
    },
    Remove {
        drawable: DrawableId,
    },
}

#[derive(Debug, Clone)]
struct DrawableState {
    layer_id: String,
    pane: Pane,
    source: LayerSource,
    opacity: f32,
    attached: bool,
    bounds: Option<BoundsParams>,
}

/// Canvas that keeps drawable state in memory and records every call.
///
/// Used by the replay tool and the tests; failures can be injected per layer.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<CanvasCall>,
    drawables: HashMap<DrawableId, DrawableState>,
    by_layer: HashMap<String, DrawableId>,
    panes: Vec<Pane>,
    next_id: u64,
    failing_creates: HashSet<String>,
    failing_bounds: bool,
    echo: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs every call at info level as it happens
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Makes drawable construction for `layer_id` fail until cleared
    pub fn fail_create(&mut self, layer_id: &str) {
        self.failing_creates.insert(layer_id.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.failing_creates.clear();
        self.failing_bounds = false;
    }

    /// Makes every `set_bounds` call fail
    pub fn fail_bounds(&mut self, fail: bool) {
        self.failing_bounds = fail;
    }

    pub fn calls(&self) -> &[CanvasCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn drawable_for(&self, layer_id: &str) -> Option<DrawableId> {
        self.by_layer.get(layer_id).copied()
    }

    /// Number of drawables ever built for a layer
    pub fn create_count(&self, layer_id: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| {
                matches!(call, CanvasCall::Create { layer_id: id, .. } if id == layer_id)
            })
            .count()
    }

    pub fn count_calls(&self, predicate: impl Fn(&CanvasCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Opacity values applied to a layer's drawable, in order
    pub fn opacity_history(&self, layer_id: &str) -> Vec<f32> {
        let Some(drawable) = self.drawable_for(layer_id) else {
            return Vec::new();
        };
        self.calls
            .iter()
            .filter_map(|call| match call {
                CanvasCall::SetOpacity { drawable: d, opacity } if *d == drawable => Some(*opacity),
                _ => None,
            })
            .collect()
    }

    pub fn opacity(&self, layer_id: &str) -> Option<f32> {
        self.state(layer_id).map(|s| s.opacity)
    }

    pub fn is_attached(&self, layer_id: &str) -> Option<bool> {
        self.state(layer_id).map(|s| s.attached)
    }

    pub fn pane_of(&self, layer_id: &str) -> Option<Pane> {
        self.state(layer_id).map(|s| s.pane)
    }

    pub fn source_of(&self, layer_id: &str) -> Option<&LayerSource> {
        self.state(layer_id).map(|s| &s.source)
    }

    pub fn bounds_of(&self, layer_id: &str) -> Option<&BoundsParams> {
        self.state(layer_id).and_then(|s| s.bounds.as_ref())
    }

    pub fn live_drawables(&self) -> usize {
        self.drawables.len()
    }

    fn state(&self, layer_id: &str) -> Option<&DrawableState> {
        self.by_layer
            .get(layer_id)
            .and_then(|id| self.drawables.get(id))
    }

    fn state_mut(&mut self, drawable: DrawableId) -> Result<&mut DrawableState> {
        self.drawables
            .get_mut(&drawable)
            .ok_or_else(|| OverlayError::Canvas(format!("unknown {drawable}")))
    }

    fn record(&mut self, call: CanvasCall) {
        if self.echo {
            log::info!("canvas: {:?}", call);
        }
        self.calls.push(call);
    }
}

impl MapCanvas for RecordingCanvas {
    fn create_pane(&mut self, pane: Pane, z_index: i32) -> Result<()> {
        if !self.panes.contains(&pane) {
            self.panes.push(pane);
        }
        self.record(CanvasCall::CreatePane { pane, z_index });
        Ok(())
    }

    fn create_drawable(&mut self, spec: &DrawableSpec<'_>) -> Result<DrawableId> {
        if self.failing_creates.contains(spec.layer_id) {
            return Err(OverlayError::Canvas(format!(
                "cannot build {} layer {}",
                spec.kind, spec.layer_id
            )));
        }
        if !self.panes.contains(&spec.pane) {
            return Err(OverlayError::UnknownPane(spec.pane.name().to_string()));
        }

        self.next_id += 1;
        let drawable = DrawableId(self.next_id);
        self.drawables.insert(
            drawable,
            DrawableState {
                layer_id: spec.layer_id.to_string(),
                pane: spec.pane,
                source: spec.source.clone(),
                opacity: 0.0,
                attached: false,
                bounds: None,
            },
        );
        self.by_layer.insert(spec.layer_id.to_string(), drawable);
        self.record(CanvasCall::Create {
            layer_id: spec.layer_id.to_string(),
            kind: spec.kind,
            pane: spec.pane,
            drawable,
        });
        Ok(drawable)
    }

    fn update_source(&mut self, drawable: DrawableId, source: &LayerSource) -> Result<()> {
        self.state_mut(drawable)?.source = source.clone();
        self.record(CanvasCall::UpdateSource {
            drawable,
            source: source.clone(),
        });
        Ok(())
    }

    fn set_opacity(&mut self, drawable: DrawableId, opacity: f32) -> Result<()> {
        self.state_mut(drawable)?.opacity = opacity;
        self.record(CanvasCall::SetOpacity { drawable, opacity });
        Ok(())
    }

    fn attach(&mut self, drawable: DrawableId) -> Result<()> {
        self.state_mut(drawable)?.attached = true;
        self.record(CanvasCall::Attach { drawable });
        Ok(())
    }

    fn detach(&mut self, drawable: DrawableId) -> Result<()> {
        self.state_mut(drawable)?.attached = false;
        self.record(CanvasCall::Detach { drawable });
        Ok(())
    }

    fn set_bounds(&mut self, drawable: DrawableId, params: &BoundsParams) -> Result<()> {
        if self.failing_bounds {
            let layer_id = self.state_mut(drawable)?.layer_id.clone();
            return Err(OverlayError::Canvas(format!(
                "bounds update rejected for {layer_id}"
            )));
        }
        self.state_mut(drawable)?.bounds = Some(params.clone());
        self.record(CanvasCall::SetBounds {
            drawable,
            params: params.clone(),
        });
        Ok(())
    }

    fn remove_drawable(&mut self, drawable: DrawableId) -> Result<()> {
        let state = self
            .drawables
            .remove(&drawable)
            .ok_or_else(|| OverlayError::Canvas(format!("unknown {drawable}")))?;
        self.by_layer.remove(&state.layer_id);
        self.record(CanvasCall::Remove { drawable });
        Ok(())
    }
}
