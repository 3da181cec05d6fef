use crate::canvas::DrawableId;
use crate::layers::descriptor::{LayerDescriptor, LayerKind, LayerSource};
use crate::layers::pane::Pane;
use crate::prelude::HashMap;

/// Live drawable owned by the engine for one layer id
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHandle {
    /// Back-reference to the descriptor; identity only
    pub layer_id: String,
    pub drawable: DrawableId,
    /// Kind the drawable was built as
    pub kind: LayerKind,
    pub pane: Pane,
    /// Source as last applied to the drawable
    pub source: LayerSource,
    /// Fixed at creation, like `kind`; later store edits are not carried over
    pub bounds_sensitive: bool,
    /// Kind the store last declared for this id
    declared_kind: LayerKind,
    current_opacity: f32,
    target_opacity: f32,
    attached: bool,
    /// Bounds moved on while the layer was hidden
    bounds_stale: bool,
}

impl ResourceHandle {
    /// A freshly built handle: transparent, detached, and (if bounds
    /// sensitive) waiting for its first bounds.
    pub fn new(descriptor: &LayerDescriptor, drawable: DrawableId, pane: Pane) -> Self {
        Self {
            layer_id: descriptor.id.clone(),
            drawable,
            kind: descriptor.kind,
            pane,
            source: descriptor.source.clone(),
            bounds_sensitive: descriptor.bounds_sensitive,
            declared_kind: descriptor.kind,
            current_opacity: 0.0,
            target_opacity: 0.0,
            attached: false,
            bounds_stale: descriptor.bounds_sensitive,
        }
    }

    pub fn declared_kind(&self) -> LayerKind {
        self.declared_kind
    }

    pub fn set_declared_kind(&mut self, kind: LayerKind) {
        self.declared_kind = kind;
    }

    pub fn current_opacity(&self) -> f32 {
        self.current_opacity
    }

    pub fn set_current_opacity(&mut self, opacity: f32) {
        self.current_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn target_opacity(&self) -> f32 {
        self.target_opacity
    }

    pub fn set_target_opacity(&mut self, opacity: f32) {
        self.target_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn is_bounds_stale(&self) -> bool {
        self.bounds_stale
    }

    pub fn mark_bounds_stale(&mut self, stale: bool) {
        self.bounds_stale = stale;
    }

    /// Visible now or heading there
    pub fn is_showing(&self) -> bool {
        self.target_opacity > 0.0
    }
}

/// Arena of live drawables keyed by layer id.
///
/// Entries are created at most once per id and only leave when the engine
/// is torn down.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    handles: HashMap<String, ResourceHandle>,
    /// Creation order, for deterministic iteration
    order: Vec<String>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a handle for a new id. Returns false (and keeps the existing
    /// handle) if the id is already registered.
    pub fn insert(&mut self, handle: ResourceHandle) -> bool {
        if self.handles.contains_key(&handle.layer_id) {
            return false;
        }
        self.order.push(handle.layer_id.clone());
        self.handles.insert(handle.layer_id.clone(), handle);
        true
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.handles.contains_key(layer_id)
    }

    pub fn get(&self, layer_id: &str) -> Option<&ResourceHandle> {
        self.handles.get(layer_id)
    }

    pub fn get_mut(&mut self, layer_id: &str) -> Option<&mut ResourceHandle> {
        self.handles.get_mut(layer_id)
    }

    /// Handles in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.order.iter().filter_map(|id| self.handles.get(id))
    }

    pub fn bounds_sensitive_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|h| h.bounds_sensitive)
            .map(|h| h.layer_id.clone())
            .collect()
    }

    /// Empties the registry, yielding handles in creation order
    pub fn drain(&mut self) -> Vec<ResourceHandle> {
        let order = std::mem::take(&mut self.order);
        let mut handles = std::mem::take(&mut self.handles);
        order
            .into_iter()
            .filter_map(|id| handles.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
