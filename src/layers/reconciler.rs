//! Layer reconciliation
//!
//! [`reconcile`] is a pure function from the current registry and a store
//! snapshot to the list of actions that would make the canvas match the
//! snapshot. The engine applies the actions; nothing here touches the canvas.
//! Running it again against the registry it produced yields an empty plan.

use crate::layers::descriptor::{DescriptorSnapshot, LayerDescriptor, LayerKind};
use crate::layers::pane::Pane;
use crate::layers::registry::ResourceRegistry;
use crate::prelude::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileAction<'a> {
    /// Build the drawable, then fade it toward `target`
    Create {
        descriptor: &'a LayerDescriptor,
        pane: Pane,
        target: f32,
    },
    /// Source fields changed; update the existing drawable in place
    UpdateSource { descriptor: &'a LayerDescriptor },
    /// Effective opacity changed
    Retarget { layer_id: &'a str, target: f32 },
    /// The store now declares a different kind; the drawable is kept as built
    KindChanged { layer_id: &'a str, kind: LayerKind },
}

impl ReconcileAction<'_> {
    pub fn layer_id(&self) -> &str {
        match self {
            ReconcileAction::Create { descriptor, .. } => &descriptor.id,
            ReconcileAction::UpdateSource { descriptor } => &descriptor.id,
            ReconcileAction::Retarget { layer_id, .. } => layer_id,
            ReconcileAction::KindChanged { layer_id, .. } => layer_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan<'a> {
    pub actions: Vec<ReconcileAction<'a>>,
}

impl ReconcilePlan<'_> {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// Computes the actions needed to bring `registry` in line with `snapshot`.
///
/// Descriptors are visited in list order. A drawable is only built once a
/// layer is effectively enabled, so layers nobody switches on cost nothing.
/// Layers drawn by self-managing components are never touched.
pub fn reconcile<'a>(
    registry: &ResourceRegistry,
    snapshot: &'a DescriptorSnapshot,
) -> ReconcilePlan<'a> {
    let mut plan = ReconcilePlan::default();
    let mut seen: HashSet<&str> = HashSet::default();

    for layer in snapshot.resolved() {
        let descriptor = layer.descriptor;

        if !descriptor.kind.is_managed() {
            continue;
        }
        if !seen.insert(descriptor.id.as_str()) {
            log::warn!(
                "layer id {} appears more than once; later entries are ignored",
                descriptor.id
            );
            continue;
        }

        let target = layer.target_opacity();

        let Some(handle) = registry.get(&descriptor.id) else {
            if layer.effective_enabled {
                plan.actions.push(ReconcileAction::Create {
                    descriptor,
                    pane: Pane::for_descriptor(descriptor),
                    target,
                });
            }
            continue;
        };

        if handle.declared_kind() != descriptor.kind {
            plan.actions.push(ReconcileAction::KindChanged {
                layer_id: &descriptor.id,
                kind: descriptor.kind,
            });
        }

        if handle.source != descriptor.source {
            plan.actions.push(ReconcileAction::UpdateSource { descriptor });
        }

        if handle.target_opacity() != target {
            plan.actions.push(ReconcileAction::Retarget {
                layer_id: &descriptor.id,
                target,
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawableId;
    use crate::layers::descriptor::{LayerGroup, LayerKind, LayerSource};
    use crate::layers::registry::ResourceHandle;

    fn dynamic(id: &str, enabled: bool) -> LayerDescriptor {
        LayerDescriptor::new(
            id,
            LayerKind::DynamicService,
            LayerSource::url("https://example.gov.au/MapServer").with_sublayer(1),
        )
        .with_opacity(0.7)
        .enabled(enabled)
    }

    fn snapshot(layers: Vec<LayerDescriptor>) -> DescriptorSnapshot {
        DescriptorSnapshot::new(vec![LayerGroup::new("planning", layers)])
    }

    /// Registry as the engine would leave it after applying `plan`
    fn apply(registry: &mut ResourceRegistry, plan: &ReconcilePlan<'_>) {
        for (i, action) in plan.actions.iter().enumerate() {
            match action {
                ReconcileAction::Create {
                    descriptor,
                    pane,
                    target,
                } => {
                    let mut handle = ResourceHandle::new(descriptor, DrawableId(i as u64), *pane);
                    handle.set_target_opacity(*target);
                    registry.insert(handle);
                }
                ReconcileAction::UpdateSource { descriptor } => {
                    registry.get_mut(&descriptor.id).unwrap().source = descriptor.source.clone();
                }
                ReconcileAction::Retarget { layer_id, target } => {
                    registry.get_mut(layer_id).unwrap().set_target_opacity(*target);
                }
                ReconcileAction::KindChanged { layer_id, kind } => {
                    registry.get_mut(layer_id).unwrap().set_declared_kind(*kind);
                }
            }
        }
    }

    #[test]
    fn test_creates_only_enabled_layers() {
        let registry = ResourceRegistry::new();
        let snap = snapshot(vec![dynamic("zoning", true), dynamic("fsr", false)]);

        let plan = reconcile(&registry, &snap);
        assert_eq!(plan.len(), 1);
        assert!(matches!(
            plan.actions[0],
            ReconcileAction::Create { pane: Pane::Overlay, target, .. } if target == 0.7
        ));
    }

    #[test]
    fn test_second_pass_is_empty() {
        let mut registry = ResourceRegistry::new();
        let snap = snapshot(vec![dynamic("zoning", true), dynamic("fsr", false)]);

        let plan = reconcile(&registry, &snap);
        apply(&mut registry, &plan);

        assert!(reconcile(&registry, &snap).is_empty());
    }

    #[test]
    fn test_disable_retargets_existing_handle() {
        let mut registry = ResourceRegistry::new();
        let on = snapshot(vec![dynamic("zoning", true)]);
        let plan = reconcile(&registry, &on);
        apply(&mut registry, &plan);

        let off = on.toggled("zoning");
        let plan = reconcile(&registry, &off);
        assert_eq!(
            plan.actions,
            vec![ReconcileAction::Retarget {
                layer_id: "zoning",
                target: 0.0
            }]
        );
    }

    #[test]
    fn test_filter_change_updates_in_place() {
        let mut registry = ResourceRegistry::new();
        let before = snapshot(vec![dynamic("zoning", true)]);
        let plan = reconcile(&registry, &before);
        apply(&mut registry, &plan);

        let mut after = before.clone();
        after.layer_mut("zoning").unwrap().source.filter = LayerSource::zone_filter(&["R2"]);

        let plan = reconcile(&registry, &after);
        assert_eq!(plan.len(), 1);
        assert!(matches!(plan.actions[0], ReconcileAction::UpdateSource { .. }));
    }

    #[test]
    fn test_group_toggle_gates_members() {
        let mut registry = ResourceRegistry::new();
        let mut snap = snapshot(vec![dynamic("zoning", true)]);
        let plan = reconcile(&registry, &snap);
        apply(&mut registry, &plan);

        snap.group_mut("planning").unwrap().enabled = false;
        let plan = reconcile(&registry, &snap);
        assert_eq!(
            plan.actions,
            vec![ReconcileAction::Retarget {
                layer_id: "zoning",
                target: 0.0
            }]
        );
        apply(&mut registry, &plan);

        snap.group_mut("planning").unwrap().enabled = true;
        let plan = reconcile(&registry, &snap);
        assert_eq!(
            plan.actions,
            vec![ReconcileAction::Retarget {
                layer_id: "zoning",
                target: 0.7
            }]
        );
    }

    #[test]
    fn test_external_and_duplicate_layers_skipped() {
        let registry = ResourceRegistry::new();
        let external = LayerDescriptor::new("stations", LayerKind::External, LayerSource::default())
            .enabled(true);
        let snap = snapshot(vec![external, dynamic("zoning", true), dynamic("zoning", true)]);

        let plan = reconcile(&registry, &snap);
        let ids: Vec<_> = plan.actions.iter().map(|a| a.layer_id()).collect();
        assert_eq!(ids, vec!["zoning"]);
    }

    #[test]
    fn test_kind_change_reported_once() {
        let mut registry = ResourceRegistry::new();
        let mut snap = snapshot(vec![dynamic("zoning", true)]);
        let plan = reconcile(&registry, &snap);
        apply(&mut registry, &plan);

        snap.layer_mut("zoning").unwrap().kind = LayerKind::VectorFeatureService;
        let plan = reconcile(&registry, &snap);
        assert_eq!(
            plan.actions,
            vec![ReconcileAction::KindChanged {
                layer_id: "zoning",
                kind: LayerKind::VectorFeatureService
            }]
        );
        apply(&mut registry, &plan);

        assert!(reconcile(&registry, &snap).is_empty());
        let handle = registry.get("zoning").unwrap();
        assert_eq!(handle.kind, LayerKind::DynamicService);
        assert_eq!(handle.declared_kind(), LayerKind::VectorFeatureService);
    }
}
