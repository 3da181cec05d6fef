//! Opacity transition scheduling
//!
//! Every live fade is a [`SteppedTween`] keyed by layer id, and all of them
//! advance together on one shared tick, so the number of timers stays at one
//! however many layers are animating. Starting a new fade for a layer replaces
//! the old one outright: the latest desired state wins.

use crate::animation::tweening::{SteppedTween, TweenStep};
use crate::core::config::FadeConfig;
use crate::layers::registry::{ResourceHandle, ResourceRegistry};
use instant::Instant;

/// Visibility work the caller must do when a fade is (re)targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FadeStart {
    /// A fade task is now running
    pub started: bool,
    /// Reattach the paint surface before any non-zero opacity is applied
    pub attach: bool,
    /// Already transparent and staying there; detach now
    pub detach: bool,
}

/// One tick's worth of change for one layer
#[derive(Debug, Clone, PartialEq)]
pub struct FadeUpdate {
    pub layer_id: String,
    pub opacity: f32,
    pub converged: bool,
    /// Converged at zero; the paint surface can be detached
    pub detach: bool,
}

pub struct OpacityScheduler {
    config: FadeConfig,
    /// Active fades in start order; at most one per layer
    fades: Vec<(String, SteppedTween)>,
    next_tick_at: Option<Instant>,
}

impl OpacityScheduler {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config,
            fades: Vec::new(),
            next_tick_at: None,
        }
    }

    pub fn config(&self) -> &FadeConfig {
        &self.config
    }

    /// Points `handle` at a new target opacity.
    ///
    /// Cancels any fade already running for the handle. A target equal to the
    /// current opacity starts nothing.
    pub fn start(&mut self, handle: &mut ResourceHandle, target: f32, now: Instant) -> FadeStart {
        handle.set_target_opacity(target);
        let target = handle.target_opacity();
        let cancelled = self.cancel(&handle.layer_id);

        if handle.current_opacity() == target {
            if cancelled {
                log::debug!("fade for {} cancelled at {}", handle.layer_id, target);
            }
            return FadeStart {
                started: false,
                attach: false,
                detach: target == 0.0 && handle.is_attached(),
            };
        }

        log::debug!(
            "fading {} from {:.2} to {:.2}",
            handle.layer_id,
            handle.current_opacity(),
            target
        );
        self.fades.push((
            handle.layer_id.clone(),
            SteppedTween::new(handle.current_opacity(), target, self.config.step),
        ));
        if self.next_tick_at.is_none() {
            self.next_tick_at = Some(now + self.config.tick_interval());
        }

        FadeStart {
            started: true,
            attach: target > 0.0 && !handle.is_attached(),
            detach: false,
        }
    }

    /// Drops the fade for a layer, leaving its opacity where it is
    pub fn cancel(&mut self, layer_id: &str) -> bool {
        let before = self.fades.len();
        self.fades.retain(|(id, _)| id != layer_id);
        if self.fades.is_empty() {
            self.next_tick_at = None;
        }
        self.fades.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.fades.clear();
        self.next_tick_at = None;
    }

    pub fn is_fading(&self, layer_id: &str) -> bool {
        self.fades.iter().any(|(id, _)| id == layer_id)
    }

    pub fn fade_target(&self, layer_id: &str) -> Option<f32> {
        self.fades
            .iter()
            .find(|(id, _)| id == layer_id)
            .map(|(_, tween)| tween.target())
    }

    pub fn active_count(&self) -> usize {
        self.fades.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick_at
    }

    /// Runs every tick that has come due by `now`, updating each handle's
    /// current opacity, and returns the changes in order.
    pub fn advance(&mut self, registry: &mut ResourceRegistry, now: Instant) -> Vec<FadeUpdate> {
        let mut updates = Vec::new();

        while let Some(due) = self.next_tick_at {
            if due > now || self.fades.is_empty() {
                break;
            }
            self.tick(registry, &mut updates);
            self.next_tick_at = Some(due + self.config.tick_interval());
        }

        if self.fades.is_empty() {
            self.next_tick_at = None;
        }
        updates
    }

    fn tick(&mut self, registry: &mut ResourceRegistry, updates: &mut Vec<FadeUpdate>) {
        self.fades.retain_mut(|(layer_id, tween)| {
            let Some(handle) = registry.get_mut(layer_id) else {
                return false;
            };

            let step = tween.step();
            handle.set_current_opacity(step.value());
            let converged = step.is_converged();
            if converged {
                log::debug!("fade for {} converged at {:.2}", layer_id, step.value());
            }
            updates.push(FadeUpdate {
                layer_id: layer_id.clone(),
                opacity: step.value(),
                converged,
                detach: matches!(step, TweenStep::Converged(v) if v == 0.0),
            });
            !converged
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawableId;
    use crate::layers::descriptor::{LayerDescriptor, LayerKind, LayerSource};
    use crate::layers::pane::Pane;
    use std::time::Duration;

    fn registry_with(id: &str) -> ResourceRegistry {
        let descriptor = LayerDescriptor::new(id, LayerKind::TiledRaster, LayerSource::default());
        let mut registry = ResourceRegistry::new();
        registry.insert(ResourceHandle::new(&descriptor, DrawableId(1), Pane::Overlay));
        registry
    }

    fn config() -> FadeConfig {
        FadeConfig {
            step: 0.25,
            tick_interval_ms: 10,
        }
    }

    #[test]
    fn test_fade_in_requests_attach_first() {
        let mut registry = registry_with("zoning");
        let mut scheduler = OpacityScheduler::new(config());
        let now = Instant::now();

        let start = scheduler.start(registry.get_mut("zoning").unwrap(), 0.5, now);
        assert!(start.started);
        assert!(start.attach);
        assert_eq!(scheduler.next_deadline(), Some(now + Duration::from_millis(10)));

        // Nothing is due yet
        assert!(scheduler.advance(&mut registry, now).is_empty());

        let updates = scheduler.advance(&mut registry, now + Duration::from_millis(20));
        let opacities: Vec<_> = updates.iter().map(|u| u.opacity).collect();
        assert_eq!(opacities, vec![0.25, 0.5]);
        assert!(updates[1].converged);
        assert!(!updates[1].detach);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(registry.get("zoning").unwrap().current_opacity(), 0.5);
    }

    #[test]
    fn test_new_target_replaces_running_fade() {
        let mut registry = registry_with("zoning");
        let mut scheduler = OpacityScheduler::new(config());
        let now = Instant::now();

        scheduler.start(registry.get_mut("zoning").unwrap(), 1.0, now);
        scheduler.advance(&mut registry, now + Duration::from_millis(10));
        scheduler.start(registry.get_mut("zoning").unwrap(), 0.0, now);

        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.fade_target("zoning"), Some(0.0));

        let updates = scheduler.advance(&mut registry, now + Duration::from_secs(1));
        let last = updates.last().unwrap();
        assert_eq!(last.opacity, 0.0);
        assert!(last.detach);
    }

    #[test]
    fn test_same_target_is_noop() {
        let mut registry = registry_with("zoning");
        let mut scheduler = OpacityScheduler::new(config());

        let start = scheduler.start(registry.get_mut("zoning").unwrap(), 0.0, Instant::now());
        assert_eq!(start, FadeStart::default());
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_cancelled_fade_in_detaches_when_target_returns_to_zero() {
        let mut registry = registry_with("zoning");
        let mut scheduler = OpacityScheduler::new(config());
        let now = Instant::now();

        scheduler.start(registry.get_mut("zoning").unwrap(), 1.0, now);
        registry.get_mut("zoning").unwrap().set_attached(true);

        // Toggled back off before the first tick ran
        let start = scheduler.start(registry.get_mut("zoning").unwrap(), 0.0, now);
        assert!(!start.started);
        assert!(start.detach);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
