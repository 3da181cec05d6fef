//! Tokio driver for the engine
//!
//! The engine itself never blocks or spawns; this module supplies the host
//! event loop. One task owns the engine, takes store and viewport events off a
//! channel and sleeps until the engine's next deadline in between, so no two
//! callbacks ever run at the same time.

use crate::canvas::MapCanvas;
use crate::core::viewport::ViewportSnapshot;
use crate::engine::OverlayEngine;
use crate::layers::descriptor::DescriptorSnapshot;
use crate::Result;
use instant::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The layer store changed
    Snapshot(DescriptorSnapshot),
    /// The map moved
    Viewport(ViewportSnapshot),
    Shutdown,
}

pub type EventSender = mpsc::UnboundedSender<EngineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Runs the engine until [`EngineEvent::Shutdown`] arrives or every sender is
/// dropped, then tears it down.
pub async fn drive<C: MapCanvas>(
    engine: &mut OverlayEngine<C>,
    mut events: EventReceiver,
) -> Result<()> {
    loop {
        let deadline = engine.next_deadline();

        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(EngineEvent::Snapshot(snapshot)) => {
                    let report = engine.apply_snapshot(&snapshot, now())?;
                    if !report.failed.is_empty() {
                        log::info!("layers not built this pass: {:?}", report.failed);
                    }
                }
                Some(EngineEvent::Viewport(viewport)) => {
                    engine.viewport_changed(viewport, now())?;
                }
                Some(EngineEvent::Shutdown) | None => {
                    log::debug!("runtime shutdown requested");
                    engine.teardown();
                    return Ok(());
                }
            },
            _ = sleep_until(deadline) => {
                engine.advance(now())?;
            }
        }
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
