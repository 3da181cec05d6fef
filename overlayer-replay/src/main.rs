use anyhow::{bail, Context};
use overlayer::prelude::*;
use serde::Deserialize;

/// A scripted session: engine settings, the initial store and timed edits
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    options: Option<EngineOptions>,
    store: DescriptorSnapshot,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    /// Milliseconds after the previous step
    #[serde(default)]
    after_ms: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Toggle { layer: String },
    ToggleGroup { group: String },
    Opacity { layer: String, value: f32 },
    Filter { layer: String, zones: Vec<String> },
    Viewport { bounds: LatLngBounds, zoom: f64 },
}

fn profile_options(session: &Session) -> anyhow::Result<EngineOptions> {
    let profile = match (session.profile.as_deref(), &session.options) {
        (_, Some(options)) => EngineProfile::Custom(options.clone()),
        (None | Some("balanced"), None) => EngineProfile::Balanced,
        (Some("low-power"), None) => EngineProfile::LowPower,
        (Some("smooth"), None) => EngineProfile::Smooth,
        (Some(other), None) => bail!("unknown profile {other:?}"),
    };
    Ok(profile.resolve())
}

/// Applies one scripted edit to the store, returning the event to send
fn apply(store: &mut DescriptorSnapshot, action: Action) -> anyhow::Result<EngineEvent> {
    match action {
        Action::Toggle { layer } => {
            *store = store.toggled(&layer);
        }
        Action::ToggleGroup { group } => {
            let group = store
                .group_mut(&group)
                .with_context(|| format!("no group {group}"))?;
            group.enabled = !group.enabled;
        }
        Action::Opacity { layer, value } => {
            store
                .layer_mut(&layer)
                .with_context(|| format!("no layer {layer}"))?
                .opacity = value;
        }
        Action::Filter { layer, zones } => {
            store
                .layer_mut(&layer)
                .with_context(|| format!("no layer {layer}"))?
                .source
                .filter = LayerSource::zone_filter(&zones);
        }
        Action::Viewport { bounds, zoom } => {
            return Ok(EngineEvent::Viewport(ViewportSnapshot::new(bounds, zoom)));
        }
    }
    Ok(EngineEvent::Snapshot(store.clone()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    overlayer::init_logging();

    let path = std::env::args()
        .nth(1)
        .context("usage: overlayer-replay <session.json>")?;
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let session: Session = serde_json::from_str(&json).with_context(|| format!("parsing {path}"))?;

    let options = profile_options(&session)?;
    let mut engine = OverlayEngine::new(RecordingCanvas::echoing(), options)?;
    let (events, receiver) = event_channel();

    let Session { store, steps, .. } = session;
    let feeder = async move {
        let mut store = store;
        events.send(EngineEvent::Snapshot(store.clone()))?;
        for step in steps {
            tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
            log::info!("step: {:?}", step.action);
            let event = apply(&mut store, step.action)?;
            events.send(event)?;
        }
        // Let the last fades and refreshes play out
        tokio::time::sleep(Duration::from_secs(2)).await;
        events.send(EngineEvent::Shutdown)?;
        anyhow::Ok(())
    };

    let (driven, fed) = tokio::join!(drive(&mut engine, receiver), feeder);
    fed?;
    driven?;

    let canvas = engine.canvas();
    log::info!(
        "replay finished: {} canvas calls, {} drawables built",
        canvas.calls().len(),
        canvas.count_calls(|c| matches!(c, CanvasCall::Create { .. }))
    );
    Ok(())
}
