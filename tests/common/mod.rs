#![allow(dead_code)]

use overlayer::prelude::*;

pub const ZONING_URL: &str =
    "https://example.gov.au/arcgis/rest/services/ePlanning/Planning_Principal/MapServer";

pub fn dynamic(id: &str, sublayer: u32, opacity: f32, enabled: bool) -> LayerDescriptor {
    LayerDescriptor::new(
        id,
        LayerKind::DynamicService,
        LayerSource::url(ZONING_URL).with_sublayer(sublayer),
    )
    .with_opacity(opacity)
    .enabled(enabled)
}

pub fn imagery(id: &str, enabled: bool) -> LayerDescriptor {
    LayerDescriptor::new(
        id,
        LayerKind::TiledRaster,
        LayerSource::url("https://imagery.example.com/wms?BBOX={bbox-epsg-3857}&WIDTH=512"),
    )
    .enabled(enabled)
    .bounds_sensitive()
}

pub fn single_group(layers: Vec<LayerDescriptor>) -> DescriptorSnapshot {
    DescriptorSnapshot::new(vec![LayerGroup::new("planning", layers)])
}

pub fn engine() -> OverlayEngine<RecordingCanvas> {
    OverlayEngine::new(RecordingCanvas::new(), EngineOptions::default()).unwrap()
}

/// Calls `advance` at every deadline until the engine goes idle.
/// Returns the instant of the last call.
pub fn settle(engine: &mut OverlayEngine<RecordingCanvas>, from: Instant) -> Instant {
    let mut now = from;
    for _ in 0..10_000 {
        match engine.next_deadline() {
            Some(deadline) => {
                now = deadline.max(now);
                engine.advance(now).unwrap();
            }
            None => return now,
        }
    }
    panic!("engine never went idle");
}

/// Bounds straddling the equator, 0.1 degrees wide, centered on `lng`
pub fn equator_bounds(lng: f64) -> LatLngBounds {
    LatLngBounds::from_coords(-0.05, lng - 0.05, 0.05, lng + 0.05)
}

pub fn init_logging() {
    #[cfg(feature = "debug")]
    overlayer::init_logging();
}
