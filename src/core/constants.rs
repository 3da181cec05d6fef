//! Engine-wide defaults.
//! Keeping them in a single place makes it easier to tweak the magic numbers;
//! every one of them can be overridden through [`crate::core::config::EngineOptions`].

/// Opacity change applied per fade tick.
pub const DEFAULT_FADE_STEP: f32 = 0.05;

/// Interval between fade ticks (~60 fps).
pub const DEFAULT_FADE_TICK_MS: u64 = 16;

/// A viewport move counts when the centers drift further than this fraction
/// of the previous viewport's ground width.
pub const DEFAULT_SIGNIFICANCE_RATIO: f64 = 0.1;

/// Fraction of the viewport span added on every side of refreshed bounds.
pub const DEFAULT_BOUNDS_PADDING: f64 = 0.25;

/// Quiet period before a significant move is pushed to bounds-sensitive layers.
pub const DEFAULT_REFRESH_DEBOUNCE_MS: u64 = 500;

/// Placeholder substituted with the Web Mercator bbox in bounds-sensitive urls.
pub const BBOX_PLACEHOLDER: &str = "{bbox-epsg-3857}";

/// Pane stacking, back to front.
pub const BASE_PANE_Z_INDEX: i32 = 200;
pub const OVERLAY_PANE_Z_INDEX: i32 = 400;
pub const BOUNDARY_PANE_Z_INDEX: i32 = 600;
pub const RADIUS_PANE_Z_INDEX: i32 = 650;
pub const POI_PANE_Z_INDEX: i32 = 1000;
pub const POI_LABEL_PANE_Z_INDEX: i32 = 1001;
