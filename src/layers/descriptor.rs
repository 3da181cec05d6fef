//! Desired state of every overlay, as kept by the surrounding layer store.
//!
//! The engine only ever reads these types. A [`DescriptorSnapshot`] is an
//! immutable copy of the store taken on each change notification.

use crate::core::constants::BBOX_PLACEHOLDER;
use crate::core::viewport::BoundsParams;
use crate::layers::pane::Pane;
use crate::{OverlayError, Result};
use serde::{Deserialize, Serialize};

/// How a layer's drawable is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Server-rendered map image (ArcGIS dynamic map service)
    #[serde(rename = "dynamic")]
    DynamicService,
    #[serde(rename = "tile")]
    TiledRaster,
    #[serde(rename = "feature")]
    VectorFeatureService,
    #[serde(rename = "geojson")]
    StaticGeoJson,
    /// Drawn by a self-managing component elsewhere; never reconciled here
    #[serde(rename = "external")]
    External,
}

impl LayerKind {
    pub fn is_managed(&self) -> bool {
        !matches!(self, LayerKind::External)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::DynamicService => write!(f, "dynamic"),
            LayerKind::TiledRaster => write!(f, "tile"),
            LayerKind::VectorFeatureService => write!(f, "feature"),
            LayerKind::StaticGeoJson => write!(f, "geojson"),
            LayerKind::External => write!(f, "external"),
        }
    }
}

/// Connection info, passed through to the canvas at creation time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerSource {
    pub url: String,
    /// Sub-layer index within a dynamic map service
    #[serde(rename = "layerId")]
    pub sublayer: Option<u32>,
    /// Definition expression restricting drawn features
    pub filter: Option<String>,
    pub attribution: Option<String>,
    /// Inline GeoJSON for static layers
    pub data: Option<serde_json::Value>,
}

impl LayerSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_sublayer(mut self, sublayer: u32) -> Self {
        self.sublayer = Some(sublayer);
        self
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn geojson(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Builds the zoning filter for a set of selected zone codes.
    ///
    /// An empty selection means "draw every zone", so no filter is produced.
    pub fn zone_filter<S: AsRef<str>>(codes: &[S]) -> Option<String> {
        if codes.is_empty() {
            return None;
        }
        let quoted: Vec<String> = codes
            .iter()
            .map(|code| format!("'{}'", code.as_ref().replace('\'', "''")))
            .collect();
        Some(format!("SYM_CODE IN ({})", quoted.join(",")))
    }

    pub fn is_bbox_template(&self) -> bool {
        self.url.contains(BBOX_PLACEHOLDER)
    }

    /// Substitutes the padded Web Mercator bbox into a templated url.
    pub fn render_url(&self, params: &BoundsParams) -> String {
        let [min_x, min_y, max_x, max_y] = params.bbox_3857;
        self.url.replace(
            BBOX_PLACEHOLDER,
            &format!("{min_x:.2},{min_y:.2},{max_x:.2},{max_y:.2}"),
        )
    }

    /// Checks that the source carries what the given kind needs to be built.
    pub fn validate(&self, layer_id: &str, kind: LayerKind) -> Result<()> {
        let invalid = |reason: &str| OverlayError::InvalidSource {
            layer_id: layer_id.to_string(),
            reason: reason.to_string(),
        };

        match kind {
            LayerKind::DynamicService | LayerKind::VectorFeatureService => {
                if !is_http_url(&self.url) {
                    return Err(invalid("service url must be an http(s) url"));
                }
                if kind == LayerKind::DynamicService && self.sublayer.is_none() {
                    return Err(invalid("dynamic service needs a sub-layer index"));
                }
            }
            LayerKind::TiledRaster => {
                let tiled = ["{z}", "{x}", "{y}"].iter().all(|p| self.url.contains(p));
                if !tiled && !self.is_bbox_template() {
                    return Err(invalid("tile url needs {z}/{x}/{y} or a bbox placeholder"));
                }
            }
            LayerKind::StaticGeoJson => {
                if !matches!(self.data, Some(serde_json::Value::Object(_))) {
                    return Err(invalid("static geojson layer has no inline data"));
                }
            }
            LayerKind::External => {}
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Desired state of one overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(flatten)]
    pub source: LayerSource,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub enabled: bool,
    /// Source parameters follow the visible map extent
    #[serde(default)]
    pub bounds_sensitive: bool,
    /// Explicit pane; the kind's default pane is used when absent
    #[serde(default)]
    pub pane: Option<Pane>,
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: LayerSource) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            source,
            opacity: 1.0,
            enabled: false,
            bounds_sensitive: false,
            pane: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn bounds_sensitive(mut self) -> Self {
        self.bounds_sensitive = true;
        self
    }

    pub fn in_pane(mut self, pane: Pane) -> Self {
        self.pane = Some(pane);
        self
    }

    /// Configured opacity clamped into [0, 1]; NaN counts as fully transparent
    pub fn clamped_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            0.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }
}

/// A named set of layers gated by one shared toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub layers: Vec<LayerDescriptor>,
}

impl LayerGroup {
    pub fn new(id: impl Into<String>, layers: Vec<LayerDescriptor>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            enabled: true,
            layers,
        }
    }
}

/// One descriptor with its group toggle folded in
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLayer<'a> {
    pub descriptor: &'a LayerDescriptor,
    pub group_id: &'a str,
    /// `descriptor.enabled AND group.enabled`
    pub effective_enabled: bool,
}

impl ResolvedLayer<'_> {
    pub fn target_opacity(&self) -> f32 {
        if self.effective_enabled {
            self.descriptor.clamped_opacity()
        } else {
            0.0
        }
    }
}

/// Immutable copy of the layer store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSnapshot {
    #[serde(default, alias = "layerGroups")]
    pub groups: Vec<LayerGroup>,
}

impl DescriptorSnapshot {
    pub fn new(groups: Vec<LayerGroup>) -> Self {
        Self { groups }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flattens groups into list order, folding in each group's toggle
    pub fn resolved(&self) -> impl Iterator<Item = ResolvedLayer<'_>> {
        self.groups.iter().flat_map(|group| {
            group.layers.iter().map(move |descriptor| ResolvedLayer {
                descriptor,
                group_id: &group.id,
                effective_enabled: descriptor.enabled && group.enabled,
            })
        })
    }

    pub fn layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.groups
            .iter()
            .flat_map(|g| g.layers.iter())
            .find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut LayerDescriptor> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.layers.iter_mut())
            .find(|l| l.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut LayerGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Returns a copy with one layer's toggle flipped, the way the store's
    /// toggle action produces a new state
    pub fn toggled(&self, layer_id: &str) -> Self {
        let mut next = self.clone();
        if let Some(layer) = next.layer_mut(layer_id) {
            layer.enabled = !layer.enabled;
        }
        next
    }
}
