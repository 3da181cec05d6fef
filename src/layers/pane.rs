//! Fixed, totally ordered drawing surfaces.
//!
//! Panes are created once when the engine starts; layers are only ever
//! assigned into them, so paint order never depends on creation order.

use crate::core::constants::{
    BASE_PANE_Z_INDEX, BOUNDARY_PANE_Z_INDEX, OVERLAY_PANE_Z_INDEX, POI_LABEL_PANE_Z_INDEX,
    POI_PANE_Z_INDEX, RADIUS_PANE_Z_INDEX,
};
use crate::layers::descriptor::LayerDescriptor;
use crate::OverlayError;
use serde::{Deserialize, Serialize};

/// Serialized under the same names the canvas uses, see [`Pane::name`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pane {
    #[serde(rename = "base-pane")]
    Base,
    #[serde(rename = "overlay-pane")]
    Overlay,
    #[serde(rename = "boundary-pane")]
    SelectionBoundary,
    #[serde(rename = "radius-pane")]
    SearchRadius,
    #[serde(rename = "poi-pane")]
    PointOfInterest,
    #[serde(rename = "poi-label-pane")]
    PointOfInterestLabel,
}

/// Every pane, back to front
pub const PANE_ORDER: [Pane; 6] = [
    Pane::Base,
    Pane::Overlay,
    Pane::SelectionBoundary,
    Pane::SearchRadius,
    Pane::PointOfInterest,
    Pane::PointOfInterestLabel,
];

impl Pane {
    pub fn z_index(&self) -> i32 {
        match self {
            Pane::Base => BASE_PANE_Z_INDEX,
            Pane::Overlay => OVERLAY_PANE_Z_INDEX,
            Pane::SelectionBoundary => BOUNDARY_PANE_Z_INDEX,
            Pane::SearchRadius => RADIUS_PANE_Z_INDEX,
            Pane::PointOfInterest => POI_PANE_Z_INDEX,
            Pane::PointOfInterestLabel => POI_LABEL_PANE_Z_INDEX,
        }
    }

    /// Name of the pane on the canvas
    pub fn name(&self) -> &'static str {
        match self {
            Pane::Base => "base-pane",
            Pane::Overlay => "overlay-pane",
            Pane::SelectionBoundary => "boundary-pane",
            Pane::SearchRadius => "radius-pane",
            Pane::PointOfInterest => "poi-pane",
            Pane::PointOfInterestLabel => "poi-label-pane",
        }
    }

    /// Pane a descriptor draws into. Layer-control overlays all share the
    /// overlay pane unless the descriptor names another one.
    pub fn for_descriptor(descriptor: &LayerDescriptor) -> Pane {
        descriptor.pane.unwrap_or(Pane::Overlay)
    }
}

impl std::fmt::Display for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Pane {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PANE_ORDER
            .iter()
            .copied()
            .find(|pane| pane.name() == s)
            .ok_or_else(|| OverlayError::UnknownPane(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::descriptor::{LayerKind, LayerSource};

    #[test]
    fn test_order_matches_z_index() {
        for pair in PANE_ORDER.windows(2) {
            assert!(pair[0].z_index() < pair[1].z_index());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_assignment() {
        let overlay =
            LayerDescriptor::new("zoning", LayerKind::DynamicService, LayerSource::default());
        assert_eq!(Pane::for_descriptor(&overlay), Pane::Overlay);

        let boundary =
            LayerDescriptor::new("parcel", LayerKind::StaticGeoJson, LayerSource::default())
                .in_pane(Pane::SelectionBoundary);
        assert_eq!(Pane::for_descriptor(&boundary), Pane::SelectionBoundary);
    }

    #[test]
    fn test_names_round_trip() {
        for pane in PANE_ORDER {
            assert_eq!(pane.name().parse::<Pane>().unwrap(), pane);
        }
        assert!(matches!(
            "wiki-pane".parse::<Pane>(),
            Err(OverlayError::UnknownPane(_))
        ));
    }

    #[test]
    fn test_serde_uses_canvas_names() {
        for pane in PANE_ORDER {
            let json = serde_json::to_string(&pane).unwrap();
            assert_eq!(json, format!("\"{}\"", pane.name()));
            assert_eq!(serde_json::from_str::<Pane>(&json).unwrap(), pane);
        }
        assert!(serde_json::from_str::<Pane>("\"base\"").is_err());
    }
}
