use geo::HaversineDistance;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Great-circle ground distance to another coordinate, in meters
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        self.to_geo_point().haversine_distance(&other.to_geo_point())
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857)
    pub fn to_mercator(&self) -> Point {
        let lat = Self::clamp_lat(self.lat);
        let x = self.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }

    fn to_geo_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A point in projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    /// Checks that the corners are ordered and the coordinates are finite
    pub fn is_valid(&self) -> bool {
        self.south_west.lat.is_finite()
            && self.south_west.lng.is_finite()
            && self.north_east.lat.is_finite()
            && self.north_east.lng.is_finite()
            && self.south_west.lat <= self.north_east.lat
            && self.south_west.lng <= self.north_east.lng
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }

    /// Ground width in meters, measured west to east along the center latitude
    pub fn ground_width(&self) -> f64 {
        let lat = self.center().lat;
        LatLng::new(lat, self.west()).distance_to(&LatLng::new(lat, self.east()))
    }

    /// Returns bounds grown on every side by `ratio` of the current span
    pub fn pad(&self, ratio: f64) -> LatLngBounds {
        let span = self.span();
        let dlat = span.lat * ratio;
        let dlng = span.lng * ratio;

        LatLngBounds::from_coords(
            LatLng::clamp_lat(self.south() - dlat),
            self.west() - dlng,
            LatLng::clamp_lat(self.north() + dlat),
            self.east() + dlng,
        )
    }

    /// Projects the bounds to a Web Mercator bbox `[min_x, min_y, max_x, max_y]`
    pub fn to_mercator_bbox(&self) -> [f64; 4] {
        let sw = self.south_west.to_mercator();
        let ne = self.north_east.to_mercator();
        [sw.x, sw.y, ne.x, ne.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(-33.8688, 151.2093);
        assert_eq!(coord.lat, -33.8688);
        assert_eq!(coord.lng, 151.2093);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_lat_lng_distance() {
        let sydney = LatLng::new(-33.8688, 151.2093);
        let melbourne = LatLng::new(-37.8136, 144.9631);
        let distance = sydney.distance_to(&melbourne);

        // Distance should be approximately 714 km
        assert!((distance - 714_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_ground_width_on_equator() {
        let bounds = LatLngBounds::from_coords(-0.5, -0.5, 0.5, 0.5);
        let one_degree = LatLng::new(0.0, 0.0).distance_to(&LatLng::new(0.0, 1.0));

        assert!((bounds.ground_width() - one_degree).abs() < 1e-6);
    }

    #[test]
    fn test_pad_grows_every_side() {
        let bounds = LatLngBounds::from_coords(-34.0, 151.0, -33.0, 152.0);
        let padded = bounds.pad(0.25);

        assert!((padded.south() - -34.25).abs() < 1e-9);
        assert!((padded.west() - 150.75).abs() < 1e-9);
        assert!((padded.north() - -32.75).abs() < 1e-9);
        assert!((padded.east() - 152.25).abs() < 1e-9);
        assert_eq!(padded.center(), bounds.center());
    }

    #[test]
    fn test_mercator_bbox() {
        let bounds = LatLngBounds::from_coords(0.0, 0.0, 10.0, 10.0);
        let bbox = bounds.to_mercator_bbox();

        assert!(bbox[0].abs() < 1e-6);
        assert!(bbox[1].abs() < 1e-6);
        assert!(bbox[2] > 1_113_000.0 && bbox[2] < 1_114_000.0);
        assert!(bbox[3] > bbox[1]);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(LatLngBounds::from_coords(-1.0, -1.0, 1.0, 1.0).is_valid());
        assert!(!LatLngBounds::from_coords(1.0, -1.0, -1.0, 1.0).is_valid());
        assert!(!LatLngBounds::from_coords(f64::NAN, -1.0, 1.0, 1.0).is_valid());
    }
}
