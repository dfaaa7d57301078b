//! Map state: the selected location, the marker, and the visible window.
//!
//! The map is drawn with ratatui's world-map canvas (see [`crate::ui`]).
//! This module only holds state and turns gestures into [`Effect`]s, so the
//! whole controller can be driven without a terminal.

use crate::api::ApiError;
use crate::config::MapConfig;
use crate::events::{ChangeOrigin, Effect};
use crate::models::SelectedLocation;
use ratatui::layout::Rect;
use tracing::{debug, warn};

pub const LOADING_NAME: &str = "Loading name...";
pub const UNKNOWN_NAME: &str = "Unknown location";
pub const LOOKUP_FAILED_NAME: &str = "Could not resolve name";
pub const MAX_ZOOM: u8 = 8;

/// Visible window of the world map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

impl Viewport {
    /// Half the visible longitude range, in degrees.
    pub fn half_width(&self) -> f64 {
        180.0 / 2f64.powi(self.zoom as i32)
    }

    /// Canvas bounds `(x, y)` for a map drawn into `area`.
    ///
    /// Terminal cells are roughly twice as tall as they are wide, so the
    /// latitude range is scaled by the cell aspect to keep shapes square.
    pub fn bounds(&self, area: Rect) -> ([f64; 2], [f64; 2]) {
        let half_w = self.half_width();
        let aspect = if area.width == 0 {
            0.5
        } else {
            area.height as f64 * 2.0 / area.width as f64
        };
        let half_h = half_w * aspect;
        (
            [self.center_lon - half_w, self.center_lon + half_w],
            [self.center_lat - half_h, self.center_lat + half_h],
        )
    }

    /// Coordinates `(lat, lon)` under the terminal cell at `(col, row)`.
    pub fn cell_to_coords(&self, area: Rect, col: u16, row: u16) -> Option<(f64, f64)> {
        if !contains(area, col, row) {
            return None;
        }
        let (x, y) = self.bounds(area);
        let fx = ((col - area.x) as f64 + 0.5) / area.width as f64;
        let fy = ((row - area.y) as f64 + 0.5) / area.height as f64;
        let lon = x[0] + fx * (x[1] - x[0]);
        let lat = y[1] - fy * (y[1] - y[0]);
        Some((lat.clamp(-90.0, 90.0), wrap_lon(lon)))
    }

    /// Terminal cell showing `(lat, lon)`, if it is inside the window.
    pub fn coords_to_cell(&self, area: Rect, lat: f64, lon: f64) -> Option<(u16, u16)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let (x, y) = self.bounds(area);
        let fx = (lon - x[0]) / (x[1] - x[0]);
        let fy = (y[1] - lat) / (y[1] - y[0]);
        if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
            return None;
        }
        let col = area.x + (fx * area.width as f64) as u16;
        let row = area.y + (fy * area.height as f64) as u16;
        Some((col, row))
    }
}

fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Text before the first comma of a provider display name.
pub fn short_name(display_name: &str) -> &str {
    display_name.split(',').next().unwrap_or(display_name)
}

pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("{:.4}°, {:.4}°", lat, lon)
}

/// What the location line currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationLabel {
    pub name: String,
    pub coordinates: String,
}

pub struct MapController {
    selected: SelectedLocation,
    marker: (f64, f64),
    viewport: Viewport,
    default_zoom: u8,
    label: LocationLabel,
    // Last issued lookup and the coordinates it was issued for.
    lookup_seq: u64,
    pending: Option<(u64, f64, f64)>,
    dragging: bool,
}

impl MapController {
    pub fn new(location: SelectedLocation, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        Self {
            marker: (location.lat, location.lon),
            viewport: Viewport {
                center_lat: location.lat,
                center_lon: location.lon,
                zoom,
            },
            default_zoom: zoom,
            label: LocationLabel {
                name: location.name.clone(),
                coordinates: format_coordinates(location.lat, location.lon),
            },
            selected: location,
            lookup_seq: 0,
            pending: None,
            dragging: false,
        }
    }

    pub fn from_config(config: &MapConfig, lat: f64, lon: f64) -> Self {
        Self::new(
            SelectedLocation {
                lat,
                lon,
                name: config.default_name.clone(),
            },
            config.default_zoom,
        )
    }

    pub fn selected(&self) -> &SelectedLocation {
        &self.selected
    }

    pub fn marker(&self) -> (f64, f64) {
        self.marker
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn label(&self) -> &LocationLabel {
        &self.label
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Name lookup for the starting location.
    pub fn initialize(&mut self) -> Effect {
        self.resolve_location_name(self.selected.lat, self.selected.lon)
    }

    /// Applies a click, drag end or nudge.
    ///
    /// A drag has already carried the marker along, every other origin
    /// moves it here.
    pub fn on_location_change(&mut self, lat: f64, lon: f64, origin: ChangeOrigin) -> Effect {
        self.selected.lat = lat;
        self.selected.lon = lon;
        if origin != ChangeOrigin::DragEnd {
            self.marker = (lat, lon);
        }
        if origin == ChangeOrigin::Nudge {
            self.viewport.center_lat = lat;
            self.viewport.center_lon = lon;
        }
        self.resolve_location_name(lat, lon)
    }

    /// Centers the map and the marker on a stored location at default zoom.
    ///
    /// The stored name is adopted right away, but the label still goes
    /// through a fresh lookup from the coordinates.
    pub fn recenter(&mut self, location: SelectedLocation) -> Effect {
        let (lat, lon) = (location.lat, location.lon);
        self.viewport = Viewport {
            center_lat: lat,
            center_lon: lon,
            zoom: self.default_zoom,
        };
        self.marker = (lat, lon);
        self.selected = location;
        self.resolve_location_name(lat, lon)
    }

    /// Shows the loading placeholder and asks for a lookup.
    pub fn resolve_location_name(&mut self, lat: f64, lon: f64) -> Effect {
        self.lookup_seq += 1;
        self.pending = Some((self.lookup_seq, lat, lon));
        self.label = LocationLabel {
            name: LOADING_NAME.to_string(),
            coordinates: format_coordinates(lat, lon),
        };
        Effect::ReverseGeocode {
            seq: self.lookup_seq,
            lat,
            lon,
        }
    }

    /// Applies a finished lookup. Returns `false` when a newer lookup has
    /// been issued since, in which case the result is dropped.
    pub fn on_name_resolved(&mut self, seq: u64, outcome: Result<Option<String>, ApiError>) -> bool {
        let (lat, lon) = match self.pending {
            Some((pending_seq, lat, lon)) if pending_seq == seq => (lat, lon),
            _ => {
                debug!("Dropping stale reverse geocode #{} (latest #{})", seq, self.lookup_seq);
                return false;
            }
        };
        self.pending = None;

        let name = match outcome {
            Ok(Some(display_name)) if !display_name.is_empty() => {
                short_name(&display_name).to_string()
            }
            Ok(_) => UNKNOWN_NAME.to_string(),
            Err(e) => {
                warn!("Reverse geocoding failed for ({}, {}): {}", lat, lon, e);
                LOOKUP_FAILED_NAME.to_string()
            }
        };
        self.selected.name = name.clone();
        self.label = LocationLabel {
            name,
            coordinates: format_coordinates(lat, lon),
        };
        true
    }

    /// Moves the marker by whole steps of a twentieth of the visible width.
    pub fn nudge(&mut self, north: i32, east: i32) -> Effect {
        let step = self.viewport.half_width() / 10.0;
        let lat = (self.marker.0 + north as f64 * step).clamp(-90.0, 90.0);
        let lon = wrap_lon(self.marker.1 + east as f64 * step);
        self.on_location_change(lat, lon, ChangeOrigin::Nudge)
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom = (self.viewport.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom = self.viewport.zoom.saturating_sub(1);
    }

    /// Whether `(col, row)` is on or right next to the marker.
    pub fn marker_hit(&self, area: Rect, col: u16, row: u16) -> bool {
        match self
            .viewport
            .coords_to_cell(area, self.marker.0, self.marker.1)
        {
            Some((mc, mr)) => mc.abs_diff(col) <= 1 && mr.abs_diff(row) <= 1,
            None => false,
        }
    }

    pub fn start_drag(&mut self) {
        self.dragging = true;
    }

    /// Carries the marker along with the cursor.
    pub fn drag_to(&mut self, area: Rect, col: u16, row: u16) {
        if !self.dragging {
            return;
        }
        if let Some(coords) = self.viewport.cell_to_coords(area, col, row) {
            self.marker = coords;
        }
    }

    /// Ends a drag and reports where the marker was dropped.
    pub fn finish_drag(&mut self) -> Option<(f64, f64)> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chihuahua() -> MapController {
        MapController::new(
            SelectedLocation {
                lat: 28.6329,
                lon: -106.0691,
                name: "Chihuahua".into(),
            },
            4,
        )
    }

    fn failed_lookup() -> ApiError {
        ApiError::Status {
            status: 503,
            message: None,
        }
    }

    #[test]
    fn initialize_issues_lookup_for_default_location() {
        let mut map = chihuahua();
        let effect = map.initialize();
        assert_eq!(
            effect,
            Effect::ReverseGeocode {
                seq: 1,
                lat: 28.6329,
                lon: -106.0691
            }
        );
        assert_eq!(map.label().name, LOADING_NAME);
        assert_eq!(map.label().coordinates, "28.6329°, -106.0691°");
    }

    #[test]
    fn successful_lookup_uses_first_segment() {
        let mut map = chihuahua();
        let Effect::ReverseGeocode { seq, .. } = map.on_location_change(19.43251, -99.13321, ChangeOrigin::Click) else {
            panic!("expected a lookup");
        };
        assert!(map.on_name_resolved(seq, Ok(Some("Ciudad de México, CDMX, México".into()))));
        assert_eq!(map.label().name, "Ciudad de México");
        assert_eq!(map.label().coordinates, "19.4325°, -99.1332°");
        assert_eq!(map.selected().name, "Ciudad de México");
    }

    #[test]
    fn failed_lookup_uses_fallback_and_keeps_coordinates() {
        let mut map = chihuahua();
        let Effect::ReverseGeocode { seq, .. } = map.on_location_change(40.0, 3.5, ChangeOrigin::Click) else {
            panic!("expected a lookup");
        };
        assert!(map.on_name_resolved(seq, Err(failed_lookup())));
        assert_eq!(map.label().name, LOOKUP_FAILED_NAME);
        assert_eq!(map.label().coordinates, "40.0000°, 3.5000°");
        assert_eq!(map.selected().lat, 40.0);
    }

    #[test]
    fn missing_display_name_is_unknown() {
        let mut map = chihuahua();
        let Effect::ReverseGeocode { seq, .. } = map.initialize() else {
            panic!("expected a lookup");
        };
        map.on_name_resolved(seq, Ok(None));
        assert_eq!(map.label().name, UNKNOWN_NAME);
    }

    #[test]
    fn stale_lookup_never_overwrites_newer_one() {
        let mut map = chihuahua();
        let first = map.on_location_change(10.0, 10.0, ChangeOrigin::Click);
        let second = map.on_location_change(20.0, 20.0, ChangeOrigin::Click);
        let (Effect::ReverseGeocode { seq: s1, .. }, Effect::ReverseGeocode { seq: s2, .. }) = (first, second) else {
            panic!("expected lookups");
        };
        assert!(map.on_name_resolved(s2, Ok(Some("Second, Place".into()))));
        assert!(!map.on_name_resolved(s1, Ok(Some("First, Place".into()))));
        assert_eq!(map.label().name, "Second");
        assert_eq!(map.label().coordinates, "20.0000°, 20.0000°");
    }

    #[test]
    fn click_moves_marker_but_drag_end_does_not() {
        let mut map = chihuahua();
        map.on_location_change(1.0, 2.0, ChangeOrigin::Click);
        assert_eq!(map.marker(), (1.0, 2.0));

        map.on_location_change(5.0, 6.0, ChangeOrigin::DragEnd);
        assert_eq!(map.marker(), (1.0, 2.0));
        assert_eq!((map.selected().lat, map.selected().lon), (5.0, 6.0));
    }

    #[test]
    fn recenter_moves_view_marker_and_selection() {
        let mut map = chihuahua();
        map.zoom_out();
        map.recenter(SelectedLocation {
            lat: 48.8566,
            lon: 2.3522,
            name: "Paris".into(),
        });
        assert_eq!(map.viewport().center_lat, 48.8566);
        assert_eq!(map.viewport().center_lon, 2.3522);
        assert_eq!(map.viewport().zoom, 4);
        assert_eq!(map.marker(), (48.8566, 2.3522));
        assert_eq!(map.label().name, LOADING_NAME);
        assert_eq!(map.selected().name, "Paris");
    }

    #[test]
    fn drag_follows_cursor_and_reports_drop_point() {
        let mut map = chihuahua();
        let area = Rect::new(0, 0, 80, 20);
        let (col, row) = map
            .viewport()
            .coords_to_cell(area, 28.6329, -106.0691)
            .unwrap();
        assert!(map.marker_hit(area, col, row));
        assert!(!map.marker_hit(area, 0, 0));

        map.start_drag();
        map.drag_to(area, col + 10, row);
        let dropped = map.finish_drag().unwrap();
        assert!(dropped.1 > -106.0691);
        assert!(!map.is_dragging());
        assert_eq!(map.finish_drag(), None);
    }

    #[test]
    fn projection_round_trips_through_cells() {
        let view = Viewport {
            center_lat: 0.0,
            center_lon: 0.0,
            zoom: 0,
        };
        let area = Rect::new(2, 1, 100, 25);
        let (lat, lon) = view.cell_to_coords(area, 52, 13).unwrap();
        assert_eq!(view.coords_to_cell(area, lat, lon), Some((52, 13)));
        assert_eq!(view.cell_to_coords(area, 0, 0), None);
    }

    #[test]
    fn longitude_wraps_across_antimeridian() {
        assert_eq!(wrap_lon(190.0), -170.0);
        assert_eq!(wrap_lon(-190.0), 170.0);
    }
}
