use std::fmt;

use serde::Serialize;

use crate::api::{Coordinate, Track, TrackKind};

/// Redraw identity of a track overlay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OverlayKey(String);

impl OverlayKey {
    pub fn for_track(track: &Track) -> Self {
        let len = track.coordinates.len();
        match track.kind {
            TrackKind::Pass => {
                let first = track.coordinates.first().map(fmt_coordinate);
                let last = track.coordinates.last().map(fmt_coordinate);
                OverlayKey(format!(
                    "pass:{}:{}:{}:{}",
                    track.catalog_number,
                    len,
                    first.unwrap_or_default(),
                    last.unwrap_or_default()
                ))
            }
            TrackKind::Orbit => OverlayKey(format!("orbit:{}:{}", track.catalog_number, len)),
        }
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fmt_coordinate(c: &Coordinate) -> String {
    format!("{:.6},{:.6}", c.lon, c.lat)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn of(coordinates: &[Coordinate]) -> Option<Self> {
        let (first, rest) = coordinates.split_first()?;
        let init = BoundingBox {
            min_lon: first.lon,
            min_lat: first.lat,
            max_lon: first.lon,
            max_lat: first.lat,
        };
        Some(rest.iter().fold(init, |b, c| BoundingBox {
            min_lon: b.min_lon.min(c.lon),
            min_lat: b.min_lat.min(c.lat),
            max_lon: b.max_lon.max(c.lon),
            max_lat: b.max_lat.max(c.lat),
        }))
    }
}

/// Region the viewport should fit, preferring the pass track.
///
/// Returns `None` when the preferred track is missing or empty; the orbit
/// track is only consulted when there is no pass track at all.
pub fn fit_target(pass: Option<&Track>, orbit: Option<&Track>) -> Option<BoundingBox> {
    pass.or(orbit).and_then(|t| BoundingBox::of(&t.coordinates))
}

/// What the map has to do for one render pass
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MapFrame {
    pub redraw_pass: bool,
    pub redraw_orbit: bool,
    pub fit: Option<BoundingBox>,
}

impl MapFrame {
    pub fn is_idle(&self) -> bool {
        !self.redraw_pass && !self.redraw_orbit && self.fit.is_none()
    }
}

#[derive(Debug, Default)]
pub struct MapSync {
    pass_key: Option<OverlayKey>,
    orbit_key: Option<OverlayKey>,
}

impl MapSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, pass: Option<&Track>, orbit: Option<&Track>) -> MapFrame {
        let pass_key = pass.map(OverlayKey::for_track);
        let orbit_key = orbit.map(OverlayKey::for_track);

        let redraw_pass = pass_key != self.pass_key;
        let redraw_orbit = orbit_key != self.orbit_key;
        self.pass_key = pass_key;
        self.orbit_key = orbit_key;

        let fit = if redraw_pass || redraw_orbit {
            fit_target(pass, orbit)
        } else {
            None
        };

        MapFrame {
            redraw_pass,
            redraw_orbit,
            fit,
        }
    }
}
