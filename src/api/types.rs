use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::selection::PassId;

/// Satellite identity as embedded in every service response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteRef {
    pub key: String,
    #[serde(rename = "catnr")]
    pub catalog_number: u32,
}

/// One entry of the satellite catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub key: String,
    #[serde(rename = "catnr")]
    pub catalog_number: u32,
    #[serde(default)]
    pub has_tle_local: bool,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub tle_age_seconds: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fetched_at_utc: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogResponse {
    pub satellites: Vec<SatelliteInfo>,
}

/// A predicted pass over the observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WirePass")]
pub struct Pass {
    pub rise_utc: DateTime<Utc>,
    pub rise_local: DateTime<FixedOffset>,
    pub culmination_utc: DateTime<Utc>,
    pub culmination_local: DateTime<FixedOffset>,
    pub set_utc: DateTime<Utc>,
    pub set_local: DateTime<FixedOffset>,
    pub max_elevation_deg: f64,
    /// The service omitted the rise (the window opened mid-pass); `rise_*`
    /// mirror the culmination-to-set half instead.
    pub rise_estimated: bool,
}

impl Pass {
    pub fn id(&self) -> PassId {
        PassId {
            rise: self.rise_utc,
            set: self.set_utc,
        }
    }
}

/// A pass as the service sends it. Passes already in progress when the
/// window opens come without their rise.
#[derive(Debug, Deserialize)]
struct WirePass {
    #[serde(default)]
    rise_utc: Option<DateTime<Utc>>,
    #[serde(default, alias = "rise_uy")]
    rise_local: Option<DateTime<FixedOffset>>,
    culmination_utc: DateTime<Utc>,
    #[serde(alias = "culmination_uy")]
    culmination_local: DateTime<FixedOffset>,
    set_utc: DateTime<Utc>,
    #[serde(alias = "set_uy")]
    set_local: DateTime<FixedOffset>,
    max_elevation_deg: f64,
    #[serde(default)]
    rise_estimated: bool,
}

impl From<WirePass> for Pass {
    fn from(wire: WirePass) -> Self {
        let offset = *wire.culmination_local.offset();
        let (rise_utc, rise_estimated) = match wire.rise_utc {
            Some(rise) => (rise, wire.rise_estimated),
            // same pass, same id on every fetch
            None => (
                wire.culmination_utc - (wire.set_utc - wire.culmination_utc),
                true,
            ),
        };
        let rise_local = match wire.rise_local {
            Some(local) if !rise_estimated => local,
            _ => rise_utc.with_timezone(&offset),
        };

        Pass {
            rise_utc,
            rise_local,
            culmination_utc: wire.culmination_utc,
            culmination_local: wire.culmination_local,
            set_utc: wire.set_utc,
            set_local: wire.set_local,
            max_elevation_deg: wire.max_elevation_deg,
            rise_estimated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
}

/// All passes of one satellite over the requested window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassWindowResult {
    pub satellite: SatelliteRef,
    #[serde(default)]
    pub observer: Option<Observer>,
    pub hours: u32,
    pub min_elevation_deg: f64,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub passes: Vec<Pass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Coordinate { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TrackKind {
    Pass,
    Orbit,
}

/// Ground path of a satellite, tagged with its owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub kind: TrackKind,
    pub catalog_number: u32,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackResponse {
    pub satellite: SatelliteRef,
    pub geojson: TrackFeature,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackFeature {
    pub geometry: LineString,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Coordinate>,
}

impl TrackResponse {
    pub fn into_track(self, kind: TrackKind) -> Result<Track, String> {
        if self.geojson.geometry.kind != "LineString" {
            return Err(format!(
                "expected LineString geometry, got {}",
                self.geojson.geometry.kind
            ));
        }
        Ok(Track {
            kind,
            catalog_number: self.satellite.catalog_number,
            coordinates: self.geojson.geometry.coordinates,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub alt_km: f64,
}

/// Current sub-satellite point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    pub satellite: SatelliteRef,
    pub t_utc: DateTime<Utc>,
    #[serde(alias = "t_uy")]
    pub t_local: DateTime<FixedOffset>,
    pub position: GeoPoint,
}

/// Provenance of the locally cached TLE
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TleMeta {
    #[serde(default)]
    pub fetched_at_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Freshness of one satellite's TLE against the service's refresh TTL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TleStatus {
    pub key: String,
    #[serde(rename = "catnr")]
    pub catalog_number: u32,
    #[serde(default)]
    pub has_local: bool,
    #[serde(default)]
    pub mtime_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Option<TleMeta>,
    #[serde(default)]
    pub age_seconds: Option<i64>,
    #[serde(default)]
    pub age_minutes: Option<f64>,
    pub ttl_seconds: u64,
    #[serde(default)]
    pub stale: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TleStatusResponse {
    pub satellites: Vec<TleStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassQuery {
    pub satellite: String,
    pub hours: u32,
    pub min_elevation_deg: f64,
    pub start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackQuery {
    pub satellite: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step_seconds: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitQuery {
    pub satellite: String,
    pub minutes: u32,
    pub step_seconds: u32,
}
