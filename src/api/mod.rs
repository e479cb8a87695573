mod client;
mod error;
mod types;

pub use client::{HttpPredictionApi, PredictionApi};
pub use error::ApiError;
pub use types::{
    Coordinate, GeoPoint, Health, LivePosition, Observer, OrbitQuery, Pass, PassQuery,
    PassWindowResult, SatelliteInfo, SatelliteRef, TleMeta, TleStatus, Track, TrackKind,
    TrackQuery,
};
