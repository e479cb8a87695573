use crate::api::{LivePosition, Pass, PassWindowResult, SatelliteInfo, Track};
use crate::selection::PassId;

/// Latest fetched snapshots plus the selection; the projector's only input.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub catalog: Vec<SatelliteInfo>,
    pub catalog_error: Option<String>,
    pub active: Option<SatelliteInfo>,
    pub passes: Option<PassWindowResult>,
    pub passes_error: Option<String>,
    pub selection: Option<Pass>,
    pub pass_track: Option<Track>,
    pub orbit_track: Option<Track>,
    pub position: Option<LivePosition>,
}

impl SyncState {
    pub fn find_satellite(&self, key: &str) -> Option<&SatelliteInfo> {
        self.catalog.iter().find(|s| s.key == key)
    }

    pub fn find_pass(&self, id: PassId) -> Option<&Pass> {
        self.passes
            .as_ref()
            .and_then(|w| w.passes.iter().find(|p| p.id() == id))
    }

    pub fn selection_id(&self) -> Option<PassId> {
        self.selection.as_ref().map(Pass::id)
    }

    /// Forget everything that belongs to the previously active satellite.
    pub fn activate(&mut self, satellite: SatelliteInfo) {
        self.active = Some(satellite);
        self.passes = None;
        self.passes_error = None;
        self.selection = None;
        self.pass_track = None;
        self.orbit_track = None;
        self.position = None;
    }
}
