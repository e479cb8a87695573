use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::api::{LivePosition, Pass, Track};
use crate::scheduler::SyncState;
use crate::selection::PassId;

const APP_TITLE: &str = "pass-o-mat";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum PanelStatus {
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRow {
    pub id: PassId,
    pub rise_local: DateTime<FixedOffset>,
    pub rise_estimated: bool,
    pub culmination_local: DateTime<FixedOffset>,
    pub set_local: DateTime<FixedOffset>,
    pub max_elevation_deg: f64,
    pub duration_seconds: i64,
    pub selected: bool,
}

/// Everything a frontend needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub header: String,
    pub active_satellite: Option<String>,
    pub passes: PanelStatus,
    pub rows: Vec<PassRow>,
    pub selection: Option<PassId>,
    pub live: String,
    pub position: Option<LivePosition>,
    pub pass_track: Option<Track>,
    pub orbit_track: Option<Track>,
}

impl Default for RenderModel {
    fn default() -> Self {
        project(&SyncState::default())
    }
}

pub fn project(state: &SyncState) -> RenderModel {
    let header = match &state.active {
        Some(sat) if sat.stale => format!("{} ({}) [stale TLE]", sat.key, sat.catalog_number),
        Some(sat) => format!("{} ({})", sat.key, sat.catalog_number),
        None => APP_TITLE.to_string(),
    };

    let passes = if let Some(e) = &state.catalog_error {
        PanelStatus::Failed(e.clone())
    } else if let Some(e) = &state.passes_error {
        PanelStatus::Failed(e.clone())
    } else if state.passes.is_some() {
        PanelStatus::Ready
    } else {
        PanelStatus::Loading
    };

    let selection = state.selection_id();
    let rows = match (&passes, &state.passes) {
        (PanelStatus::Ready, Some(window)) => {
            let mut ordered: Vec<&Pass> = window.passes.iter().collect();
            ordered.sort_by_key(|p| p.rise_utc);
            ordered
                .into_iter()
                .map(|p| pass_row(p, selection))
                .collect()
        }
        _ => Vec::new(),
    };

    RenderModel {
        header,
        active_satellite: state.active.as_ref().map(|s| s.key.clone()),
        passes,
        rows,
        selection,
        live: live_status(state.position.as_ref()),
        position: state.position.clone(),
        pass_track: state.pass_track.clone(),
        orbit_track: state.orbit_track.clone(),
    }
}

fn pass_row(pass: &Pass, selection: Option<PassId>) -> PassRow {
    PassRow {
        id: pass.id(),
        rise_local: pass.rise_local,
        rise_estimated: pass.rise_estimated,
        culmination_local: pass.culmination_local,
        set_local: pass.set_local,
        max_elevation_deg: pass.max_elevation_deg,
        duration_seconds: (pass.set_utc - pass.rise_utc).num_seconds(),
        selected: selection == Some(pass.id()),
    }
}

fn live_status(position: Option<&LivePosition>) -> String {
    match position {
        Some(fix) => format!(
            "lat {:.3} lon {:.3} alt {:.1} km @ {}",
            fix.position.lat,
            fix.position.lon,
            fix.position.alt_km,
            fix.t_local.format("%H:%M:%S")
        ),
        None => "waiting for position".to_string(),
    }
}
