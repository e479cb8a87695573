use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::api::{
    ApiError, LivePosition, OrbitQuery, Pass, PassQuery, PassWindowResult, PredictionApi,
    SatelliteInfo, Track, TrackQuery,
};
use crate::selection::{reconcile, PassId};
use crate::view::{project, RenderModel};

use super::clock::Clock;
use super::state::SyncState;
use super::timeline::{Start, Timeline};
use super::DataKind;

const COMMAND_QUEUE: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub preferred_satellite: Option<String>,
    pub pass_window_hours: u32,
    pub min_elevation_deg: f64,
    pub pass_refresh: Duration,
    pub pass_track_step_seconds: u32,
    pub orbit_look_ahead_minutes: u32,
    pub orbit_step_seconds: u32,
    pub orbit_refresh: Duration,
    pub position_refresh: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            preferred_satellite: Some("ISS".to_string()),
            pass_window_hours: 48,
            min_elevation_deg: 10.0,
            pass_refresh: Duration::from_secs(60),
            pass_track_step_seconds: 10,
            orbit_look_ahead_minutes: 20,
            orbit_step_seconds: 10,
            orbit_refresh: Duration::from_secs(30),
            position_refresh: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectSatellite(String),
    SelectPass(PassId),
    Shutdown,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sync engine is not running")]
    Stopped,
}

/// Which pass-list request is authoritative: the satellite activation it was
/// issued under, and the arming of the pass-list timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    activation: u64,
    arming: u64,
}

#[derive(Debug)]
enum Update {
    Catalog(Result<Vec<SatelliteInfo>, ApiError>),
    Passes {
        ticket: Ticket,
        force_reset: bool,
        result: Result<PassWindowResult, ApiError>,
    },
    PassTrack {
        activation: u64,
        pass: PassId,
        result: Result<Track, ApiError>,
    },
    OrbitTrack {
        activation: u64,
        result: Result<Track, ApiError>,
    },
    Position {
        activation: u64,
        result: Result<LivePosition, ApiError>,
    },
}

#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<RenderModel>,
}

impl EngineHandle {
    pub async fn select_satellite(&self, key: impl Into<String>) -> Result<(), EngineError> {
        self.send(Command::SelectSatellite(key.into())).await
    }

    pub async fn select_pass(&self, id: PassId) -> Result<(), EngineError> {
        self.send(Command::SelectPass(id)).await
    }

    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.send(Command::Shutdown).await
    }

    pub fn view(&self) -> watch::Receiver<RenderModel> {
        self.view.clone()
    }

    async fn send(&self, command: Command) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EngineError::Stopped)
    }
}

/// Single writer of [`SyncState`].
///
/// Every timeline reports through one update channel; results are applied
/// only if they still belong to the active satellite (and, for pass data, to
/// the current arming or selection).
pub struct Engine {
    api: Arc<dyn PredictionApi>,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
    state: SyncState,
    activation: u64,
    pass_arming: u64,
    position_failure_logged: bool,
    timelines: HashMap<DataKind, Timeline>,
    updates_tx: mpsc::UnboundedSender<Update>,
    updates_rx: mpsc::UnboundedReceiver<Update>,
    commands_rx: mpsc::Receiver<Command>,
    view_tx: watch::Sender<RenderModel>,
}

impl Engine {
    pub fn new(
        api: Arc<dyn PredictionApi>,
        clock: Arc<dyn Clock>,
        settings: SyncSettings,
    ) -> (Self, EngineHandle) {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE);
        let (view_tx, view_rx) = watch::channel(RenderModel::default());

        let engine = Self {
            api,
            clock,
            settings,
            state: SyncState::default(),
            activation: 0,
            pass_arming: 0,
            position_failure_logged: false,
            timelines: HashMap::new(),
            updates_tx,
            updates_rx,
            commands_rx,
            view_tx,
        };
        let handle = EngineHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (engine, handle)
    }

    pub async fn run(mut self) {
        self.start_catalog();
        self.publish();

        loop {
            tokio::select! {
                command = self.commands_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(update) = self.updates_rx.recv() => self.handle_update(update).await,
            }
            self.publish();
        }

        self.stop_all().await;
        log::info!("Sync engine stopped");
    }

    fn publish(&self) {
        let next = project(&self.state);
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SelectSatellite(key) => {
                if self.state.active.as_ref().is_some_and(|s| s.key == key) {
                    return;
                }
                match self.state.find_satellite(&key).cloned() {
                    Some(satellite) => self.activate(satellite).await,
                    None => log::warn!("Ignoring unknown satellite {}", key),
                }
            }
            Command::SelectPass(id) => {
                if self.state.selection_id() == Some(id) {
                    return;
                }
                match self.state.find_pass(id).cloned() {
                    Some(pass) => {
                        self.state.selection = Some(pass);
                        self.on_selection_changed().await;
                    }
                    None => log::warn!("Ignoring selection of unknown pass {:?}", id),
                }
            }
            Command::Shutdown => {}
        }
    }

    async fn handle_update(&mut self, update: Update) {
        match update {
            Update::Catalog(Ok(satellites)) if satellites.is_empty() => {
                log::error!("Satellite catalog is empty");
                self.state.catalog_error = Some("satellite catalog is empty".to_string());
            }
            Update::Catalog(Ok(satellites)) => {
                log::info!("Loaded {} satellites", satellites.len());
                self.state.catalog = satellites;
                self.state.catalog_error = None;
                let initial = self
                    .settings
                    .preferred_satellite
                    .as_deref()
                    .and_then(|key| self.state.find_satellite(key))
                    .or_else(|| self.state.catalog.first())
                    .cloned();
                if let Some(satellite) = initial {
                    self.activate(satellite).await;
                }
            }
            Update::Catalog(Err(e)) => {
                log::error!("Failed to load satellite catalog: {}", e);
                self.state.catalog_error = Some(e.to_string());
            }
            Update::Passes {
                ticket,
                force_reset,
                result,
            } => {
                if !self.is_current(ticket) {
                    log::debug!("Discarding superseded pass list {:?}", ticket);
                    return;
                }
                match result {
                    Ok(window) => self.apply_passes(window, force_reset).await,
                    Err(e) if force_reset => {
                        log::error!("Failed to load passes: {}", e);
                        self.state.passes_error = Some(e.to_string());
                    }
                    Err(e) => log::warn!("Pass list refresh failed: {}", e),
                }
            }
            Update::PassTrack {
                activation,
                pass,
                result,
            } => {
                if activation != self.activation || self.state.selection_id() != Some(pass) {
                    log::debug!("Discarding pass track for superseded selection");
                    return;
                }
                match result {
                    Ok(track) => self.state.pass_track = Some(track),
                    Err(e) => log::warn!(
                        "Pass track fetch failed, retrying on next pass refresh: {}",
                        e
                    ),
                }
            }
            Update::OrbitTrack { activation, result } => {
                if activation != self.activation {
                    log::debug!("Discarding orbit track of inactive satellite");
                    return;
                }
                match result {
                    Ok(track) => self.state.orbit_track = Some(track),
                    Err(e) => log::warn!("Orbit track refresh failed: {}", e),
                }
            }
            Update::Position { activation, result } => {
                if activation != self.activation {
                    log::debug!("Discarding position of inactive satellite");
                    return;
                }
                match result {
                    Ok(position) => self.state.position = Some(position),
                    Err(e) if !self.position_failure_logged => {
                        log::warn!("Live position unavailable: {}", e);
                        self.position_failure_logged = true;
                    }
                    Err(e) => log::debug!("Live position unavailable: {}", e),
                }
            }
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.activation == self.activation && ticket.arming == self.pass_arming
    }

    async fn activate(&mut self, satellite: SatelliteInfo) {
        log::info!(
            "Tracking {} ({})",
            satellite.key,
            satellite.catalog_number
        );
        self.stop_all().await;
        self.activation += 1;
        self.pass_arming += 1;
        self.position_failure_logged = false;
        self.state.activate(satellite);
        // cleared state goes out before any of the new satellite's data
        self.publish();

        self.start_pass_list(Start::Immediately);
        self.start_orbit_track();
        self.start_position();
    }

    async fn apply_passes(&mut self, window: PassWindowResult, force_reset: bool) {
        let before = self.state.selection_id();
        let selection = reconcile(
            &window.passes,
            self.state.selection.as_ref(),
            self.clock.now(),
            force_reset,
        );
        self.state.passes = Some(window);
        self.state.passes_error = None;
        self.state.selection = selection;

        if self.state.selection_id() != before {
            self.on_selection_changed().await;
        } else if self.state.pass_track.is_none() && !self.is_running(DataKind::PassTrack) {
            if let Some(pass) = self.state.selection.clone() {
                log::debug!("Retrying pass track for {:?}", pass.id());
                self.start_pass_track(&pass);
            }
        }
    }

    async fn on_selection_changed(&mut self) {
        self.state.pass_track = None;
        self.stop(DataKind::PassTrack).await;

        self.stop(DataKind::Passes).await;
        self.pass_arming += 1;
        self.start_pass_list(Start::AfterPeriod);

        if let Some(pass) = self.state.selection.clone() {
            self.start_pass_track(&pass);
        }
    }

    fn active_key(&self) -> Option<String> {
        self.state.active.as_ref().map(|s| s.key.clone())
    }

    fn start_catalog(&mut self) {
        let api = self.api.clone();
        let tx = self.updates_tx.clone();
        self.launch(Timeline::once(DataKind::Catalog, async move {
            let result = api.satellites().await;
            let _ = tx.send(Update::Catalog(result));
        }));
    }

    fn start_pass_list(&mut self, start: Start) {
        let Some(satellite) = self.active_key() else {
            return;
        };
        let query = PassQuery {
            satellite,
            hours: self.settings.pass_window_hours,
            min_elevation_deg: self.settings.min_elevation_deg,
            start: None,
        };
        let ticket = Ticket {
            activation: self.activation,
            arming: self.pass_arming,
        };
        let api = self.api.clone();
        let tx = self.updates_tx.clone();
        let mut force_reset = start == Start::Immediately;

        self.launch(Timeline::periodic(
            DataKind::Passes,
            start,
            self.settings.pass_refresh,
            move || {
                let force_reset = std::mem::replace(&mut force_reset, false);
                let api = api.clone();
                let tx = tx.clone();
                let query = query.clone();
                async move {
                    let result = api.passes(&query).await;
                    let _ = tx.send(Update::Passes {
                        ticket,
                        force_reset,
                        result,
                    });
                }
            },
        ));
    }

    fn start_pass_track(&mut self, pass: &Pass) {
        let Some(satellite) = self.active_key() else {
            return;
        };
        let query = TrackQuery {
            satellite,
            start: pass.rise_utc,
            end: pass.set_utc,
            step_seconds: self.settings.pass_track_step_seconds,
        };
        let activation = self.activation;
        let id = pass.id();
        let api = self.api.clone();
        let tx = self.updates_tx.clone();

        self.launch(Timeline::once(DataKind::PassTrack, async move {
            let result = api.pass_track(&query).await;
            let _ = tx.send(Update::PassTrack {
                activation,
                pass: id,
                result,
            });
        }));
    }

    fn start_orbit_track(&mut self) {
        let Some(satellite) = self.active_key() else {
            return;
        };
        let query = OrbitQuery {
            satellite,
            minutes: self.settings.orbit_look_ahead_minutes,
            step_seconds: self.settings.orbit_step_seconds,
        };
        let activation = self.activation;
        let api = self.api.clone();
        let tx = self.updates_tx.clone();

        self.launch(Timeline::periodic(
            DataKind::OrbitTrack,
            Start::Immediately,
            self.settings.orbit_refresh,
            move || {
                let api = api.clone();
                let tx = tx.clone();
                let query = query.clone();
                async move {
                    let result = api.orbit_track(&query).await;
                    let _ = tx.send(Update::OrbitTrack { activation, result });
                }
            },
        ));
    }

    fn start_position(&mut self) {
        let Some(satellite) = self.active_key() else {
            return;
        };
        let activation = self.activation;
        let api = self.api.clone();
        let tx = self.updates_tx.clone();

        self.launch(Timeline::periodic(
            DataKind::Position,
            Start::Immediately,
            self.settings.position_refresh,
            move || {
                let api = api.clone();
                let tx = tx.clone();
                let satellite = satellite.clone();
                async move {
                    let result = api.position(&satellite).await;
                    let _ = tx.send(Update::Position { activation, result });
                }
            },
        ));
    }

    fn launch(&mut self, timeline: Timeline) {
        // a replaced timeline is aborted on drop
        if let Some(previous) = self.timelines.insert(timeline.kind(), timeline) {
            if !previous.is_finished() {
                log::debug!("Replacing running {} timeline", previous.kind());
            }
        }
    }

    fn is_running(&self, kind: DataKind) -> bool {
        self.timelines.get(&kind).is_some_and(|t| !t.is_finished())
    }

    async fn stop(&mut self, kind: DataKind) {
        if let Some(timeline) = self.timelines.remove(&kind) {
            timeline.stop().await;
        }
    }

    async fn stop_all(&mut self) {
        for (_, timeline) in self.timelines.drain() {
            timeline.stop().await;
        }
    }
}
