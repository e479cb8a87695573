mod clock;
mod engine;
mod state;
mod timeline;

pub use clock::{Clock, SystemClock};
pub use engine::{Command, Engine, EngineError, EngineHandle, SyncSettings};
pub use state::SyncState;
pub use timeline::{Start, Timeline};

/// The independently refreshed feeds the engine keeps in sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DataKind {
    Catalog,
    Passes,
    PassTrack,
    OrbitTrack,
    Position,
}
