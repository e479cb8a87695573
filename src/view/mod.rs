mod projector;
pub mod text;

pub use projector::{project, PanelStatus, PassRow, RenderModel};
