use crate::map::MapFrame;

use super::{PanelStatus, RenderModel};

/// Plain-text rendering of one frame, for terminals.
pub fn render(model: &RenderModel, frame: &MapFrame) -> Vec<String> {
    let mut lines = vec![model.header.clone()];

    match &model.passes {
        PanelStatus::Loading => lines.push("  loading passes...".to_string()),
        PanelStatus::Failed(message) => lines.push(format!("  error: {}", message)),
        PanelStatus::Ready if model.rows.is_empty() => {
            lines.push("  no passes in window".to_string())
        }
        PanelStatus::Ready => {
            lines.push(format!(
                "    {:<8} {:<8} {:<8} {:>7} {:>6}",
                "rise", "culm", "set", "max el", "dur"
            ));
            for row in &model.rows {
                lines.push(format!(
                    "  {}{}{:<8} {:<8} {:<8} {:>6.1}° {:>3}m{:02}",
                    if row.selected { '>' } else { ' ' },
                    if row.rise_estimated { '~' } else { ' ' },
                    row.rise_local.format("%d %H:%M").to_string(),
                    row.culmination_local.format("%H:%M:%S").to_string(),
                    row.set_local.format("%H:%M").to_string(),
                    row.max_elevation_deg,
                    row.duration_seconds / 60,
                    row.duration_seconds % 60,
                ));
            }
        }
    }

    lines.push(format!("  live: {}", model.live));

    let overlay = |name: &str, len: Option<usize>, redraw: bool| match len {
        Some(n) => format!(
            "  {}: {} points{}",
            name,
            n,
            if redraw { " (redrawn)" } else { "" }
        ),
        None => format!("  {}: none", name),
    };
    lines.push(overlay(
        "pass track",
        model.pass_track.as_ref().map(|t| t.coordinates.len()),
        frame.redraw_pass,
    ));
    lines.push(overlay(
        "orbit track",
        model.orbit_track.as_ref().map(|t| t.coordinates.len()),
        frame.redraw_orbit,
    ));

    if let Some(fit) = frame.fit {
        lines.push(format!(
            "  map fit: lon {:.2}..{:.2} lat {:.2}..{:.2}",
            fit.min_lon, fit.max_lon, fit.min_lat, fit.max_lat
        ));
    }

    lines
}
