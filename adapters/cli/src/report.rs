//! Human-readable event lines.

use platform_grid_core::{Event, SpawnCause};

fn cause_label(cause: SpawnCause) -> String {
    match cause {
        SpawnCause::Initial => "initial".to_owned(),
        SpawnCause::Fill => "fill".to_owned(),
        SpawnCause::Scheduled { origin } => {
            format!("scheduled from ({}, {})", origin.column(), origin.row())
        }
        SpawnCause::Corrective => "corrective".to_owned(),
    }
}

/// Describes an event, or `None` for bookkeeping events not worth printing.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::SessionStarted { origin } => {
            format!("session started at ({}, {})", origin.column(), origin.row())
        }
        Event::SessionReset => "session reset".to_owned(),
        Event::TimeAdvanced { .. } => return None,
        Event::CellSpawned {
            cell,
            coord,
            lifetime,
            cause,
        } => format!(
            "cell #{} spawned at ({}, {}) for {:.2}s [{}]",
            cell.get(),
            coord.column(),
            coord.row(),
            lifetime.as_secs_f32(),
            cause_label(*cause)
        ),
        Event::EarlyWarning { cell, coord } => format!(
            "cell #{} at ({}, {}) is fading",
            cell.get(),
            coord.column(),
            coord.row()
        ),
        Event::CellExpired { cell, coord } => format!(
            "cell #{} at ({}, {}) expired",
            cell.get(),
            coord.column(),
            coord.row()
        ),
        Event::CellRemoved { cell, coord } => format!(
            "cell #{} removed from ({}, {})",
            cell.get(),
            coord.column(),
            coord.row()
        ),
        Event::PlacementRejected {
            coord,
            cause,
            reason,
        } => format!(
            "placement at ({}, {}) [{}] rejected: {reason}",
            coord.column(),
            coord.row(),
            cause_label(*cause)
        ),
        Event::PlayerPlaced { placement } => {
            let position = placement.position();
            format!(
                "player over ({}, {}) at ({:.1}, {:.1}, {:.1})",
                placement.coord().column(),
                placement.coord().row(),
                position.x,
                position.y,
                position.z
            )
        }
    };
    Some(line)
}
