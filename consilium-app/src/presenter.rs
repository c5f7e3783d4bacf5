//! Terminal overlay presenter.
//!
//! Stands in for a real overlay window: every applied decision becomes a
//! structured log line with the suggestion and the enemy markers.

use consilium_core::{Decision, OverlayPresenter};
use tracing::info;

pub struct TerminalOverlay;

impl OverlayPresenter for TerminalOverlay {
    fn render(&mut self, decision: &Decision) {
        let markers: Vec<String> = decision
            .enemies
            .iter()
            .map(|e| format!("{}@({},{})", e.id, e.x, e.y))
            .collect();
        info!(
            suggestion = decision.suggestion.label(),
            markers = %markers.join(" "),
            "overlay render"
        );
    }

    fn teardown(&mut self) {
        info!("overlay released");
    }
}
