//! Overlay presenter boundary.
//!
//! Window creation, placement and drag handling belong to the host; the
//! core only pushes freshly applied decisions across this seam.

use crate::decision::Decision;

/// Contract for overlay rendering backends.
///
/// Called from inside the decision sink's critical section, so
/// implementations should hand off expensive drawing work rather than
/// block.
pub trait OverlayPresenter: Send + 'static {
    /// Show a newly applied decision (suggestion plus enemy markers).
    fn render(&mut self, decision: &Decision);

    /// Move the overlay window. Drag support is host business; backends
    /// without a movable surface can ignore it.
    fn reposition(&mut self, _x: i32, _y: i32) {}

    /// Release the rendering surface. Called once when the sink closes.
    fn teardown(&mut self) {}
}

/// Presenter that discards everything (headless hosts, tests).
pub struct NullPresenter;

impl OverlayPresenter for NullPresenter {
    fn render(&mut self, _decision: &Decision) {}
}
