//! Status callbacks emitted by the selection controller.

use textscrub_foundation::ControlSurface;

use crate::controller::SelectType;

/// Observer of controller activity. Every method has an empty default so
/// hosts implement only what they care about.
pub trait SelectionStatusListener {
    /// A gesture started on the surface.
    fn on_touch_start(&self, _surface: &dyn ControlSurface) {}

    /// The gesture ended and transient state was reset.
    fn on_touch_end(&self, _surface: &dyn ControlSurface) {}

    /// The long-press timer switched the active select type. Only fires
    /// under the two short/long modes.
    fn on_long_press(&self, _select_type: SelectType) {}

    /// A cursor move or selection change was applied.
    ///
    /// `from_touch` is false for programmatic
    /// [`crate::TextSelectionController::move_cursor`] calls.
    fn on_move(&self, _delta: i32, _select_type: SelectType, _from_touch: bool) {}
}
