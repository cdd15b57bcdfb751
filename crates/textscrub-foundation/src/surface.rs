//! The draggable control surface seam.

use std::rc::Rc;

use crate::input::TouchEvent;

/// Identifier returned by [`ControlSurface::add_layout_handler`] so the
/// registration can be detached later.
pub type LayoutHandlerId = u64;

/// Screen-space geometry of a control surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceBounds {
    /// Left edge in screen coordinates.
    pub screen_x: f32,
    /// Full width including track insets.
    pub width: f32,
    /// Inset before the usable track (leading padding).
    pub inset_start: f32,
    /// Inset after the usable track (trailing padding).
    pub inset_end: f32,
}

impl SurfaceBounds {
    /// Horizontal center in screen coordinates.
    pub fn center_x(&self) -> f32 {
        self.screen_x + self.width * 0.5
    }

    /// Width of the usable track, excluding insets.
    pub fn track_width(&self) -> f32 {
        self.width - self.inset_start - self.inset_end
    }
}

/// A draggable linear control. Owned by the host; the controller only
/// attaches handlers and drives the value range.
///
/// `set_value` must clamp to `[min, max]`. The touch handler is a single
/// slot (`None` detaches); layout handlers are keyed so one of several can
/// be removed.
pub trait ControlSurface {
    fn min(&self) -> i32;

    fn max(&self) -> i32;

    fn set_range(&self, min: i32, max: i32);

    fn value(&self) -> i32;

    fn set_value(&self, value: i32);

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    fn bounds(&self) -> SurfaceBounds;

    fn set_touch_handler(&self, handler: Option<Rc<dyn Fn(TouchEvent)>>);

    fn add_layout_handler(&self, handler: Rc<dyn Fn()>) -> LayoutHandlerId;

    fn remove_layout_handler(&self, id: LayoutHandlerId);
}
