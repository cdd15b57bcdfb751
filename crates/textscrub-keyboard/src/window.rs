//! The window seam the detector observes.

/// Identity of a host window; registry cache key.
pub type WindowId = u64;

/// What the host window can report about system UI obstructions. Ordered
/// from least to most capable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InsetCapability {
    /// Only the visible content frame height is observable.
    Baseline,
    /// Structured keyboard and navigation-bar insets are queryable.
    Insets,
    /// Insets plus a continuous show/hide transition signal.
    AnimatedInsets,
}

/// Host window adapter. The platform layer forwards its layout and
/// animation callbacks into the detector and answers these queries.
pub trait WindowEnvironment {
    fn id(&self) -> WindowId;

    fn capability(&self) -> InsetCapability;

    /// Height of the window's visible content frame, in logical px.
    fn visible_frame_height(&self) -> i32;

    /// Current keyboard inset. Only meaningful at `Insets` and above.
    fn ime_inset(&self) -> i32;

    /// Current navigation-bar inset. Only meaningful at `Insets` and above.
    fn navigation_inset(&self) -> i32;

    /// Platform-reported keyboard visibility. Only meaningful at `Insets`
    /// and above.
    fn ime_visible(&self) -> bool;
}
