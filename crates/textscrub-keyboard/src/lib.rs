//! Soft-keyboard visibility and height detection.
//!
//! Platforms do not expose the keyboard signal uniformly, so detection is
//! tiered: a baseline strategy watches the visible frame height, a richer
//! one queries structured insets, and the richest also follows the
//! show/hide animation frame by frame. The highest tier the window
//! supports is selected once at registration.

pub mod detector;
pub mod registry;
pub mod window;

pub use detector::{
    KeyboardStatusDetector, KeyboardStatusListener, BASELINE_HEIGHT_THRESHOLD,
};
pub use registry::KeyboardStatusRegistry;
pub use window::{InsetCapability, WindowEnvironment, WindowId};
