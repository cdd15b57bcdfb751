//! Foundation elements for textscrub: text ranges, the selection target
//! seam, pointer events, listener lists, and tagged timers.

pub mod input;
pub mod listeners;
pub mod surface;
pub mod target;
pub mod text;
pub mod timers;

pub use input::{TouchEvent, TouchEventKind, TOUCH_SLOP};
pub use listeners::ListenerList;
pub use surface::{ControlSurface, LayoutHandlerId, SurfaceBounds};
pub use target::{HapticDevice, SelectionActionSink, SelectionTarget};
pub use text::{CaretGeometry, EditorState, TextLayout, TextRange, Viewport};
pub use timers::TimerQueue;
