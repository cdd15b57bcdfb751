//! Text primitives: ranges, layout geometry, and the observable editor
//! state that backs [`crate::SelectionTarget`].

mod editor;
mod layout;
mod range;

pub use editor::{EditorState, Viewport};
pub use layout::{CaretGeometry, TextLayout};
pub use range::TextRange;
