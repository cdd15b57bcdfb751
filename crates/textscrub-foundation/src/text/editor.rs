//! Observable state holder for the text being scrubbed.
//!
//! `EditorState` is the reference [`SelectionTarget`] implementation: it
//! owns text and selection, clamps every selection write, and notifies
//! text-change and redraw listeners. It deliberately carries no undo
//! history or IME composition state; it exists so the controller has a
//! concrete target to drive and the tests a real buffer to assert against.
//!
//! # Thread safety
//!
//! Uses `Rc<RefCell<...>>` internally and is not thread-safe; use it only
//! from the UI thread.

use std::cell::RefCell;
use std::rc::Rc;

use crate::listeners::ListenerList;
use crate::target::SelectionTarget;
use crate::text::{CaretGeometry, TextLayout, TextRange};

/// View-space adjustments applied when resolving caret geometry, mirroring
/// a scrolled and scaled text view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub padding_left: f32,
    pub padding_top: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            padding_left: 0.0,
            padding_top: 0.0,
        }
    }
}

struct EditorInner {
    text: String,
    /// Cached character count of `text`.
    char_len: usize,
    selection: TextRange,
    viewport: Viewport,
    /// Metrics used to rebuild the layout on text change; `None` until the
    /// host provides them.
    metrics: Option<(f32, f32)>,
    layout: Option<TextLayout>,
}

#[derive(Clone)]
pub struct EditorState {
    inner: Rc<RefCell<EditorInner>>,
    text_listeners: Rc<ListenerList<dyn Fn()>>,
    redraw_listeners: Rc<ListenerList<dyn Fn()>>,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EditorState")
            .field("text", &inner.text)
            .field("selection", &inner.selection)
            .finish()
    }
}

impl EditorState {
    pub fn new(initial_text: impl Into<String>) -> Self {
        let text = initial_text.into();
        let char_len = text.chars().count();
        Self {
            inner: Rc::new(RefCell::new(EditorInner {
                text,
                char_len,
                selection: TextRange::cursor(char_len),
                viewport: Viewport::default(),
                metrics: None,
                layout: None,
            })),
            text_listeners: Rc::new(ListenerList::new()),
            redraw_listeners: Rc::new(ListenerList::new()),
        }
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    pub fn selection(&self) -> TextRange {
        self.inner.borrow().selection
    }

    /// Replaces the text, clamps the selection into the new bounds, and
    /// notifies text listeners.
    pub fn set_text(&self, text: impl Into<String>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.text = text.into();
            inner.char_len = inner.text.chars().count();
            inner.selection = inner.selection.coerce_in(inner.char_len);
            if let Some((char_width, line_height)) = inner.metrics {
                inner.layout = Some(TextLayout::measure(&inner.text, char_width, line_height));
            }
        }
        self.text_listeners.for_each(|l| l());
    }

    /// Provides fixed character metrics, enabling caret geometry lookups.
    pub fn set_layout_metrics(&self, char_width: f32, line_height: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.metrics = Some((char_width, line_height));
        inner.layout = Some(TextLayout::measure(&inner.text, char_width, line_height));
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.inner.borrow_mut().viewport = viewport;
    }

    /// Called by the host after it repaints the text; overlays subscribed
    /// through [`SelectionTarget::add_redraw_listener`] refresh here.
    pub fn notify_redraw(&self) {
        self.redraw_listeners.for_each(|l| l());
    }
}

impl SelectionTarget for EditorState {
    fn text_len(&self) -> usize {
        self.inner.borrow().char_len
    }

    fn selection_start(&self) -> usize {
        self.inner.borrow().selection.start
    }

    fn selection_end(&self) -> usize {
        self.inner.borrow().selection.end
    }

    fn set_selection(&self, start: usize, end: usize) {
        let mut inner = self.inner.borrow_mut();
        let len = inner.char_len;
        inner.selection = TextRange::new(start, end).coerce_in(len);
    }

    fn clear_selection(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.selection = TextRange::cursor(inner.selection.end);
    }

    fn add_text_listener(&self, listener: Rc<dyn Fn()>) {
        self.text_listeners.add(listener);
    }

    fn remove_text_listener(&self, listener: &Rc<dyn Fn()>) {
        self.text_listeners.remove(listener);
    }

    fn add_redraw_listener(&self, listener: Rc<dyn Fn()>) {
        self.redraw_listeners.add(listener);
    }

    fn remove_redraw_listener(&self, listener: &Rc<dyn Fn()>) {
        self.redraw_listeners.remove(listener);
    }

    fn caret_geometry(&self, offset: usize) -> Option<CaretGeometry> {
        let inner = self.inner.borrow();
        let layout = inner.layout.as_ref()?;
        let vp = inner.viewport;
        let line = layout.line_for_offset(offset);
        let x = (layout.caret_x(offset) + vp.padding_left - vp.scroll_x) * vp.scale_x;
        let line_center = (layout.line_top(line) + layout.line_top(line + 1)) * 0.5;
        let y = (line_center + vp.padding_top - vp.scroll_y) * vp.scale_y;
        Some(CaretGeometry {
            x,
            y,
            line_height: layout.line_height(),
        })
    }
}
