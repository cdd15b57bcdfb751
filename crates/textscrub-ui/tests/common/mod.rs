//! Shared fakes for controller and magnifier integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use textscrub_foundation::{
    ControlSurface, HapticDevice, LayoutHandlerId, SelectionActionSink, SurfaceBounds, TouchEvent,
};
use textscrub_ui::{MagnifierPlatform, MagnifierSpec, SelectType, SelectionStatusListener};

/// In-memory control surface. Clamps `set_value` like a real slider and
/// lets tests deliver touch/layout events through the installed handlers.
pub struct FakeSurface {
    min: Cell<i32>,
    max: Cell<i32>,
    value: Cell<i32>,
    enabled: Cell<bool>,
    bounds: Cell<SurfaceBounds>,
    touch_handler: RefCell<Option<Rc<dyn Fn(TouchEvent)>>>,
    layout_handlers: RefCell<Vec<(LayoutHandlerId, Rc<dyn Fn()>)>>,
    next_handler_id: Cell<LayoutHandlerId>,
}

impl FakeSurface {
    pub fn new(bounds: SurfaceBounds) -> Rc<Self> {
        Rc::new(Self {
            min: Cell::new(0),
            max: Cell::new(100),
            value: Cell::new(0),
            enabled: Cell::new(true),
            bounds: Cell::new(bounds),
            touch_handler: RefCell::new(None),
            layout_handlers: RefCell::new(Vec::new()),
            next_handler_id: Cell::new(1),
        })
    }

    /// Delivers a touch event to the installed handler, if any.
    pub fn touch(&self, event: TouchEvent) {
        let handler = self.touch_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }

    /// Changes the bounds and fires layout handlers, like a relayout pass.
    pub fn relayout(&self, bounds: SurfaceBounds) {
        self.bounds.set(bounds);
        let handlers: Vec<_> = self
            .layout_handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn has_touch_handler(&self) -> bool {
        self.touch_handler.borrow().is_some()
    }

    pub fn layout_handler_count(&self) -> usize {
        self.layout_handlers.borrow().len()
    }
}

impl ControlSurface for FakeSurface {
    fn min(&self) -> i32 {
        self.min.get()
    }

    fn max(&self) -> i32 {
        self.max.get()
    }

    fn set_range(&self, min: i32, max: i32) {
        self.min.set(min);
        self.max.set(max);
        self.value.set(self.value.get().clamp(min, max));
    }

    fn value(&self) -> i32 {
        self.value.get()
    }

    fn set_value(&self, value: i32) {
        self.value.set(value.clamp(self.min.get(), self.max.get()));
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn bounds(&self) -> SurfaceBounds {
        self.bounds.get()
    }

    fn set_touch_handler(&self, handler: Option<Rc<dyn Fn(TouchEvent)>>) {
        self.touch_handler.replace(handler);
    }

    fn add_layout_handler(&self, handler: Rc<dyn Fn()>) -> LayoutHandlerId {
        let id = self.next_handler_id.get();
        self.next_handler_id.set(id + 1);
        self.layout_handlers.borrow_mut().push((id, handler));
        id
    }

    fn remove_layout_handler(&self, id: LayoutHandlerId) {
        self.layout_handlers.borrow_mut().retain(|(h, _)| *h != id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TouchStart,
    TouchEnd,
    LongPress(SelectType),
    Move {
        delta: i32,
        select_type: SelectType,
        from_touch: bool,
    },
}

#[derive(Default)]
pub struct RecordingListener {
    pub events: RefCell<Vec<Event>>,
}

impl RecordingListener {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn moves(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Move { .. }))
            .cloned()
            .collect()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.borrow().contains(event)
    }
}

impl SelectionStatusListener for RecordingListener {
    fn on_touch_start(&self, _surface: &dyn ControlSurface) {
        self.events.borrow_mut().push(Event::TouchStart);
    }

    fn on_touch_end(&self, _surface: &dyn ControlSurface) {
        self.events.borrow_mut().push(Event::TouchEnd);
    }

    fn on_long_press(&self, select_type: SelectType) {
        self.events.borrow_mut().push(Event::LongPress(select_type));
    }

    fn on_move(&self, delta: i32, select_type: SelectType, from_touch: bool) {
        self.events.borrow_mut().push(Event::Move {
            delta,
            select_type,
            from_touch,
        });
    }
}

#[derive(Default)]
pub struct FakeHaptics {
    pub pulses: RefCell<Vec<u64>>,
}

impl HapticDevice for FakeHaptics {
    fn pulse(&self, duration_ms: u64) {
        self.pulses.borrow_mut().push(duration_ms);
    }
}

#[derive(Default)]
pub struct FakeActionSink {
    pub established: RefCell<Vec<(usize, usize)>>,
}

impl SelectionActionSink for FakeActionSink {
    fn selection_established(&self, start: usize, end: usize) {
        self.established.borrow_mut().push((start, end));
    }
}

/// Records every call the magnifier overlay makes against the platform
/// lens.
#[derive(Default)]
pub struct FakeLens {
    pub specs: RefCell<Vec<MagnifierSpec>>,
    pub positions: RefCell<Vec<(f32, f32)>>,
    pub refreshes: Cell<u32>,
    pub dismissals: Cell<u32>,
}

impl FakeLens {
    pub fn last_position(&self) -> Option<(f32, f32)> {
        self.positions.borrow().last().copied()
    }
}

impl MagnifierPlatform for FakeLens {
    fn configure(&self, spec: MagnifierSpec) {
        self.specs.borrow_mut().push(spec);
    }

    fn show_at(&self, x: f32, y: f32) {
        self.positions.borrow_mut().push((x, y));
    }

    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }

    fn dismiss(&self) {
        self.dismissals.set(self.dismissals.get() + 1);
    }
}
