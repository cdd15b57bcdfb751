//! The gesture-to-text-position state machine.
//!
//! A [`TextSelectionController`] binds to one [`ControlSurface`] at a time
//! and translates horizontal drags into cursor moves or selection changes
//! on its [`SelectionTarget`]. Holding the surface triggers a long-press
//! mode switch; holding the drag at either end of the track auto-repeats
//! unit moves; every applied move repositions the magnifier.
//!
//! Timers are deadline-based: the host pumps [`TextSelectionController::tick`]
//! and may sleep until [`TextSelectionController::next_deadline`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use textscrub_foundation::{
    ControlSurface, HapticDevice, LayoutHandlerId, ListenerList, SelectionActionSink,
    SelectionTarget, TimerQueue, TouchEvent, TouchEventKind, TOUCH_SLOP,
};
use web_time::{Duration, Instant};

use crate::listener::SelectionStatusListener;
use crate::magnifier::{MagnifierOverlay, MagnifierPlatform};

/// Value range applied to an attached surface. Large enough that one pixel
/// of drag maps to sub-character granularity.
pub const SURFACE_SCALE_MAX: i32 = 10_000;

/// Haptic pulse length for the long-press mode switch.
const LONG_PRESS_PULSE_MS: u64 = 600;

/// How a delta is applied to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectType {
    /// Move the cursor.
    Move,
    /// Extend one endpoint of the selection range.
    Selection,
}

/// Maps touch duration to the active [`SelectType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Short press moves the cursor; long press switches to selection.
    ShortPressMoveAndLongPressSelection,
    /// Short press selects; long press switches to cursor movement.
    ShortPressSelectionAndLongPressMove,
    /// Always move the cursor, regardless of press duration.
    JustMove,
    /// Always select, regardless of press duration.
    JustSelection,
}

impl Mode {
    fn default_select_type(self) -> SelectType {
        match self {
            Mode::ShortPressMoveAndLongPressSelection | Mode::JustMove => SelectType::Move,
            Mode::ShortPressSelectionAndLongPressMove | Mode::JustSelection => SelectType::Selection,
        }
    }
}

/// Gates the surface's enabled flag on the target's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnableWhen {
    /// Surface enabled exactly when the target text is non-empty.
    NotEmpty,
    /// The controller never touches the enabled flag.
    None,
}

/// Which selection endpoint the current drag is extending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionDirection {
    Undefined,
    Start,
    End,
}

/// Strategy for mutating the target's selection. The default writes
/// straight through; hosts override it to interpose (e.g. to batch edits
/// or route through their own command system).
pub trait SelectionActionCallback {
    fn set_cursor(&self, target: &dyn SelectionTarget, position: usize) {
        self.set_selection(target, position, position);
    }

    fn set_selection(&self, target: &dyn SelectionTarget, start: usize, end: usize);

    fn remove_selection(&self, target: &dyn SelectionTarget);
}

pub struct DefaultSelectionAction;

impl SelectionActionCallback for DefaultSelectionAction {
    fn set_selection(&self, target: &dyn SelectionTarget, start: usize, end: usize) {
        target.set_selection(start, end);
    }

    fn remove_selection(&self, target: &dyn SelectionTarget) {
        target.clear_selection();
    }
}

/// Constructor parameters; everything but the target.
#[derive(Clone, Copy, Debug)]
pub struct ControllerConfig {
    pub mode: Mode,
    pub enable_when: EnableWhen,
    /// Surface the system selection-actions affordance after a selection
    /// gesture ends.
    pub start_action_mode_after_selection: bool,
    pub enable_magnifier: bool,
    pub long_press_duration: Duration,
    /// Interval between auto-repeated unit moves while the surface value is
    /// pinned at an extreme.
    pub auto_repeat_interval: Duration,
    /// How many cursor positions one full screen width of drag covers.
    /// Higher is more sensitive. Values ≤ 0 are clamped to 1.
    pub move_sensitivity: f32,
    /// Screen width in logical px, used to derive drag distance per move.
    pub screen_width_px: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::ShortPressMoveAndLongPressSelection,
            enable_when: EnableWhen::None,
            start_action_mode_after_selection: true,
            enable_magnifier: true,
            long_press_duration: Duration::from_millis(500),
            auto_repeat_interval: Duration::from_millis(100),
            move_sensitivity: 100.0,
            screen_width_px: 1080.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ControllerTimer {
    LongPress,
    AutoRepeat,
}

/// Transient per-gesture state, created on touch-down and dropped on
/// touch-up/cancel.
#[derive(Clone, Copy)]
struct GestureSession {
    down_x: f32,
    down_y: f32,
    /// Reference for delta computation; advances each time a move is
    /// issued.
    reference_x: f32,
    /// Most recent raw pointer x, for layout resync.
    pointer_x: f32,
    /// Pixels of drag per unit cursor move.
    distance_per_move: f32,
}

struct AttachedSurface {
    surface: Rc<dyn ControlSurface>,
    layout_handler: LayoutHandlerId,
}

pub struct TextSelectionController {
    target: Rc<dyn SelectionTarget>,

    mode: Cell<Mode>,
    enable_when: Cell<EnableWhen>,
    start_action_mode_after_selection: Cell<bool>,
    enable_magnifier: Cell<bool>,
    long_press_duration: Cell<Duration>,
    auto_repeat_interval: Cell<Duration>,
    move_sensitivity: Cell<f32>,
    screen_width_px: Cell<f32>,
    /// Master gate; when false every touch event is swallowed.
    enabled: Cell<bool>,

    active_type: Cell<SelectType>,
    direction: Cell<SelectionDirection>,
    session: RefCell<Option<GestureSession>>,

    surface: RefCell<Option<AttachedSurface>>,
    timers: TimerQueue<ControllerTimer>,
    listeners: ListenerList<dyn SelectionStatusListener>,
    selection_action: RefCell<Rc<dyn SelectionActionCallback>>,

    magnifier: RefCell<Option<MagnifierOverlay>>,
    magnifier_platform: RefCell<Option<Rc<dyn MagnifierPlatform>>>,
    haptics: RefCell<Option<Rc<dyn HapticDevice>>>,
    action_sink: RefCell<Option<Rc<dyn SelectionActionSink>>>,

    /// Enable-policy hook installed on the target for this controller's
    /// lifetime.
    text_listener: RefCell<Option<Rc<dyn Fn()>>>,
}

impl TextSelectionController {
    pub fn new(target: Rc<dyn SelectionTarget>, config: ControllerConfig) -> Rc<Self> {
        let controller = Rc::new(Self {
            target,
            mode: Cell::new(config.mode),
            enable_when: Cell::new(config.enable_when),
            start_action_mode_after_selection: Cell::new(config.start_action_mode_after_selection),
            enable_magnifier: Cell::new(config.enable_magnifier),
            long_press_duration: Cell::new(config.long_press_duration),
            auto_repeat_interval: Cell::new(config.auto_repeat_interval),
            move_sensitivity: Cell::new(sanitize_sensitivity(config.move_sensitivity)),
            screen_width_px: Cell::new(config.screen_width_px),
            enabled: Cell::new(true),
            active_type: Cell::new(config.mode.default_select_type()),
            direction: Cell::new(SelectionDirection::Undefined),
            session: RefCell::new(None),
            surface: RefCell::new(None),
            timers: TimerQueue::new(),
            listeners: ListenerList::new(),
            selection_action: RefCell::new(Rc::new(DefaultSelectionAction)),
            magnifier: RefCell::new(None),
            magnifier_platform: RefCell::new(None),
            haptics: RefCell::new(None),
            action_sink: RefCell::new(None),
            text_listener: RefCell::new(None),
        });

        let weak = Rc::downgrade(&controller);
        let listener: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.apply_enable_policy();
            }
        });
        controller.target.add_text_listener(Rc::clone(&listener));
        controller.text_listener.replace(Some(listener));
        controller
    }

    // ------------------------------------------------------------------
    // Attachment

    /// Binds to `surface`: installs touch and layout handlers, applies the
    /// fine-grained value range, centers the value, and applies the enable
    /// policy. Re-attaching detaches the previous surface first; `None`
    /// just detaches.
    pub fn attach_to(self: &Rc<Self>, surface: Option<Rc<dyn ControlSurface>>) {
        self.detach();
        let Some(surface) = surface else {
            return;
        };

        let weak = Rc::downgrade(self);
        surface.set_touch_handler(Some(Rc::new(move |event| {
            if let Some(controller) = weak.upgrade() {
                controller.handle_touch(event);
            }
        })));

        let weak = Rc::downgrade(self);
        let layout_handler = surface.add_layout_handler(Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.handle_surface_layout();
            }
        }));

        surface.set_range(0, SURFACE_SCALE_MAX);
        surface.set_value(midpoint(surface.min(), surface.max()));
        self.surface.replace(Some(AttachedSurface {
            surface,
            layout_handler,
        }));
        self.apply_enable_policy();
    }

    /// Removes this controller's handlers from the current surface, if any.
    pub fn detach(&self) {
        if let Some(attached) = self.surface.borrow_mut().take() {
            attached.surface.set_touch_handler(None);
            attached.surface.remove_layout_handler(attached.layout_handler);
        }
    }

    fn attached_surface(&self) -> Option<Rc<dyn ControlSurface>> {
        self.surface
            .borrow()
            .as_ref()
            .map(|attached| Rc::clone(&attached.surface))
    }

    // ------------------------------------------------------------------
    // Configuration

    pub fn control_mode(&self) -> Mode {
        self.mode.get()
    }

    /// Changing the mode also resets the active select type to the mode's
    /// short-press default.
    pub fn set_control_mode(&self, mode: Mode) {
        self.mode.set(mode);
        self.active_type.set(mode.default_select_type());
    }

    pub fn set_enable_when(&self, enable_when: EnableWhen) {
        self.enable_when.set(enable_when);
        self.apply_enable_policy();
    }

    pub fn set_start_action_mode_after_selection(&self, value: bool) {
        self.start_action_mode_after_selection.set(value);
    }

    pub fn set_enable_magnifier(&self, value: bool) {
        self.enable_magnifier.set(value);
    }

    pub fn set_long_press_duration(&self, duration: Duration) {
        self.long_press_duration.set(duration);
    }

    pub fn set_auto_repeat_interval(&self, interval: Duration) {
        self.auto_repeat_interval.set(interval);
    }

    pub fn set_move_sensitivity(&self, sensitivity: f32) {
        self.move_sensitivity.set(sanitize_sensitivity(sensitivity));
    }

    pub fn set_screen_width_px(&self, width: f32) {
        self.screen_width_px.set(width);
    }

    /// Master gate. While false, every touch event is swallowed without
    /// effect; programmatic moves still work.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn active_select_type(&self) -> SelectType {
        self.active_type.get()
    }

    pub fn selection_direction(&self) -> SelectionDirection {
        self.direction.get()
    }

    pub fn set_haptics(&self, haptics: Option<Rc<dyn HapticDevice>>) {
        self.haptics.replace(haptics);
    }

    pub fn set_action_sink(&self, sink: Option<Rc<dyn SelectionActionSink>>) {
        self.action_sink.replace(sink);
    }

    /// Supplies the platform lens the magnifier renders through. Without
    /// one the magnifier is never constructed.
    pub fn set_magnifier_platform(&self, platform: Option<Rc<dyn MagnifierPlatform>>) {
        if platform.is_none() {
            if let Some(magnifier) = self.magnifier.borrow_mut().take() {
                magnifier.dismiss();
            }
        }
        self.magnifier_platform.replace(platform);
    }

    /// Replaces the selection-mutation strategy; `None` restores the
    /// default write-through callback.
    pub fn override_selection_action(&self, callback: Option<Rc<dyn SelectionActionCallback>>) {
        self.selection_action
            .replace(callback.unwrap_or_else(|| Rc::new(DefaultSelectionAction)));
    }

    pub fn add_listener(&self, listener: Rc<dyn SelectionStatusListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn SelectionStatusListener>) {
        self.listeners.remove(listener);
    }

    // ------------------------------------------------------------------
    // Timer pump

    /// Fires due timers and advances the magnifier glide.
    pub fn tick(&self, now: Instant) {
        for timer in self.timers.fire_due(now) {
            match timer {
                ControllerTimer::LongPress => self.long_press_fired(),
                ControllerTimer::AutoRepeat => self.auto_repeat_fired(),
            }
        }
        let magnifier = self.magnifier.borrow();
        if let Some(magnifier) = magnifier.as_ref() {
            magnifier.tick(now);
        }
    }

    /// Earliest pending timer deadline, for host wait-until scheduling.
    /// Hosts should additionally tick every frame while
    /// [`needs_animation_frames`](Self::needs_animation_frames) holds.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn needs_animation_frames(&self) -> bool {
        self.magnifier
            .borrow()
            .as_ref()
            .is_some_and(|magnifier| magnifier.is_animating())
    }

    // ------------------------------------------------------------------
    // Gesture handling

    fn handle_touch(&self, event: TouchEvent) {
        if !self.enabled.get() {
            return;
        }
        let Some(surface) = self.attached_surface() else {
            return;
        };

        match event.kind {
            TouchEventKind::Down => self.touch_down(&surface, event),
            TouchEventKind::Move => self.touch_move(event),
            TouchEventKind::Up | TouchEventKind::Cancel => self.touch_end(&surface),
        }
    }

    fn touch_down(&self, surface: &Rc<dyn ControlSurface>, event: TouchEvent) {
        let bounds = surface.bounds();
        let distance_per_move =
            (self.screen_width_px.get() / self.move_sensitivity.get()).max(1.0);
        let reference_x = bounds.center_x();
        self.session.replace(Some(GestureSession {
            down_x: event.x,
            down_y: event.y,
            reference_x,
            pointer_x: event.x,
            distance_per_move,
        }));

        self.timers.schedule(
            ControllerTimer::LongPress,
            Instant::now() + self.long_press_duration.get(),
        );

        self.listeners.for_each(|l| l.on_touch_start(&**surface));

        // A press landing off-center beyond the slop starts moving without
        // waiting for a drag.
        let delta = ((event.x - reference_x) / distance_per_move).round() as i32;
        if delta != 0 && (event.x - reference_x).abs() > TOUCH_SLOP {
            self.apply_move(delta, self.active_type.get(), true);
            if let Some(session) = self.session.borrow_mut().as_mut() {
                session.reference_x = event.x;
            }
        }
    }

    fn touch_move(&self, event: TouchEvent) {
        let Some(mut session) = *self.session.borrow() else {
            return;
        };
        session.pointer_x = event.x;

        let dx = event.x - session.down_x;
        let dy = event.y - session.down_y;
        if dx * dx + dy * dy > TOUCH_SLOP * TOUCH_SLOP {
            // A real drag disqualifies the pending long press.
            self.timers.cancel(ControllerTimer::LongPress);
        }

        let delta = ((event.x - session.reference_x) / session.distance_per_move).round() as i32;
        if delta != 0 {
            session.reference_x = event.x;
        }
        self.session.replace(Some(session));
        if delta != 0 {
            self.apply_move(delta, self.active_type.get(), true);
        }
    }

    fn touch_end(&self, surface: &Rc<dyn ControlSurface>) {
        self.timers.cancel(ControllerTimer::LongPress);
        self.timers.cancel(ControllerTimer::AutoRepeat);

        {
            let magnifier = self.magnifier.borrow();
            if let Some(magnifier) = magnifier.as_ref() {
                magnifier.dismiss();
            }
        }

        if self.active_type.get() == SelectType::Selection
            && self.start_action_mode_after_selection.get()
        {
            let start = self.target.selection_start();
            let end = self.target.selection_end();
            self.selection_action.borrow().remove_selection(&*self.target);
            let sink = self.action_sink.borrow().clone();
            if let Some(sink) = sink {
                sink.selection_established(start, end);
            }
        }

        self.direction.set(SelectionDirection::Undefined);
        self.active_type.set(self.mode.get().default_select_type());
        surface.set_value(midpoint(surface.min(), surface.max()));

        self.listeners.for_each(|l| l.on_touch_end(&**surface));
        self.session.replace(None);
    }

    /// A layout shift under an active gesture resyncs the surface value to
    /// the absolute pointer position, so the thumb stays under the finger.
    fn handle_surface_layout(&self) {
        let Some(session) = *self.session.borrow() else {
            return;
        };
        let Some(surface) = self.attached_surface() else {
            return;
        };
        let bounds = surface.bounds();
        let track = bounds.track_width();
        if track <= 0.0 {
            return;
        }
        let (min, max) = (surface.min(), surface.max());
        let ratio = (session.pointer_x - bounds.screen_x) / track;
        let value = min + (ratio * (max - min) as f32).round() as i32;
        surface.set_value(value.clamp(min, max));
    }

    // ------------------------------------------------------------------
    // Timer handlers

    fn long_press_fired(&self) {
        let flipped = match self.mode.get() {
            Mode::ShortPressMoveAndLongPressSelection => Some(SelectType::Selection),
            Mode::ShortPressSelectionAndLongPressMove => Some(SelectType::Move),
            // Fixed-type modes: the timer is a no-op by construction.
            Mode::JustMove | Mode::JustSelection => None,
        };
        let Some(select_type) = flipped else {
            return;
        };
        self.active_type.set(select_type);
        let haptics = self.haptics.borrow().clone();
        if let Some(haptics) = haptics {
            haptics.pulse(LONG_PRESS_PULSE_MS);
        }
        self.listeners.for_each(|l| l.on_long_press(select_type));
    }

    fn auto_repeat_fired(&self) {
        let Some(surface) = self.attached_surface() else {
            return;
        };
        let value = surface.value();
        if value == surface.min() {
            self.apply_move(-1, self.active_type.get(), true);
        } else if value == surface.max() {
            self.apply_move(1, self.active_type.get(), true);
        }
        // apply_move reschedules while the value stays pinned.
    }

    // ------------------------------------------------------------------
    // Position updates

    /// Programmatic move, equivalent to a touch-driven one with
    /// `from_touch = false`.
    pub fn move_cursor(&self, delta: i32, select_type: SelectType) {
        self.apply_move(delta, select_type, false);
    }

    fn apply_move(&self, delta: i32, select_type: SelectType, from_touch: bool) {
        let len = self.target.text_len();
        match select_type {
            SelectType::Move => {
                let position =
                    clamp_offset(self.target.selection_end() as i64 + delta as i64, len);
                self.selection_action
                    .borrow()
                    .set_cursor(&*self.target, position);
            }
            SelectType::Selection => {
                let start = self.target.selection_start() as i64;
                let end = self.target.selection_end() as i64;
                let delta = delta as i64;

                let direction = match self.direction.get() {
                    SelectionDirection::Undefined => {
                        if delta <= 0 {
                            SelectionDirection::Start
                        } else {
                            SelectionDirection::End
                        }
                    }
                    // A drag that would push one endpoint through the other
                    // switches to extending the other side.
                    _ if start + delta > end => SelectionDirection::End,
                    _ if end + delta < start => SelectionDirection::Start,
                    current => current,
                };
                self.direction.set(direction);

                let new_start = if direction == SelectionDirection::End {
                    start
                } else {
                    start + delta
                };
                let new_end = if direction == SelectionDirection::Start {
                    end
                } else {
                    end + delta
                };
                self.selection_action.borrow().set_selection(
                    &*self.target,
                    clamp_offset(new_start, len),
                    clamp_offset(new_end, len),
                );
            }
        }

        if self.enable_magnifier.get() {
            let platform = self.magnifier_platform.borrow().clone();
            if let Some(platform) = platform {
                let mut magnifier = self.magnifier.borrow_mut();
                let overlay = magnifier.get_or_insert_with(|| {
                    MagnifierOverlay::new(platform, Rc::clone(&self.target))
                });
                overlay.show_at_offset(self.target.selection_start());
            }
        }

        if let Some(surface) = self.attached_surface() {
            let value = surface.value();
            if value == surface.min() || value == surface.max() {
                self.timers.schedule(
                    ControllerTimer::AutoRepeat,
                    Instant::now() + self.auto_repeat_interval.get(),
                );
            } else {
                self.timers.cancel(ControllerTimer::AutoRepeat);
            }
        }

        self.listeners
            .for_each(|l| l.on_move(delta, select_type, from_touch));
    }

    // ------------------------------------------------------------------

    fn apply_enable_policy(&self) {
        if self.enable_when.get() == EnableWhen::NotEmpty {
            if let Some(surface) = self.attached_surface() {
                surface.set_enabled(self.target.text_len() > 0);
            }
        }
    }
}

impl Drop for TextSelectionController {
    fn drop(&mut self) {
        self.detach();
        if let Some(listener) = self.text_listener.borrow_mut().take() {
            self.target.remove_text_listener(&listener);
        }
    }
}

fn sanitize_sensitivity(sensitivity: f32) -> f32 {
    if sensitivity <= 0.0 {
        log::warn!("move_sensitivity {sensitivity} is not positive, clamping to 1");
        1.0
    } else {
        sensitivity
    }
}

fn clamp_offset(value: i64, len: usize) -> usize {
    value.clamp(0, len as i64) as usize
}

fn midpoint(min: i32, max: i32) -> i32 {
    min + (max - min) / 2
}
