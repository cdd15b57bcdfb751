//! Magnified caret preview with animated repositioning.
//!
//! The overlay owns no platform resources directly; it drives a
//! [`MagnifierPlatform`] the host supplies. Repositioning is animated so a
//! multi-character jump glides instead of snapping, and retargeting an
//! in-flight glide restarts from the currently displayed position.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use textscrub_animation::{Easing, Lerp, TimedAnimation};
use textscrub_foundation::SelectionTarget;
use web_time::{Duration, Instant};

/// Magnification factor of the lens.
const ZOOM: f32 = 1.5;

/// Lens width as a multiple of the source line height.
const ASPECT_RATIO: f32 = 4.0;

/// Floor for the source height used to size the lens, in logical px.
const MIN_SOURCE_HEIGHT: f32 = 20.0;

/// Extra lens height beyond the zoomed line, in logical px.
const VERTICAL_PADDING: f32 = 8.0;

/// Duration of the reposition glide.
const REPOSITION_DURATION: Duration = Duration::from_millis(100);

/// Lens dimensions derived from the caret line height on first show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnifierSpec {
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub zoom: f32,
}

impl MagnifierSpec {
    pub fn for_line_height(line_height: f32) -> Self {
        let height = line_height * ZOOM + VERTICAL_PADDING;
        let width = ASPECT_RATIO * line_height.max(MIN_SOURCE_HEIGHT);
        Self {
            width,
            height,
            corner_radius: height * 0.5,
            zoom: ZOOM,
        }
    }
}

/// Platform half of the magnifier: a host-owned zoom lens that can be
/// positioned over screen coordinates and refreshed when its source
/// repaints.
pub trait MagnifierPlatform {
    fn configure(&self, spec: MagnifierSpec);

    fn show_at(&self, x: f32, y: f32);

    /// Re-captures the source content at the current position.
    fn refresh(&self);

    fn dismiss(&self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LensPosition {
    x: f32,
    y: f32,
}

impl Lerp for LensPosition {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Self {
            x: self.x.lerp(&target.x, fraction),
            y: self.y.lerp(&target.y, fraction),
        }
    }
}

pub struct MagnifierOverlay {
    platform: Rc<dyn MagnifierPlatform>,
    target: Rc<dyn SelectionTarget>,
    configured: Cell<bool>,
    /// Shared with the redraw listener so a dismissed overlay stops
    /// refreshing even if the host repaints before unsubscription lands.
    visible: Rc<Cell<bool>>,
    /// Where the lens was last asked to settle.
    settle_at: Cell<Option<LensPosition>>,
    animation: RefCell<Option<TimedAnimation<LensPosition>>>,
    redraw_listener: RefCell<Option<Rc<dyn Fn()>>>,
}

impl MagnifierOverlay {
    pub fn new(platform: Rc<dyn MagnifierPlatform>, target: Rc<dyn SelectionTarget>) -> Self {
        Self {
            platform,
            target,
            configured: Cell::new(false),
            visible: Rc::new(Cell::new(false)),
            settle_at: Cell::new(None),
            animation: RefCell::new(None),
            redraw_listener: RefCell::new(None),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.borrow().is_some()
    }

    /// Positions the lens over the caret at `offset`. No-op when the target
    /// cannot resolve caret geometry.
    pub fn show_at_offset(&self, offset: usize) {
        let Some(geometry) = self.target.caret_geometry(offset) else {
            return;
        };

        if !self.configured.get() {
            self.platform
                .configure(MagnifierSpec::for_line_height(geometry.line_height));
            self.configured.set(true);
        }

        let position = LensPosition {
            x: geometry.x,
            y: geometry.y,
        };
        let now = Instant::now();

        if self.visible.get() && self.settle_at.get() != Some(position) {
            let mut animation = self.animation.borrow_mut();
            *animation = Some(match animation.as_ref() {
                Some(glide) if !glide.is_finished(now) => glide.retargeted(now, position),
                _ => TimedAnimation::new(
                    self.settle_at.get().unwrap_or(position),
                    position,
                    now,
                    REPOSITION_DURATION,
                    Easing::Linear,
                ),
            });
        } else if self.animation.borrow().is_none() {
            self.platform.show_at(position.x, position.y);
        }
        self.settle_at.set(Some(position));

        if !self.visible.get() {
            self.visible.set(true);
            let platform = Rc::clone(&self.platform);
            let visible = Rc::clone(&self.visible);
            let listener: Rc<dyn Fn()> = Rc::new(move || {
                if visible.get() {
                    platform.refresh();
                }
            });
            self.target.add_redraw_listener(Rc::clone(&listener));
            self.redraw_listener.replace(Some(listener));
        }
    }

    /// Advances the reposition glide. Hosts call this once per frame while
    /// [`is_animating`](Self::is_animating) holds.
    pub fn tick(&self, now: Instant) {
        let finished = {
            let animation = self.animation.borrow();
            match animation.as_ref() {
                Some(glide) => {
                    let position = glide.value_at(now);
                    self.platform.show_at(position.x, position.y);
                    glide.is_finished(now)
                }
                None => false,
            }
        };
        if finished {
            self.animation.replace(None);
        }
    }

    /// Cancels any glide, unsubscribes from redraws, and releases the lens.
    /// Idempotent.
    pub fn dismiss(&self) {
        self.animation.replace(None);
        if let Some(listener) = self.redraw_listener.borrow_mut().take() {
            self.target.remove_redraw_listener(&listener);
        }
        if self.visible.replace(false) {
            self.platform.dismiss();
        }
        self.configured.set(false);
        self.settle_at.set(None);
    }
}
