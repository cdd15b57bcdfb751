//! The tiered keyboard status detector.
//!
//! One strategy is selected at construction from the window's
//! [`InsetCapability`] and never changes. Exactly one pathway is
//! authoritative for events at any instant: on the animated tier, a
//! suppression flag parks the layout fallback while a transition is
//! animating, and the fallback resumes afterwards to catch changes the
//! animation did not deliver (e.g. resuming from background with the
//! keyboard already gone).

use std::cell::Cell;
use std::rc::Rc;

use textscrub_foundation::ListenerList;

use crate::window::{InsetCapability, WindowEnvironment};

/// Minimum visible-frame-height delta, in logical px, that the baseline
/// tier accepts as a keyboard transition. Smaller deltas are layout noise.
pub const BASELINE_HEIGHT_THRESHOLD: i32 = 300;

/// Observer of keyboard state. `on_visible_change` always precedes the
/// `on_height_change` belonging to the same transition.
pub trait KeyboardStatusListener {
    fn on_visible_change(&self, _visible: bool) {}

    fn on_height_change(&self, _height: i32) {}
}

/// Baseline tier: visible-frame-height deltas against a stable baseline.
struct BaselineDetector {
    /// Height of the first observed layout pass; the keyboard-free
    /// reference all height reports are relative to.
    baseline: Cell<Option<i32>>,
    /// Height at the last observed layout pass.
    last_height: Cell<i32>,
}

/// Inset tier: structured keyboard/navigation insets, fired on visibility
/// transitions only.
struct InsetDetector;

/// Animated tier: inset-style layout fallback plus per-frame transition
/// reports.
struct AnimatedInsetDetector {
    /// Raised between animation prepare and end; parks the layout
    /// fallback while the transition owns the signal.
    animating: Cell<bool>,
}

enum Strategy {
    Baseline(BaselineDetector),
    Inset(InsetDetector),
    AnimatedInset(AnimatedInsetDetector),
}

pub struct KeyboardStatusDetector {
    visible: Cell<bool>,
    listeners: ListenerList<dyn KeyboardStatusListener>,
    strategy: Strategy,
}

impl KeyboardStatusDetector {
    /// Probes the window once and fixes the strategy. Construction goes
    /// through [`crate::KeyboardStatusRegistry::register`] so that each
    /// window carries at most one detector.
    pub(crate) fn new(env: &dyn WindowEnvironment) -> Self {
        let (strategy, visible) = match env.capability() {
            InsetCapability::Baseline => (
                Strategy::Baseline(BaselineDetector {
                    baseline: Cell::new(None),
                    last_height: Cell::new(0),
                }),
                false,
            ),
            InsetCapability::Insets => (
                Strategy::Inset(InsetDetector),
                env.ime_inset() > env.navigation_inset(),
            ),
            InsetCapability::AnimatedInsets => (
                Strategy::AnimatedInset(AnimatedInsetDetector {
                    animating: Cell::new(false),
                }),
                env.ime_visible(),
            ),
        };
        Self {
            visible: Cell::new(visible),
            listeners: ListenerList::new(),
            strategy,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn add_listener(&self, listener: Rc<dyn KeyboardStatusListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn KeyboardStatusListener>) {
        self.listeners.remove(listener);
    }

    /// Forwarded by the platform adapter after every layout pass.
    pub fn on_layout_pass(&self, env: &dyn WindowEnvironment) {
        match &self.strategy {
            Strategy::Baseline(baseline) => self.baseline_layout_pass(baseline, env),
            Strategy::Inset(_) => self.inset_layout_pass(env),
            Strategy::AnimatedInset(animated) => {
                if animated.animating.get() {
                    return;
                }
                // Correctness net while no transition is in flight: catch
                // visibility flips the animation never reported. Height is
                // owned by the animation pathway on this tier.
                let new_visible = env.ime_visible();
                if new_visible != self.visible.get() {
                    self.visible.set(new_visible);
                    self.listeners.for_each(|l| l.on_visible_change(new_visible));
                }
            }
        }
    }

    /// Forwarded when a show/hide transition is about to start. Only
    /// meaningful on the animated tier.
    pub fn on_animation_prepare(&self) {
        if let Strategy::AnimatedInset(animated) = &self.strategy {
            animated.animating.set(true);
        }
    }

    /// Forwarded once per frame while a transition animates, with the
    /// interpolated inset values.
    pub fn on_animation_progress(&self, ime_inset: i32, navigation_inset: i32) {
        let Strategy::AnimatedInset(_) = &self.strategy else {
            return;
        };
        let new_visible = ime_inset > navigation_inset;
        if new_visible != self.visible.get() {
            self.visible.set(new_visible);
            self.listeners.for_each(|l| l.on_visible_change(new_visible));
        }
        self.listeners
            .for_each(|l| l.on_height_change(ime_inset - navigation_inset));
    }

    /// Forwarded when the transition ends; the layout fallback resumes.
    pub fn on_animation_end(&self) {
        if let Strategy::AnimatedInset(animated) = &self.strategy {
            animated.animating.set(false);
        }
    }

    fn baseline_layout_pass(&self, state: &BaselineDetector, env: &dyn WindowEnvironment) {
        let height = env.visible_frame_height();
        let Some(baseline) = state.baseline.get() else {
            // First observation is the stable reference; no events yet.
            state.baseline.set(Some(height));
            state.last_height.set(height);
            return;
        };

        let last = state.last_height.get();
        if height == last {
            return;
        }

        if height - last > BASELINE_HEIGHT_THRESHOLD {
            if self.visible.get() {
                self.visible.set(false);
                self.listeners.for_each(|l| l.on_visible_change(false));
            }
        } else if last - height > BASELINE_HEIGHT_THRESHOLD {
            if !self.visible.get() {
                self.visible.set(true);
                self.listeners.for_each(|l| l.on_visible_change(true));
            }
        }

        if self.visible.get() {
            self.listeners
                .for_each(|l| l.on_height_change(baseline - height));
        }
        state.last_height.set(height);
    }

    fn inset_layout_pass(&self, env: &dyn WindowEnvironment) {
        let new_visible = env.ime_inset() > env.navigation_inset();
        if new_visible == self.visible.get() {
            return;
        }
        self.visible.set(new_visible);
        self.listeners.for_each(|l| l.on_visible_change(new_visible));
        let height = env.ime_inset() - env.navigation_inset();
        self.listeners.for_each(|l| l.on_height_change(height));
    }
}
