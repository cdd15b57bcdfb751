//! Per-window detector cache.
//!
//! Replaces tag-a-singleton-on-the-view schemes with an explicit map from
//! window identity to detector, owned by the host UI thread. Registration
//! is idempotent; unregistration belongs in the window teardown path.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::detector::KeyboardStatusDetector;
use crate::window::{WindowEnvironment, WindowId};

pub struct KeyboardStatusRegistry {
    detectors: RefCell<FxHashMap<WindowId, Rc<KeyboardStatusDetector>>>,
}

impl KeyboardStatusRegistry {
    pub fn new() -> Self {
        Self {
            detectors: RefCell::new(FxHashMap::default()),
        }
    }

    /// Returns the detector for `env`'s window, creating one on first
    /// registration. A second registration on the same window returns the
    /// existing instance untouched.
    pub fn register(&self, env: &dyn WindowEnvironment) -> Rc<KeyboardStatusDetector> {
        let mut detectors = self.detectors.borrow_mut();
        if let Some(existing) = detectors.get(&env.id()) {
            log::debug!("window {} already has a keyboard detector", env.id());
            return Rc::clone(existing);
        }
        let detector = Rc::new(KeyboardStatusDetector::new(env));
        detectors.insert(env.id(), Rc::clone(&detector));
        detector
    }

    /// Detector previously registered for `id`, if any.
    pub fn registered(&self, id: WindowId) -> Option<Rc<KeyboardStatusDetector>> {
        self.detectors.borrow().get(&id).cloned()
    }

    /// Drops the detector for a window being torn down. Returns whether one
    /// was registered.
    pub fn unregister(&self, id: WindowId) -> bool {
        self.detectors.borrow_mut().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.detectors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.borrow().is_empty()
    }
}

impl Default for KeyboardStatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
