//! Rate limiting
//!
//! `Debounced` runs its callback once calls stop arriving for a quiet
//! period; `Throttled` runs on the leading edge and drops calls until a
//! cooldown elapses. Both schedule through the host's timers.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use folio_dom::{Host, TimerId};

/// Default quiet period (ms)
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Default cooldown (ms)
pub const DEFAULT_THROTTLE_MS: u64 = 100;

struct DebounceState<A> {
    host: Weak<dyn Host>,
    delay_ms: u64,
    callback: Rc<dyn Fn(A)>,
    pending: Cell<Option<TimerId>>,
}

/// Trailing-edge debounce
pub struct Debounced<A> {
    state: Rc<DebounceState<A>>,
}

impl<A: 'static> Debounced<A> {
    pub fn new(host: &Rc<dyn Host>, delay_ms: u64, callback: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(DebounceState {
                host: Rc::downgrade(host),
                delay_ms,
                callback: Rc::new(callback),
                pending: Cell::new(None),
            }),
        }
    }

    /// Restart the quiet period; the callback later receives these args
    pub fn call(&self, args: A) {
        let Some(host) = self.state.host.upgrade() else {
            return;
        };
        if let Some(id) = self.state.pending.take() {
            host.clear_timer(id);
        }

        let state = self.state.clone();
        let id = host.set_timeout(
            self.state.delay_ms,
            Box::new(move || {
                state.pending.set(None);
                (state.callback)(args);
            }),
        );
        self.state.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    /// Drop a pending invocation
    pub fn cancel(&self) {
        if let Some(id) = self.state.pending.take() {
            if let Some(host) = self.state.host.upgrade() {
                host.clear_timer(id);
            }
        }
    }
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("delay_ms", &self.state.delay_ms)
            .field("pending", &self.state.pending.get())
            .finish()
    }
}

struct ThrottleState<A> {
    host: Weak<dyn Host>,
    limit_ms: u64,
    callback: Rc<dyn Fn(A)>,
    cooldown: Cell<Option<TimerId>>,
}

/// Leading-edge throttle
pub struct Throttled<A> {
    state: Rc<ThrottleState<A>>,
}

impl<A: 'static> Throttled<A> {
    pub fn new(host: &Rc<dyn Host>, limit_ms: u64, callback: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(ThrottleState {
                host: Rc::downgrade(host),
                limit_ms,
                callback: Rc::new(callback),
                cooldown: Cell::new(None),
            }),
        }
    }

    /// Run now unless cooling down. Returns whether the callback ran.
    pub fn call(&self, args: A) -> bool {
        if self.is_cooling_down() {
            tracing::trace!("throttled call dropped");
            return false;
        }
        let Some(host) = self.state.host.upgrade() else {
            return false;
        };

        let state = Rc::downgrade(&self.state);
        let id = host.set_timeout(
            self.state.limit_ms,
            Box::new(move || {
                if let Some(state) = state.upgrade() {
                    state.cooldown.set(None);
                }
            }),
        );
        self.state.cooldown.set(Some(id));

        (self.state.callback)(args);
        true
    }

    pub fn is_cooling_down(&self) -> bool {
        self.state.cooldown.get().is_some()
    }

    /// End the cooldown early
    pub fn cancel(&self) {
        if let Some(id) = self.state.cooldown.take() {
            if let Some(host) = self.state.host.upgrade() {
                host.clear_timer(id);
            }
        }
    }
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A> fmt::Debug for Throttled<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("limit_ms", &self.state.limit_ms)
            .field("cooling_down", &self.state.cooldown.get().is_some())
            .finish()
    }
}

/// Debounce with the default quiet period
pub fn debounce<A: 'static>(host: &Rc<dyn Host>, callback: impl Fn(A) + 'static) -> Debounced<A> {
    Debounced::new(host, DEFAULT_DEBOUNCE_MS, callback)
}

/// Throttle with the default cooldown
pub fn throttle<A: 'static>(host: &Rc<dyn Host>, callback: impl Fn(A) + 'static) -> Throttled<A> {
    Throttled::new(host, DEFAULT_THROTTLE_MS, callback)
}
