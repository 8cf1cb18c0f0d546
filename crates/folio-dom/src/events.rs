//! Events
//!
//! Event kinds, targets and the event object handed to listeners.

use crate::ElementId;

/// Event types the enhancement layer subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Scroll,
    /// Page finished loading (window `load`)
    Load,
    /// Uncaught error surfaced to the window
    Error,
}

impl EventKind {
    /// DOM event type name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Scroll => "scroll",
            EventKind::Load => "load",
            EventKind::Error => "error",
        }
    }

    /// Whether `prevent_default` has any effect
    pub fn is_cancelable(&self) -> bool {
        matches!(self, EventKind::Click | EventKind::Error)
    }
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    Element(ElementId),
}

/// Event delivered to listeners
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub target: EventTarget,
    /// Error message for `EventKind::Error`
    pub message: Option<String>,
    /// Virtual or wall-clock time of dispatch (ms)
    pub timestamp: f64,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            message: None,
            timestamp: 0.0,
            default_prevented: false,
        }
    }

    /// Create an error event carrying a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(EventKind::Error, EventTarget::Window)
        }
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.kind.is_cancelable() {
            self.default_prevented = true;
        }
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);
