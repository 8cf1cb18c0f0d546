//! Host bindings
//!
//! Selector lookups that attribute failures to a component, and the
//! registration list each component tears down on dispose.

use std::rc::{Rc, Weak};

use folio_dom::{ElementId, Event, EventKind, EventTarget, Host, ListenerId, ObserverId, TimerId};

use crate::error::{EnhanceError, Result};

/// First element matching `selector`
pub fn select_one(host: &dyn Host, component: &'static str, selector: &str) -> Result<Option<ElementId>> {
    host.query_selector(selector)
        .map_err(|source| EnhanceError::Selector {
            component,
            selector: selector.to_string(),
            source,
        })
}

/// All elements matching `selector`, in document order
pub fn select_all(host: &dyn Host, component: &'static str, selector: &str) -> Result<Vec<ElementId>> {
    host.query_selector_all(selector)
        .map_err(|source| EnhanceError::Selector {
            component,
            selector: selector.to_string(),
            source,
        })
}

/// Something registered with the host that must be released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Listener(ListenerId),
    Timer(TimerId),
    Observer(ObserverId),
}

/// Registrations owned by one component
#[derive(Debug, Default)]
pub struct Registrations {
    items: Vec<Registration>,
}

impl Registrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener whose callback holds only a weak host reference.
    /// The callback does nothing once the host is gone.
    pub fn listen(
        &mut self,
        host: &Rc<dyn Host>,
        target: EventTarget,
        kind: EventKind,
        callback: impl Fn(&dyn Host, &mut Event) + 'static,
    ) -> ListenerId {
        let weak: Weak<dyn Host> = Rc::downgrade(host);
        let id = host.add_event_listener(
            target,
            kind,
            Rc::new(move |event: &mut Event| {
                if let Some(host) = weak.upgrade() {
                    callback(host.as_ref(), event);
                }
            }),
        );
        self.items.push(Registration::Listener(id));
        id
    }

    pub fn push(&mut self, registration: Registration) {
        self.items.push(registration);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Release everything, newest first
    pub fn dispose(&mut self, host: &dyn Host) {
        for registration in self.items.drain(..).rev() {
            match registration {
                Registration::Listener(id) => host.remove_event_listener(id),
                Registration::Timer(id) => host.clear_timer(id),
                Registration::Observer(id) => host.disconnect(id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::blank_page;
    use std::cell::Cell;

    #[test]
    fn test_selector_errors_name_component() {
        let page = blank_page();
        let err = select_all(&*page, "nav menu", "a[").unwrap_err();
        assert!(matches!(err, EnhanceError::Selector { component: "nav menu", .. }));
        assert!(err.to_string().contains("a["));
    }

    #[test]
    fn test_dispose_releases_everything() {
        let page = blank_page();
        let host: Rc<dyn Host> = page.clone();
        let button = page.element("button").build();
        let clicks = Rc::new(Cell::new(0));

        let mut registrations = Registrations::new();
        let seen = clicks.clone();
        registrations.listen(&host, EventTarget::Element(button), EventKind::Click, move |_, _| {
            seen.set(seen.get() + 1)
        });
        let timer = host.set_timeout(1_000, Box::new(|| {}));
        registrations.push(Registration::Timer(timer));
        assert_eq!(registrations.len(), 2);

        page.click(button);
        assert_eq!(clicks.get(), 1);

        registrations.dispose(host.as_ref());
        assert!(registrations.is_empty());
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.pending_timers(), 0);

        page.click(button);
        assert_eq!(clicks.get(), 1);
    }
}
