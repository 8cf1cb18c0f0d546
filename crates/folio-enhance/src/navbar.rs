//! Navbar scroll state
//!
//! Switches the navbar to its compact style once the page has scrolled
//! past a threshold, and tracks the last scroll offset and direction.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use folio_dom::{ElementId, EventKind, EventTarget, Host};

use crate::bindings::{Registrations, select_one};
use crate::config::EnhanceConfig;
use crate::error::Result;
use crate::timing::Throttled;

const COMPONENT: &str = "navbar";

/// Direction of the most recent scroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    Still,
}

#[derive(Debug)]
struct NavbarState {
    host: Weak<dyn Host>,
    navbar: ElementId,
    threshold_px: f64,
    scrolled_class: String,
    last_scroll_top: Cell<f64>,
    direction: Cell<ScrollDirection>,
}

impl NavbarState {
    fn update(&self) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        let scroll_top = host.scroll_y();

        if scroll_top > self.threshold_px {
            host.add_class(self.navbar, &self.scrolled_class);
        } else {
            host.remove_class(self.navbar, &self.scrolled_class);
        }

        let last = self.last_scroll_top.replace(scroll_top);
        self.direction.set(if scroll_top > last {
            ScrollDirection::Down
        } else if scroll_top < last {
            ScrollDirection::Up
        } else {
            ScrollDirection::Still
        });
    }
}

#[derive(Debug)]
pub struct NavbarSwitcher {
    state: Rc<NavbarState>,
    throttle: Option<Throttled<()>>,
    registrations: Registrations,
}

impl NavbarSwitcher {
    /// Bind to window scroll. `None` without a navbar.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let Some(navbar) = select_one(host.as_ref(), COMPONENT, &config.selectors.navbar)? else {
            tracing::debug!("navbar missing, skipping");
            return Ok(None);
        };

        let state = Rc::new(NavbarState {
            host: Rc::downgrade(host),
            navbar,
            threshold_px: config.navbar.threshold_px,
            scrolled_class: config.classes.scrolled.clone(),
            last_scroll_top: Cell::new(host.scroll_y()),
            direction: Cell::new(ScrollDirection::Still),
        });

        let throttle = config.scroll.throttle_ms.map(|limit| {
            let state = state.clone();
            Throttled::new(host, limit, move |()| state.update())
        });

        let mut registrations = Registrations::new();
        let (handler_state, handler_throttle) = (state.clone(), throttle.clone());
        registrations.listen(host, EventTarget::Window, EventKind::Scroll, move |_, _| {
            match &handler_throttle {
                Some(throttle) => {
                    throttle.call(());
                }
                None => handler_state.update(),
            }
        });

        tracing::debug!(threshold = config.navbar.threshold_px, "navbar switcher bound");
        Ok(Some(Self {
            state,
            throttle,
            registrations,
        }))
    }

    pub fn is_scrolled(&self) -> bool {
        self.state
            .host
            .upgrade()
            .map(|host| host.has_class(self.state.navbar, &self.state.scrolled_class))
            .unwrap_or(false)
    }

    pub fn last_scroll_top(&self) -> f64 {
        self.state.last_scroll_top.get()
    }

    pub fn direction(&self) -> ScrollDirection {
        self.state.direction.get()
    }

    pub fn dispose(&mut self) {
        if let Some(throttle) = &self.throttle {
            throttle.cancel();
        }
        if let Some(host) = self.state.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}
