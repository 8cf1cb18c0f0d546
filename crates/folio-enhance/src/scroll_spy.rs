//! Scroll spy
//!
//! Highlights the nav link of the section containing the scroll
//! offset. Sections count as current from `lead_px` above their top,
//! so a link lights up slightly before its section reaches the navbar.

use std::rc::{Rc, Weak};

use folio_dom::{ElementId, EventKind, EventTarget, Host};

use crate::bindings::{Registrations, select_all};
use crate::config::{EnhanceConfig, TieBreak};
use crate::error::Result;
use crate::timing::Throttled;

const COMPONENT: &str = "scroll spy";

#[derive(Debug)]
struct SpyState {
    host: Weak<dyn Host>,
    sections: Vec<ElementId>,
    links: Vec<ElementId>,
    lead_px: f64,
    tie_break: TieBreak,
    active_class: String,
}

impl SpyState {
    /// Section containing `scroll_y`, if any
    fn current_section(&self, host: &dyn Host, scroll_y: f64) -> Option<(ElementId, String)> {
        let mut current = None;
        for &section in &self.sections {
            let top = host.offset_top(section) - self.lead_px;
            let bottom = top + host.offset_height(section);
            if scroll_y > top && scroll_y <= bottom {
                let id = host.attribute(section, "id").unwrap_or_default();
                current = Some((section, id));
                if self.tie_break == TieBreak::FirstMatch {
                    break;
                }
            }
        }
        current
    }

    /// Re-evaluate the active link. Leaves links untouched when no
    /// section contains the offset.
    fn update(&self) -> Option<ElementId> {
        let host = self.host.upgrade()?;
        let (section, id) = self.current_section(host.as_ref(), host.scroll_y())?;
        let fragment = format!("#{id}");

        for &link in &self.links {
            if host.attribute(link, "href").as_deref() == Some(fragment.as_str()) {
                host.add_class(link, &self.active_class);
            } else {
                host.remove_class(link, &self.active_class);
            }
        }
        tracing::trace!(section = %id, "scroll spy updated");
        Some(section)
    }
}

#[derive(Debug)]
pub struct ScrollSpy {
    state: Rc<SpyState>,
    throttle: Option<Throttled<()>>,
    registrations: Registrations,
}

impl ScrollSpy {
    /// Bind to window scroll and evaluate once for the initial offset.
    /// `None` when there are no sections or no nav links.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let sections = select_all(host.as_ref(), COMPONENT, &config.selectors.sections)?;
        let links = select_all(host.as_ref(), COMPONENT, &config.selectors.nav_link)?;
        if sections.is_empty() || links.is_empty() {
            tracing::debug!(
                sections = sections.len(),
                links = links.len(),
                "scroll spy has nothing to track, skipping"
            );
            return Ok(None);
        }

        let state = Rc::new(SpyState {
            host: Rc::downgrade(host),
            sections,
            links,
            lead_px: config.scroll_spy.lead_px,
            tie_break: config.scroll_spy.tie_break,
            active_class: config.classes.active.clone(),
        });

        let throttle = config.scroll.throttle_ms.map(|limit| {
            let state = state.clone();
            Throttled::new(host, limit, move |()| {
                state.update();
            })
        });

        let mut registrations = Registrations::new();
        let (handler_state, handler_throttle) = (state.clone(), throttle.clone());
        registrations.listen(host, EventTarget::Window, EventKind::Scroll, move |_, _| {
            match &handler_throttle {
                Some(throttle) => {
                    throttle.call(());
                }
                None => {
                    handler_state.update();
                }
            }
        });

        let spy = Self {
            state,
            throttle,
            registrations,
        };
        spy.refresh();
        tracing::debug!(sections = spy.state.sections.len(), "scroll spy bound");
        Ok(Some(spy))
    }

    /// Re-evaluate immediately, returning the current section
    pub fn refresh(&self) -> Option<ElementId> {
        self.state.update()
    }

    /// Link currently carrying the active class
    pub fn active_link(&self) -> Option<ElementId> {
        let host = self.state.host.upgrade()?;
        self.state
            .links
            .iter()
            .copied()
            .find(|&link| host.has_class(link, &self.state.active_class))
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
