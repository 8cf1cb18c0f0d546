//! In-page anchor scrolling
//!
//! Clicks on fragment links are intercepted and turned into a smooth
//! scroll that stops `offset_px` short of the target, leaving room for
//! the fixed navbar.

use std::rc::{Rc, Weak};

use folio_dom::{ElementId, EventKind, EventTarget, Host, ScrollOptions};

use crate::bindings::{Registrations, select_all};
use crate::config::EnhanceConfig;
use crate::error::Result;

const COMPONENT: &str = "smooth scroll";

/// Scroll destination for a fragment `href`, if it names an element.
/// Fragments that do not parse as selectors (such as a bare `#`) have
/// no destination.
pub fn scroll_target(host: &dyn Host, href: &str, offset_px: f64) -> Option<f64> {
    match host.query_selector(href) {
        Ok(Some(target)) => Some(host.offset_top(target) - offset_px),
        Ok(None) => {
            tracing::trace!(href, "anchor target not found");
            None
        }
        Err(err) => {
            tracing::debug!(href, error = %err, "anchor fragment is not a selector");
            None
        }
    }
}

#[derive(Debug)]
pub struct SmoothScroll {
    host: Weak<dyn Host>,
    anchors: Vec<ElementId>,
    registrations: Registrations,
}

impl SmoothScroll {
    /// Intercept clicks on every fragment anchor. `None` without anchors.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let anchors = select_all(host.as_ref(), COMPONENT, &config.selectors.anchors)?;
        if anchors.is_empty() {
            tracing::debug!("no fragment anchors, skipping");
            return Ok(None);
        }

        let offset_px = config.smooth_scroll.offset_px;
        let behavior = config.smooth_scroll.behavior;
        let mut registrations = Registrations::new();

        for &anchor in &anchors {
            registrations.listen(host, EventTarget::Element(anchor), EventKind::Click, move |host, event| {
                event.prevent_default();

                let Some(href) = host.attribute(anchor, "href") else {
                    return;
                };
                if let Some(top) = scroll_target(host, &href, offset_px) {
                    tracing::debug!(href = %href, top, "scrolling to anchor");
                    host.scroll_to(ScrollOptions { top, behavior });
                }
            });
        }

        tracing::debug!(anchors = anchors.len(), "smooth scroll bound");
        Ok(Some(Self {
            host: Rc::downgrade(host),
            anchors,
            registrations,
        }))
    }

    pub fn anchors(&self) -> &[ElementId] {
        &self.anchors
    }

    pub fn dispose(&mut self) {
        if let Some(host) = self.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}
