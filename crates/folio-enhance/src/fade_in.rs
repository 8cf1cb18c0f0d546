//! Reveal on scroll
//!
//! Content blocks gain the revealed class the first time they intersect
//! the (margin-shrunk) viewport. The class is never removed.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use folio_dom::{ElementId, Host, IntersectionEntry, ObserverId};

use crate::bindings::{Registration, Registrations, select_all};
use crate::config::EnhanceConfig;
use crate::error::Result;

const COMPONENT: &str = "fade in";

#[derive(Debug)]
pub struct FadeIn {
    host: Weak<dyn Host>,
    observer: ObserverId,
    targets: Vec<ElementId>,
    revealed_class: String,
    registrations: Registrations,
}

impl FadeIn {
    /// Observe every reveal target. `None` when there are none.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let options = config.fade_in.intersection_options()?;
        let targets = select_all(host.as_ref(), COMPONENT, &config.selectors.fade_targets)?;
        if targets.is_empty() {
            tracing::debug!("no reveal targets, skipping");
            return Ok(None);
        }

        let weak = Rc::downgrade(host);
        let revealed_class = config.classes.revealed.clone();
        let unobserve_revealed = config.fade_in.unobserve_revealed;
        let observer_id: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let (class, slot) = (revealed_class.clone(), observer_id.clone());
        let observer = host.create_intersection_observer(
            options,
            Rc::new(move |entries: &[IntersectionEntry]| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                for entry in entries.iter().filter(|e| e.is_intersecting) {
                    host.add_class(entry.target, &class);
                    tracing::trace!(element = entry.target.0, ratio = entry.intersection_ratio, "revealed");
                    if unobserve_revealed {
                        if let Some(observer) = slot.get() {
                            host.unobserve(observer, entry.target);
                        }
                    }
                }
            }),
        );
        observer_id.set(Some(observer));

        for &target in &targets {
            host.observe(observer, target);
        }

        let mut registrations = Registrations::new();
        registrations.push(Registration::Observer(observer));

        tracing::debug!(targets = targets.len(), "reveal observer bound");
        Ok(Some(Self {
            host: Rc::downgrade(host),
            observer,
            targets,
            revealed_class,
            registrations,
        }))
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    /// Targets that carry the revealed class
    pub fn revealed(&self) -> Vec<ElementId> {
        let Some(host) = self.host.upgrade() else {
            return Vec::new();
        };
        self.targets
            .iter()
            .copied()
            .filter(|&target| host.has_class(target, &self.revealed_class))
            .collect()
    }

    pub fn dispose(&mut self) {
        if let Some(host) = self.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}
