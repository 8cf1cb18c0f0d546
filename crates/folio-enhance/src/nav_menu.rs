//! Mobile navigation menu
//!
//! The hamburger toggles the open class on the menu; following any nav
//! link closes it again.

use std::rc::{Rc, Weak};

use folio_dom::{ElementId, EventKind, EventTarget, Host};

use crate::bindings::{Registrations, select_all, select_one};
use crate::config::EnhanceConfig;
use crate::error::Result;

const COMPONENT: &str = "nav menu";

#[derive(Debug)]
pub struct NavMenu {
    host: Weak<dyn Host>,
    menu: ElementId,
    open_class: String,
    registrations: Registrations,
}

impl NavMenu {
    /// Bind the hamburger and nav links. `None` when the hamburger or
    /// the menu is absent.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let selectors = &config.selectors;
        let toggle = select_one(host.as_ref(), COMPONENT, &selectors.hamburger)?;
        let menu = select_one(host.as_ref(), COMPONENT, &selectors.nav_menu)?;
        let (Some(toggle), Some(menu)) = (toggle, menu) else {
            tracing::debug!("nav menu elements missing, skipping");
            return Ok(None);
        };
        let links = select_all(host.as_ref(), COMPONENT, &selectors.nav_link)?;

        let open_class = config.classes.menu_open.clone();
        let mut registrations = Registrations::new();

        let class = open_class.clone();
        registrations.listen(host, EventTarget::Element(toggle), EventKind::Click, move |host, _| {
            let open = host.toggle_class(menu, &class);
            tracing::debug!(open, "nav menu toggled");
        });

        for &link in &links {
            let class = open_class.clone();
            registrations.listen(host, EventTarget::Element(link), EventKind::Click, move |host, _| {
                host.remove_class(menu, &class);
            });
        }

        tracing::debug!(links = links.len(), "nav menu bound");
        Ok(Some(Self {
            host: Rc::downgrade(host),
            menu,
            open_class,
            registrations,
        }))
    }

    pub fn is_open(&self) -> bool {
        self.host
            .upgrade()
            .map(|host| host.has_class(self.menu, &self.open_class))
            .unwrap_or(false)
    }

    pub fn dispose(&mut self) {
        if let Some(host) = self.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}
