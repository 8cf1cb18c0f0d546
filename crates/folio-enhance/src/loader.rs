//! Page loader overlay
//!
//! After the window `load` event the overlay fades (opacity 0) and is
//! later taken out of layout (display none). The overlay is looked up
//! when `load` fires, so pages without one are unaffected. Installing
//! on a page that has already loaded starts the sequence at once.

use std::rc::{Rc, Weak};

use folio_dom::{EventKind, EventTarget, Host, SelectorList};

use crate::bindings::Registrations;
use crate::config::EnhanceConfig;
use crate::error::{EnhanceError, Result};

const COMPONENT: &str = "page loader";

/// Fade then hide, scheduled once the page has loaded
struct FadeSequence {
    host: Weak<dyn Host>,
    selector: String,
    fade_delay_ms: u64,
    hide_delay_ms: u64,
}

impl FadeSequence {
    fn start(&self, host: &dyn Host) {
        let Ok(Some(loader)) = host.query_selector(&self.selector) else {
            tracing::debug!("no loader overlay on this page");
            return;
        };

        let weak = self.host.clone();
        let hide_delay = self.hide_delay_ms;
        host.set_timeout(
            self.fade_delay_ms,
            Box::new(move || {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                host.set_style(loader, "opacity", "0");
                tracing::debug!("loader faded");

                let weak = Rc::downgrade(&host);
                host.set_timeout(
                    hide_delay,
                    Box::new(move || {
                        if let Some(host) = weak.upgrade() {
                            host.set_style(loader, "display", "none");
                            tracing::debug!("loader hidden");
                        }
                    }),
                );
            }),
        );
    }
}

#[derive(Debug)]
pub struct PageLoader {
    host: Weak<dyn Host>,
    registrations: Registrations,
}

impl PageLoader {
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let selector = config.selectors.loader.clone();
        SelectorList::parse(&selector).map_err(|source| EnhanceError::Selector {
            component: COMPONENT,
            selector: selector.clone(),
            source,
        })?;

        let sequence = FadeSequence {
            host: Rc::downgrade(host),
            selector,
            fade_delay_ms: config.loader.fade_delay_ms,
            hide_delay_ms: config.loader.hide_delay_ms,
        };

        let mut registrations = Registrations::new();
        if host.is_loaded() {
            tracing::debug!("page already loaded, starting loader fade");
            sequence.start(host.as_ref());
        } else {
            registrations.listen(host, EventTarget::Window, EventKind::Load, move |host, _| {
                sequence.start(host);
            });
        }

        Ok(Some(Self {
            host: Rc::downgrade(host),
            registrations,
        }))
    }

    pub fn dispose(&mut self) {
        if let Some(host) = self.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{blank_page, portfolio};

    #[test]
    fn test_fade_then_hide() {
        let site = portfolio();
        let host = site.host();
        PageLoader::install(&host, &EnhanceConfig::default()).unwrap().unwrap();

        site.page.advance(2_000);
        assert_eq!(site.page.style(site.loader, "opacity"), None);

        site.page.fire_load();
        site.page.advance(499);
        assert_eq!(site.page.style(site.loader, "opacity"), None);
        site.page.advance(1);
        assert_eq!(site.page.style(site.loader, "opacity").as_deref(), Some("0"));
        assert_eq!(site.page.style(site.loader, "display"), None);

        site.page.advance(500);
        assert_eq!(site.page.style(site.loader, "display").as_deref(), Some("none"));
        assert_eq!(site.page.pending_timers(), 0);
    }

    #[test]
    fn test_install_after_load_still_fades() {
        let site = portfolio();
        let host = site.host();
        site.page.fire_load();

        let loader = PageLoader::install(&host, &EnhanceConfig::default()).unwrap().unwrap();
        assert_eq!(loader.registrations.len(), 0);

        site.page.advance(500);
        assert_eq!(site.page.style(site.loader, "opacity").as_deref(), Some("0"));
        site.page.advance(500);
        assert_eq!(site.page.style(site.loader, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_page_without_loader() {
        let page = blank_page();
        let host: Rc<dyn Host> = page.clone();
        PageLoader::install(&host, &EnhanceConfig::default()).unwrap().unwrap();

        page.fire_load();
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn test_invalid_selector() {
        let page = blank_page();
        let host: Rc<dyn Host> = page.clone();
        let mut config = EnhanceConfig::default();
        config.selectors.loader = ".".to_string();
        assert!(PageLoader::install(&host, &config).is_err());
    }
}
