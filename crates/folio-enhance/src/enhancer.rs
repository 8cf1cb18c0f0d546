//! Enhancer - installs every page behavior
//!
//! Each component installs independently: one that fails or finds its
//! elements missing is skipped without affecting the others.

use std::rc::{Rc, Weak};

use folio_dom::Host;

use crate::config::EnhanceConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::fade_in::FadeIn;
use crate::loader::PageLoader;
use crate::nav_menu::NavMenu;
use crate::navbar::NavbarSwitcher;
use crate::scroll_spy::ScrollSpy;
use crate::smooth_scroll::SmoothScroll;
use crate::timing::{Debounced, Throttled};
use crate::typewriter::Typewriter;

/// Element whose text holds a JSON configuration
pub const CONFIG_SELECTOR: &str = "#folio-config";

/// Installed page behaviors
#[derive(Debug)]
pub struct Enhancer {
    host: Weak<dyn Host>,
    config: EnhanceConfig,
    nav_menu: Option<NavMenu>,
    scroll_spy: Option<ScrollSpy>,
    fade_in: Option<FadeIn>,
    navbar: Option<NavbarSwitcher>,
    smooth_scroll: Option<SmoothScroll>,
    loader: Option<PageLoader>,
    typewriter: Option<Typewriter>,
    diagnostics: Option<Diagnostics>,
    missing_elements: Option<Vec<String>>,
}

impl Enhancer {
    /// Read the page's embedded configuration. Pages without one, or
    /// with one that does not parse, get the defaults.
    pub fn load_config(host: &dyn Host) -> EnhanceConfig {
        let element = match host.query_selector(CONFIG_SELECTOR) {
            Ok(Some(element)) => element,
            _ => return EnhanceConfig::default(),
        };

        match EnhanceConfig::from_json(&host.text_content(element)) {
            Ok(config) => {
                tracing::debug!("loaded page configuration");
                config
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring page configuration");
                EnhanceConfig::default()
            }
        }
    }

    /// Install every behavior the page has elements for
    pub fn install(host: &Rc<dyn Host>, config: EnhanceConfig) -> Self {
        let diagnostics = mount("diagnostics", Diagnostics::install(host, &config));
        if let Some(diagnostics) = &diagnostics {
            diagnostics.log_banners();
        }

        let mut enhancer = Self {
            host: Rc::downgrade(host),
            nav_menu: mount("nav menu", NavMenu::install(host, &config)),
            scroll_spy: mount("scroll spy", ScrollSpy::install(host, &config)),
            fade_in: mount("fade in", FadeIn::install(host, &config)),
            navbar: mount("navbar", NavbarSwitcher::install(host, &config)),
            smooth_scroll: mount("smooth scroll", SmoothScroll::install(host, &config)),
            loader: mount("page loader", PageLoader::install(host, &config)),
            typewriter: mount("typewriter", Typewriter::install(host, &config)),
            diagnostics,
            missing_elements: None,
            config,
        };

        enhancer.missing_elements = enhancer
            .diagnostics
            .as_ref()
            .and_then(Diagnostics::check_local);

        tracing::info!(components = enhancer.installed().len(), "page enhancements installed");
        enhancer
    }

    /// Names of the installed components
    pub fn installed(&self) -> Vec<&'static str> {
        [
            ("diagnostics", self.diagnostics.is_some()),
            ("nav menu", self.nav_menu.is_some()),
            ("scroll spy", self.scroll_spy.is_some()),
            ("fade in", self.fade_in.is_some()),
            ("navbar", self.navbar.is_some()),
            ("smooth scroll", self.smooth_scroll.is_some()),
            ("page loader", self.loader.is_some()),
            ("typewriter", self.typewriter.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn nav_menu(&self) -> Option<&NavMenu> {
        self.nav_menu.as_ref()
    }

    pub fn scroll_spy(&self) -> Option<&ScrollSpy> {
        self.scroll_spy.as_ref()
    }

    pub fn fade_in(&self) -> Option<&FadeIn> {
        self.fade_in.as_ref()
    }

    pub fn navbar(&self) -> Option<&NavbarSwitcher> {
        self.navbar.as_ref()
    }

    pub fn smooth_scroll(&self) -> Option<&SmoothScroll> {
        self.smooth_scroll.as_ref()
    }

    pub fn typewriter(&self) -> Option<&Typewriter> {
        self.typewriter.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    /// Critical selectors that matched nothing. `None` when the check
    /// did not run (non-local host).
    pub fn missing_elements(&self) -> Option<&[String]> {
        self.missing_elements.as_deref()
    }

    /// Debounce with the configured quiet period
    pub fn debounce<A: 'static>(&self, callback: impl Fn(A) + 'static) -> Option<Debounced<A>> {
        let host = self.host.upgrade()?;
        Some(Debounced::new(&host, self.config.timing.debounce_ms, callback))
    }

    /// Throttle with the configured cooldown
    pub fn throttle<A: 'static>(&self, callback: impl Fn(A) + 'static) -> Option<Throttled<A>> {
        let host = self.host.upgrade()?;
        Some(Throttled::new(&host, self.config.timing.throttle_ms, callback))
    }

    /// Remove every listener, timer and observer the components own
    pub fn teardown(&mut self) {
        if let Some(mut c) = self.typewriter.take() {
            c.dispose();
        }
        if let Some(mut c) = self.loader.take() {
            c.dispose();
        }
        if let Some(mut c) = self.smooth_scroll.take() {
            c.dispose();
        }
        if let Some(mut c) = self.navbar.take() {
            c.dispose();
        }
        if let Some(mut c) = self.fade_in.take() {
            c.dispose();
        }
        if let Some(mut c) = self.scroll_spy.take() {
            c.dispose();
        }
        if let Some(mut c) = self.nav_menu.take() {
            c.dispose();
        }
        if let Some(mut c) = self.diagnostics.take() {
            c.dispose();
        }
        tracing::debug!("page enhancements removed");
    }
}

fn mount<T>(name: &'static str, installed: Result<Option<T>>) -> Option<T> {
    match installed {
        Ok(Some(component)) => {
            tracing::debug!(component = name, "installed");
            Some(component)
        }
        Ok(None) => {
            tracing::debug!(component = name, "not applicable to this page");
            None
        }
        Err(err) => {
            tracing::warn!(component = name, error = %err, "failed to install");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{blank_page, portfolio};

    #[test]
    fn test_full_install() {
        let site = portfolio();
        let host = site.host();
        let enhancer = Enhancer::install(&host, EnhanceConfig::default());

        assert_eq!(
            enhancer.installed(),
            vec![
                "diagnostics",
                "nav menu",
                "scroll spy",
                "fade in",
                "navbar",
                "smooth scroll",
                "page loader",
            ]
        );
        assert_eq!(enhancer.missing_elements(), Some(&[][..]));
    }

    #[test]
    fn test_failures_are_isolated() {
        let site = portfolio();
        let host = site.host();
        let mut config = EnhanceConfig::default();
        config.selectors.hamburger = "[".to_string();
        config.fade_in.root_margin = "bogus".to_string();
        let enhancer = Enhancer::install(&host, config);

        assert!(enhancer.nav_menu().is_none());
        assert!(enhancer.fade_in().is_none());
        assert!(enhancer.scroll_spy().is_some());
        assert!(enhancer.smooth_scroll().is_some());

        site.page.scroll_to_y(200.0);
        assert!(enhancer.navbar().is_some_and(|n| n.is_scrolled()));
    }

    #[test]
    fn test_empty_page() {
        let page = blank_page();
        let host: Rc<dyn Host> = page.clone();
        let enhancer = Enhancer::install(&host, EnhanceConfig::default());

        assert_eq!(enhancer.installed(), vec!["diagnostics", "page loader"]);
        assert_eq!(enhancer.missing_elements().map(<[String]>::len), Some(4));
    }

    #[test]
    fn test_load_config() {
        let page = blank_page();
        assert_eq!(Enhancer::load_config(&*page), EnhanceConfig::default());

        let script = page
            .element("script")
            .id("folio-config")
            .attr("type", "application/json")
            .text(r#"{ "navbar": { "threshold_px": 300 } }"#)
            .build();
        assert_eq!(Enhancer::load_config(&*page).navbar.threshold_px, 300.0);

        page.set_text_content(script, "{ not json");
        assert_eq!(Enhancer::load_config(&*page), EnhanceConfig::default());
    }

    #[test]
    fn test_teardown() {
        let site = portfolio();
        let host = site.host();
        let mut config = EnhanceConfig::default();
        config.scroll.throttle_ms = Some(100);
        let mut enhancer = Enhancer::install(&host, config);

        site.page.scroll_to_y(300.0);
        assert!(site.page.listener_count() > 0);

        enhancer.teardown();
        assert!(enhancer.installed().is_empty());
        assert_eq!(site.page.listener_count(), 0);
        assert_eq!(site.page.pending_timers(), 0);
        assert_eq!(site.page.observed_count(), 0);
    }

    #[test]
    fn test_configured_timing() {
        let site = portfolio();
        let host = site.host();
        let mut config = EnhanceConfig::default();
        config.timing.debounce_ms = 40;
        let enhancer = Enhancer::install(&host, config);

        let hits = Rc::new(std::cell::Cell::new(0));
        let count = hits.clone();
        let debounced = enhancer.debounce(move |()| count.set(count.get() + 1)).unwrap();
        debounced.call(());
        site.page.advance(39);
        assert_eq!(hits.get(), 0);
        site.page.advance(1);
        assert_eq!(hits.get(), 1);
    }
}
