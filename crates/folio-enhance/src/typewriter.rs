//! Typewriter effect
//!
//! Clears an element's text and types it back one character per tick.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use folio_dom::{ElementId, Host, TimerId};

use crate::bindings::select_one;
use crate::config::{EnhanceConfig, TypewriterConfig};
use crate::error::{EnhanceError, Result};

const COMPONENT: &str = "typewriter";

#[derive(Debug)]
struct TypingState {
    host: Weak<dyn Host>,
    element: ElementId,
    chars: Vec<char>,
    typed: RefCell<String>,
    index: Cell<usize>,
    timer: Cell<Option<TimerId>>,
}

impl TypingState {
    fn tick(&self) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        let index = self.index.get();
        match self.chars.get(index) {
            Some(&c) => {
                self.typed.borrow_mut().push(c);
                self.index.set(index + 1);
                host.set_text_content(self.element, &self.typed.borrow());
            }
            None => {
                if let Some(timer) = self.timer.take() {
                    host.clear_timer(timer);
                    tracing::debug!(chars = self.chars.len(), "typing finished");
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Typewriter {
    state: Rc<TypingState>,
}

impl Typewriter {
    /// Start typing when configured. `None` when disabled or when the
    /// element is absent.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let Some(TypewriterConfig { selector, speed_ms }) = &config.typewriter else {
            return Ok(None);
        };
        if *speed_ms == 0 {
            return Err(EnhanceError::invalid_option("typewriter.speed_ms", "must be positive"));
        }
        let Some(element) = select_one(host.as_ref(), COMPONENT, selector)? else {
            tracing::debug!(selector = %selector, "typewriter element missing, skipping");
            return Ok(None);
        };

        let text = host.text_content(element);
        host.set_text_content(element, "");

        let state = Rc::new(TypingState {
            host: Rc::downgrade(host),
            element,
            chars: text.chars().collect(),
            typed: RefCell::new(String::with_capacity(text.len())),
            index: Cell::new(0),
            timer: Cell::new(None),
        });

        let ticking = state.clone();
        let timer = host.set_interval(*speed_ms, Rc::new(move || ticking.tick()));
        state.timer.set(Some(timer));

        Ok(Some(Self { state }))
    }

    pub fn is_finished(&self) -> bool {
        self.state.timer.get().is_none()
    }

    /// Stop typing, leaving the text typed so far
    pub fn dispose(&mut self) {
        if let (Some(timer), Some(host)) = (self.state.timer.take(), self.state.host.upgrade()) {
            host.clear_timer(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::portfolio;

    fn enabled(speed_ms: u64) -> EnhanceConfig {
        EnhanceConfig {
            typewriter: Some(TypewriterConfig {
                speed_ms,
                ..TypewriterConfig::default()
            }),
            ..EnhanceConfig::default()
        }
    }

    #[test]
    fn test_types_then_stops() {
        let site = portfolio();
        let host = site.host();
        let typewriter = Typewriter::install(&host, &enabled(10)).unwrap().unwrap();
        assert_eq!(site.page.text_content(site.subtitle), "");

        site.page.advance(40);
        assert_eq!(site.page.text_content(site.subtitle), "Sust");
        assert!(!typewriter.is_finished());

        site.page.advance(1_000);
        assert_eq!(site.page.text_content(site.subtitle), "Sustainable urban design");
        assert!(typewriter.is_finished());
        assert_eq!(site.page.pending_timers(), 0);
    }

    #[test]
    fn test_disabled_by_default() {
        let site = portfolio();
        let host = site.host();
        assert!(Typewriter::install(&host, &EnhanceConfig::default()).unwrap().is_none());
        assert_eq!(site.page.text_content(site.subtitle), "Sustainable urban design");
    }

    #[test]
    fn test_dispose_stops_typing() {
        let site = portfolio();
        let host = site.host();
        let mut typewriter = Typewriter::install(&host, &enabled(80)).unwrap().unwrap();

        site.page.advance(160);
        typewriter.dispose();
        site.page.advance(1_000);
        assert_eq!(site.page.text_content(site.subtitle), "Su");
        assert_eq!(site.page.pending_timers(), 0);
    }
}
