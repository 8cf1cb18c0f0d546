//! folio enhance - interactive behaviors for a static portfolio page
//!
//! Features:
//! - Mobile nav menu toggle
//! - Scroll spy highlighting the current section's nav link
//! - Reveal-on-scroll via intersection observers
//! - Navbar compact style past a scroll threshold
//! - Smooth in-page anchor scrolling with a navbar offset
//! - Loader overlay fade after page load
//! - Debounce / throttle helpers
//! - Diagnostics: banners, uncaught error logging, critical element check
//!
//! Everything runs against a [`folio_dom::Host`], so the same code
//! drives a browser page or an in-memory [`folio_dom::Page`].

pub mod bindings;
pub mod config;
pub mod diagnostics;
mod enhancer;
pub mod error;
pub mod fade_in;
pub mod loader;
pub mod nav_menu;
pub mod navbar;
pub mod scroll_spy;
pub mod smooth_scroll;
pub mod timing;
pub mod typewriter;

#[cfg(test)]
mod test_helpers;

pub use config::{EnhanceConfig, TieBreak};
pub use diagnostics::Diagnostics;
pub use enhancer::{CONFIG_SELECTOR, Enhancer};
pub use error::{EnhanceError, Result};
pub use fade_in::FadeIn;
pub use loader::PageLoader;
pub use nav_menu::NavMenu;
pub use navbar::{NavbarSwitcher, ScrollDirection};
pub use scroll_spy::ScrollSpy;
pub use smooth_scroll::SmoothScroll;
pub use timing::{Debounced, Throttled, debounce, throttle};
pub use typewriter::Typewriter;
