//! Integration tests - full portfolio page
//!
//! Builds the portfolio document on an in-memory page, installs every
//! enhancement and drives it through clicks, scrolling and time.

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use folio_dom::{ElementId, Host, Page, ScrollOptions};
use folio_enhance::{EnhanceConfig, Enhancer, ScrollDirection, debounce, throttle};

struct Site {
    page: Rc<Page>,
    navbar: ElementId,
    hamburger: ElementId,
    menu: ElementId,
    links: Vec<ElementId>,
    loader: ElementId,
    cards: Vec<ElementId>,
    dead_link: ElementId,
}

impl Site {
    fn host(&self) -> Rc<dyn Host> {
        self.page.clone()
    }
}

fn site_at(url: &str) -> Site {
    let page = Rc::new(Page::new(url, 1280.0, 800.0).unwrap());

    let loader = page.element("div").class("loader").build();
    let navbar = page.element("nav").class("navbar").at(0.0, 70.0).build();
    let hamburger = page.element("div").class("hamburger").child_of(navbar).build();
    let menu = page.element("ul").class("nav-menu").child_of(navbar).build();
    let links = ["home", "about", "skills", "projects", "contact"]
        .iter()
        .map(|id| {
            let item = page.element("li").child_of(menu).build();
            page.element("a")
                .class("nav-link")
                .attr("href", &format!("#{id}"))
                .child_of(item)
                .build()
        })
        .collect();

    let home = page.element("section").id("home").class("hero").at(0.0, 900.0).build();
    let dead_link = page.element("a").attr("href", "#").child_of(home).at(600.0, 30.0).build();

    let about = page.element("section").id("about").at(900.0, 700.0).build();
    page.element("div").class("about-text").child_of(about).at(1000.0, 400.0).build();

    let skills = page.element("section").id("skills").at(1600.0, 600.0).build();
    for top in [1700.0, 1900.0] {
        page.element("div").class("skill-card").child_of(skills).at(top, 150.0).build();
    }

    let projects = page.element("section").id("projects").class("projects").at(2200.0, 1000.0).build();
    let cards = [2300.0, 2700.0]
        .into_iter()
        .map(|top| page.element("div").class("project-card").child_of(projects).at(top, 350.0).build())
        .collect();

    let contact = page.element("section").id("contact").class("contact").at(3200.0, 800.0).build();
    page.element("div").class("contact-item").child_of(contact).at(3300.0, 200.0).build();

    Site {
        page,
        navbar,
        hamburger,
        menu,
        links,
        loader,
        cards,
        dead_link,
    }
}

fn site() -> Site {
    site_at("http://localhost:5500/index.html")
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records everything at debug and above
fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[test]
fn test_menu_toggles_and_closes_on_link() {
    let site = site();
    let enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    let menu = enhancer.nav_menu().unwrap();

    site.page.click(site.hamburger);
    assert!(menu.is_open());
    assert!(site.page.has_class(site.menu, "active"));

    site.page.click(site.hamburger);
    assert!(!menu.is_open());

    site.page.click(site.hamburger);
    site.page.click(site.links[3]);
    assert!(!menu.is_open());
}

#[test]
fn test_scroll_spy_follows_sections() {
    let site = site();
    let enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    let spy = enhancer.scroll_spy().unwrap();

    assert_eq!(spy.active_link(), Some(site.links[0]));

    // skills spans 1600..2200, current from 1500
    site.page.scroll_to_y(1500.0);
    assert_eq!(spy.active_link(), Some(site.links[1]));
    site.page.scroll_to_y(1501.0);
    assert_eq!(spy.active_link(), Some(site.links[2]));

    let active: Vec<_> = site.links.iter().filter(|&&l| site.page.has_class(l, "active")).collect();
    assert_eq!(active.len(), 1);
}

#[test]
fn test_navbar_threshold_and_direction() {
    let site = site();
    let enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    let navbar = enhancer.navbar().unwrap();

    site.page.scroll_to_y(100.0);
    assert!(!site.page.has_class(site.navbar, "scrolled"));
    site.page.scroll_to_y(101.0);
    assert!(site.page.has_class(site.navbar, "scrolled"));
    assert_eq!(navbar.direction(), ScrollDirection::Down);

    site.page.scroll_to_y(0.0);
    assert!(!site.page.has_class(site.navbar, "scrolled"));
    assert_eq!(navbar.direction(), ScrollDirection::Up);
    assert_eq!(navbar.last_scroll_top(), 0.0);
}

// ============================================================================
// SMOOTH SCROLLING
// ============================================================================

#[test]
fn test_nav_click_scrolls_below_navbar() {
    let site = site();
    let _enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());

    site.page.scroll_to_y(50.0);
    assert!(!site.page.click(site.links[3]));
    assert_eq!(site.page.scroll_requests(), vec![ScrollOptions::smooth(2130.0)]);

    site.page.advance(400);
    assert_eq!(site.page.scroll_y(), 2130.0);

    // The scroll spy and navbar saw the animated frames
    assert!(site.page.has_class(site.links[3], "active"));
    assert!(site.page.has_class(site.navbar, "scrolled"));
}

#[test]
fn test_bare_hash_link_does_nothing() {
    let site = site();
    let _enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    site.page.scroll_to_y(300.0);

    assert!(!site.page.click(site.dead_link));
    site.page.advance(500);

    assert_eq!(site.page.scroll_y(), 300.0);
    assert!(site.page.scroll_requests().is_empty());
}

// ============================================================================
// REVEAL AND LOADER
// ============================================================================

#[test]
fn test_cards_reveal_once() {
    let site = site();
    let enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    site.page.flush();
    assert!(!site.page.has_class(site.cards[0], "fade-in"));

    site.page.scroll_to_y(1600.0);
    assert!(site.page.has_class(site.cards[0], "fade-in"));
    assert!(!site.page.has_class(site.cards[1], "fade-in"));

    site.page.scroll_to_y(0.0);
    assert!(site.page.has_class(site.cards[0], "fade-in"));
    assert!(enhancer.fade_in().unwrap().revealed().contains(&site.cards[0]));
}

#[test]
fn test_loader_fades_after_load() {
    let site = site();
    let _enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());

    site.page.fire_load();
    site.page.advance(500);
    assert_eq!(site.page.style(site.loader, "opacity").as_deref(), Some("0"));
    assert_eq!(site.page.style(site.loader, "display"), None);

    site.page.advance(500);
    assert_eq!(site.page.style(site.loader, "display").as_deref(), Some("none"));
}

#[test]
fn test_loader_hidden_when_installed_late() {
    let site = site();
    site.page.fire_load();
    let _enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());

    site.page.advance(5_000);
    assert_eq!(site.page.style(site.loader, "opacity").as_deref(), Some("0"));
    assert_eq!(site.page.style(site.loader, "display").as_deref(), Some("none"));
}

// ============================================================================
// TIMING HELPERS
// ============================================================================

#[test]
fn test_debounce_and_throttle() {
    let site = site();
    let host = site.host();

    let last = Rc::new(RefCell::new(None));
    let sink = last.clone();
    let resized = debounce(&host, move |width: u32| *sink.borrow_mut() = Some(width));
    for width in [800, 900, 1000] {
        resized.call(width);
        site.page.advance(100);
    }
    site.page.advance(150);
    assert_eq!(*last.borrow(), Some(1000));

    let hits = Rc::new(Cell::new(0));
    let count = hits.clone();
    let ticked = throttle(&host, move |()| count.set(count.get() + 1));
    for _ in 0..10 {
        ticked.call(());
        site.page.advance(10);
    }
    assert_eq!(hits.get(), 1);
    site.page.advance(1);
    ticked.call(());
    assert_eq!(hits.get(), 2);
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_startup_logs() {
    let logs = capture_logs(|| {
        let site = site();
        Enhancer::install(&site.host(), EnhanceConfig::default());
    });

    assert!(logs.contains("Portfolio designed for Bernard Martin Lawan"));
    assert!(logs.contains("Architect specialised in sustainable urban design"));
    assert!(logs.contains("page enhancements installed"));
    assert!(!logs.contains("critical element not found"));
}

#[test]
fn test_missing_critical_elements_warn_on_localhost() {
    let logs = capture_logs(|| {
        let page = Rc::new(Page::new("http://127.0.0.1:8080/", 1280.0, 800.0).unwrap());
        page.element("nav").class("navbar").build();
        let host: Rc<dyn Host> = page.clone();
        let enhancer = Enhancer::install(&host, EnhanceConfig::default());
        assert_eq!(enhancer.missing_elements().map(<[String]>::len), Some(3));
    });

    assert!(logs.contains("critical element not found"));
    assert!(logs.contains(".hero"));
    assert!(!logs.contains("selector=.navbar"));
}

#[test]
fn test_no_element_check_in_production() {
    let site = site_at("https://bernard-lawan.example.com/");
    let enhancer = Enhancer::install(&site.host(), EnhanceConfig::default());
    assert_eq!(enhancer.missing_elements(), None);
}

#[test]
fn test_handler_panic_is_logged_not_fatal() {
    let site = site();
    let host = site.host();
    let enhancer = Enhancer::install(&host, EnhanceConfig::default());

    host.set_timeout(10, Box::new(|| panic!("deferred task failed")));
    let logs = capture_logs(|| site.page.advance(20));

    assert_eq!(enhancer.diagnostics().unwrap().captured_errors(), 1);
    assert!(logs.contains("deferred task failed"));

    site.page.click(site.hamburger);
    assert!(enhancer.nav_menu().unwrap().is_open());
}
