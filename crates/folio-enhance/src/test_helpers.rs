//! Shared test fixtures

use std::rc::Rc;

use folio_dom::{ElementId, Host, Page};

pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 800.0;

pub fn blank_page() -> Rc<Page> {
    Rc::new(Page::new("http://localhost:8000/", VIEWPORT_WIDTH, VIEWPORT_HEIGHT).unwrap())
}

/// The portfolio document laid out top to bottom:
///
/// | section  | top  | height |
/// |----------|------|--------|
/// | home     | 0    | 800    |
/// | about    | 800  | 900    |
/// | projects | 1700 | 1200   |
/// | contact  | 2900 | 800    |
pub struct Portfolio {
    pub page: Rc<Page>,
    pub navbar: ElementId,
    pub hamburger: ElementId,
    pub menu: ElementId,
    /// Nav links in order: home, about, projects, contact
    pub links: Vec<ElementId>,
    /// Sections in order: home, about, projects, contact
    pub sections: Vec<ElementId>,
    pub subtitle: ElementId,
    pub loader: ElementId,
    /// `.about-text`, three `.project-card`s, `.contact-item`
    pub reveal_targets: Vec<ElementId>,
    /// Hero call to action linking to `#contact`
    pub cta: ElementId,
    /// Anchors with `href="#"` and `href="#missing"`
    pub dead_anchors: Vec<ElementId>,
}

impl Portfolio {
    pub fn host(&self) -> Rc<dyn Host> {
        self.page.clone()
    }
}

pub fn portfolio() -> Portfolio {
    let page = blank_page();

    let loader = page.element("div").class("loader").build();
    let navbar = page.element("nav").class("navbar").at(0.0, 70.0).build();
    let hamburger = page.element("div").class("hamburger").child_of(navbar).build();
    let menu = page.element("ul").class("nav-menu").child_of(navbar).build();
    let links = ["home", "about", "projects", "contact"]
        .iter()
        .map(|id| {
            page.element("a")
                .class("nav-link")
                .attr("href", &format!("#{id}"))
                .child_of(menu)
                .build()
        })
        .collect();

    let home = page.element("section").id("home").class("hero").at(0.0, 800.0).build();
    let subtitle = page
        .element("p")
        .class("hero-subtitle")
        .text("Sustainable urban design")
        .child_of(home)
        .at(300.0, 40.0)
        .build();
    let cta = page
        .element("a")
        .class("btn")
        .attr("href", "#contact")
        .child_of(home)
        .at(400.0, 40.0)
        .build();
    let dead_anchors = vec![
        page.element("a").attr("href", "#").child_of(home).at(460.0, 20.0).build(),
        page.element("a").attr("href", "#missing").child_of(home).at(480.0, 20.0).build(),
    ];

    let about = page.element("section").id("about").at(800.0, 900.0).build();
    let about_text = page.element("div").class("about-text").child_of(about).at(900.0, 300.0).build();

    let projects = page.element("section").id("projects").class("projects").at(1700.0, 1200.0).build();
    let cards: Vec<ElementId> = [1800.0, 2150.0, 2500.0]
        .iter()
        .map(|&top| {
            page.element("div")
                .class("project-card")
                .child_of(projects)
                .at(top, 300.0)
                .build()
        })
        .collect();

    let contact = page.element("section").id("contact").class("contact").at(2900.0, 800.0).build();
    let contact_item = page.element("div").class("contact-item").child_of(contact).at(3000.0, 200.0).build();

    let mut reveal_targets = vec![about_text];
    reveal_targets.extend(cards);
    reveal_targets.push(contact_item);

    Portfolio {
        page,
        navbar,
        hamburger,
        menu,
        links,
        sections: vec![home, about, projects, contact],
        subtitle,
        loader,
        reveal_targets,
        cta,
        dead_anchors,
    }
}
