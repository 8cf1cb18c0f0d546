//! Host abstraction
//!
//! Everything the enhancement layer needs from a document: lookup,
//! geometry, class/style mutation, events, timers and intersection
//! observers. `Page` implements it in memory; the browser crate
//! implements it over `web-sys`.

use std::rc::Rc;

use crate::{
    ElementId, Event, EventKind, EventTarget, IntersectionEntry, IntersectionOptions, ListenerId,
    ObserverId, ScrollOptions, SelectorError, TimerId,
};

/// Listener callback
pub type EventCallback = Rc<dyn Fn(&mut Event)>;

/// Repeating timer callback
pub type IntervalCallback = Rc<dyn Fn()>;

/// Batched intersection callback
pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry])>;

/// Document host. Single-threaded: every method takes `&self`.
pub trait Host {
    // === Lookup ===

    /// First element matching `selector` in document order
    fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SelectorError>;

    /// All elements matching `selector` in document order
    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, SelectorError>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn text_content(&self, element: ElementId) -> String;

    fn set_text_content(&self, element: ElementId, text: &str);

    // === Classes and style ===

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&self, element: ElementId, class: &str);

    fn remove_class(&self, element: ElementId, class: &str);

    /// Flip a class, returning whether it is now present
    fn toggle_class(&self, element: ElementId, class: &str) -> bool;

    fn set_style(&self, element: ElementId, property: &str, value: &str);

    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    // === Geometry ===

    /// Distance from the document top (px)
    fn offset_top(&self, element: ElementId) -> f64;

    fn offset_height(&self, element: ElementId) -> f64;

    /// Vertical scroll offset of the viewport
    fn scroll_y(&self) -> f64;

    fn scroll_to(&self, options: ScrollOptions);

    /// Host name of the page location
    fn hostname(&self) -> String;

    /// Whether the window `load` event has already fired
    fn is_loaded(&self) -> bool;

    // === Events ===

    fn add_event_listener(&self, target: EventTarget, kind: EventKind, callback: EventCallback) -> ListenerId;

    fn remove_event_listener(&self, id: ListenerId);

    // === Timers ===

    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId;

    fn set_interval(&self, period_ms: u64, callback: IntervalCallback) -> TimerId;

    fn clear_timer(&self, id: TimerId);

    // === Intersection observers ===

    fn create_intersection_observer(
        &self,
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> ObserverId;

    fn observe(&self, observer: ObserverId, element: ElementId);

    fn unobserve(&self, observer: ObserverId, element: ElementId);

    fn disconnect(&self, observer: ObserverId);
}
