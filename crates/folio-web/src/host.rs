//! Browser host
//!
//! `Host` over `web-sys`. Elements are interned into a table so the
//! enhancement layer can address them by `ElementId`; listener, timer
//! and observer closures stay owned here until they are removed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use folio_dom::host::{EventCallback, IntersectionCallback, IntervalCallback};
use folio_dom::{
    ElementId, Event, EventKind, EventTarget, Host, IntersectionEntry, IntersectionOptions,
    ListenerId, ObserverId, Rect, ScrollBehavior, ScrollOptions, SelectorError, TimerId,
};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Browser host setup failure
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,
}

type ElementTable = Rc<RefCell<Vec<web_sys::Element>>>;

fn intern(table: &ElementTable, element: web_sys::Element) -> ElementId {
    let mut elements = table.borrow_mut();
    if let Some(index) = elements.iter().position(|e| *e == element) {
        return ElementId::from_index(index);
    }
    elements.push(element);
    ElementId::from_index(elements.len() - 1)
}

fn dom_rect(rect: &web_sys::DomRectReadOnly) -> Rect {
    Rect::from_xywh(rect.x(), rect.y(), rect.width(), rect.height())
}

struct Listener {
    target: web_sys::EventTarget,
    kind: EventKind,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Scheduled timer; dropping the closure frees it whether or not it ran
enum Timer {
    Timeout(i32, Closure<dyn FnMut()>),
    Interval(i32, Closure<dyn FnMut()>),
}

/// Browsers store timer delays as a signed 32-bit count
fn timer_delay(ms: u64) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

struct Observer {
    observer: web_sys::IntersectionObserver,
    _closure: Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>,
}

/// `Host` backed by the live document
pub struct WebHost {
    window: web_sys::Window,
    document: web_sys::Document,
    elements: ElementTable,
    listeners: RefCell<HashMap<ListenerId, Listener>>,
    timers: Rc<RefCell<HashMap<TimerId, Timer>>>,
    observers: RefCell<HashMap<ObserverId, Observer>>,
    next_id: Cell<u32>,
}

impl WebHost {
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;
        Ok(Self {
            window,
            document,
            elements: Rc::new(RefCell::new(Vec::new())),
            listeners: RefCell::new(HashMap::new()),
            timers: Rc::new(RefCell::new(HashMap::new())),
            observers: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        })
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn element(&self, id: ElementId) -> Option<web_sys::Element> {
        self.elements.borrow().get(id.index()).cloned()
    }

    fn html_element(&self, id: ElementId) -> Option<web_sys::HtmlElement> {
        self.element(id)?.dyn_into::<web_sys::HtmlElement>().ok()
    }

    fn event_target(&self, target: EventTarget) -> Option<web_sys::EventTarget> {
        match target {
            EventTarget::Window => Some(self.window.clone().into()),
            EventTarget::Document => Some(self.document.clone().into()),
            EventTarget::Element(id) => self.element(id).map(Into::into),
        }
    }
}

impl Host for WebHost {
    fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SelectorError> {
        let found = self
            .document
            .query_selector(selector)
            .map_err(|_| SelectorError::Rejected(selector.to_string()))?;
        Ok(found.map(|element| intern(&self.elements, element)))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, SelectorError> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|_| SelectorError::Rejected(selector.to_string()))?;

        Ok((0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(|element| intern(&self.elements, element))
            .collect())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn text_content(&self, element: ElementId) -> String {
        self.element(element)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text_content(&self, element: ElementId, text: &str) {
        if let Some(e) = self.element(element) {
            e.set_text_content(Some(text));
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn add_class(&self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn toggle_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .and_then(|e| e.class_list().toggle(class).ok())
            .unwrap_or(false)
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        if let Some(e) = self.html_element(element) {
            let _ = e.style().set_property(property, value);
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.html_element(element)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.html_element(element)
            .map(|e| f64::from(e.offset_top()))
            .unwrap_or(0.0)
    }

    fn offset_height(&self, element: ElementId) -> f64 {
        self.html_element(element)
            .map(|e| f64::from(e.offset_height()))
            .unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, options: ScrollOptions) {
        let web_options = web_sys::ScrollToOptions::new();
        web_options.set_top(options.top);
        web_options.set_behavior(match options.behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&web_options);
    }

    fn hostname(&self) -> String {
        self.window
            .location()
            .href()
            .ok()
            .and_then(|href| Url::parse(&href).ok())
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn is_loaded(&self) -> bool {
        self.document.ready_state() == "complete"
    }

    fn add_event_listener(&self, target: EventTarget, kind: EventKind, callback: EventCallback) -> ListenerId {
        let id = ListenerId(self.next_id());
        let Some(web_target) = self.event_target(target) else {
            tracing::debug!(kind = kind.as_str(), "listener target no longer exists");
            return id;
        };

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
            let mut event = match raw.dyn_ref::<web_sys::ErrorEvent>() {
                Some(error) => Event::error(error.message()),
                None => Event::new(kind, target),
            }
            .at(raw.time_stamp());
            callback(&mut event);
            if event.is_default_prevented() {
                raw.prevent_default();
            }
        });

        if web_target
            .add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
            .is_err()
        {
            tracing::warn!(kind = kind.as_str(), "failed to add event listener");
        }
        self.listeners.borrow_mut().insert(
            id,
            Listener {
                target: web_target,
                kind,
                closure,
            },
        );
        id
    }

    fn remove_event_listener(&self, id: ListenerId) {
        if let Some(listener) = self.listeners.borrow_mut().remove(&id) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind.as_str(),
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }

    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id());
        let timers = self.timers.clone();
        let closure = Closure::once(move || {
            let _fired = timers.borrow_mut().remove(&id);
            callback();
        });

        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            timer_delay(delay_ms),
        ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(id, Timer::Timeout(handle, closure));
            }
            Err(_) => tracing::warn!(delay_ms, "failed to schedule timeout"),
        }
        id
    }

    fn set_interval(&self, period_ms: u64, callback: IntervalCallback) -> TimerId {
        let id = TimerId(self.next_id());
        let closure = Closure::<dyn FnMut()>::new(move || callback());

        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            timer_delay(period_ms),
        ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(id, Timer::Interval(handle, closure));
            }
            Err(_) => tracing::warn!(period_ms, "failed to schedule interval"),
        }
        id
    }

    fn clear_timer(&self, id: TimerId) {
        let removed = self.timers.borrow_mut().remove(&id);
        match removed {
            Some(Timer::Timeout(handle, _closure)) => self.window.clear_timeout_with_handle(handle),
            Some(Timer::Interval(handle, _closure)) => self.window.clear_interval_with_handle(handle),
            None => {}
        }
    }

    fn create_intersection_observer(
        &self,
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> ObserverId {
        let id = ObserverId(self.next_id());
        let elements = self.elements.clone();

        let closure = Closure::<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>::new(
            move |raw: js_sys::Array, _: web_sys::IntersectionObserver| {
                let entries: Vec<IntersectionEntry> = raw
                    .iter()
                    .filter_map(|value| value.dyn_into::<web_sys::IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        target: intern(&elements, entry.target()),
                        bounding_rect: dom_rect(&entry.bounding_client_rect()),
                        intersection_rect: dom_rect(&entry.intersection_rect()),
                        root_bounds: entry.root_bounds().map(|r| dom_rect(&r)).unwrap_or_default(),
                        intersection_ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                        time: entry.time(),
                    })
                    .collect();
                callback(&entries);
            },
        );

        let init = web_sys::IntersectionObserverInit::new();
        let thresholds: js_sys::Array = options.thresholds.iter().map(|&t| JsValue::from_f64(t)).collect();
        init.set_threshold(&thresholds);
        init.set_root_margin(&options.root_margin.to_string());

        match web_sys::IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                self.observers.borrow_mut().insert(
                    id,
                    Observer {
                        observer,
                        _closure: closure,
                    },
                );
            }
            Err(_) => tracing::warn!("intersection observers unavailable"),
        }
        id
    }

    fn observe(&self, observer: ObserverId, element: ElementId) {
        if let (Some(o), Some(e)) = (self.observers.borrow().get(&observer), self.element(element)) {
            o.observer.observe(&e);
        }
    }

    fn unobserve(&self, observer: ObserverId, element: ElementId) {
        if let (Some(o), Some(e)) = (self.observers.borrow().get(&observer), self.element(element)) {
            o.observer.unobserve(&e);
        }
    }

    fn disconnect(&self, observer: ObserverId) {
        if let Some(o) = self.observers.borrow_mut().remove(&observer) {
            o.observer.disconnect();
        }
    }
}
