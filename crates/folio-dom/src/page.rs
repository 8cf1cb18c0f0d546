//! Page - in-memory document host
//!
//! A deterministic `Host` with no rendering environment: elements carry
//! explicit document-space boxes, time only moves through `advance`,
//! and intersection entries are delivered in batches after each task.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use url::Url;

use crate::host::{EventCallback, Host, IntersectionCallback, IntervalCallback};
use crate::intersection::IntersectionTracker;
use crate::scroll::ScrollAnimator;
use crate::selector::{SelectorElement, SelectorList};
use crate::timers::{TimerQueue, TimerTask};
use crate::{
    DomError, ElementId, Event, EventKind, EventTarget, IntersectionEntry, IntersectionOptions,
    ListenerId, ObserverId, Rect, ScrollBehavior, ScrollOptions, SelectorError, TimerId,
};

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: String,
    parent: Option<ElementId>,
    rect: Rect,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    fn write_classes(&mut self, classes: Vec<String>) {
        self.set_attr("class", classes.join(" "));
    }
}

/// Borrowed element view for selector matching
#[derive(Clone, Copy)]
struct ElementRef<'a> {
    elements: &'a [ElementData],
    id: ElementId,
}

impl<'a> ElementRef<'a> {
    fn data(&self) -> &'a ElementData {
        &self.elements[self.id.index()]
    }
}

impl SelectorElement for ElementRef<'_> {
    fn local_name(&self) -> &str {
        &self.data().tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.data().attr(name)
    }

    fn parent_element(&self) -> Option<Self> {
        self.data().parent.map(|id| ElementRef {
            elements: self.elements,
            id,
        })
    }

    fn has_class(&self, class: &str) -> bool {
        self.data().has_class(class)
    }
}

struct Listener {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    callback: EventCallback,
}

struct Observer {
    id: ObserverId,
    tracker: IntersectionTracker,
    callback: IntersectionCallback,
}

struct PageState {
    elements: Vec<ElementData>,
    viewport_width: f64,
    viewport_height: f64,
    document_height: Option<f64>,
    scroll_y: f64,
    clock: u64,
    timers: TimerQueue,
    animator: ScrollAnimator,
    listeners: Vec<Listener>,
    next_listener: u32,
    observers: Vec<Observer>,
    next_observer: u32,
    scroll_requests: Vec<ScrollOptions>,
    loaded: bool,
}

impl PageState {
    fn document_height(&self) -> f64 {
        self.document_height.unwrap_or_else(|| {
            self.elements
                .iter()
                .map(|e| e.rect.bottom())
                .fold(0.0, f64::max)
        })
    }

    fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    fn clamp_scroll(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll())
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_xywh(0.0, self.scroll_y, self.viewport_width, self.viewport_height)
    }

    fn element(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(id.index())
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.elements.get_mut(id.index())
    }

    fn matching(&self, selector: &SelectorList) -> impl Iterator<Item = ElementId> {
        (0..self.elements.len()).map(ElementId::from_index).filter(move |&id| {
            selector.matches(&ElementRef {
                elements: &self.elements,
                id,
            })
        })
    }
}

/// Next thing on the page timeline
enum Step {
    Timer,
    Frame(u64),
}

/// In-memory document host
pub struct Page {
    url: Url,
    state: RefCell<PageState>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Page")
            .field("url", &self.url.as_str())
            .field("elements", &state.elements.len())
            .field("scroll_y", &state.scroll_y)
            .field("clock", &state.clock)
            .finish()
    }
}

impl Page {
    /// Create an empty page with the given viewport size
    pub fn new(url: &str, viewport_width: f64, viewport_height: f64) -> Result<Self, DomError> {
        Ok(Self {
            url: Url::parse(url)?,
            state: RefCell::new(PageState {
                elements: Vec::new(),
                viewport_width,
                viewport_height,
                document_height: None,
                scroll_y: 0.0,
                clock: 0,
                timers: TimerQueue::new(),
                animator: ScrollAnimator::new(),
                listeners: Vec::new(),
                next_listener: 0,
                observers: Vec::new(),
                next_observer: 0,
                scroll_requests: Vec::new(),
                loaded: false,
            }),
        })
    }

    /// Get page URL
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Start building an element
    pub fn element(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            page: self,
            data: ElementData {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
                style: Vec::new(),
                text: String::new(),
                parent: None,
                rect: Rect::default(),
            },
        }
    }

    /// Override the document height derived from element boxes
    pub fn set_document_height(&self, height: f64) {
        self.state.borrow_mut().document_height = Some(height);
    }

    /// Move an element's box
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        if let Some(data) = self.state.borrow_mut().element_mut(element) {
            data.rect = rect;
        }
    }

    pub fn rect(&self, element: ElementId) -> Option<Rect> {
        self.state.borrow().element(element).map(|e| e.rect)
    }

    pub fn element_count(&self) -> usize {
        self.state.borrow().elements.len()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.state.borrow().clock
    }

    pub fn max_scroll(&self) -> f64 {
        self.state.borrow().max_scroll()
    }

    /// Check if a smooth scroll is in flight
    pub fn is_scrolling(&self) -> bool {
        self.state.borrow().animator.is_scrolling()
    }

    /// Every `scroll_to` request made through the host, in order
    pub fn scroll_requests(&self) -> Vec<ScrollOptions> {
        self.state.borrow().scroll_requests.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Elements observed across all intersection observers
    pub fn observed_count(&self) -> usize {
        self.state
            .borrow()
            .observers
            .iter()
            .map(|o| o.tracker.targets().len())
            .sum()
    }

    // === Driving the page ===

    /// Click an element. Returns false when a listener prevented the default action.
    pub fn click(&self, element: ElementId) -> bool {
        let event = self.dispatch(Event::new(EventKind::Click, EventTarget::Element(element)));
        self.flush();
        !event.is_default_prevented()
    }

    /// User scroll: jumps immediately and cancels any smooth scroll
    pub fn scroll_to_y(&self, y: f64) {
        self.state.borrow_mut().animator.cancel();
        self.jump_to(y);
        self.flush();
    }

    /// Mark the document complete and fire the window `load` event
    pub fn fire_load(&self) {
        self.state.borrow_mut().loaded = true;
        self.dispatch(Event::new(EventKind::Load, EventTarget::Window));
        self.flush();
    }

    /// Surface an uncaught error to window error listeners
    pub fn report_error(&self, message: &str) {
        self.dispatch_error(message);
        self.flush();
    }

    /// Advance the clock, running due timers and animation frames in order
    pub fn advance(&self, ms: u64) {
        let until = self.now() + ms;

        loop {
            let step = {
                let state = self.state.borrow();
                let timer = state.timers.next_due().filter(|&t| t <= until);
                let frame = state.animator.next_frame().filter(|&t| t <= until);
                match (timer, frame) {
                    (Some(t), Some(f)) if f < t => Step::Frame(f),
                    (Some(_), _) => Step::Timer,
                    (None, Some(f)) => Step::Frame(f),
                    (None, None) => break,
                }
            };

            match step {
                Step::Timer => self.run_next_timer(until),
                Step::Frame(at) => self.run_frame(at),
            }
            self.flush();
        }

        self.state.borrow_mut().clock = until;
        self.flush();
    }

    /// Deliver queued intersection entries
    pub fn flush(&self) {
        let batches: Vec<(IntersectionCallback, Vec<IntersectionEntry>)> = {
            let mut state = self.state.borrow_mut();
            let viewport = state.viewport_rect();
            let time = state.clock as f64;
            let PageState {
                observers,
                elements,
                ..
            } = &mut *state;

            observers
                .iter_mut()
                .filter_map(|observer| {
                    let entries = observer.tracker.check(
                        viewport,
                        |id| elements.get(id.index()).map(|e| e.rect),
                        time,
                    );
                    (!entries.is_empty()).then(|| (observer.callback.clone(), entries))
                })
                .collect()
        };

        for (callback, entries) in batches {
            tracing::trace!(count = entries.len(), "delivering intersection entries");
            self.guarded(|| callback(&entries));
        }
    }

    fn run_next_timer(&self, until: u64) {
        let popped = {
            let mut state = self.state.borrow_mut();
            let popped = state.timers.pop_due(until);
            if let Some((_, due, _)) = &popped {
                state.clock = state.clock.max(*due);
            }
            popped
        };

        if let Some((id, _, task)) = popped {
            tracing::trace!(timer = id.0, "running timer");
            match task {
                TimerTask::Once(callback) => self.guarded(callback),
                TimerTask::Repeat(callback) => self.guarded(|| callback()),
            }
        }
    }

    fn run_frame(&self, at: u64) {
        let position = {
            let mut state = self.state.borrow_mut();
            state.clock = state.clock.max(at);
            state.animator.frame(at)
        };
        if let Some(y) = position {
            self.jump_to(y);
        }
    }

    /// Set the scroll offset, dispatching `scroll` when it changes
    fn jump_to(&self, y: f64) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let y = state.clamp_scroll(y);
            let changed = y != state.scroll_y;
            state.scroll_y = y;
            changed
        };
        if changed {
            self.dispatch(Event::new(EventKind::Scroll, EventTarget::Window));
        }
    }

    fn dispatch(&self, event: Event) -> Event {
        let mut event = event.at(self.now() as f64);
        let listeners: Vec<(ListenerId, EventCallback)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == event.target && l.kind == event.kind)
            .map(|l| (l.id, l.callback.clone()))
            .collect();

        tracing::trace!(kind = event.kind.as_str(), listeners = listeners.len(), "dispatching event");

        for (id, callback) in listeners {
            // Listeners removed by an earlier listener in this dispatch are skipped
            if !self.state.borrow().listeners.iter().any(|l| l.id == id) {
                continue;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(&mut event)));
            if let Err(payload) = outcome {
                let message = panic_message(payload.as_ref());
                if event.kind == EventKind::Error {
                    tracing::error!(error = %message, "error listener panicked");
                } else {
                    self.dispatch_error(&message);
                }
            }
        }

        event
    }

    fn dispatch_error(&self, message: &str) {
        self.dispatch(Event::error(message));
    }

    /// Run a callback; a panic becomes a window error event
    fn guarded(&self, callback: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
            let message = panic_message(payload.as_ref());
            self.dispatch_error(&message);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Host for Page {
    fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SelectorError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.state.borrow().matching(&selector).next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, SelectorError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.state.borrow().matching(&selector).collect())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.state
            .borrow()
            .element(element)
            .and_then(|e| e.attr(name))
            .map(str::to_string)
    }

    fn text_content(&self, element: ElementId) -> String {
        self.state
            .borrow()
            .element(element)
            .map(|e| e.text.clone())
            .unwrap_or_default()
    }

    fn set_text_content(&self, element: ElementId, text: &str) {
        if let Some(data) = self.state.borrow_mut().element_mut(element) {
            data.text = text.to_string();
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.state
            .borrow()
            .element(element)
            .map(|e| e.has_class(class))
            .unwrap_or(false)
    }

    fn add_class(&self, element: ElementId, class: &str) {
        if let Some(data) = self.state.borrow_mut().element_mut(element) {
            if !data.has_class(class) {
                let mut classes: Vec<String> = data.classes().into_iter().map(String::from).collect();
                classes.push(class.to_string());
                data.write_classes(classes);
            }
        }
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        if let Some(data) = self.state.borrow_mut().element_mut(element) {
            if data.has_class(class) {
                let classes = data
                    .classes()
                    .into_iter()
                    .filter(|c| *c != class)
                    .map(String::from)
                    .collect();
                data.write_classes(classes);
            }
        }
    }

    fn toggle_class(&self, element: ElementId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            self.has_class(element, class)
        }
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        if let Some(data) = self.state.borrow_mut().element_mut(element) {
            match data.style.iter_mut().find(|(p, _)| p == property) {
                Some((_, v)) => *v = value.to_string(),
                None => data.style.push((property.to_string(), value.to_string())),
            }
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.state.borrow().element(element).and_then(|e| {
            e.style
                .iter()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.clone())
        })
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.rect(element).map(|r| r.top()).unwrap_or(0.0)
    }

    fn offset_height(&self, element: ElementId) -> f64 {
        self.rect(element).map(|r| r.height).unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn scroll_to(&self, options: ScrollOptions) {
        let smooth = {
            let mut state = self.state.borrow_mut();
            state.scroll_requests.push(options);
            let target = state.clamp_scroll(options.top);
            match options.behavior {
                ScrollBehavior::Smooth => {
                    if target != state.scroll_y {
                        let (from, now) = (state.scroll_y, state.clock);
                        state.animator.start(from, target, now);
                    }
                    true
                }
                ScrollBehavior::Auto | ScrollBehavior::Instant => {
                    state.animator.cancel();
                    false
                }
            }
        };
        if !smooth {
            self.jump_to(options.top);
        }
    }

    fn hostname(&self) -> String {
        self.url.host_str().unwrap_or_default().to_string()
    }

    fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    fn add_event_listener(&self, target: EventTarget, kind: EventKind, callback: EventCallback) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push(Listener {
            id,
            target,
            kind,
            callback,
        });
        id
    }

    fn remove_event_listener(&self, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|l| l.id != id);
    }

    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let now = state.clock;
        state.timers.set_timeout(now, delay_ms, callback)
    }

    fn set_interval(&self, period_ms: u64, callback: IntervalCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let now = state.clock;
        state.timers.set_interval(now, period_ms, callback)
    }

    fn clear_timer(&self, id: TimerId) {
        self.state.borrow_mut().timers.clear(id);
    }

    fn create_intersection_observer(
        &self,
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> ObserverId {
        let mut state = self.state.borrow_mut();
        state.next_observer += 1;
        let id = ObserverId(state.next_observer);
        state.observers.push(Observer {
            id,
            tracker: IntersectionTracker::new(options),
            callback,
        });
        id
    }

    fn observe(&self, observer: ObserverId, element: ElementId) {
        let mut state = self.state.borrow_mut();
        if element.index() >= state.elements.len() {
            return;
        }
        if let Some(o) = state.observers.iter_mut().find(|o| o.id == observer) {
            o.tracker.observe(element);
        }
    }

    fn unobserve(&self, observer: ObserverId, element: ElementId) {
        if let Some(o) = self.state.borrow_mut().observers.iter_mut().find(|o| o.id == observer) {
            o.tracker.unobserve(element);
        }
    }

    fn disconnect(&self, observer: ObserverId) {
        if let Some(o) = self.state.borrow_mut().observers.iter_mut().find(|o| o.id == observer) {
            o.tracker.disconnect();
        }
    }
}

/// Element under construction
pub struct ElementBuilder<'a> {
    page: &'a Page,
    data: ElementData,
}

impl ElementBuilder<'_> {
    pub fn id(mut self, id: &str) -> Self {
        self.data.set_attr("id", id.to_string());
        self
    }

    /// Add one or more space-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        let mut all: Vec<String> = self.data.classes().into_iter().map(String::from).collect();
        all.extend(classes.split_ascii_whitespace().map(String::from));
        self.data.write_classes(all);
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.data.set_attr(&name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.data.text = text.to_string();
        self
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.data.parent = Some(parent);
        self
    }

    /// Full-width box at `top` with `height`
    pub fn at(mut self, top: f64, height: f64) -> Self {
        let width = self.page.state.borrow().viewport_width;
        self.data.rect = Rect::from_xywh(0.0, top, width, height);
        self
    }

    pub fn bounds(mut self, rect: Rect) -> Self {
        self.data.rect = rect;
        self
    }

    /// Append to the document, returning the new element's id
    pub fn build(self) -> ElementId {
        let mut state = self.page.state.borrow_mut();
        let id = ElementId::from_index(state.elements.len());
        state.elements.push(self.data);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn page() -> Page {
        Page::new("http://localhost:8080/index.html", 1000.0, 800.0).unwrap()
    }

    #[test]
    fn test_query_in_document_order() {
        let page = page();
        let nav = page.element("nav").class("navbar").build();
        let a = page.element("a").class("nav-link").attr("href", "#home").child_of(nav).build();
        let b = page.element("a").class("nav-link").attr("href", "#about").child_of(nav).build();

        assert_eq!(page.query_selector(".nav-link").unwrap(), Some(a));
        assert_eq!(page.query_selector_all(".navbar a").unwrap(), vec![a, b]);
        assert_eq!(page.query_selector(".missing").unwrap(), None);
        assert!(page.query_selector("#").is_err());
    }

    #[test]
    fn test_class_mutation() {
        let page = page();
        let menu = page.element("ul").class("nav-menu").build();

        assert!(page.toggle_class(menu, "active"));
        assert_eq!(page.attribute(menu, "class").as_deref(), Some("nav-menu active"));
        assert!(!page.toggle_class(menu, "active"));
        page.remove_class(menu, "active");
        assert!(!page.has_class(menu, "active"));
        assert!(page.has_class(menu, "nav-menu"));
    }

    #[test]
    fn test_hostname() {
        assert_eq!(page().hostname(), "localhost");
        let remote = Page::new("https://folio.example.com/", 800.0, 600.0).unwrap();
        assert_eq!(remote.hostname(), "folio.example.com");
        assert!(Page::new("not a url", 1.0, 1.0).is_err());
    }

    #[test]
    fn test_load_marks_page_loaded() {
        let page = page();
        assert!(!page.is_loaded());
        page.fire_load();
        assert!(page.is_loaded());
    }

    #[test]
    fn test_scroll_clamped_and_dispatched() {
        let page = page();
        page.element("main").at(0.0, 3000.0).build();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        page.add_event_listener(
            EventTarget::Window,
            EventKind::Scroll,
            Rc::new(move |_: &mut Event| seen.set(seen.get() + 1)),
        );

        page.scroll_to_y(5000.0);
        assert_eq!(page.scroll_y(), 2200.0);
        page.scroll_to_y(2200.0);
        assert_eq!(count.get(), 1);
        page.scroll_to_y(-10.0);
        assert_eq!(page.scroll_y(), 0.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_smooth_scroll_animates() {
        let page = page();
        page.element("main").at(0.0, 3000.0).build();

        page.scroll_to(ScrollOptions::smooth(600.0));
        assert!(page.is_scrolling());
        assert_eq!(page.scroll_y(), 0.0);

        page.advance(100);
        let midway = page.scroll_y();
        assert!(midway > 0.0 && midway < 600.0);

        page.advance(500);
        assert_eq!(page.scroll_y(), 600.0);
        assert!(!page.is_scrolling());
        assert_eq!(page.scroll_requests(), vec![ScrollOptions::smooth(600.0)]);
    }

    #[test]
    fn test_user_scroll_cancels_animation() {
        let page = page();
        page.element("main").at(0.0, 3000.0).build();

        page.scroll_to(ScrollOptions::smooth(1200.0));
        page.advance(50);
        page.scroll_to_y(10.0);
        page.advance(1000);
        assert_eq!(page.scroll_y(), 10.0);
    }

    #[test]
    fn test_timers_run_in_order() {
        let page = Rc::new(page());
        let log = Rc::new(RefCell::new(Vec::new()));

        let (sink, weak) = (log.clone(), Rc::downgrade(&page));
        page.set_timeout(500, Box::new(move || {
            sink.borrow_mut().push("first");
            let sink = sink.clone();
            if let Some(page) = weak.upgrade() {
                page.set_timeout(500, Box::new(move || sink.borrow_mut().push("second")));
            }
        }));

        page.advance(499);
        assert!(log.borrow().is_empty());
        page.advance(1);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(page.now(), 500);
        page.advance(500);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_interval_can_clear_itself() {
        let page = Rc::new(page());
        let ticks = Rc::new(Cell::new(0));
        let id = Rc::new(Cell::new(None));

        let (t, i, weak) = (ticks.clone(), id.clone(), Rc::downgrade(&page));
        let timer = page.set_interval(10, Rc::new(move || {
            t.set(t.get() + 1);
            if t.get() == 3 {
                if let (Some(page), Some(id)) = (weak.upgrade(), i.get()) {
                    page.clear_timer(id);
                }
            }
        }));
        id.set(Some(timer));

        page.advance(100);
        assert_eq!(ticks.get(), 3);
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn test_panicking_listener_becomes_error_event() {
        let page = page();
        let button = page.element("button").build();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let after = Rc::new(Cell::new(false));

        page.add_event_listener(
            EventTarget::Element(button),
            EventKind::Click,
            Rc::new(|_: &mut Event| panic!("handler exploded")),
        );
        let flag = after.clone();
        page.add_event_listener(
            EventTarget::Element(button),
            EventKind::Click,
            Rc::new(move |_: &mut Event| flag.set(true)),
        );
        let sink = errors.clone();
        page.add_event_listener(
            EventTarget::Window,
            EventKind::Error,
            Rc::new(move |e: &mut Event| sink.borrow_mut().push(e.message.clone().unwrap_or_default())),
        );

        assert!(page.click(button));
        assert!(after.get());
        assert_eq!(*errors.borrow(), vec!["handler exploded".to_string()]);
    }

    #[test]
    fn test_intersections_delivered_on_flush() {
        let page = page();
        page.element("main").at(0.0, 3000.0).build();
        let card = page.element("div").class("card").at(1500.0, 200.0).build();
        let batches = Rc::new(RefCell::new(Vec::new()));

        let sink = batches.clone();
        let observer = page.create_intersection_observer(
            IntersectionOptions::new(&[0.1], "0px").unwrap(),
            Rc::new(move |entries: &[IntersectionEntry]| {
                sink.borrow_mut().push(entries.iter().map(|e| e.is_intersecting).collect::<Vec<_>>())
            }),
        );
        page.observe(observer, card);
        assert!(batches.borrow().is_empty());

        page.flush();
        assert_eq!(*batches.borrow(), vec![vec![false]]);

        page.scroll_to_y(1000.0);
        assert_eq!(batches.borrow().last(), Some(&vec![true]));
        assert_eq!(page.observed_count(), 1);

        page.disconnect(observer);
        assert_eq!(page.observed_count(), 0);
    }
}
