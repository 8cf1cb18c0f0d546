//! folio DOM - document host for page enhancements
//!
//! Features:
//! - `Host` trait: lookup, geometry, classes/styles, events, timers,
//!   intersection observers
//! - Selector engine for the CSS subset page scripts use
//! - `Page`: deterministic in-memory host with a virtual clock

mod events;
mod geometry;
pub mod host;
mod intersection;
mod page;
mod scroll;
pub mod selector;
mod timers;

pub use events::{Event, EventKind, EventTarget, ListenerId};
pub use geometry::{Rect, ScrollBehavior, ScrollOptions};
pub use host::{EventCallback, Host, IntersectionCallback, IntervalCallback};
pub use intersection::{
    IntersectionEntry, IntersectionOptions, IntersectionOptionsError, IntersectionTracker,
    ObserverId, RootMargin, RootMarginError,
};
pub use page::{ElementBuilder, Page};
pub use scroll::{FRAME_MS, SMOOTH_SCROLL_DURATION_MS, ScrollAnimator};
pub use selector::{SelectorError, SelectorList};
pub use timers::{TimerId, TimerQueue, TimerTask};

/// Element identifier (index into the host's element table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("invalid page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Intersection(#[from] IntersectionOptionsError),
}
