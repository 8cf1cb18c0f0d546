//! Intersection Observer
//!
//! Observe element visibility and intersection with the viewport.

use std::collections::HashMap;

use crate::{ElementId, Rect};

/// Root margin parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RootMarginError {
    #[error("root margin must have 1 to 4 lengths, got {0}")]
    Arity(usize),

    #[error("unsupported root margin length `{0}` (expected px)")]
    Length(String),
}

/// Options threshold validation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntersectionOptionsError {
    #[error("threshold {0} is outside [0, 1]")]
    Threshold(f64),

    #[error(transparent)]
    RootMargin(#[from] RootMarginError),
}

/// Margins that grow (positive) or shrink (negative) the root box
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parse CSS margin shorthand, e.g. `"0px 0px -50px 0px"`
    pub fn parse(input: &str) -> Result<Self, RootMarginError> {
        let values = input
            .split_ascii_whitespace()
            .map(parse_px)
            .collect::<Result<Vec<_>, _>>()?;

        let [top, right, bottom, left] = match values.as_slice() {
            [all] => [*all; 4],
            [v, h] => [*v, *h, *v, *h],
            [t, h, b] => [*t, *h, *b, *h],
            [t, r, b, l] => [*t, *r, *b, *l],
            other => return Err(RootMarginError::Arity(other.len())),
        };

        Ok(Self { top, right, bottom, left })
    }

    /// Apply to a root rect
    pub fn apply(&self, root: Rect) -> Rect {
        Rect::from_xywh(
            root.x - self.left,
            root.y - self.top,
            root.width + self.left + self.right,
            root.height + self.top + self.bottom,
        )
    }
}

impl std::fmt::Display for RootMargin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px {}px {}px {}px", self.top, self.right, self.bottom, self.left)
    }
}

fn parse_px(token: &str) -> Result<f64, RootMarginError> {
    let number = match token.strip_suffix("px") {
        Some(number) => number,
        // Unitless lengths are only valid for zero
        None if token.parse::<f64>().ok() == Some(0.0) => token,
        None => return Err(RootMarginError::Length(token.to_string())),
    };
    number
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RootMarginError::Length(token.to_string()))
}

/// Intersection observer options
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionOptions {
    /// Sorted, each in [0, 1]
    pub thresholds: Vec<f64>,
    pub root_margin: RootMargin,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0],
            root_margin: RootMargin::default(),
        }
    }
}

impl IntersectionOptions {
    pub fn new(thresholds: &[f64], root_margin: &str) -> Result<Self, IntersectionOptionsError> {
        if let Some(&bad) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(IntersectionOptionsError::Threshold(bad));
        }
        let mut thresholds = if thresholds.is_empty() {
            vec![0.0]
        } else {
            thresholds.to_vec()
        };
        thresholds.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            thresholds,
            root_margin: RootMargin::parse(root_margin)?,
        })
    }

    /// Index of the first threshold above `ratio`, or the threshold count
    fn threshold_index(&self, ratio: f64, is_intersecting: bool) -> usize {
        if !is_intersecting {
            return 0;
        }
        self.thresholds
            .iter()
            .position(|&t| t > ratio)
            .unwrap_or(self.thresholds.len())
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub bounding_rect: Rect,
    pub intersection_rect: Rect,
    pub root_bounds: Rect,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
    pub time: f64,
}

/// Observer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct LastState {
    threshold_index: usize,
    is_intersecting: bool,
}

/// Per-observer bookkeeping: targets in observation order and the
/// state each one was last reported in
#[derive(Debug)]
pub struct IntersectionTracker {
    options: IntersectionOptions,
    targets: Vec<ElementId>,
    last: HashMap<ElementId, Option<LastState>>,
}

impl IntersectionTracker {
    pub fn new(options: IntersectionOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
            last: HashMap::new(),
        }
    }

    pub fn options(&self) -> &IntersectionOptions {
        &self.options
    }

    /// Observe an element; observing twice is a no-op
    pub fn observe(&mut self, target: ElementId) {
        if !self.last.contains_key(&target) {
            self.targets.push(target);
            self.last.insert(target, None);
        }
    }

    /// Stop observing
    pub fn unobserve(&mut self, target: ElementId) {
        self.targets.retain(|t| *t != target);
        self.last.remove(&target);
    }

    /// Disconnect all
    pub fn disconnect(&mut self) {
        self.targets.clear();
        self.last.clear();
    }

    pub fn is_observing(&self, target: ElementId) -> bool {
        self.last.contains_key(&target)
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    /// Compute entries for targets whose threshold index or
    /// intersecting flag changed since the last report
    pub fn check(
        &mut self,
        viewport: Rect,
        rect_of: impl Fn(ElementId) -> Option<Rect>,
        time: f64,
    ) -> Vec<IntersectionEntry> {
        let root = self.options.root_margin.apply(viewport);
        let mut entries = Vec::new();

        for &target in &self.targets {
            let Some(rect) = rect_of(target) else {
                continue;
            };

            let intersection = rect.intersection(&root);
            let is_intersecting = intersection.is_some();
            let intersection_rect = intersection.unwrap_or_default();
            let ratio = if rect.area() > 0.0 {
                intersection_rect.area() / rect.area()
            } else if is_intersecting {
                1.0
            } else {
                0.0
            };

            let state = LastState {
                threshold_index: self.options.threshold_index(ratio, is_intersecting),
                is_intersecting,
            };
            let last = self.last.entry(target).or_insert(None);
            if *last == Some(state) {
                continue;
            }
            *last = Some(state);

            entries.push(IntersectionEntry {
                target,
                bounding_rect: rect,
                intersection_rect,
                root_bounds: root,
                intersection_ratio: ratio,
                is_intersecting,
                time,
            });
        }

        entries
    }
}
