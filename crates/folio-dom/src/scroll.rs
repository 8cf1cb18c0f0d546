//! Smooth scrolling
//!
//! Frame-stepped scroll animation driven by the page clock.

/// Smooth scroll duration (ms)
pub const SMOOTH_SCROLL_DURATION_MS: u64 = 300;

/// Animation frame interval (ms)
pub const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f64,
    to: f64,
    started_at: u64,
    last_frame: u64,
}

/// In-flight smooth scroll, if any
#[derive(Debug, Default)]
pub struct ScrollAnimator {
    active: Option<Animation>,
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) an animation from `from` to `to`
    pub fn start(&mut self, from: f64, to: f64, now: u64) {
        self.active = Some(Animation {
            from,
            to,
            started_at: now,
            last_frame: now,
        });
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Check if smooth scrolling
    pub fn is_scrolling(&self) -> bool {
        self.active.is_some()
    }

    /// Destination of the running animation
    pub fn target(&self) -> Option<f64> {
        self.active.map(|a| a.to)
    }

    /// Time of the next frame
    pub fn next_frame(&self) -> Option<u64> {
        self.active.map(|a| {
            (a.last_frame + FRAME_MS).min(a.started_at + SMOOTH_SCROLL_DURATION_MS)
        })
    }

    /// Position at `now`; the animation ends on the frame that reaches
    /// the full duration
    pub fn frame(&mut self, now: u64) -> Option<f64> {
        let animation = self.active.as_mut()?;
        animation.last_frame = now;

        let elapsed = now.saturating_sub(animation.started_at) as f64;
        let progress = (elapsed / SMOOTH_SCROLL_DURATION_MS as f64).min(1.0);
        if progress >= 1.0 {
            let to = animation.to;
            self.active = None;
            return Some(to);
        }

        // Ease-out interpolation
        let t = 1.0 - (1.0 - progress).powi(3);
        Some(animation.from + (animation.to - animation.from) * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_reaches_target() {
        let mut animator = ScrollAnimator::new();
        animator.start(0.0, 600.0, 1_000);

        let mut positions = Vec::new();
        while let Some(at) = animator.next_frame() {
            positions.push(animator.frame(at).unwrap());
        }

        assert_eq!(positions.last().copied(), Some(600.0));
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(positions.len(), 19);
        assert!(!animator.is_scrolling());
    }

    #[test]
    fn test_cancel() {
        let mut animator = ScrollAnimator::new();
        animator.start(0.0, 600.0, 0);
        assert_eq!(animator.target(), Some(600.0));

        animator.cancel();
        assert_eq!(animator.next_frame(), None);
        assert_eq!(animator.frame(16), None);
    }
}
