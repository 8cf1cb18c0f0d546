//! Timer queue
//!
//! setTimeout/setInterval storage driven by a virtual clock.

use std::rc::Rc;

/// Timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u32);

/// What a timer runs when it fires
pub enum TimerTask {
    Once(Box<dyn FnOnce()>),
    Repeat(Rc<dyn Fn()>),
}

impl std::fmt::Debug for TimerTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerTask::Once(_) => f.write_str("Once(..)"),
            TimerTask::Repeat(_) => f.write_str("Repeat(..)"),
        }
    }
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    due: u64,
    /// Interval period; `None` for one-shot timers
    period: Option<u64>,
    task: TimerTask,
}

/// Pending timers ordered by due time, then by registration
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    /// Schedule a one-shot callback at `now + delay_ms`
    pub fn set_timeout(&mut self, now: u64, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.allocate();
        self.timers.push(Timer {
            id,
            due: now + delay_ms,
            period: None,
            task: TimerTask::Once(callback),
        });
        id
    }

    /// Schedule a repeating callback every `period_ms` (at least 1 ms)
    pub fn set_interval(&mut self, now: u64, period_ms: u64, callback: Rc<dyn Fn()>) -> TimerId {
        let id = self.allocate();
        let period = period_ms.max(1);
        self.timers.push(Timer {
            id,
            due: now + period,
            period: Some(period),
            task: TimerTask::Repeat(callback),
        });
        id
    }

    /// Clear a timeout/interval
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Earliest due time
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Take the earliest timer due at or before `until`.
    ///
    /// One-shot timers are removed; intervals are re-armed one period
    /// after their due time and a clone of the callback is returned.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, u64, TimerTask)> {
        // Vec order is registration order, so min_by_key keeps ties stable
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| t.due)
            .map(|(i, _)| i)?;

        let timer = self.timers.remove(index);
        let (id, due) = (timer.id, timer.due);
        match (timer.period, timer.task) {
            (Some(period), TimerTask::Repeat(callback)) => {
                self.timers.push(Timer {
                    id,
                    due: due + period,
                    period: Some(period),
                    task: TimerTask::Repeat(Rc::clone(&callback)),
                });
                Some((id, due, TimerTask::Repeat(callback)))
            }
            (_, task) => Some((id, due, task)),
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Check if there are pending timers
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
