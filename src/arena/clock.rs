//! Virtual-time scheduler driving the countdown and every deferred effect.
//!
//! Time only moves when the driver calls [`Scheduler::pop_due`] with a later
//! timestamp, so tests can step through a whole session without real timers.
use super::EntityId;

/// Deferred work owned by the arena controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Countdown,
    ClearMoving,
    RemoveHat(EntityId),
    RevealWin,
    RevealGameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    due_ms: f64,
    period_ms: Option<f64>,
    task: Task,
}

pub struct Scheduler {
    now_ms: f64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now_ms,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn schedule_once(&mut self, delay_ms: f64, task: Task) -> TimerId {
        self.push(delay_ms, None, task)
    }

    pub fn schedule_every(&mut self, period_ms: f64, task: Task) -> TimerId {
        // a zero period would spin forever inside pop_due
        let period = period_ms.max(1.0);
        self.push(period, Some(period), task)
    }

    fn push(&mut self, delay_ms: f64, period_ms: Option<f64>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            period_ms,
            task,
        });
        id
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Pops the earliest task due at or before `until_ms` and moves the clock
    /// to its deadline. Equal deadlines fire in scheduling order. Periodic
    /// timers are re-armed one period later. Once nothing is due the clock
    /// settles on `until_ms` and `None` is returned.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Task> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .total_cmp(&b.due_ms)
                    .then_with(|| a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            if until_ms > self.now_ms {
                self.now_ms = until_ms;
            }
            return None;
        };

        let timer = &mut self.timers[idx];
        let task = timer.task;
        if timer.due_ms > self.now_ms {
            self.now_ms = timer.due_ms;
        }
        match timer.period_ms {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, until: f64) -> Vec<Task> {
        std::iter::from_fn(|| s.pop_due(until)).collect()
    }

    #[test]
    fn test_once_fires_at_deadline_only() {
        let mut s = Scheduler::new(1_000.0);
        s.schedule_once(500.0, Task::RevealGameOver);
        assert!(drain(&mut s, 1_499.0).is_empty());
        assert_eq!(s.now_ms(), 1_499.0);
        assert_eq!(drain(&mut s, 1_500.0), vec![Task::RevealGameOver]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_periodic_rearms() {
        let mut s = Scheduler::new(0.0);
        s.schedule_every(1_000.0, Task::Countdown);
        let fired = drain(&mut s, 3_500.0);
        assert_eq!(fired, vec![Task::Countdown; 3]);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.now_ms(), 3_500.0);
    }

    #[test]
    fn test_deadline_then_fifo_order() {
        let mut s = Scheduler::new(0.0);
        s.schedule_once(500.0, Task::RevealWin);
        s.schedule_once(100.0, Task::ClearMoving);
        s.schedule_once(500.0, Task::RevealGameOver);
        assert_eq!(
            drain(&mut s, 1_000.0),
            vec![Task::ClearMoving, Task::RevealWin, Task::RevealGameOver]
        );
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new(0.0);
        let id = s.schedule_every(1_000.0, Task::Countdown);
        assert_eq!(s.pop_due(1_000.0), Some(Task::Countdown));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(drain(&mut s, 10_000.0).is_empty());
    }

    #[test]
    fn test_clock_advances_to_each_deadline() {
        let mut s = Scheduler::new(0.0);
        s.schedule_once(100.0, Task::ClearMoving);
        assert_eq!(s.pop_due(5_000.0), Some(Task::ClearMoving));
        assert_eq!(s.now_ms(), 100.0);
        // scheduling from inside a task is relative to the task's deadline
        s.schedule_once(100.0, Task::ClearMoving);
        assert_eq!(s.pop_due(5_000.0), Some(Task::ClearMoving));
        assert_eq!(s.now_ms(), 200.0);
    }
}
