//! Tick scheduler - delayed one-shot and repeating tasks on a discrete clock
//!
//! Tasks are explicit data payloads, not closures: the engine defines a
//! closed task enum and dispatches drained tasks itself. That keeps every
//! scheduled phase advance inspectable and cancellable through a stored
//! handle.

use crate::types::Tick;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Opaque handle to a scheduled task.
///
/// Once `cancel` returns, the task is guaranteed not to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[cfg(test)]
impl TaskHandle {
    /// Stub handle for unit tests that never touch a real scheduler
    pub(crate) fn stub(id: u64) -> Self {
        TaskHandle(id)
    }
}

/// A task drained from the scheduler, due this tick
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub handle: TaskHandle,
    pub task: T,
}

struct Entry<T> {
    task: T,
    /// `Some(period)` re-arms the task after each firing
    period: Option<u64>,
}

/// Single-threaded tick scheduler.
///
/// Guarantees: tasks drain in non-decreasing due-tick order, and within a
/// tick in registration order. A cancelled handle never fires; the check
/// happens when the task is popped, immediately before it is handed out.
pub struct TickScheduler<T> {
    now: Tick,
    next_id: u64,
    next_seq: u64,
    entries: HashMap<u64, Entry<T>>,
    /// Min-heap of (due, registration seq, id)
    queue: BinaryHeap<Reverse<(Tick, u64, u64)>>,
}

impl<T: Clone> TickScheduler<T> {
    pub fn new() -> Self {
        TickScheduler {
            now: 0,
            next_id: 0,
            next_seq: 0,
            entries: HashMap::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Number of live (not yet fired, not cancelled) tasks
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Schedule a one-shot task `delay` ticks from now
    pub fn schedule_once(&mut self, delay: u64, task: T) -> TaskHandle {
        self.insert(self.now + delay, task, None)
    }

    /// Schedule a repeating task. First firing is `initial_delay` ticks
    /// from now, then every `period` ticks. A zero period is clamped to 1
    /// so a repeating task can never fire twice in one tick.
    pub fn schedule_repeating(&mut self, initial_delay: u64, period: u64, task: T) -> TaskHandle {
        self.insert(self.now + initial_delay, task, Some(period.max(1)))
    }

    /// Cancel a scheduled task. Returns false if the task already fired
    /// (one-shot) or was already cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.entries.remove(&handle.0).is_some()
    }

    /// Advance the clock one tick and drain everything due, in order.
    pub fn advance(&mut self) -> Vec<DueTask<T>> {
        self.now += 1;
        self.drain_due()
    }

    fn insert(&mut self, due: Tick, task: T, period: Option<u64>) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(id, Entry { task, period });
        self.queue.push(Reverse((due, seq, id)));
        TaskHandle(id)
    }

    fn drain_due(&mut self) -> Vec<DueTask<T>> {
        let mut due = Vec::new();
        while let Some(Reverse((due_at, _, id))) = self.queue.peek().copied() {
            if due_at > self.now {
                break;
            }
            self.queue.pop();

            // Cancellation check: a stale queue node for a cancelled or
            // already-fired task is dropped here.
            let rearm = match self.entries.get(&id) {
                Some(entry) => {
                    due.push(DueTask {
                        handle: TaskHandle(id),
                        task: entry.task.clone(),
                    });
                    entry.period
                }
                None => continue,
            };

            match rearm {
                Some(period) => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    self.queue.push(Reverse((due_at + period, seq, id)));
                }
                None => {
                    self.entries.remove(&id);
                }
            }
        }
        due
    }
}

impl<T: Clone> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
