//! A priority queue of timed callbacks, called 'plans'.
//!
//! Plans are ordered by `f64` time, then by `ExecutionPhase`, then by the order in
//! which they were added. Adding and removing a plan are both *O*(log(*n*)).
//!
//! `Context` uses this queue to run one tick of the model per unit of time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Plans scheduled for the same time run in phase order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ExecutionPhase {
    First,
    #[default]
    Normal,
    Last,
}

/// A time-ordered queue of plans carrying data of type `T`.
pub struct Queue<T> {
    queue: BinaryHeap<Entry<T>>,
    plan_counter: u64,
}

impl<T> Queue<T> {
    #[must_use]
    pub fn new() -> Queue<T> {
        Queue {
            queue: BinaryHeap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue at the specified time and phase
    pub fn add_plan(&mut self, time: f64, data: T, phase: ExecutionPhase) {
        self.queue.push(Entry {
            time,
            phase,
            id: self.plan_counter,
            data,
        });
        self.plan_counter += 1;
    }

    /// Number of plans still waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Remove and return the earliest pending plan.
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        self.queue.pop().map(|entry| Plan {
            time: entry.time,
            phase: entry.phase,
            data: entry.data,
        })
    }

    /// Drop every pending plan.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry<T> {
    time: f64,
    phase: ExecutionPhase,
    id: u64,
    data: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so that `BinaryHeap`, a max-heap, pops the earliest entry.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.phase.cmp(&other.phase))
            .then(self.id.cmp(&other.id))
            .reverse()
    }
}

/// A plan that holds data of type `T` intended to be used at the specified time
pub struct Plan<T> {
    pub time: f64,
    pub phase: ExecutionPhase,
    pub data: T,
}
