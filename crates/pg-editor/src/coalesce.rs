//! Write coalescing for position updates during a drag.
//!
//! Every pointer move produces a new position, but persisting each one would
//! flood the host. Writes are buffered per `(task, device)` with "latest
//! wins" and handed back by [`WriteCoalescer::tick`] once the flush interval
//! has elapsed since the first buffered write, or immediately by
//! [`WriteCoalescer::flush`] when the gesture ends. Time is supplied by the
//! caller in milliseconds so the coalescer stays deterministic.

use pg_core::id::TaskId;
use pg_core::model::{DeviceClass, Point};
use std::collections::BTreeMap;

/// One buffered position write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingWrite {
    pub task: TaskId,
    pub device: DeviceClass,
    pub position: Point,
}

#[derive(Debug, Clone)]
pub struct WriteCoalescer {
    interval_ms: f64,
    pending: BTreeMap<(TaskId, DeviceClass), Point>,
    /// When the oldest pending write arrived.
    window_start: Option<f64>,
}

impl WriteCoalescer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            pending: BTreeMap::new(),
            window_start: None,
        }
    }

    /// Buffer a write; replaces any pending write for the same task/device.
    pub fn push(&mut self, task: TaskId, device: DeviceClass, position: Point, now_ms: f64) {
        self.pending.insert((task, device), position);
        self.window_start.get_or_insert(now_ms);
    }

    /// Flush if the interval has elapsed. Returns nothing otherwise.
    pub fn tick(&mut self, now_ms: f64) -> Vec<PendingWrite> {
        match self.window_start {
            Some(start) if now_ms - start >= self.interval_ms => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Hand back every pending write unconditionally.
    pub fn flush(&mut self) -> Vec<PendingWrite> {
        self.window_start = None;
        let writes: Vec<PendingWrite> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|((task, device), position)| PendingWrite {
                task,
                device,
                position,
            })
            .collect();
        if !writes.is_empty() {
            log::trace!("flushing {} coalesced write(s)", writes.len());
        }
        writes
    }

    /// Drop pending writes for `task` without flushing them.
    pub fn discard(&mut self, task: TaskId) {
        self.pending.retain(|(t, _), _| *t != task);
        if self.pending.is_empty() {
            self.window_start = None;
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
