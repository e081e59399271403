//! Document sync: the single owner of the authored document.
//!
//! Every committed change goes through [`DocumentSync::apply`] as a
//! [`ZoneMutation`]. Each mutation replaces whole tasks (never edits them in
//! place) and, when it changed something, bumps the revision and notifies
//! every registered [`DocumentObserver`] with the full zone set. Persisting
//! the document is the observer's job.

use pg_core::graph;
use pg_core::id::{ActionId, TaskId, ZoneId};
use pg_core::layout::{copy_device_layout, with_device_scale, with_position, with_scale};
use pg_core::model::{DeviceClass, DisplayToggles, Document, Point, Task, TriggerKind, Zone};
use pg_core::snap::{snap_all, snap_selected};
use std::collections::HashSet;

/// A committed change to one zone.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneMutation {
    SetPosition {
        task: TaskId,
        device: DeviceClass,
        position: Point,
        snap: bool,
    },
    /// Per-device override when `device` is set, task-wide otherwise.
    SetScale {
        task: TaskId,
        device: Option<DeviceClass>,
        scale: f32,
    },
    AddEdge {
        source: TaskId,
        trigger: TriggerKind,
        target: TaskId,
    },
    RemoveEdge {
        source: TaskId,
        action: ActionId,
    },
    SnapAll {
        device: DeviceClass,
    },
    SnapSelected {
        device: DeviceClass,
        tasks: Vec<TaskId>,
    },
    CopyDeviceLayout {
        from: DeviceClass,
        to: DeviceClass,
    },
    AddTask {
        task: Box<Task>,
    },
    RemoveTask {
        id: TaskId,
    },
    ReplaceTask {
        task: Box<Task>,
    },
    /// Reference returned by the host's asset upload; `None` clears it.
    SetBackground {
        url: Option<String>,
    },
    SetDisplay {
        display: DisplayToggles,
    },
}

/// Result of an applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub revision: u64,
    /// Id of the edge created by `AddEdge`.
    pub action: Option<ActionId>,
}

/// Receives the whole document after every committed change.
pub trait DocumentObserver {
    fn document_changed(&mut self, document: &Document);
}

impl<F: FnMut(&Document)> DocumentObserver for F {
    fn document_changed(&mut self, document: &Document) {
        self(document)
    }
}

pub struct DocumentSync {
    document: Document,
    revision: u64,
    observers: Vec<Box<dyn DocumentObserver>>,
}

impl DocumentSync {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            revision: 0,
            observers: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.document.zone(id)
    }

    /// Bumped once per committed change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─── Zone set ────────────────────────────────────────────────────────

    pub fn add_zone(&mut self, zone: Zone) -> bool {
        let added = self.document.add_zone(zone);
        if added {
            self.committed();
        }
        added
    }

    /// Remove a zone and every task in it.
    pub fn remove_zone(&mut self, id: ZoneId) -> Option<Zone> {
        let removed = self.document.remove_zone(id)?;
        self.committed();
        Some(removed)
    }

    // ─── Zone mutations ──────────────────────────────────────────────────

    /// Apply `mutation` to `zone`. `None` when nothing changed (unknown zone
    /// or task, rejected edge); observers are only called on success.
    pub fn apply(&mut self, zone: ZoneId, mutation: ZoneMutation) -> Option<Applied> {
        let Some(target) = self.document.zone_mut(zone) else {
            log::warn!("mutation for unknown zone {zone} ignored");
            return None;
        };
        let action = apply_to_zone(target, mutation)?;
        self.committed();
        Some(Applied {
            revision: self.revision,
            action,
        })
    }

    fn committed(&mut self) {
        self.revision += 1;
        log::debug!("document revision {}", self.revision);
        for observer in &mut self.observers {
            observer.document_changed(&self.document);
        }
    }
}

/// `Some(edge id or None)` on success, `None` when the mutation did not apply.
fn apply_to_zone(zone: &mut Zone, mutation: ZoneMutation) -> Option<Option<ActionId>> {
    match mutation {
        ZoneMutation::SetPosition {
            task,
            device,
            position,
            snap,
        } => {
            let next = with_position(zone.task(task)?, device, position, snap);
            replace(zone, next)
        }
        ZoneMutation::SetScale {
            task,
            device,
            scale,
        } => {
            let current = zone.task(task)?;
            let next = match device {
                Some(device) => with_device_scale(current, device, scale),
                None => with_scale(current, scale),
            };
            replace(zone, next)
        }
        ZoneMutation::AddEdge {
            source,
            trigger,
            target,
        } => graph::add_edge(zone, source, trigger, target).map(Some),
        ZoneMutation::RemoveEdge { source, action } => {
            graph::remove_edge(zone, source, action).then_some(None)
        }
        ZoneMutation::SnapAll { device } => {
            *zone = snap_all(zone, device);
            Some(None)
        }
        ZoneMutation::SnapSelected { device, tasks } => {
            let selected: HashSet<TaskId> = tasks.into_iter().collect();
            *zone = snap_selected(zone, device, &selected);
            Some(None)
        }
        ZoneMutation::CopyDeviceLayout { from, to } => {
            *zone = copy_device_layout(zone, from, to);
            Some(None)
        }
        ZoneMutation::AddTask { task } => zone.add_task(*task).then_some(None),
        ZoneMutation::RemoveTask { id } => zone.remove_task(id).map(|_| None),
        ZoneMutation::ReplaceTask { task } => replace(zone, *task),
        ZoneMutation::SetBackground { url } => {
            zone.background = url;
            Some(None)
        }
        ZoneMutation::SetDisplay { display } => {
            zone.display = display;
            Some(None)
        }
    }
}

fn replace(zone: &mut Zone, task: Task) -> Option<Option<ActionId>> {
    zone.replace_task(task).then_some(None)
}
