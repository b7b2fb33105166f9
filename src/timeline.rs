//! Task timeline resolution.
//!
//! Derives a display layout from a task collection: per-task effective
//! dates, a stable display order, the visible date range, and the
//! dependency edges that resolve against the visible task set. Resolution
//! is a pure function of its input and never fails; missing fields fall
//! back along a documented chain and unresolvable predecessor references
//! are dropped without affecting the remaining edges.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::model::{Task, TaskStatus};

/// One task placed on the timeline, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task_id: Uuid,
    pub name: String,
    pub status: TaskStatus,
    /// Effective start after fallbacks.
    pub start: NaiveDate,
    /// Effective end after fallbacks. Equal to `start` for tasks without
    /// a deadline.
    pub end: NaiveDate,
    /// Row index in display order, top to bottom.
    pub row: usize,
    pub predecessor_ids: Vec<Uuid>,
}

/// A dependency edge between two visible rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEdge {
    pub predecessor_row: usize,
    pub predecessor_end: NaiveDate,
    pub successor_row: usize,
    pub successor_start: NaiveDate,
}

/// The visible date span covering every row's effective dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.max - self.min).num_days()
    }
}

/// Resolved display layout for a task collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimeline {
    pub rows: Vec<TaskRow>,
    pub range: DateRange,
    pub edges: Vec<DependencyEdge>,
}

/// Result of timeline resolution. An empty task collection resolves to
/// [`TimelineLayout::Empty`] so consumers can render a placeholder rather
/// than an empty chart.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineLayout {
    Empty,
    Resolved(ResolvedTimeline),
}

/// Start date used for layout: the explicit start date when present,
/// otherwise the date portion of the creation timestamp.
pub fn effective_start(task: &Task) -> NaiveDate {
    task.start_date.unwrap_or_else(|| task.created_at.date_naive())
}

/// End date used for layout: the deadline when present, otherwise the
/// effective start (zero-duration task).
pub fn effective_end(task: &Task) -> NaiveDate {
    task.deadline.unwrap_or_else(|| effective_start(task))
}

/// Resolve a task collection into a display layout.
///
/// Tasks are ordered by effective start ascending; ties keep their input
/// order. The visible range spans the minimum effective start to the
/// maximum effective end, widened to one day when it would be zero-width.
/// Edges are emitted per predecessor reference, in row order, skipping
/// references that do not resolve against the visible set.
pub fn resolve(tasks: &[Task]) -> TimelineLayout {
    if tasks.is_empty() {
        return TimelineLayout::Empty;
    }

    let mut order: Vec<&Task> = tasks.iter().collect();
    order.sort_by_key(|task| effective_start(task));

    let rows: Vec<TaskRow> = order
        .iter()
        .enumerate()
        .map(|(row, task)| TaskRow {
            task_id: task.id,
            name: task.name.clone(),
            status: task.status.clone(),
            start: effective_start(task),
            end: effective_end(task),
            row,
            predecessor_ids: task.predecessor_task_ids.clone(),
        })
        .collect();

    let min = rows.iter().map(|r| r.start).min().unwrap_or_default();
    let mut max = rows.iter().map(|r| r.end).max().unwrap_or_default();
    if (max - min).num_days() == 0 {
        max = min + Duration::days(1);
    }

    let index: HashMap<Uuid, usize> = rows.iter().map(|r| (r.task_id, r.row)).collect();

    let mut edges = Vec::new();
    for row in &rows {
        for pred_id in &row.predecessor_ids {
            match index.get(pred_id) {
                Some(&pred_row) => edges.push(DependencyEdge {
                    predecessor_row: pred_row,
                    predecessor_end: rows[pred_row].end,
                    successor_row: row.row,
                    successor_start: row.start,
                }),
                None => {
                    debug!(
                        task_id = %row.task_id,
                        predecessor_id = %pred_id,
                        "skipping unresolvable predecessor reference"
                    );
                }
            }
        }
    }

    TimelineLayout::Resolved(ResolvedTimeline {
        rows,
        range: DateRange { min, max },
        edges,
    })
}
