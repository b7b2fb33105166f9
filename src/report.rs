//! Report composition.
//!
//! Walks a resolved timeline plus the project's mails and produces a
//! [`RenderPlan`]: panels of drawing primitives (bars, arrows, labels,
//! points, wedges, nodes) with fully resolved coordinates and colors.
//! The plan is backend-agnostic; rendering backends map it onto their
//! surface without further business logic.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::ReportConfig;
use crate::model::{Mail, Project, TaskStatus};
use crate::timeline::{self, ResolvedTimeline, TimelineLayout};

/// Fill color per task status.
pub fn status_color(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::ToDo => "#E0E0E0",
        TaskStatus::InProgress => "#2196F3",
        TaskStatus::Done => "#4CAF50",
        TaskStatus::Blocked => "#F44336",
        TaskStatus::Canceled => "#9E9E9E",
        TaskStatus::Paused => "#FF9800",
        TaskStatus::Other(_) => NEUTRAL_COLOR,
    }
}

/// Fallback fill for statuses outside the fixed set.
pub const NEUTRAL_COLOR: &str = "#CCCCCC";

// ===== Render plan =====

/// Horizontal text alignment relative to the label's anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A single resolved drawing instruction. Primitives within a panel are
/// listed back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Horizontal bar spanning `x0..x1` centered on `row`.
    Bar {
        x0: f64,
        x1: f64,
        row: f64,
        color: String,
    },
    /// Directed arrow between two points.
    Arrow {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: String,
        dashed: bool,
    },
    /// Positioned text.
    Label {
        x: f64,
        y: f64,
        text: String,
        anchor: TextAnchor,
        bold: bool,
    },
    /// Scatter point.
    Point { x: f64, y: f64, color: String },
    /// One pie slice. Angles are degrees counterclockwise from the
    /// positive x axis; slices start at 90 degrees.
    Wedge {
        label: String,
        count: usize,
        fraction: f64,
        start_angle: f64,
        end_angle: f64,
        color: String,
        pct_label: String,
    },
    /// Rounded box for the dependency diagram.
    Node {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    /// Centered "no data" text replacing a panel's content.
    Placeholder { text: String },
}

/// Axis tick with a resolved position and label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Legend entry for a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    pub dashed: bool,
}

/// One chart panel of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    /// Data-space x extent. Absent for panels without a coordinate axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub x_ticks: Vec<AxisTick>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub y_ticks: Vec<AxisTick>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub legend: Vec<LegendEntry>,
    /// Whether the backend should draw the axis frame and ticks.
    pub show_axes: bool,
    pub primitives: Vec<Primitive>,
}

impl Panel {
    fn bare(title: &str, show_axes: bool) -> Self {
        Self {
            title: title.to_string(),
            x_label: None,
            x_range: None,
            y_range: None,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            legend: Vec::new(),
            show_axes,
            primitives: Vec::new(),
        }
    }

    fn placeholder(title: &str, text: &str, show_axes: bool) -> Self {
        let mut panel = Self::bare(title, show_axes);
        panel.primitives.push(Primitive::Placeholder {
            text: text.to_string(),
        });
        panel
    }
}

/// Backend-agnostic report: an optional header plus one panel per chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub panels: Vec<Panel>,
}

// ===== Composition =====

/// Compose the full report for a project: resolves the timeline, composes
/// every panel, and adds the project header.
pub fn compose_project(project: &Project, config: &ReportConfig) -> RenderPlan {
    let layout = timeline::resolve(&project.tasks);
    let mut plan = compose(&layout, &project.mails, config);
    plan.title = Some(format!("Project: {}", project.title));
    plan.subtitle = project
        .description
        .as_ref()
        .filter(|d| !d.is_empty())
        .cloned();
    plan
}

/// Compose the report panels from a resolved layout and the raw mail
/// collection. Every "no data" condition yields a placeholder panel.
pub fn compose(layout: &TimelineLayout, mails: &[Mail], config: &ReportConfig) -> RenderPlan {
    let panels = vec![
        compose_gantt_panel(layout, config),
        compose_mail_panel(mails),
        compose_status_panel(layout),
        compose_dependency_panel(layout),
    ];
    RenderPlan {
        title: None,
        subtitle: None,
        panels,
    }
}

fn compose_gantt_panel(layout: &TimelineLayout, config: &ReportConfig) -> Panel {
    let timeline = match layout {
        TimelineLayout::Empty => {
            return Panel::placeholder("Gantt Chart - Tasks Timeline", "No tasks available", true);
        }
        TimelineLayout::Resolved(timeline) => timeline,
    };

    let range_days = timeline.range.days() as f64;
    let mut panel = Panel::bare("Gantt Chart - Tasks Timeline (with dependencies)", true);
    panel.x_label = Some("Days from project start".to_string());
    panel.x_range = Some((-range_days * 0.05, range_days * 1.1));
    panel.y_range = Some((-0.5, timeline.rows.len() as f64 - 0.5));
    panel.y_ticks = timeline
        .rows
        .iter()
        .map(|row| AxisTick {
            position: row.row as f64,
            label: truncate(&row.name, 30),
        })
        .collect();

    panel.legend = TaskStatus::KNOWN
        .iter()
        .map(|status| LegendEntry {
            label: status.label().to_string(),
            color: status_color(status).to_string(),
            dashed: false,
        })
        .collect();
    panel.legend.push(LegendEntry {
        label: "Dependencies".to_string(),
        color: "red".to_string(),
        dashed: true,
    });

    // Arrows first so bars stack above them
    for edge in &timeline.edges {
        panel.primitives.push(Primitive::Arrow {
            x0: day_offset(timeline, edge.predecessor_end),
            y0: edge.predecessor_row as f64,
            x1: day_offset(timeline, edge.successor_start),
            y1: edge.successor_row as f64,
            color: "red".to_string(),
            dashed: true,
        });
    }

    for row in &timeline.rows {
        let x0 = day_offset(timeline, row.start);
        let duration = bar_duration(timeline, row.row);
        panel.primitives.push(Primitive::Bar {
            x0,
            x1: x0 + duration,
            row: row.row as f64,
            color: status_color(&row.status).to_string(),
        });
    }

    for row in &timeline.rows {
        let x0 = day_offset(timeline, row.start);
        let duration = bar_duration(timeline, row.row);
        let label = truncate(&row.name, 30);
        if duration > range_days * config.label_inside_fraction {
            panel.primitives.push(Primitive::Label {
                x: x0 + duration / 2.0,
                y: row.row as f64,
                text: label,
                anchor: TextAnchor::Middle,
                bold: true,
            });
        } else if duration > range_days * config.label_beside_fraction {
            panel.primitives.push(Primitive::Label {
                x: x0 + duration + range_days * config.label_offset_fraction,
                y: row.row as f64,
                text: label,
                anchor: TextAnchor::Start,
                bold: false,
            });
        }
    }

    panel
}

fn day_offset(timeline: &ResolvedTimeline, date: chrono::NaiveDate) -> f64 {
    (date - timeline.range.min).num_days() as f64
}

/// Bar width in days, floored to one day for rows whose deadline lies
/// before their start.
fn bar_duration(timeline: &ResolvedTimeline, row: usize) -> f64 {
    let row = &timeline.rows[row];
    if row.end >= row.start {
        (row.end - row.start).num_days() as f64
    } else {
        1.0
    }
}

fn compose_mail_panel(mails: &[Mail]) -> Panel {
    if mails.is_empty() {
        return Panel::placeholder("Mail Timeline", "No mails available", true);
    }

    let mut sorted: Vec<&Mail> = mails.iter().collect();
    sorted.sort_by_key(|mail| mail.effective_timestamp());
    let origin = sorted[0].effective_timestamp();

    let xs: Vec<f64> = sorted
        .iter()
        .map(|mail| (mail.effective_timestamp() - origin).num_seconds() as f64 / 86_400.0)
        .collect();
    let span = xs.last().copied().unwrap_or(0.0).max(1.0);

    let mut panel = Panel::bare("Mail Timeline", true);
    panel.x_label = Some("Date".to_string());
    panel.x_range = Some((-span * 0.05, span * 1.05));
    panel.y_range = Some((-0.5, sorted.len() as f64 - 0.5));
    panel.x_ticks = sorted
        .iter()
        .zip(&xs)
        .map(|(mail, &x)| AxisTick {
            position: x,
            label: mail
                .effective_timestamp()
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();
    panel.y_ticks = (0..sorted.len())
        .map(|i| AxisTick {
            position: i as f64,
            label: format!("Mail {}", i + 1),
        })
        .collect();

    for (i, &x) in xs.iter().enumerate() {
        panel.primitives.push(Primitive::Point {
            x,
            y: i as f64,
            color: "blue".to_string(),
        });
    }
    for (i, (mail, &x)) in sorted.iter().zip(&xs).enumerate() {
        panel.primitives.push(Primitive::Label {
            x,
            y: i as f64,
            text: truncate(&mail.subject, 40),
            anchor: TextAnchor::Start,
            bold: false,
        });
    }

    panel
}

fn compose_status_panel(layout: &TimelineLayout) -> Panel {
    let timeline = match layout {
        TimelineLayout::Empty => {
            return Panel::placeholder("Task Status Distribution", "No tasks available", false);
        }
        TimelineLayout::Resolved(timeline) => timeline,
    };

    // Tally in first-occurrence order over the display rows
    let mut counts: Vec<(String, &TaskStatus, usize)> = Vec::new();
    for row in &timeline.rows {
        let label = row.status.label();
        match counts.iter_mut().find(|(seen, _, _)| seen == label) {
            Some((_, _, count)) => *count += 1,
            None => counts.push((label.to_string(), &row.status, 1)),
        }
    }

    let total = timeline.rows.len() as f64;
    let mut panel = Panel::bare("Task Status Distribution", false);
    let mut acc = 0.0_f64;
    for (label, status, count) in counts {
        let fraction = count as f64 / total;
        panel.primitives.push(Primitive::Wedge {
            label,
            count,
            fraction,
            start_angle: 90.0 + 360.0 * acc,
            end_angle: 90.0 + 360.0 * (acc + fraction),
            color: status_color(status).to_string(),
            pct_label: format!("{:.1}%", fraction * 100.0),
        });
        acc += fraction;
    }

    panel
}

fn compose_dependency_panel(layout: &TimelineLayout) -> Panel {
    let timeline = match layout {
        TimelineLayout::Empty => {
            return Panel::placeholder("Task Dependencies", "No tasks available", false);
        }
        TimelineLayout::Resolved(timeline) => timeline,
    };

    let with_deps: Vec<_> = timeline
        .rows
        .iter()
        .filter(|row| !row.predecessor_ids.is_empty())
        .collect();
    if with_deps.is_empty() {
        return Panel::placeholder("Task Dependencies", "No task dependencies", false);
    }

    let mut panel = Panel::bare("Task Dependencies", false);
    panel.x_range = Some((0.0, 10.0));
    panel.y_range = Some((0.0, 10.0));

    let ys = evenly_spaced(1.0, 9.0, with_deps.len());
    let mut positions: HashMap<uuid::Uuid, f64> = HashMap::new();
    for (row, &y) in with_deps.iter().zip(&ys) {
        positions.insert(row.task_id, y);

        panel.primitives.push(Primitive::Node {
            x: 4.0,
            y: y - 0.3,
            width: 2.0,
            height: 0.6,
            color: status_color(&row.status).to_string(),
        });
        panel.primitives.push(Primitive::Label {
            x: 5.0,
            y,
            text: truncate(&row.name, 15),
            anchor: TextAnchor::Middle,
            bold: true,
        });

        // Arrows only between tasks already placed in this column
        for pred_id in &row.predecessor_ids {
            if let Some(&pred_y) = positions.get(pred_id) {
                panel.primitives.push(Primitive::Arrow {
                    x0: 5.0,
                    y0: pred_y,
                    x1: 5.0,
                    y1: y,
                    color: "gray".to_string(),
                    dashed: false,
                });
            }
        }
    }

    panel
}

fn evenly_spaced(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
