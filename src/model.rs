//! Core data model for planviz.
//!
//! A `Project` owns its tasks and mail correspondence outright: both exist
//! only inside exactly one project document and travel with it. Documents are
//! stored fully hydrated, so a loaded project never needs follow-up reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Task workflow status.
///
/// The six known statuses serialize as their display labels (`"To Do"`,
/// `"In Progress"`, ...). Labels not in the known set are preserved verbatim
/// in `Other` so documents written by other tools survive a round trip; they
/// render with the neutral color instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
    Blocked,
    Canceled,
    Paused,
    Other(String),
}

impl TaskStatus {
    /// The six known statuses in display order.
    pub const KNOWN: [TaskStatus; 6] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
        TaskStatus::Canceled,
        TaskStatus::Paused,
    ];

    /// Display label, also the serialized form.
    pub fn label(&self) -> &str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Canceled => "Canceled",
            TaskStatus::Paused => "Paused",
            TaskStatus::Other(label) => label,
        }
    }

    /// Parse a label, tolerating case and separator variants
    /// (`"to do"`, `"to_do"`, `"todo"`). Unrecognized labels become `Other`.
    pub fn parse(input: &str) -> TaskStatus {
        let folded: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "todo" => TaskStatus::ToDo,
            "inprogress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "blocked" => TaskStatus::Blocked,
            "canceled" => TaskStatus::Canceled,
            "paused" => TaskStatus::Paused,
            _ => TaskStatus::Other(input.trim().to_string()),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        TaskStatus::parse(&value)
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.label().to_string()
    }
}

/// A unit of project work.
///
/// `start_date` and `deadline` are both optional; `created_at` is the
/// fallback when a start date is missing. Predecessor ids may point at tasks
/// outside the project, which is not an error (see the timeline module).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignee_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessor_task_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            status: TaskStatus::default(),
            deadline: None,
            start_date: None,
            assignee_emails: Vec::new(),
            predecessor_task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Address on a mail (sender or recipient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

/// One piece of project correspondence.
///
/// `previous_mail_id` forms a reply chain, but only chronology matters for
/// reporting, so the descendant side of the chain is never materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mail {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_mail_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<MailAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_recipients: Vec<MailAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc_recipients: Vec<MailAddress>,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mail {
    pub fn new(subject: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            previous_mail_id: None,
            written_at: None,
            sender: None,
            to_recipients: Vec::new(),
            cc_recipients: Vec::new(),
            subject: subject.into(),
            body: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Timestamp used for chronological ordering: `written_at` when present,
    /// `created_at` otherwise.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.written_at.unwrap_or(self.created_at)
    }
}

/// A fully hydrated project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mails: Vec<Mail>,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            created_at: now,
            updated_at: now,
            tasks: Vec::new(),
            mails: Vec::new(),
        }
    }

    /// Check the document invariants: a non-empty title and unique task and
    /// mail ids. Dangling predecessor ids are allowed.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidDocument(
                "project title cannot be empty".to_string(),
            ));
        }

        let mut task_ids = std::collections::HashSet::new();
        for task in &self.tasks {
            if !task_ids.insert(task.id) {
                return Err(Error::InvalidDocument(format!(
                    "duplicate task id: {}",
                    task.id
                )));
            }
        }

        let mut mail_ids = std::collections::HashSet::new();
        for mail in &self.mails {
            if !mail_ids.insert(mail.id) {
                return Err(Error::InvalidDocument(format!(
                    "duplicate mail id: {}",
                    mail.id
                )));
            }
        }

        Ok(())
    }
}
