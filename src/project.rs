//! Project document store.
//!
//! Realizes the storage contract the report pipeline consumes: load one
//! fully hydrated project by id, list every stored project id, and save
//! documents for the ingestion paths (import, seed). One JSON document per
//! project under `projects/`.

use std::fs;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{Mail, MailAddress, Project, Task, TaskStatus};
use crate::storage::Storage;

/// Listing entry for a stored project.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub tasks: usize,
    pub mails: usize,
    pub updated_at: chrono::DateTime<Utc>,
}

/// Store for fully hydrated project documents.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    storage: Storage,
}

impl ProjectStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load a project with its tasks and mails.
    ///
    /// A missing document is the explicit not-found failure, distinct from a
    /// project that exists but has no tasks or mails.
    pub fn load(&self, id: Uuid) -> Result<Project> {
        let path = self.storage.project_file(id);
        if !path.exists() {
            return Err(Error::ProjectNotFound(id));
        }
        let project: Project = self.storage.read_json(&path)?;
        debug!(
            project_id = %id,
            tasks = project.tasks.len(),
            mails = project.mails.len(),
            "loaded project document"
        );
        Ok(project)
    }

    /// List the ids of all stored projects, sorted for deterministic
    /// iteration. Files whose stem is not a UUID are skipped.
    pub fn list_ids(&self) -> Result<Vec<Uuid>> {
        let dir = self.storage.projects_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<Uuid>().ok())
            {
                Some(id) => ids.push(id),
                None => {
                    debug!(path = %path.display(), "skipping non-project file");
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Validate and persist a project document (locked atomic write).
    pub fn save(&self, project: &Project) -> Result<()> {
        project.validate()?;
        self.storage.init()?;

        let path = self.storage.project_file(project.id);
        let json = serde_json::to_string_pretty(project)?;
        lock::locked_replace(&path, json.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)?;
        debug!(project_id = %project.id, "saved project document");
        Ok(())
    }

    /// Summaries of every stored project, most recently updated first.
    pub fn summaries(&self) -> Result<Vec<ProjectSummary>> {
        let mut summaries = Vec::new();
        for id in self.list_ids()? {
            let project = self.load(id)?;
            summaries.push(ProjectSummary {
                id: project.id,
                title: project.title,
                tasks: project.tasks.len(),
                mails: project.mails.len(),
                updated_at: project.updated_at,
            });
        }
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(summaries)
    }
}

/// Generate a demonstration project touching every report feature: mixed
/// statuses, date fallbacks, a zero-duration task, a dangling predecessor,
/// and mails with and without a written-at timestamp.
pub fn sample_project() -> Project {
    let now = Utc::now();
    let today = now.date_naive();

    let mut project = Project::new("Website Relaunch");
    project.description = Some("Migrate the marketing site to the new CMS".to_string());

    let mut kickoff = Task::new("Kickoff workshop");
    kickoff.status = TaskStatus::Done;
    kickoff.start_date = Some(today - Duration::days(14));
    kickoff.deadline = Some(today - Duration::days(13));
    kickoff.assignee_emails.push("alice@example.com".to_string());

    let mut inventory = Task::new("Content inventory");
    inventory.status = TaskStatus::Done;
    inventory.start_date = Some(today - Duration::days(12));
    inventory.deadline = Some(today - Duration::days(3));
    inventory.predecessor_task_ids.push(kickoff.id);

    let mut architecture = Task::new("Information architecture");
    architecture.status = TaskStatus::InProgress;
    architecture.start_date = Some(today - Duration::days(2));
    architecture.deadline = Some(today + Duration::days(6));
    architecture.predecessor_task_ids.push(inventory.id);

    let mut design = Task::new("Visual design for all key landing pages");
    design.status = TaskStatus::InProgress;
    design.start_date = Some(today + Duration::days(1));
    design.deadline = Some(today + Duration::days(15));
    design.predecessor_task_ids.push(architecture.id);

    let mut migration = Task::new("CMS migration");
    migration.status = TaskStatus::Blocked;
    migration.start_date = Some(today + Duration::days(4));
    migration.deadline = Some(today + Duration::days(18));
    migration.predecessor_task_ids.push(inventory.id);
    // References a task tracked outside this project
    migration.predecessor_task_ids.push(Uuid::new_v4());

    // No explicit dates: falls back to its creation date
    let copy_review = Task::new("Copy review");

    let mut seo = Task::new("SEO audit");
    seo.status = TaskStatus::Paused;
    seo.start_date = Some(today + Duration::days(8));

    let mut redirects = Task::new("Legacy redirects");
    redirects.status = TaskStatus::Canceled;
    redirects.start_date = Some(today - Duration::days(10));
    redirects.deadline = Some(today - Duration::days(9));

    project.tasks = vec![
        kickoff, inventory, architecture, design, migration, copy_review, seo, redirects,
    ];

    let alice = MailAddress {
        name: Some("Alice".to_string()),
        email: "alice@example.com".to_string(),
    };
    let bob = MailAddress {
        name: Some("Bob".to_string()),
        email: "bob@example.com".to_string(),
    };

    let mut agenda = Mail::new("Kickoff agenda");
    agenda.written_at = Some(now - Duration::days(15));
    agenda.sender = Some(alice.clone());
    agenda.to_recipients.push(bob.clone());
    agenda.body = "Agenda attached, see you Monday.".to_string();

    let mut agenda_reply = Mail::new("Re: Kickoff agenda");
    agenda_reply.written_at = Some(now - Duration::days(15) + Duration::hours(5));
    agenda_reply.previous_mail_id = Some(agenda.id);
    agenda_reply.sender = Some(bob.clone());
    agenda_reply.to_recipients.push(alice.clone());
    agenda_reply.body = "Works for me.".to_string();

    // Ingested without a written-at timestamp
    let mut freeze = Mail::new("Content freeze reminder");
    freeze.created_at = now - Duration::days(4);
    freeze.updated_at = freeze.created_at;
    freeze.sender = Some(alice.clone());
    freeze.to_recipients.push(bob.clone());
    freeze.body = "Freeze starts tomorrow, last call for edits.".to_string();

    let mut review_invite = Mail::new("Design review invite");
    review_invite.written_at = Some(now - Duration::days(1));
    review_invite.sender = Some(bob);
    review_invite.to_recipients.push(alice);
    review_invite.cc_recipients.push(MailAddress {
        name: None,
        email: "team@example.com".to_string(),
    });
    review_invite.body = "Walkthrough of the new landing pages on Thursday.".to_string();

    project.mails = vec![agenda, agenda_reply, freeze, review_invite];
    project
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> (tempfile::TempDir, ProjectStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        (dir, ProjectStore::new(storage))
    }

    #[test]
    fn save_and_load_round_trip() {
        let (_dir, store) = setup_store();
        let project = sample_project();
        store.save(&project).expect("save");

        let loaded = store.load(project.id).expect("load");
        assert_eq!(loaded.id, project.id);
        assert_eq!(loaded.title, project.title);
        assert_eq!(loaded.tasks.len(), project.tasks.len());
        assert_eq!(loaded.mails.len(), project.mails.len());
    }

    #[test]
    fn load_missing_project_is_not_found() {
        let (_dir, store) = setup_store();
        let id = Uuid::new_v4();
        match store.load(id) {
            Err(Error::ProjectNotFound(missing)) => assert_eq!(missing, id),
            other => panic!("expected ProjectNotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_project_loads_as_found() {
        let (_dir, store) = setup_store();
        let project = Project::new("Empty");
        store.save(&project).expect("save");

        let loaded = store.load(project.id).expect("load");
        assert!(loaded.tasks.is_empty());
        assert!(loaded.mails.is_empty());
    }

    #[test]
    fn list_ids_sorted_and_skips_foreign_files() {
        let (_dir, store) = setup_store();
        let mut expected = Vec::new();
        for title in ["One", "Two", "Three"] {
            let project = Project::new(title);
            expected.push(project.id);
            store.save(&project).expect("save");
        }
        fs::write(store.storage().projects_dir().join("notes.json"), "{}").expect("write");
        fs::write(store.storage().projects_dir().join("README.txt"), "hi").expect("write");

        expected.sort();
        assert_eq!(store.list_ids().expect("list"), expected);
    }

    #[test]
    fn save_rejects_invalid_document() {
        let (_dir, store) = setup_store();
        let mut project = Project::new("Demo");
        let task = Task::new("One");
        let mut dup = Task::new("Two");
        dup.id = task.id;
        project.tasks.push(task);
        project.tasks.push(dup);

        assert!(matches!(
            store.save(&project),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn summaries_report_counts() {
        let (_dir, store) = setup_store();
        let project = sample_project();
        store.save(&project).expect("save");

        let summaries = store.summaries().expect("summaries");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, project.id);
        assert_eq!(summaries[0].tasks, project.tasks.len());
        assert_eq!(summaries[0].mails, project.mails.len());
    }

    #[test]
    fn sample_project_exercises_report_features() {
        let project = sample_project();
        project.validate().expect("valid");

        let task_ids: std::collections::HashSet<Uuid> =
            project.tasks.iter().map(|t| t.id).collect();
        let has_dangling = project
            .tasks
            .iter()
            .flat_map(|t| &t.predecessor_task_ids)
            .any(|id| !task_ids.contains(id));
        assert!(has_dangling, "expected an unresolvable predecessor");

        assert!(project.tasks.iter().any(|t| t.start_date.is_none()));
        assert!(project
            .tasks
            .iter()
            .any(|t| t.start_date.is_some() && t.deadline.is_none()));
        assert!(project.mails.iter().any(|m| m.written_at.is_none()));
        assert!(project.mails.iter().any(|m| m.previous_mail_id.is_some()));
    }
}
