use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{NaiveDate, TimeZone, Utc};
use planviz::model::{Mail, MailAddress, Project, Task, TaskStatus};
use planviz::project::ProjectStore;
use planviz::storage::Storage;
use tempfile::TempDir;

/// Tempdir-backed planviz data directory for CLI and store tests.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.dir.path().to_path_buf())
    }

    pub fn store(&self) -> ProjectStore {
        ProjectStore::new(self.storage())
    }

    pub fn save_project(&self, project: &Project) {
        self.store().save(project).expect("save project");
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("planviz.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.dir.path().join("reports")
    }
}

pub fn planviz_cmd() -> Command {
    Command::cargo_bin("planviz").expect("binary")
}

/// A small project with fixed dates so report geometry is stable.
pub fn fixture_project() -> Project {
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).expect("date");
    let stamp = |d: u32, h: u32| {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0)
            .single()
            .expect("timestamp")
    };

    let mut design = Task::new("Design");
    design.status = TaskStatus::InProgress;
    design.start_date = Some(day(1));
    design.deadline = Some(day(10));

    let mut build = Task::new("Build");
    build.status = TaskStatus::ToDo;
    build.start_date = Some(day(8));
    build.deadline = Some(day(20));
    build.predecessor_task_ids = vec![design.id];

    let mut review = Task::new("Review");
    review.status = TaskStatus::Done;
    review.start_date = Some(day(2));
    review.deadline = Some(day(4));

    let mut kickoff = Mail::new("Kickoff notes");
    kickoff.written_at = Some(stamp(1, 9));
    kickoff.sender = Some(MailAddress {
        name: Some("Alice".to_string()),
        email: "alice@example.com".to_string(),
    });

    let mut reply = Mail::new("Re: Kickoff notes");
    reply.written_at = Some(stamp(2, 14));
    reply.previous_mail_id = Some(kickoff.id);

    let mut project = Project::new("Fixture Sprint");
    project.tasks = vec![design, build, review];
    project.mails = vec![kickoff, reply];
    project
}
