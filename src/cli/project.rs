//! planviz project command implementations.

use std::path::PathBuf;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Project;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::project::{sample_project, ProjectStore, ProjectSummary};
use crate::storage::Storage;

pub struct ListOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: Uuid,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ImportOptions {
    pub file: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SeedOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    total: usize,
    projects: Vec<ProjectSummary>,
}

#[derive(serde::Serialize)]
struct ProjectImportOutput {
    id: Uuid,
    title: String,
    tasks: usize,
    mails: usize,
}

#[derive(serde::Serialize)]
struct ProjectSeedOutput {
    id: Uuid,
    title: String,
    tasks: usize,
    mails: usize,
    config_written: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let store = open_store(options.data_dir)?;
    let summaries = store.summaries()?;
    let output = ProjectListOutput {
        total: summaries.len(),
        projects: summaries,
    };
    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", output.total.to_string());
    for project in &output.projects {
        human.push_detail(format!(
            "{} {} ({} tasks, {} mails)",
            project.id, project.title, project.tasks, project.mails
        ));
    }
    if output.projects.is_empty() {
        human.push_next_step("planviz project seed");
    }
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let store = open_store(options.data_dir)?;
    let project = store.load(options.id)?;
    let mut human = HumanOutput::new(format!("Project {}", project.id));
    human.push_summary("Title", project.title.clone());
    if let Some(description) = project.description.as_ref() {
        human.push_summary("Description", description.clone());
    }
    human.push_summary("Tasks", project.tasks.len().to_string());
    human.push_summary("Mails", project.mails.len().to_string());
    human.push_summary("Created", project.created_at.to_rfc3339());
    human.push_summary("Updated", project.updated_at.to_rfc3339());
    for task in &project.tasks {
        human.push_detail(format!(
            "task {} [{}] {}",
            task.id,
            task.status.label(),
            task.name
        ));
    }
    for mail in &project.mails {
        human.push_detail(format!("mail {} {}", mail.id, mail.subject));
    }
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project show",
        &project,
        Some(&human),
    )
}

pub fn run_import(options: ImportOptions) -> Result<()> {
    let store = open_store(options.data_dir)?;
    let content = std::fs::read_to_string(&options.file)?;
    let project: Project = serde_json::from_str(&content).map_err(|err| {
        Error::InvalidDocument(format!("{}: {}", options.file.display(), err))
    })?;
    store.save(&project)?;
    let output = ProjectImportOutput {
        id: project.id,
        title: project.title.clone(),
        tasks: project.tasks.len(),
        mails: project.mails.len(),
    };
    let mut human = HumanOutput::new("Project imported");
    human.push_summary("ID", output.id.to_string());
    human.push_summary("Title", output.title.clone());
    human.push_summary("Tasks", output.tasks.to_string());
    human.push_summary("Mails", output.mails.to_string());
    human.push_next_step(format!("planviz report {}", output.id));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project import",
        &output,
        Some(&human),
    )
}

pub fn run_seed(options: SeedOptions) -> Result<()> {
    let store = open_store(options.data_dir)?;
    let project = sample_project();
    store.save(&project)?;

    // Write a default config next to the store so users have a file to edit.
    let config_path = store.storage().config_file();
    let config_written = if config_path.exists() {
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let output = ProjectSeedOutput {
        id: project.id,
        title: project.title.clone(),
        tasks: project.tasks.len(),
        mails: project.mails.len(),
        config_written,
    };
    let mut human = HumanOutput::new("Sample project created");
    human.push_summary("ID", output.id.to_string());
    human.push_summary("Title", output.title.clone());
    human.push_summary("Tasks", output.tasks.to_string());
    human.push_summary("Mails", output.mails.to_string());
    if config_written {
        human.push_detail(format!("wrote default config {}", config_path.display()));
    }
    human.push_next_step(format!("planviz report {}", output.id));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project seed",
        &output,
        Some(&human),
    )
}

fn open_store(data_dir: Option<PathBuf>) -> Result<ProjectStore> {
    let storage = Storage::resolve(data_dir)?;
    Ok(ProjectStore::new(storage))
}
