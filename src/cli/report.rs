//! planviz report command implementation.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::project::ProjectStore;
use crate::report::compose_project;
use crate::storage::Storage;
use crate::svg::SvgRenderer;

pub struct ReportOptions {
    pub id: Option<Uuid>,
    pub all: bool,
    pub format: String,
    pub out: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Svg,
    Plan,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Svg => "svg",
            ReportFormat::Plan => "json",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ReportFormat::Svg),
            "plan" => Ok(ReportFormat::Plan),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "invalid format '{}': must be svg or plan",
                s
            ))),
        }
    }
}

#[derive(serde::Serialize)]
struct ReportOutput {
    format: ReportFormat,
    total: usize,
    reports: Vec<ReportFile>,
}

#[derive(serde::Serialize)]
struct ReportFile {
    project_id: Uuid,
    title: String,
    path: PathBuf,
}

pub fn run_report(options: ReportOptions) -> Result<()> {
    let format: ReportFormat = options.format.parse()?;
    if options.all && options.id.is_some() {
        return Err(Error::InvalidArgument(
            "pass either a project id or --all, not both".to_string(),
        ));
    }
    if options.all && options.out.is_some() {
        return Err(Error::InvalidArgument(
            "--out applies to a single project, not --all".to_string(),
        ));
    }

    let storage = Storage::resolve(options.data_dir)?;
    let config = Config::load_or_default(&storage)?;
    let store = ProjectStore::new(storage);

    let ids = match options.id {
        Some(id) => vec![id],
        None if options.all => store.list_ids()?,
        None => {
            return Err(Error::InvalidArgument(
                "pass a project id or --all".to_string(),
            ))
        }
    };

    let output_dir = resolve_output_dir(&store, &config);
    let renderer = SvgRenderer::new();

    let mut reports = Vec::new();
    for id in &ids {
        let project = store.load(*id)?;
        let plan = compose_project(&project, &config.report);
        let content = match format {
            ReportFormat::Svg => renderer.render(&plan),
            ReportFormat::Plan => serde_json::to_string_pretty(&plan)?,
        };

        let path = match options.out.as_ref() {
            Some(out) => out.clone(),
            None => output_dir.join(format!("project_{}.{}", id, format.extension())),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, content)?;

        reports.push(ReportFile {
            project_id: *id,
            title: project.title,
            path,
        });
    }

    let output = ReportOutput {
        format,
        total: reports.len(),
        reports,
    };
    let mut human = HumanOutput::new("Reports");
    human.push_summary("Format", options.format.to_lowercase());
    human.push_summary("Rendered", output.total.to_string());
    for report in &output.reports {
        human.push_detail(format!("{} -> {}", report.project_id, report.path.display()));
    }
    if output.reports.is_empty() {
        human.push_warning("no projects found");
        human.push_next_step("planviz project seed");
    }
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "report",
        &output,
        Some(&human),
    )
}

/// Report files land in the configured output directory, resolved against
/// the data directory when relative.
fn resolve_output_dir(store: &ProjectStore, config: &Config) -> PathBuf {
    let dir = PathBuf::from(&config.output.directory);
    if dir.is_absolute() {
        dir
    } else {
        store.storage().data_dir().join(dir)
    }
}
