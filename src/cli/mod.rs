//! Command-line interface for planviz
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use clap::{Parser, Subcommand};

use crate::error::Result;

mod project;
mod report;

/// planviz - Project plan visualizer
///
/// A CLI that stores project plans (tasks, dependencies, mail threads) and
/// renders them as timeline, status, and dependency reports.
#[derive(Parser, Debug)]
#[command(name = "planviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding projects and config (defaults to the platform data dir)
    #[arg(long, global = true, env = "PLANVIZ_DATA_DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Project store management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Render reports for stored projects
    Report {
        /// Project to render
        id: Option<uuid::Uuid>,

        /// Render every stored project
        #[arg(long)]
        all: bool,

        /// Output format: svg, plan
        #[arg(long, default_value = "svg")]
        format: String,

        /// Output file (single project only; defaults into the reports directory)
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List stored projects
    List,

    /// Show a stored project in full
    Show {
        /// Project id
        id: uuid::Uuid,
    },

    /// Import a project document from a JSON file
    Import {
        /// Path to the project JSON file
        file: std::path::PathBuf,
    },

    /// Create and store a sample project for trying out reports
    Seed,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Project(cmd) => match cmd {
                ProjectCommands::List => {
                    project::run_list(project::ListOptions {
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                ProjectCommands::Show { id } => {
                    project::run_show(project::ShowOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                ProjectCommands::Import { file } => {
                    project::run_import(project::ImportOptions {
                        file,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                ProjectCommands::Seed => {
                    project::run_seed(project::SeedOptions {
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
            },
            Commands::Report { id, all, format, out } => {
                report::run_report(report::ReportOptions {
                    id,
                    all,
                    format,
                    out,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
        }
    }
}
