//! planviz - Project Plan Visualizer Library
//!
//! This library provides the core functionality for the planviz CLI tool,
//! turning stored project plans into rendered reports.
//!
//! # Core Concepts
//!
//! - **Projects**: Fully hydrated documents holding tasks and mail threads
//! - **Timeline Resolution**: Effective dates, row order, and dependency edges
//! - **Render Plans**: Backend-agnostic drawing primitives with resolved
//!   coordinates and colors
//! - **SVG Backend**: Self-contained single-page rendering of a plan
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `planviz.toml`
//! - `error`: Error types and result aliases
//! - `model`: Project, task, and mail document types
//! - `timeline`: Timeline resolution (effective dates, rows, edges)
//! - `report`: Render plan composition (panels and primitives)
//! - `svg`: SVG rendering backend
//! - `project`: Project store over the data directory
//! - `storage`: File storage and directory management
//! - `lock`: File locking and atomic operations for concurrency safety

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod output;
pub mod project;
pub mod report;
pub mod storage;
pub mod svg;
pub mod timeline;

pub use error::{Error, Result};
