//! Shared output formatting for planviz CLI commands.
//!
//! Every command speaks two dialects: a versioned JSON envelope on `--json`
//! and a sectioned human rendering otherwise. Both are fed from the same
//! [`HumanOutput`] so warnings and next steps never diverge between them.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "planviz.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Versioned envelope wrapping every JSON response. Success responses carry
/// `data`, error responses carry `error`; empty lists are omitted.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn from_error(err: &Error) -> Self {
        Self {
            message: err.to_string(),
            code: err.exit_code(),
            kind: if err.exit_code() == exit_codes::USER_ERROR {
                "user_error"
            } else {
                "operation_failed"
            },
            details: err.details(),
        }
    }
}

/// Sectioned human rendering of a command result.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    /// Render as `header`, then the non-empty sections in fixed order,
    /// separated by blank lines.
    pub fn render(&self) -> String {
        let mut text = self.header.clone();

        if !self.summary.is_empty() {
            text.push_str("\n\nSummary:");
            for (key, value) in &self.summary {
                if value.is_empty() {
                    text.push_str(&format!("\n- {key}"));
                } else {
                    text.push_str(&format!("\n- {key}: {value}"));
                }
            }
        }

        for (title, items) in [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ] {
            if items.is_empty() {
                continue;
            }
            text.push_str(&format!("\n\n{title}:"));
            for item in items {
                text.push_str(&format!("\n- {item}"));
            }
        }

        text
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", human.render());
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);

    if json {
        let payload: Envelope<()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(ErrorBody::from_error(err)),
            warnings: Vec::new(),
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Best-effort command name for the error envelope, recovered from raw args
/// before clap parsing has a chance to fail.
pub fn infer_command_name_from_args() -> String {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut positional = args.iter().filter(|arg| !arg.starts_with('-'));

    let command = match positional.next() {
        Some(command) => command,
        None => return "planviz".to_string(),
    };

    if command == "project" {
        if let Some(sub) = positional.next() {
            return format!("{command} {sub}");
        }
    }
    command.clone()
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::ProjectNotFound(_) => vec!["planviz project list".to_string()],
        Error::InvalidConfig(_) => vec!["fix planviz.toml then retry".to_string()],
        Error::DataDirUnavailable => {
            vec!["pass --data-dir or set PLANVIZ_DATA_DIR".to_string()]
        }
        Error::LockFailed(_) => {
            vec!["wait for the other planviz process to finish, then retry".to_string()]
        }
        _ => Vec::new(),
    }
}
