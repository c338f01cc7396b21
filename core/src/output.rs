//! # Output
//!
//! Serializes the finished document, optionally pipes it through an external
//! formatter, and writes it to a file or stdout.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Serialization format of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Stdout gets JSON; a path ending in `json` gets JSON; anything else YAML.
    pub fn for_destination(destination: Option<&Path>) -> Self {
        match destination {
            None => OutputFormat::Json,
            Some(path) if path.to_string_lossy().ends_with("json") => OutputFormat::Json,
            Some(_) => OutputFormat::Yaml,
        }
    }

    /// Parser name understood by the formatter.
    pub fn parser(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// Renders the document.
pub fn render(doc: &Value, format: OutputFormat) -> AppResult<Vec<u8>> {
    match format {
        OutputFormat::Json => serde_json::to_vec_pretty(doc)
            .map_err(|e| AppError::Serialize(format!("JSON serialization failed: {}", e))),
        OutputFormat::Yaml => serde_yaml::to_string(doc)
            .map(String::into_bytes)
            .map_err(|e| AppError::Serialize(format!("YAML serialization failed: {}", e))),
    }
}

/// What to do with the external formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterPolicy {
    /// Never run it.
    Disabled,
    /// Run it when found on `PATH`, skip with a notice otherwise.
    #[default]
    IfAvailable,
    /// Run it; a missing executable is an error.
    Required,
}

/// An external formatter reading the document on stdin and writing it on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    /// Executable name or path.
    pub program: String,
    /// Missing executable handling.
    pub policy: FormatterPolicy,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            program: "prettier".to_string(),
            policy: FormatterPolicy::default(),
        }
    }
}

impl Formatter {
    /// Formats `input`, returning it unchanged when the formatter is disabled or skipped.
    pub fn format(&self, input: Vec<u8>, format: OutputFormat) -> AppResult<Vec<u8>> {
        if self.policy == FormatterPolicy::Disabled {
            return Ok(input);
        }

        let program = match which::which(&self.program) {
            Ok(program) => program,
            Err(_) if self.policy == FormatterPolicy::IfAvailable => {
                info!("{} not in PATH. Skipping ...", self.program);
                return Ok(input);
            }
            Err(e) => {
                return Err(AppError::Formatter(format!(
                    "{} not found: {}",
                    self.program, e
                )))
            }
        };

        info!("Formatting with {} ...", self.program);
        let args = ["--parser", format.parser()];
        debug!("Running: {} {}", program.display(), args.join(" "));
        self.run(&program, &args, &input)
    }

    fn run(&self, program: &Path, args: &[&str], input: &[u8]) -> AppResult<Vec<u8>> {
        let describe = || format!("\"{} {}\"", self.program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AppError::Formatter(format!("{} could not be started: {}", describe(), e)))?;

        // stdin is fed concurrently; the child may block on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_vec();
            std::thread::spawn(move || stdin.write_all(&input))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| AppError::Formatter(format!("{} failed: {}", describe(), e)))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => {
                    return Err(AppError::Formatter(format!(
                        "{} stdin failed: {}",
                        describe(),
                        e
                    )))
                }
                Err(_) => {
                    return Err(AppError::Formatter(format!(
                        "{} stdin writer panicked",
                        describe()
                    )))
                }
            }
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(AppError::Formatter(format!(
                "{} exited with exit code {}",
                describe(),
                code
            )));
        }

        Ok(output.stdout)
    }
}

/// Where the document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Standard output.
    Stdout,
    /// A file; `create_parents` creates missing parent directories.
    File {
        /// Destination path.
        path: PathBuf,
        /// Create missing parent directories.
        create_parents: bool,
    },
}

impl Sink {
    /// Checks that the destination directory exists (or creates it).
    ///
    /// Runs before any conversion work so a bad destination fails early.
    pub fn prepare(&self) -> AppResult<()> {
        let Sink::File {
            path,
            create_parents,
        } = self
        else {
            return Ok(());
        };
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        if parent.is_dir() {
            return Ok(());
        }
        if parent.exists() {
            return Err(AppError::Output(format!("{:?} is not a directory", parent)));
        }
        if !create_parents {
            return Err(AppError::Output(format!("{:?} does not exist", parent)));
        }
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Output(format!("Failed to create output directory {:?}: {}", parent, e))
        })
    }

    /// Writes `bytes` in one go.
    pub fn write(&self, bytes: &[u8]) -> AppResult<()> {
        match self {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(bytes)?;
                stdout.flush()?;
                Ok(())
            }
            Sink::File { path, .. } => fs::write(path, bytes)
                .map_err(|e| AppError::Output(format!("Could not create file {:?}: {}", path, e))),
        }
    }
}
