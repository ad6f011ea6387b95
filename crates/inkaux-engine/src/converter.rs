//! WMF export through an external converter.
//!
//! The export itself is done by a third-party command-line tool
//! (UniConvertor). This module assembles the command line for a given
//! input, and runs it through the platform shell with a temporary output
//! path, streaming the produced file to the caller.

use crate::config::ConverterConfig;
use std::fs::File;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Locates the converter command.
pub trait CommandResolver {
    /// Command (with any fixed arguments) that starts the converter.
    fn resolve(&self) -> Result<String, ConverterError>;
}

/// Executes an assembled converter command.
pub trait ConversionRunner {
    /// Run `command`, which still lacks its output path argument, and copy
    /// the produced file into `out`. Returns the number of bytes copied.
    fn run(
        &self,
        command: &str,
        tool_label: &str,
        output_extension: &str,
        out: &mut dyn Write,
    ) -> Result<u64, ConverterError>;
}

/// Resolves the converter by searching `PATH` for known executable names.
#[derive(Debug, Clone)]
pub struct PathResolver {
    candidates: Vec<String>,
    tool_label: String,
}

impl PathResolver {
    /// Create a resolver trying `candidates` in order.
    pub fn new(candidates: Vec<String>, tool_label: impl Into<String>) -> Self {
        Self {
            candidates,
            tool_label: tool_label.into(),
        }
    }

    /// Create a resolver from converter settings.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.candidates.clone(), config.tool_label.clone())
    }
}

impl CommandResolver for PathResolver {
    fn resolve(&self) -> Result<String, ConverterError> {
        for name in &self.candidates {
            if let Ok(path) = which::which(name) {
                let command = path.display().to_string();
                debug!(candidate = %name, command = %command, "Resolved converter");
                return Ok(if command.contains(char::is_whitespace) {
                    format!("\"{command}\"")
                } else {
                    command
                });
            }
        }

        Err(ConverterError::ToolMissing {
            tool: self.tool_label.clone(),
            candidates: self.candidates.join(", "),
        })
    }
}

/// Runs converter commands through `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ConversionRunner for ShellRunner {
    fn run(
        &self,
        command: &str,
        tool_label: &str,
        output_extension: &str,
        out: &mut dyn Write,
    ) -> Result<u64, ConverterError> {
        // Removed on drop, whether or not the tool produced anything.
        let work_dir = tempfile::Builder::new().prefix("inkaux-").tempdir()?;
        let output_path = work_dir.path().join(format!("output{output_extension}"));
        let full_command = format!("{command}\"{}\"", output_path.display());
        debug!(command = %full_command, "Running converter");

        let output = shell(&full_command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ConverterError::Spawn {
                tool: tool_label.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConverterError::Failed {
                tool: tool_label.to_string(),
                status: output.status.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        if !output_path.is_file() {
            return Err(ConverterError::NoOutput {
                tool: tool_label.to_string(),
            });
        }

        let mut produced = File::open(&output_path)?;
        let copied = io::copy(&mut produced, out)?;
        out.flush()?;
        Ok(copied)
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

/// A converter invocation ready to hand to a [`ConversionRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// `<command> "<input>" `, awaiting the output path.
    pub command: String,
    /// Tool name used in failure messages.
    pub tool_label: String,
    /// Extension of the expected output file.
    pub output_extension: String,
}

impl ExportRequest {
    /// Build the invocation for `input` using the resolved converter command.
    pub fn new(
        resolver: &dyn CommandResolver,
        input: &str,
        config: &ConverterConfig,
    ) -> Result<Self, ConverterError> {
        if input.is_empty() {
            return Err(ConverterError::EmptyInput);
        }
        let command = resolver.resolve()?;
        Ok(Self {
            command: format!("{command} \"{input}\" "),
            tool_label: config.tool_label.clone(),
            output_extension: config.output_extension.clone(),
        })
    }
}

/// Convert `input` and write the result to `out`.
pub fn export(
    resolver: &dyn CommandResolver,
    runner: &dyn ConversionRunner,
    input: &str,
    config: &ConverterConfig,
    out: &mut dyn Write,
) -> Result<u64, ConverterError> {
    let request = ExportRequest::new(resolver, input, config)?;
    runner
        .run(
            &request.command,
            &request.tool_label,
            &request.output_extension,
            out,
        )
        .inspect_err(|e| warn!(input = %input, error = %e, "Conversion failed"))
}

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error("No input file given")]
    EmptyInput,

    #[error("You need to install the {tool} software (looked for: {candidates})")]
    ToolMissing { tool: String, candidates: String },

    #[error("Error attempting to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed ({status}):\n{stdout}\n{stderr}")]
    Failed {
        tool: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("{tool} failed to produce output")]
    NoOutput { tool: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedResolver(&'static str);

    impl CommandResolver for FixedResolver {
        fn resolve(&self) -> Result<String, ConverterError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<(String, String, String)>>,
    }

    impl ConversionRunner for RecordingRunner {
        fn run(
            &self,
            command: &str,
            tool_label: &str,
            output_extension: &str,
            out: &mut dyn Write,
        ) -> Result<u64, ConverterError> {
            self.calls.borrow_mut().push((
                command.to_string(),
                tool_label.to_string(),
                output_extension.to_string(),
            ));
            out.write_all(b"WMF")?;
            Ok(3)
        }
    }

    #[test]
    fn test_request_quotes_input() {
        let config = ConverterConfig::default();
        let request =
            ExportRequest::new(&FixedResolver("uniconvertor"), "my drawing.svg", &config).unwrap();
        assert_eq!(request.command, "uniconvertor \"my drawing.svg\" ");
        assert_eq!(request.tool_label, "UniConvertor");
        assert_eq!(request.output_extension, ".wmf");
    }

    #[test]
    fn test_request_uses_resolved_command() {
        let config = ConverterConfig::default();
        let resolver = FixedResolver("/opt/uc/bin/uniconv --quiet");
        let request = ExportRequest::new(&resolver, "/tmp/in.svg", &config).unwrap();
        assert!(request.command.starts_with("/opt/uc/bin/uniconv --quiet "));
        assert!(request.command.contains("\"/tmp/in.svg\""));
    }

    #[test]
    fn test_request_rejects_empty_input() {
        let config = ConverterConfig::default();
        let err = ExportRequest::new(&FixedResolver("uniconv"), "", &config).unwrap_err();
        assert!(matches!(err, ConverterError::EmptyInput));
    }

    #[test]
    fn test_export_delegates_to_runner() {
        let config = ConverterConfig::default();
        let runner = RecordingRunner::default();
        let mut out = Vec::new();

        let copied =
            export(&FixedResolver("uniconv"), &runner, "a.svg", &config, &mut out).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(out, b"WMF");
        assert_eq!(
            runner.calls.borrow().as_slice(),
            &[(
                "uniconv \"a.svg\" ".to_string(),
                "UniConvertor".to_string(),
                ".wmf".to_string()
            )]
        );
    }

    #[test]
    fn test_missing_tool() {
        let resolver = PathResolver::new(
            vec!["inkaux-no-such-converter-3f9a".into()],
            "UniConvertor",
        );
        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, ConverterError::ToolMissing { .. }));
        assert!(err.to_string().contains("UniConvertor"));

        let runner = RecordingRunner::default();
        let mut out = Vec::new();
        let config = ConverterConfig::default();
        assert!(export(&resolver, &runner, "a.svg", &config, &mut out).is_err());
        assert!(runner.calls.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_copies_output() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = temp_dir.path().join("in.svg");
        std::fs::write(&input, b"converted bytes").unwrap();

        // `cp "<input>" "<output>"` stands in for the converter.
        let config = ConverterConfig::default();
        let mut out = Vec::new();
        let copied = export(
            &FixedResolver("cp"),
            &ShellRunner,
            &input.display().to_string(),
            &config,
            &mut out,
        )
        .unwrap();

        assert_eq!(copied, 15);
        assert_eq!(out, b"converted bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_reports_failure() {
        let mut out = Vec::new();
        let err = ShellRunner
            .run("echo oops >&2; false ", "UniConvertor", ".wmf", &mut out)
            .unwrap_err();

        match err {
            ConverterError::Failed { tool, stderr, .. } => {
                assert_eq!(tool, "UniConvertor");
                assert!(stderr.contains("oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_requires_output() {
        let mut out = Vec::new();
        let err = ShellRunner
            .run("true ", "UniConvertor", ".wmf", &mut out)
            .unwrap_err();
        assert!(matches!(err, ConverterError::NoOutput { .. }));
    }
}
