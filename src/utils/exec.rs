//! External command execution.
//!
//! Builder API for the tools the pipeline delegates to (the Sass compiler,
//! the WOFF2 converter). Output is captured; stderr of successful runs is
//! logged through a [`FilterRule`].
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::from_slice(&config.styles.compiler)
//!     .arg("--stdin")
//!     .arg("--load-path")
//!     .arg(&generated)
//!     .stdin(source)
//!     .filter(&SASS_FILTER)
//!     .run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    stdin_data: Option<Vec<u8>>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create from a command array (e.g., `["sass", "--no-source-map"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return its captured output.
    ///
    /// A non-zero exit status is an error carrying the filtered stderr.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        if self.program.is_empty() {
            anyhow::bail!("empty command");
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match self.stdin_data {
            Some(data) => {
                cmd.stdin(Stdio::piped());
                let mut child = cmd
                    .spawn()
                    .with_context(|| format!("Failed to spawn `{name}`"))?;
                if let Some(mut stdin) = child.stdin.take() {
                    stdin
                        .write_all(&data)
                        .with_context(|| format!("Failed to write stdin to `{name}`"))?;
                }
                child
                    .wait_with_output()
                    .with_context(|| format!("Failed to wait for `{name}`"))?
            }
            None => cmd
                .output()
                .with_context(|| format!("Failed to execute `{name}`"))?,
        };

        log_output(&name, &output, filter)?;
        Ok(output)
    }

    fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .to_string()
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Skips known noise such as deprecation banners.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                !self.should_skip(plain.trim())
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    re.replace_all(s, "")
}

fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output, filter));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Failure message: exit status, then stderr with ANSI codes removed.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = strip_ansi(stderr.trim());
    let error_msg = filter
        .skip_prefixes
        .iter()
        .fold(stderr.as_ref(), |s, p| s.trim_start_matches(p).trim_start());

    let mut msg = format!("`{name}` failed with {}", output.status);
    if !error_msg.is_empty() {
        msg.push('\n');
        msg.push_str(error_msg);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::from_slice(&["sass", "--no-source-map"]).arg("--stdin");

        assert_eq!(cmd.program, OsString::from("sass"));
        assert_eq!(cmd.args, vec![OsString::from("--no-source-map"), "--stdin".into()]);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::from_slice(&["echo"]).arg("").arg("a").arg("");
        assert_eq!(cmd.args.len(), 1);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["Deprecation", "WARN:"]);
        assert!(filter.should_skip("Deprecation Warning: slash-div"));
        assert!(filter.should_skip("WARN: something"));
        assert!(!filter.should_skip("Error: expected"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_empty_command() {
        let empty: [&str; 0] = [];
        assert!(Cmd::from_slice(&empty).run().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_simple_command() {
        let output = Cmd::from_slice(&["echo"]).arg("hello").run().unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_pipe() {
        let output = Cmd::from_slice(&["cat"]).stdin(b"test data").run().unwrap();
        assert_eq!(output.stdout, b"test data");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_stderr() {
        let err = Cmd::from_slice(&["sh", "-c", "echo broken >&2; exit 3"])
            .run()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`sh` failed"));
        assert!(msg.contains("broken"));
    }
}
