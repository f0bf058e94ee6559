//! Terminal output: tagged log lines, the build progress line and the watch
//! status block.
//!
//! ```ignore
//! log!("styles"; "compiled {} files", count);
//! debug!("cache"; "loaded {} entries", n); // only with --verbose
//! ```
//!
//! All writes go through one [`Screen`] lock, so a log line printed while the
//! progress line is drawn replaces it instead of being appended to it.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::{Mutex, const_mutex};
use std::io::{StdoutLock, Write, stdout};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static VERBOSE: AtomicBool = AtomicBool::new(false);
static WATCHING: AtomicBool = AtomicBool::new(false);
static SCREEN: Mutex<Screen> = const_mutex(Screen::new());

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Route results through the overwriting status block (`develop`).
pub fn set_watch_mode(enabled: bool) {
    WATCHING.store(enabled, Ordering::Relaxed);
}

#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// `log!` that prints only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let line = format!("{} {message}", tag(module));
    SCREEN.lock().line(&line);
}

/// Rebuild success in watch mode.
pub fn status_success(message: &str) {
    SCREEN.lock().status(&format!("{} {message}", "✓".green()));
}

/// Task failure: replaces the status block while watching. One-shot builds
/// keep every failure on screen.
pub fn report_error(summary: &str, detail: &str) {
    let message = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    let mut screen = SCREEN.lock();
    if WATCHING.load(Ordering::Relaxed) {
        screen.status(&format!("{} {message}", "✗".red()));
    } else {
        screen.line(&format!("{} {message}", tag("error")));
    }
}

fn tag(module: &str) -> String {
    let tag = format!("[{module}]");
    match module {
        "serve" | "reload" => tag.bright_blue().bold().to_string(),
        "watch" => tag.bright_green().bold().to_string(),
        "clean" => tag.bright_magenta().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

/// `HH:MM:SS` (UTC) of a unix timestamp.
fn clock(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60
    )
}

/// What is currently drawn below the last complete line.
struct Screen {
    /// A progress line without trailing newline is on the current row.
    progress: bool,
    /// Rows taken by the last watch status block.
    status_rows: usize,
}

impl Screen {
    const fn new() -> Self {
        Self {
            progress: false,
            status_rows: 0,
        }
    }

    fn out() -> StdoutLock<'static> {
        stdout().lock()
    }

    fn clear_row(out: &mut StdoutLock<'_>) {
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    /// Print a permanent line.
    fn line(&mut self, text: &str) {
        let mut out = Self::out();
        if self.progress {
            Self::clear_row(&mut out);
        }
        writeln!(out, "{text}").ok();
        out.flush().ok();
        // redrawn on its next update
        self.progress = false;
        self.status_rows = 0;
    }

    /// Replace the previous status block with `text`.
    fn status(&mut self, text: &str) {
        let mut out = Self::out();
        if let Ok(rows @ 1..) = u16::try_from(self.status_rows) {
            execute!(out, cursor::MoveUp(rows), Clear(ClearType::FromCursorDown)).ok();
        }
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        writeln!(out, "{} {text}", format!("[{}]", clock(secs)).dimmed()).ok();
        out.flush().ok();
        self.status_rows = text.lines().count().max(1);
    }

    /// Draw the progress row; `done` ends it with a newline.
    fn progress(&mut self, text: &str, done: bool) {
        let mut out = Self::out();
        Self::clear_row(&mut out);
        if done {
            writeln!(out, "{text}").ok();
        } else {
            write!(out, "{text}").ok();
        }
        out.flush().ok();
        self.progress = !done;
    }
}

/// One-row build progress with named counters, e.g. `[build] generate(1/2) tasks(3/5)`.
pub struct ProgressLine {
    counters: Vec<(&'static str, usize, AtomicUsize)>,
    done: bool,
}

impl ProgressLine {
    /// Counters with a zero total are left out.
    pub fn new(totals: &[(&'static str, usize)]) -> Self {
        let progress = Self {
            counters: totals
                .iter()
                .filter(|(_, total)| *total > 0)
                .map(|&(name, total)| (name, total, AtomicUsize::new(0)))
                .collect(),
            done: false,
        };
        SCREEN.lock().progress(&progress.render(), false);
        progress
    }

    pub fn inc(&self, name: &str) {
        let Some((_, _, current)) = self.counters.iter().find(|(n, ..)| *n == name) else {
            return;
        };
        current.fetch_add(1, Ordering::Relaxed);
        // workers never wait on the terminal
        if let Some(mut screen) = SCREEN.try_lock() {
            screen.progress(&self.render(), false);
        }
    }

    /// Leave the final counts on screen.
    pub fn finish(mut self) {
        SCREEN.lock().progress(&self.render(), true);
        self.done = true;
    }

    fn render(&self) -> String {
        let counters: Vec<String> = self
            .counters
            .iter()
            .map(|(name, total, current)| {
                format!("{name}({}/{total})", current.load(Ordering::Relaxed))
            })
            .collect();
        format!("{} {}", tag("build"), counters.join(" "))
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if !self.done {
            let mut screen = SCREEN.lock();
            let mut out = Screen::out();
            Screen::clear_row(&mut out);
            out.flush().ok();
            screen.progress = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3600 + 61), "01:01:01");
        assert_eq!(clock(86400 + 59), "00:00:59");
    }

    #[test]
    fn test_progress_counts() {
        let progress = ProgressLine::new(&[("generate", 0), ("tasks", 5)]);
        assert_eq!(progress.counters.len(), 1);

        progress.inc("tasks");
        progress.inc("tasks");
        progress.inc("generate");
        assert!(progress.render().ends_with("tasks(2/5)"));
        progress.finish();
    }

    #[test]
    fn test_status_block_tracks_rows() {
        let mut screen = Screen::new();
        screen.status("Error in sass\nexpected \"{\"\n  --> main.scss:5");
        assert_eq!(screen.status_rows, 3);
        screen.status("rebuilt styles");
        assert_eq!(screen.status_rows, 1);
        screen.line("[watch] stopped");
        assert_eq!(screen.status_rows, 0);
    }
}
