//! Terminal output helpers: status lines, section headers, and batch progress.

pub use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Pending => "○",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Pending,
}

/// Print a styled status message.
#[macro_export]
macro_rules! print_status {
    ($status:expr, $msg:expr) => {{
        use $crate::ui::OwoColorize as _;
        use $crate::ui::{status_icon, Status};
        let icon = status_icon($status);
        match $status {
            Status::Success => println!("{} {}", icon.green().bold(), $msg),
            Status::Error => println!("{} {}", icon.red().bold(), $msg),
            Status::Warning => println!("{} {}", icon.yellow().bold(), $msg),
            Status::Info => println!("{} {}", icon.cyan().bold(), $msg),
            Status::Pending => println!("{} {}", icon.white().dimmed(), $msg),
        }
    }};
}

/// Welcome banner for the application.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!(
        "║                 📚 Literature Review v{:<8}                ║",
        version
    );
    println!("║                                                               ║");
    println!("║   Summarize a folder of papers into a cited literature review ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Progress display for a batch of documents
///
/// A bar is drawn only on a terminal; otherwise plain lines are printed.
/// Clones share the same bar.
#[derive(Clone)]
pub struct BatchProgress {
    bar: indicatif::ProgressBar,
    quiet: bool,
}

impl std::fmt::Debug for BatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProgress")
            .field("hidden", &self.bar.is_hidden())
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl BatchProgress {
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet || !is_terminal() {
            indicatif::ProgressBar::hidden()
        } else {
            let pb = indicatif::ProgressBar::new(total as u64);
            let style = indicatif::ProgressStyle::with_template(
                "{spinner:.cyan} {wide_bar:.cyan/blue} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .progress_chars("█▓▒░ ");
            pb.set_style(style);
            pb
        };
        Self { bar, quiet }
    }

    /// No output at all
    pub fn hidden() -> Self {
        Self {
            bar: indicatif::ProgressBar::hidden(),
            quiet: true,
        }
    }

    /// Print a line without tearing the bar
    pub fn println(&self, line: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        if self.bar.is_hidden() {
            println!("{}", line.as_ref());
        } else {
            self.bar.println(line.as_ref());
        }
    }

    pub fn started(&self, file_name: &str) {
        self.println(format!("Processing: {}", file_name));
    }

    pub fn finished(&self, file_name: &str, skipped: bool) {
        let icon = if skipped {
            status_icon(Status::Warning)
        } else {
            status_icon(Status::Success)
        };
        self.bar.set_message(format!("{} {}", icon, file_name));
        self.bar.inc(1);
    }

    pub fn finish(&self, processed: usize, total: usize) {
        self.bar.finish_with_message(format!(
            "{} {}/{} processed",
            status_icon(Status::Success),
            processed,
            total
        ));
    }
}
